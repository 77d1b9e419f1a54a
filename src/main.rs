use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_keeper::core::config::ENV_ACCOUNTS;
use domain_keeper::{format_expiry, notify, process_account, AppConfig, RunSummary};

/// Console layer plus a per-run plain-text log file. The returned guard must
/// stay alive for the process lifetime or buffered lines are lost.
fn init_tracing(log_dir: &std::path::Path) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_name = format!("renew_log_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
    let file = std::fs::create_dir_all(log_dir)
        .and_then(|_| std::fs::File::create(log_dir.join(&file_name)))
        .ok();

    match file {
        Some(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_ansi(true))
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_ansi(true))
                .init();
            warn!("could not create log file in {}", log_dir.display());
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = AppConfig::load();
    let _guard = init_tracing(&config.log_dir);

    if let Some(source) = &config.config_source {
        info!("config loaded from {}", source.display());
    }

    if config.accounts.is_empty() {
        error!("no accounts configured; set {ENV_ACCOUNTS} as email:password[,email:password...]");
        return ExitCode::FAILURE;
    }
    info!("🚀 starting renewal run for {} account(s)", config.accounts.len());

    let mut summary = RunSummary::default();
    for account in &config.accounts {
        match process_account(&config, account).await {
            Ok(outcomes) => summary.outcomes.extend(outcomes),
            Err(detail) => {
                error!("account {} failed: {detail}", account.email);
                summary.record_account_error(&account.email, &detail);
            }
        }
    }

    info!("run complete");
    for outcome in &summary.outcomes {
        info!(
            "{} {} (expires {})",
            outcome.status_glyph(),
            outcome.domain,
            format_expiry(if outcome.new_expiry.is_some() {
                &outcome.new_expiry
            } else {
                &outcome.previous_expiry
            })
        );
    }
    info!(
        "totals: {} renewed, {} skipped, {} account error(s)",
        summary.success_count(),
        summary.skip_count(),
        summary.account_errors.len()
    );

    if let Some(telegram) = &config.telegram {
        match reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(client) => {
                let report = notify::format_report(&summary);
                notify::send_telegram(&client, telegram, &report).await;
            }
            Err(e) => warn!("could not build HTTP client for notification: {e}"),
        }
    } else {
        info!("telegram notification not configured, skipping");
    }

    if summary.exit_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
