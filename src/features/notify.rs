//! End-of-run Telegram report.
//!
//! One HTML-formatted message per run, summarizing every domain outcome and
//! any account-level failures. Delivery is strictly best-effort: a notifier
//! failure never changes the run's exit status.

use chrono::Local;
use reqwest::Client;
use tracing::{info, warn};

use crate::core::config::TelegramConfig;
use crate::core::types::{format_expiry, RunSummary};

/// Send `text` through the Bot API. Returns whether delivery succeeded.
pub async fn send_telegram(client: &Client, telegram: &TelegramConfig, text: &str) -> bool {
    let url = format!(
        "https://api.telegram.org/bot{}/sendMessage",
        telegram.bot_token
    );
    let body = serde_json::json!({
        "chat_id": telegram.chat_id,
        "text": text,
        "parse_mode": "HTML",
    });

    match client.post(&url).json(&body).send().await {
        Ok(resp) if resp.status().is_success() => {
            info!("📨 telegram notification sent");
            true
        }
        Ok(resp) => {
            warn!("telegram API rejected message: HTTP {}", resp.status());
            false
        }
        Err(e) => {
            warn!("telegram send failed: {e}");
            false
        }
    }
}

/// Build the run report.
///
/// The headline classifies the run; the body lists account errors first,
/// then one line per domain in discovery order, then a timestamp.
pub fn format_report(summary: &RunSummary) -> String {
    if summary.outcomes.is_empty() && summary.account_errors.is_empty() {
        return format!(
            "🚨 <b>Domain renewal check failed</b>\n\nNo domain information was retrieved. \
             The dashboard may be unreachable or every login failed.\n\n🕒 {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    let success = summary.success_count();
    let skipped = summary.skip_count();
    let attempted = summary.attempted_count();
    let total = summary.outcomes.len();

    let title = if !summary.account_errors.is_empty() && summary.outcomes.is_empty() {
        "🚨 <b>Domain renewal failed, check the logs</b>"
    } else if !summary.account_errors.is_empty() {
        "⚠️ <b>Domain renewal partial: some accounts failed</b>"
    } else if skipped == total {
        "💤 <b>Nothing to renew yet</b>"
    } else if success == attempted && attempted > 0 {
        "✅ <b>Domain renewal succeeded</b>"
    } else if success > 0 {
        "⚠️ <b>Domain renewal partially succeeded</b>"
    } else {
        "ℹ️ <b>Domain renewal run finished</b>"
    };

    let mut lines = vec![title.to_string(), String::new()];

    if !summary.account_errors.is_empty() {
        for err in &summary.account_errors {
            lines.push(format!("❌ {err}"));
        }
        lines.push(String::new());
    }

    for outcome in &summary.outcomes {
        let glyph = if outcome.skipped {
            "⏭️"
        } else if outcome.succeeded {
            "✅"
        } else {
            "❌"
        };
        let expiry = if outcome.new_expiry.is_some() {
            format_expiry(&outcome.new_expiry)
        } else {
            format_expiry(&outcome.previous_expiry)
        };
        let mut line = format!("{glyph} <code>{}</code> expires {expiry}", outcome.domain);
        if let Some(note) = &outcome.error_detail {
            line.push_str(&format!(" ({note})"));
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!("🕒 {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RenewalOutcome;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn empty_run_is_an_alarm() {
        let report = format_report(&RunSummary::default());
        assert!(report.contains("🚨"));
        assert!(report.contains("No domain information"));
    }

    #[test]
    fn all_skipped_run_reports_nothing_to_renew() {
        let mut s = RunSummary::default();
        s.outcomes.push(RenewalOutcome::skipped(
            "a.us.kg",
            date(2027, 1, 1),
            "300 days until expiry, renewal not yet needed".into(),
        ));
        let report = format_report(&s);
        assert!(report.contains("Nothing to renew"));
        assert!(report.contains("<code>a.us.kg</code>"));
        assert!(report.contains("2027-01-01"));
    }

    #[test]
    fn full_success_gets_the_green_headline() {
        let mut s = RunSummary::default();
        s.outcomes.push(RenewalOutcome::attempted(
            "a.us.kg",
            true,
            date(2026, 9, 1),
            date(2027, 9, 1),
        ));
        let report = format_report(&s);
        assert!(report.contains("✅ <b>Domain renewal succeeded</b>"));
        // new expiry wins over the previous one
        assert!(report.contains("2027-09-01"));
        assert!(!report.contains("2026-09-01"));
    }

    #[test]
    fn account_error_with_outcomes_is_partial() {
        let mut s = RunSummary::default();
        s.outcomes.push(RenewalOutcome::attempted(
            "a.us.kg",
            true,
            date(2026, 9, 1),
            date(2027, 9, 1),
        ));
        s.record_account_error("b@x.com", "login failed");
        let report = format_report(&s);
        assert!(report.contains("some accounts failed"));
        assert!(report.contains("❌ b@x.com: login failed"));
    }

    #[test]
    fn account_error_without_outcomes_is_a_failure() {
        let mut s = RunSummary::default();
        s.record_account_error("b@x.com", "login failed");
        let report = format_report(&s);
        assert!(report.contains("🚨"));
        assert!(report.contains("check the logs"));
    }

    #[test]
    fn unknown_expiry_renders_sentinel() {
        let mut s = RunSummary::default();
        s.outcomes
            .push(RenewalOutcome::failed("a.us.kg", "frame never loaded".into()));
        let report = format_report(&s);
        assert!(report.contains("expires unknown"));
        assert!(report.contains("(frame never loaded)"));
    }
}
