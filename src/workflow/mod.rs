//! Account orchestration over a live browser.

pub mod driver;
pub mod extract;

pub use driver::WorkflowDriver;

use tracing::{info, warn};

use crate::browser::launcher::BrowserHandle;
use crate::browser::LiveProbe;
use crate::core::config::AppConfig;
use crate::core::types::{Account, RenewalOutcome};
use crate::features::session_store;

/// Process one account in a dedicated browser instance.
///
/// Restores any stored session before the first navigation, runs the
/// workflow, then writes the cookie jar back whether the run succeeded or
/// not, so a login that got further than last time is never thrown away.
pub async fn process_account(
    config: &AppConfig,
    account: &Account,
) -> Result<Vec<RenewalOutcome>, String> {
    let mut handle = BrowserHandle::launch(config.chrome_executable.as_deref())
        .await
        .map_err(|e| e.to_string())?;

    let page = match handle.new_page().await {
        Ok(p) => p,
        Err(e) => {
            handle.close().await;
            return Err(e.to_string());
        }
    };

    if session_store::restore_into_page(&page, &config.session_dir, &account.email).await {
        info!("restored stored session for {}", account.email);
    }

    let probe = LiveProbe::new(page.clone());
    let result = WorkflowDriver::new(&probe).run(account).await;

    match session_store::save_from_page(&page, &config.session_dir, &account.email).await {
        Ok(count) => info!("🍪 saved {count} session cookies for {}", account.email),
        Err(e) => warn!("failed to save session for {}: {e}", account.email),
    }

    handle.close().await;

    match result {
        Ok(outcomes) if outcomes.is_empty() => {
            Err("no domains discovered or processed".to_string())
        }
        Ok(outcomes) => Ok(outcomes),
        Err(e) => Err(e.to_string()),
    }
}
