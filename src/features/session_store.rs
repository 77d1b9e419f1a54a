//! Per-account session cookie persistence.
//!
//! One JSON file per account under the configured session directory, named
//! by a filesystem-safe transform of the account email. Cookies are loaded
//! and injected *before* the first navigation so the initial request already
//! carries them; the jar is written back after the account finishes,
//! whether its run succeeded or not. A missing file is not an error, it
//! simply means a fresh interactive login.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, SetCookiesParams};
use chromiumoxide::Page;
use tracing::{info, warn};

/// Filesystem-safe key for an account email: `@` → `_at_`, `.` → `_`.
pub fn account_key(email: &str) -> String {
    email.replace('@', "_at_").replace('.', "_")
}

/// Full path of the session file for one account.
pub fn session_path(session_dir: &Path, email: &str) -> PathBuf {
    session_dir.join(format!("{}.json", account_key(email)))
}

/// Load stored cookies for an account as raw JSON values.
///
/// Returns `None` when no session file exists or it cannot be parsed
/// (a corrupt file is logged and treated as "no prior session").
pub fn load_raw(session_dir: &Path, email: &str) -> Option<Vec<serde_json::Value>> {
    let path = session_path(session_dir, email);
    let contents = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
        Ok(cookies) if !cookies.is_empty() => Some(cookies),
        Ok(_) => None,
        Err(e) => {
            warn!("session file {} unreadable ({e}), ignoring", path.display());
            None
        }
    }
}

/// Inject stored cookies into a live page via `Network.setCookies`.
///
/// Individual cookies that fail to deserialize are skipped so a partially
/// stale session file never blocks the run.
pub async fn inject_into_page(page: &Page, raw_cookies: &[serde_json::Value]) {
    let params: Vec<CookieParam> = raw_cookies
        .iter()
        .filter_map(|v| serde_json::from_value::<CookieParam>(v.clone()).ok())
        .collect();

    if params.is_empty() {
        warn!("stored session contained no usable cookies, skipping injection");
        return;
    }

    let count = params.len();
    match page.execute(SetCookiesParams::new(params)).await {
        Ok(_) => info!("🍪 injected {count} session cookies"),
        Err(e) => warn!("failed to inject session cookies: {e}"),
    }
}

/// Load-and-inject in one call. Returns true when a stored session was found.
pub async fn restore_into_page(page: &Page, session_dir: &Path, email: &str) -> bool {
    match load_raw(session_dir, email) {
        Some(raw) => {
            inject_into_page(page, &raw).await;
            true
        }
        None => false,
    }
}

/// Capture the page's cookie jar and overwrite the account's session file,
/// pretty-printed. Returns the number of cookies written.
pub async fn save_from_page(page: &Page, session_dir: &Path, email: &str) -> Result<usize> {
    let cookies = page.get_cookies().await?;
    let raw: Vec<serde_json::Value> = cookies
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    std::fs::create_dir_all(session_dir)?;
    let path = session_path(session_dir, email);
    std::fs::write(&path, serde_json::to_string_pretty(&raw)?)?;
    Ok(raw.len())
}
