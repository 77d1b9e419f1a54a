//! Process configuration, constructed **once** at startup and passed by
//! reference to every component that needs it. Component logic never reads
//! ambient environment state.
//!
//! Sources, first hit wins per key:
//! 1. `domain-keeper.env` key=value file (process cwd, then one level up)
//! 2. process environment

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::types::Account;

pub const ENV_ACCOUNTS: &str = "ACCOUNTS_DOMAIN";
pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";
pub const ENV_SESSION_DIR: &str = "SESSION_DIR";
pub const ENV_LOG_DIR: &str = "LOG_DIR";

const CONFIG_FILE: &str = "domain-keeper.env";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub accounts: Vec<Account>,
    /// `None` disables the end-of-run notification entirely.
    pub telegram: Option<TelegramConfig>,
    /// Explicit browser binary override; default is auto-discovery.
    pub chrome_executable: Option<String>,
    pub session_dir: PathBuf,
    pub log_dir: PathBuf,
    /// The env file that supplied values, if one was found. Logged by the
    /// binary once a tracing subscriber exists.
    pub config_source: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Self {
        let (file_vars, config_source) = read_config_file();
        let get = |key: &str| -> Option<String> {
            file_vars
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let accounts = get(ENV_ACCOUNTS)
            .map(|raw| parse_accounts(&raw))
            .unwrap_or_default();

        let telegram = match (get(ENV_TELEGRAM_BOT_TOKEN), get(ENV_TELEGRAM_CHAT_ID)) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let chrome_executable = get(ENV_CHROME_EXECUTABLE).filter(|p| Path::new(p).exists());

        let session_dir = get(ENV_SESSION_DIR).map(PathBuf::from).unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".domain-keeper").join("sessions"))
                .unwrap_or_else(|| PathBuf::from("sessions"))
        });

        let log_dir = get(ENV_LOG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            accounts,
            telegram,
            chrome_executable,
            session_dir,
            log_dir,
            config_source,
        }
    }
}

/// Parse the delimited account list: comma-separated `email:password` pairs,
/// first colon splits. Segments without a colon are silently dropped.
pub fn parse_accounts(raw: &str) -> Vec<Account> {
    raw.split(',')
        .filter_map(|item| {
            let item = item.trim();
            let (email, password) = item.split_once(':')?;
            Some(Account {
                email: email.trim().to_string(),
                password: password.trim().to_string(),
            })
        })
        .collect()
}

fn read_config_file() -> (HashMap<String, String>, Option<PathBuf>) {
    read_config_file_at(Path::new("."))
}

/// Scan `base`, then its parent, for the config file. Returns the parsed
/// variables plus the path actually used; `load()` runs before tracing is
/// initialized, so the caller logs the source later, not here.
fn read_config_file_at(base: &Path) -> (HashMap<String, String>, Option<PathBuf>) {
    let mut vars = HashMap::new();
    for path in [base.join(CONFIG_FILE), base.join("..").join(CONFIG_FILE)] {
        let Ok(contents) = std::fs::read_to_string(&path) else {
            continue;
        };
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                vars.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        return (vars, Some(path));
    }
    (vars, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accounts_splits_on_first_colon() {
        let accounts = parse_accounts("a@x.com:p1, b@y.com:p2:with:colons");
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].email, "a@x.com");
        assert_eq!(accounts[0].password, "p1");
        assert_eq!(accounts[1].password, "p2:with:colons");
    }

    #[test]
    fn parse_accounts_drops_malformed_segments() {
        let accounts = parse_accounts("a@x.com:p1, b@y.com:p2, bad");
        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(|a| a.email != "bad"));
    }

    #[test]
    fn parse_accounts_trims_whitespace() {
        let accounts = parse_accounts("  a@x.com : p1 ");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].email, "a@x.com");
        assert_eq!(accounts[0].password, "p1");
    }

    #[test]
    fn parse_accounts_empty_input() {
        assert!(parse_accounts("").is_empty());
        assert!(parse_accounts(" , ,, ").is_empty());
    }

    #[test]
    fn config_file_discovery_reports_the_source_path() {
        let dir = std::env::temp_dir().join("domain-keeper-test-envfile");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILE),
            "# comment\nACCOUNTS_DOMAIN=a@x.com:p1\nLOG_DIR = logs\n",
        )
        .unwrap();

        let (vars, source) = read_config_file_at(&dir);
        assert_eq!(vars.get("ACCOUNTS_DOMAIN").unwrap(), "a@x.com:p1");
        assert_eq!(vars.get("LOG_DIR").unwrap(), "logs");
        assert_eq!(source.unwrap(), dir.join(CONFIG_FILE));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_config_file_yields_no_source() {
        // nested so the parent-directory probe also lands in our own dir
        let dir = std::env::temp_dir().join("domain-keeper-test-noenv/inner");
        std::fs::create_dir_all(&dir).unwrap();

        let (vars, source) = read_config_file_at(&dir);
        assert!(vars.is_empty());
        assert!(source.is_none());
    }
}
