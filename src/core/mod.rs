pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, TelegramConfig};
pub use error::{ChallengeKind, RenewError};
pub use types::{format_expiry, Account, RenewalOutcome, RunSummary};
