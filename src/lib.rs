//! domain-keeper: unattended renewal of DigitalPlat free domains.
//!
//! Logs into the dashboard with each configured account, enumerates owned
//! domains, and renews every domain whose expiry is inside the renewal
//! window, defeating the interstitial, security-banner, and Turnstile
//! challenges along the way.

pub mod browser;
pub mod core;
pub mod features;
pub mod workflow;

pub use crate::browser::challenge;
pub use crate::browser::frame;
pub use crate::browser::launcher::BrowserHandle;
pub use crate::browser::{await_condition, DashProbe, LiveProbe, PollPolicy, Rect};
pub use crate::core::config::{AppConfig, TelegramConfig};
pub use crate::core::error::{ChallengeKind, RenewError};
pub use crate::core::types::{format_expiry, Account, RenewalOutcome, RunSummary};
pub use crate::features::{notify, session_store};
pub use crate::workflow::{process_account, WorkflowDriver};
