use thiserror::Error;

/// Which anti-bot defense a polling loop was trying to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// Full-page "Just a moment…" interstitial substituted for the real content.
    Interstitial,
    /// In-page "Security Check" acknowledgment banner.
    SecurityBanner,
    /// Embedded Turnstile widget that populates a hidden proof token.
    Turnstile,
}

impl std::fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeKind::Interstitial => write!(f, "full-page interstitial"),
            ChallengeKind::SecurityBanner => write!(f, "security check banner"),
            ChallengeKind::Turnstile => write!(f, "turnstile widget"),
        }
    }
}

/// Error taxonomy for the renewal workflow.
///
/// Domain-level failures are caught at the per-domain boundary and converted
/// into a [`crate::core::types::RenewalOutcome`] carrying the description.
/// Account-level failures (login, enumeration) abort that account only.
#[derive(Debug, Error)]
pub enum RenewError {
    #[error("{kind} unresolved after {attempts} attempts")]
    ChallengeTimeout { kind: ChallengeKind, attempts: u32 },

    #[error("content frame never became available")]
    FrameUnavailable,

    #[error("login for {email} did not leave the login page")]
    LoginFailed { email: String },

    #[error("expected control not found: {0}")]
    ElementNotFound(String),

    #[error("browser transport error: {0}")]
    Browser(#[from] anyhow::Error),
}
