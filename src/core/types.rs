use chrono::NaiveDate;

/// One dashboard account, parsed once at startup. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub password: String,
}

/// Render an optional expiry date, using the `unknown` sentinel when the
/// page never yielded a parseable date.
pub fn format_expiry(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "unknown".to_string(),
    }
}

/// Result of processing a single discovered domain. Immutable after creation;
/// collected in discovery order for reporting.
///
/// Exactly one of these shapes holds:
/// * `skipped == true`: eligibility short-circuited, nothing was clicked.
/// * `skipped == false`: `succeeded` definitely reports the renewal attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalOutcome {
    pub domain: String,
    pub succeeded: bool,
    pub skipped: bool,
    pub previous_expiry: Option<NaiveDate>,
    pub new_expiry: Option<NaiveDate>,
    pub error_detail: Option<String>,
}

impl RenewalOutcome {
    /// Eligibility check short-circuited the workflow; no renewal attempted.
    pub fn skipped(domain: &str, expiry: Option<NaiveDate>, note: String) -> Self {
        Self {
            domain: domain.to_string(),
            succeeded: false,
            skipped: true,
            previous_expiry: expiry,
            new_expiry: expiry,
            error_detail: Some(note),
        }
    }

    /// The site itself has not opened the renewal window yet: a normal
    /// business outcome, not an error.
    pub fn not_eligible(domain: &str, expiry: Option<NaiveDate>) -> Self {
        Self {
            domain: domain.to_string(),
            succeeded: false,
            skipped: false,
            previous_expiry: expiry,
            new_expiry: expiry,
            error_detail: Some("renewal window not yet open".to_string()),
        }
    }

    /// A renewal was attempted and both expiry readings are in hand.
    pub fn attempted(
        domain: &str,
        succeeded: bool,
        previous_expiry: Option<NaiveDate>,
        new_expiry: Option<NaiveDate>,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            succeeded,
            skipped: false,
            previous_expiry,
            new_expiry,
            error_detail: None,
        }
    }

    /// An uncaught failure at the per-domain boundary, converted so sibling
    /// domains keep processing.
    pub fn failed(domain: &str, detail: String) -> Self {
        Self {
            domain: domain.to_string(),
            succeeded: false,
            skipped: false,
            previous_expiry: None,
            new_expiry: None,
            error_detail: Some(detail),
        }
    }

    pub fn status_glyph(&self) -> &'static str {
        if self.skipped {
            "⏭"
        } else if self.succeeded {
            "✓"
        } else {
            "✗"
        }
    }
}

/// Run-level aggregate: per-domain outcomes in order plus account-level
/// errors (login / enumeration failures).
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<RenewalOutcome>,
    pub account_errors: Vec<String>,
}

impl RunSummary {
    pub fn record_account_error(&mut self, email: &str, detail: &str) {
        self.account_errors.push(format!("{email}: {detail}"));
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn skip_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped).count()
    }

    /// Outcomes that actually needed a renewal attempt this run.
    pub fn attempted_count(&self) -> usize {
        self.outcomes.len() - self.skip_count()
    }

    /// Process exit contract: success requires at least one renewed or
    /// eligible-skip outcome and zero account-level errors.
    pub fn exit_ok(&self) -> bool {
        (self.success_count() > 0 || self.skip_count() > 0) && self.account_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn skipped_outcome_is_never_ambiguous() {
        let o = RenewalOutcome::skipped("a.us.kg", Some(date(2026, 6, 1)), "300 days".into());
        assert!(o.skipped);
        assert!(!o.succeeded);
        assert_eq!(o.previous_expiry, o.new_expiry);
    }

    #[test]
    fn exit_contract() {
        let mut s = RunSummary::default();
        assert!(!s.exit_ok(), "empty run is a failure");

        s.outcomes
            .push(RenewalOutcome::skipped("a.us.kg", None, "n/a".into()));
        assert!(s.exit_ok(), "an eligible skip alone is a success");

        s.record_account_error("b@x.com", "login failed");
        assert!(!s.exit_ok(), "any account-level error fails the run");
    }

    #[test]
    fn format_expiry_sentinel() {
        assert_eq!(format_expiry(&None), "unknown");
        assert_eq!(format_expiry(&Some(date(2026, 1, 15))), "2026-01-15");
    }
}
