//! Text extraction from rendered dashboard content.
//!
//! Domain enumeration and expiry parsing both run over the frame's rendered
//! text, never its DOM structure, so cosmetic markup changes don't break the
//! workflow.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Days-until-expiry threshold at or below which a renewal is attempted.
pub const RENEWAL_WINDOW_DAYS: i64 = 180;

fn domain_matcher() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([\w-]+\.(?:us\.kg|pp\.ua|eu\.org|nom\.za|co\.za))")
            .expect("domain pattern is valid")
    })
}

fn expire_date_matcher() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Expire Date:\s*(\d{8})").expect("expiry pattern is valid"))
}

/// Collect every owned-domain name appearing in `text`, deduplicated,
/// preserving first-seen order.
pub fn collect_domains(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut domains = Vec::new();
    for cap in domain_matcher().captures_iter(text) {
        let name = cap[1].to_string();
        if seen.insert(name.clone()) {
            domains.push(name);
        }
    }
    domains
}

/// Parse the first `Expire Date: YYYYMMDD` occurrence in `text`.
pub fn extract_expire_date(text: &str) -> Option<NaiveDate> {
    let cap = expire_date_matcher().captures(text)?;
    NaiveDate::parse_from_str(&cap[1], "%Y%m%d").ok()
}

/// Days from `today` until `expiry`. An unknown expiry maps to -1, which is
/// inside the renewal window, so unparseable pages get a renewal attempt
/// rather than a silent skip.
pub fn days_remaining(expiry: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match expiry {
        Some(d) => (d - today).num_days(),
        None => -1,
    }
}
