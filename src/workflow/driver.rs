//! Per-account renewal workflow.
//!
//! A linear state machine: authenticate, enumerate owned domains, then
//! renew each eligible domain in turn. Challenge resolution is woven into
//! every navigation since the interstitial, banner, and Turnstile can each
//! appear at any page boundary.

use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::browser::challenge::{
    acknowledge_security_banner, clear_interstitial, solve_turnstile, INTERSTITIAL_LOGIN,
    INTERSTITIAL_NAV, INTERSTITIAL_POST_SUBMIT,
};
use crate::browser::frame::{content_frame_text, FRAME_RETRIES};
use crate::browser::DashProbe;
use crate::core::error::RenewError;
use crate::core::types::{Account, RenewalOutcome};
use crate::workflow::extract::{
    collect_domains, days_remaining, extract_expire_date, RENEWAL_WINDOW_DAYS,
};

pub const DASHBOARD_URL: &str = "https://dash.domain.digitalplat.org/";
pub const LOGIN_URL: &str = "https://dash.domain.digitalplat.org/auth/login";

/// Domain manager page, routed through the panel shell.
pub fn manager_url(domain: &str) -> String {
    format!("https://dash.domain.digitalplat.org/panel/main?page=%2Fpanel%2Fmanager%2F{domain}")
}

const NAV_SETTLE: Duration = Duration::from_secs(3);
const SHORT_SETTLE: Duration = Duration::from_secs(2);
const FIELD_SETTLE: Duration = Duration::from_secs(1);
const SUBMIT_SETTLE: Duration = Duration::from_secs(5);
const EXPIRY_RETRY_BACKOFF: Duration = Duration::from_secs(3);

const DISCOVERY_ATTEMPTS: u32 = 3;
const CONFIRM_LABELS: &[&str] = &["Confirm", "Yes", "OK"];

/// Drives one account through the full workflow against any [`DashProbe`].
pub struct WorkflowDriver<'p, P: DashProbe + ?Sized> {
    probe: &'p P,
}

impl<'p, P: DashProbe + ?Sized> WorkflowDriver<'p, P> {
    pub fn new(probe: &'p P) -> Self {
        Self { probe }
    }

    /// Process one account end to end.
    ///
    /// Account-level failures (login, challenge timeout before enumeration)
    /// propagate as errors; per-domain failures are captured as outcomes so
    /// sibling domains keep processing. An empty outcome list means no
    /// domains were discovered, which the caller records as an account error.
    pub async fn run(&self, account: &Account) -> Result<Vec<RenewalOutcome>, RenewError> {
        info!("processing account {}", account.email);

        self.probe.goto(DASHBOARD_URL).await?;
        tokio::time::sleep(NAV_SETTLE).await;
        clear_interstitial(self.probe, INTERSTITIAL_LOGIN).await?;
        acknowledge_security_banner(self.probe).await?;

        let url = self.probe.current_url().await?;
        if url.to_lowercase().contains("login") {
            info!("no live session, logging in as {}", account.email);
            self.login(account).await?;
        } else {
            info!("restored session still valid, skipping login");
        }

        let domains = self.discover_domains().await?;
        if domains.is_empty() {
            warn!("no domains found for {}", account.email);
            return Ok(Vec::new());
        }
        info!("found {} domain(s): {}", domains.len(), domains.join(", "));

        let mut outcomes = Vec::with_capacity(domains.len());
        for domain in &domains {
            let outcome = match self.renew_domain(domain).await {
                Ok(o) => o,
                Err(e) => {
                    warn!("renewal of {domain} failed: {e}");
                    RenewalOutcome::failed(domain, e.to_string())
                }
            };
            info!(
                "{} {domain}{}",
                outcome.status_glyph(),
                outcome
                    .error_detail
                    .as_deref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default()
            );
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn login(&self, account: &Account) -> Result<(), RenewError> {
        self.probe.goto(LOGIN_URL).await?;
        tokio::time::sleep(NAV_SETTLE).await;
        clear_interstitial(self.probe, INTERSTITIAL_LOGIN).await?;

        // Cookie consent only shows up on fresh profiles.
        if self.probe.click_by_text("Accept all").await.unwrap_or(false) {
            debug!("dismissed cookie consent");
            tokio::time::sleep(FIELD_SETTLE).await;
        }

        if !self
            .probe
            .fill_by_placeholder("you@example.com", &account.email)
            .await?
        {
            return Err(RenewError::ElementNotFound("email field".to_string()));
        }
        if !self.probe.click_by_text("Next").await? {
            return Err(RenewError::ElementNotFound("Next button".to_string()));
        }
        tokio::time::sleep(NAV_SETTLE).await;

        if !self
            .probe
            .fill_by_placeholder("Your password", &account.password)
            .await?
        {
            return Err(RenewError::ElementNotFound("password field".to_string()));
        }
        tokio::time::sleep(SHORT_SETTLE).await;

        solve_turnstile(self.probe).await?;
        tokio::time::sleep(FIELD_SETTLE).await;

        if !self.probe.click_by_text("Login").await? {
            return Err(RenewError::ElementNotFound("Login button".to_string()));
        }
        tokio::time::sleep(SUBMIT_SETTLE).await;

        // The interstitial can reappear right after submission; the URL
        // check below is the real verdict, so a timeout here only warns.
        if let Err(e) = clear_interstitial(self.probe, INTERSTITIAL_POST_SUBMIT).await {
            warn!("post-submit interstitial lingered: {e}");
        }
        tokio::time::sleep(SHORT_SETTLE).await;

        let url = self.probe.current_url().await?;
        if url.to_lowercase().contains("login") {
            let text = self.probe.page_text().await.unwrap_or_default();
            let head: String = text.chars().take(200).collect();
            debug!("still on login page, content starts: {head:?}");
            return Err(RenewError::LoginFailed {
                email: account.email.clone(),
            });
        }
        info!("✅ logged in as {}", account.email);
        Ok(())
    }

    /// Enumerate owned domains from the "My Domains" listing.
    ///
    /// Retried as a whole because the listing frame occasionally renders
    /// empty on first load even after the frame itself attaches. An
    /// unavailable frame aborts immediately; that is a structural failure
    /// retrying navigation will not fix.
    async fn discover_domains(&self) -> Result<Vec<String>, RenewError> {
        for attempt in 1..=DISCOVERY_ATTEMPTS {
            self.probe.goto(DASHBOARD_URL).await?;
            tokio::time::sleep(NAV_SETTLE).await;
            clear_interstitial(self.probe, INTERSTITIAL_NAV).await?;
            acknowledge_security_banner(self.probe).await?;

            if self.probe.click_by_text("My Domains").await? {
                tokio::time::sleep(NAV_SETTLE).await;
                acknowledge_security_banner(self.probe).await?;
            }
            tokio::time::sleep(SHORT_SETTLE).await;

            let text = content_frame_text(self.probe).await?;
            let domains = collect_domains(&text);
            if !domains.is_empty() {
                return Ok(domains);
            }
            debug!(
                "domain listing empty on attempt {attempt}/{}",
                DISCOVERY_ATTEMPTS
            );
        }
        Ok(Vec::new())
    }

    async fn renew_domain(&self, domain: &str) -> Result<RenewalOutcome, RenewError> {
        info!("checking {domain}");
        self.probe.goto(&manager_url(domain)).await?;
        tokio::time::sleep(NAV_SETTLE).await;
        clear_interstitial(self.probe, INTERSTITIAL_NAV).await?;
        acknowledge_security_banner(self.probe).await?;
        tokio::time::sleep(SHORT_SETTLE).await;

        let mut expiry = None;
        for attempt in 1..=FRAME_RETRIES {
            let text = content_frame_text(self.probe).await?;
            expiry = extract_expire_date(&text);
            if expiry.is_some() {
                break;
            }
            debug!("no expiry date visible yet for {domain} (attempt {attempt})");
            if attempt < FRAME_RETRIES {
                tokio::time::sleep(EXPIRY_RETRY_BACKOFF).await;
            }
        }

        let today = Local::now().date_naive();
        let days = days_remaining(expiry, today);
        if days > RENEWAL_WINDOW_DAYS {
            info!("⏭ {domain} has {days} days left, skipping");
            return Ok(RenewalOutcome::skipped(
                domain,
                expiry,
                format!("{days} days until expiry, renewal not yet needed"),
            ));
        }
        info!("{domain} is within the renewal window ({days} days left)");

        if !self.probe.frame_click_by_text("Renew").await? {
            return Err(RenewError::ElementNotFound("Renew button".to_string()));
        }
        tokio::time::sleep(NAV_SETTLE).await;
        acknowledge_security_banner(self.probe).await?;
        tokio::time::sleep(SHORT_SETTLE).await;

        // The renew click can reload the frame document. Re-resolve it so a
        // detached frame surfaces as a frame error, not as a missing offer.
        content_frame_text(self.probe).await?;

        if !self.probe.frame_click_by_text("Free Renewal").await? {
            info!("{domain}: no free renewal offered");
            return Ok(RenewalOutcome::not_eligible(domain, expiry));
        }
        tokio::time::sleep(SUBMIT_SETTLE).await;

        for label in CONFIRM_LABELS {
            if self.probe.frame_click_by_text(label).await.unwrap_or(false) {
                debug!("confirmed renewal via {label:?}");
                tokio::time::sleep(NAV_SETTLE).await;
                break;
            }
        }
        acknowledge_security_banner(self.probe).await?;
        tokio::time::sleep(NAV_SETTLE).await;

        let text = content_frame_text(self.probe).await?;
        let new_expiry = extract_expire_date(&text);

        // The page gives no explicit receipt. A changed date is proof; an
        // unchanged but readable date is treated as success too since some
        // renewals post-date asynchronously.
        let succeeded = new_expiry != expiry || new_expiry.is_some();
        Ok(RenewalOutcome::attempted(
            domain, succeeded, expiry, new_expiry,
        ))
    }
}
