//! Content-frame resolution with bounded retries.
//!
//! The application UI lives inside a single embedded frame whose attach and
//! load timing is the dominant source of flakiness in the whole workflow.

use std::time::Duration;

use tracing::debug;

use crate::browser::DashProbe;
use crate::core::error::RenewError;

pub const FRAME_RETRIES: u32 = 3;
const FRAME_BACKOFF: Duration = Duration::from_secs(3);

/// Resolve the embedded content frame and return its rendered text.
///
/// Retries the full query up to [`FRAME_RETRIES`] times with a fixed backoff,
/// because the frame may not have attached yet or its document may not have
/// loaded. On final failure returns [`RenewError::FrameUnavailable`] exactly
/// once, never an empty handle a caller could silently proceed with.
pub async fn content_frame_text<P: DashProbe + ?Sized>(probe: &P) -> Result<String, RenewError> {
    for attempt in 0..FRAME_RETRIES {
        if let Some(text) = probe.frame_text().await? {
            if attempt > 0 {
                debug!("content frame became available on attempt {}", attempt + 1);
            }
            return Ok(text);
        }
        if attempt + 1 < FRAME_RETRIES {
            debug!(
                "content frame not ready, retrying {}/{}",
                attempt + 1,
                FRAME_RETRIES
            );
            tokio::time::sleep(FRAME_BACKOFF).await;
        }
    }
    Err(RenewError::FrameUnavailable)
}
