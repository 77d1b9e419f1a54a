//! Low-level pointer input over CDP.
//!
//! Challenge scripts distinguish trusted pointer events from scripted DOM
//! `click()` calls, so every challenge interaction goes through
//! `Input.dispatchMouseEvent` with human-scale inter-event timing.

use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::Page;

/// Pause between the move and the press.
const MOVE_PRESS_DELAY_MS: u64 = 100;
/// Pause between the press and the release.
const PRESS_RELEASE_DELAY_MS: u64 = 50;

/// Issue a full move → press → release pointer sequence at page coordinates.
///
/// Inter-event delays carry a little upward jitter so repeated clicks do not
/// land on an exact fixed cadence.
pub async fn synthetic_click(page: &Page, x: f64, y: f64) -> Result<()> {
    let moved = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MouseMoved)
        .x(x)
        .y(y)
        .build()
        .map_err(|e| anyhow!("mouse move event: {e}"))?;
    page.execute(moved).await?;
    tokio::time::sleep(jittered(MOVE_PRESS_DELAY_MS)).await;

    let pressed = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MousePressed)
        .x(x)
        .y(y)
        .button(MouseButton::Left)
        .click_count(1)
        .build()
        .map_err(|e| anyhow!("mouse press event: {e}"))?;
    page.execute(pressed).await?;
    tokio::time::sleep(jittered(PRESS_RELEASE_DELAY_MS)).await;

    let released = DispatchMouseEventParams::builder()
        .r#type(DispatchMouseEventType::MouseReleased)
        .x(x)
        .y(y)
        .button(MouseButton::Left)
        .click_count(1)
        .build()
        .map_err(|e| anyhow!("mouse release event: {e}"))?;
    page.execute(released).await?;

    Ok(())
}

fn jittered(base_ms: u64) -> Duration {
    use rand::prelude::*;
    let mut rng = rand::rng();
    Duration::from_millis(base_ms + rng.random_range(0..=base_ms / 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_a_quarter_above_base() {
        for _ in 0..100 {
            let d = jittered(100);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(125));
        }
    }
}
