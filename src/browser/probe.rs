//! The page-probe seam between the workflow and the live browser.
//!
//! [`DashProbe`] captures every observation and interaction the challenge
//! resolver, frame locator, and workflow driver need, so the whole state
//! machine runs unchanged against a scripted fake in tests. [`LiveProbe`]
//! is the production implementation over a `chromiumoxide` page.
//!
//! All injected JavaScript uses classic `function` IIFEs: `chromiumoxide`
//! heuristically routes arrow-shaped strings through `Runtime.callFunctionOn`,
//! which would mangle an arrow IIFE.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::Page;

use crate::browser::input;

/// Element geometry in page viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[async_trait]
pub trait DashProbe: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// Wait (bounded) for the document to pass its "content loaded"
    /// milestone. Returns false on timeout; callers treat that as "keep
    /// polling", never as fatal.
    async fn wait_dom_ready(&self, timeout: Duration) -> bool;

    /// Full rendered text of the outer page.
    async fn page_text(&self) -> Result<String>;

    /// Viewport geometry of the first match, or `None` when absent.
    async fn element_rect(&self, selector: &str) -> Result<Option<Rect>>;

    /// Raw pointer move/press/release at page coordinates.
    async fn synthetic_click(&self, x: f64, y: f64) -> Result<()>;

    /// DOM-click the first button/link whose text contains `label`.
    /// Returns false when no such control exists.
    async fn click_by_text(&self, label: &str) -> Result<bool>;

    /// Fill the input identified by its placeholder text, firing the input
    /// and change events the page's framework listens for.
    async fn fill_by_placeholder(&self, placeholder: &str, value: &str) -> Result<bool>;

    /// Value of a (typically hidden) named input; empty string when absent.
    async fn hidden_input_value(&self, name: &str) -> Result<String>;

    /// Rendered text of the embedded application frame, or `None` while the
    /// frame has not attached or its document has not loaded.
    async fn frame_text(&self) -> Result<Option<String>>;

    /// DOM-click a button/link by text inside the embedded frame.
    async fn frame_click_by_text(&self, label: &str) -> Result<bool>;
}

/// Production probe over a live CDP page.
#[derive(Clone)]
pub struct LiveProbe {
    page: Page,
}

impl LiveProbe {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn eval(&self, js: String) -> Result<serde_json::Value> {
        Ok(self.page.evaluate(js).await?.into_value()?)
    }
}

#[async_trait]
impl DashProbe for LiveProbe {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        let v = self.eval("document.title".to_string()).await?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    async fn wait_dom_ready(&self, timeout: Duration) -> bool {
        let poll = Duration::from_millis(250);
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            let ready = self
                .eval("document.readyState".to_string())
                .await
                .ok()
                .and_then(|v| v.as_str().map(|s| s != "loading"))
                .unwrap_or(false);
            if ready {
                return true;
            }
            tokio::time::sleep(poll).await;
        }
        false
    }

    async fn page_text(&self) -> Result<String> {
        let v = self
            .eval("document.body ? document.body.innerText : ''".to_string())
            .await?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    async fn element_rect(&self, selector: &str) -> Result<Option<Rect>> {
        let sel = serde_json::to_string(selector)?;
        let js = format!(
            r#"(function () {{
  var el = document.querySelector({sel});
  if (!el) return null;
  var r = el.getBoundingClientRect();
  return {{ x: r.x, y: r.y, width: r.width, height: r.height }};
}})()"#
        );
        Ok(self.page.evaluate(js).await?.into_value()?)
    }

    async fn synthetic_click(&self, x: f64, y: f64) -> Result<()> {
        input::synthetic_click(&self.page, x, y).await
    }

    async fn click_by_text(&self, label: &str) -> Result<bool> {
        let label_json = serde_json::to_string(label)?;
        let js = format!(
            r#"(function () {{
  var label = {label_json};
  var els = document.querySelectorAll('button, a');
  for (var i = 0; i < els.length; i++) {{
    if ((els[i].textContent || '').indexOf(label) !== -1) {{
      els[i].scrollIntoView({{ block: 'center', inline: 'center' }});
      els[i].click();
      return true;
    }}
  }}
  return false;
}})()"#
        );
        let v = self.eval(js).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    async fn fill_by_placeholder(&self, placeholder: &str, value: &str) -> Result<bool> {
        let ph_json = serde_json::to_string(placeholder)?;
        let value_json = serde_json::to_string(value)?;
        let js = format!(
            r#"(function () {{
  var ph = {ph_json};
  var inputs = document.querySelectorAll('input');
  var el = null;
  for (var i = 0; i < inputs.length; i++) {{
    if (inputs[i].placeholder === ph) {{ el = inputs[i]; break; }}
  }}
  if (!el) return false;
  el.focus();
  var setter = Object.getOwnPropertyDescriptor(window.HTMLInputElement.prototype, 'value').set;
  setter.call(el, {value_json});
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#
        );
        let v = self.eval(js).await?;
        Ok(v.as_bool().unwrap_or(false))
    }

    async fn hidden_input_value(&self, name: &str) -> Result<String> {
        let name_json = serde_json::to_string(name)?;
        let js = format!(
            r#"(function () {{
  var els = document.getElementsByName({name_json});
  return els.length && els[0].value ? els[0].value : '';
}})()"#
        );
        let v = self.eval(js).await?;
        Ok(v.as_str().unwrap_or_default().to_string())
    }

    async fn frame_text(&self) -> Result<Option<String>> {
        let js = r#"(function () {
  var frame = document.querySelector('iframe');
  if (!frame) return null;
  var doc = null;
  try { doc = frame.contentDocument; } catch (err) { return null; }
  if (!doc || !doc.body) return null;
  return doc.body.innerText;
})()"#;
        Ok(self.page.evaluate(js.to_string()).await?.into_value()?)
    }

    async fn frame_click_by_text(&self, label: &str) -> Result<bool> {
        let label_json = serde_json::to_string(label)?;
        let js = format!(
            r#"(function () {{
  var frame = document.querySelector('iframe');
  if (!frame) return false;
  var doc = null;
  try {{ doc = frame.contentDocument; }} catch (err) {{ return false; }}
  if (!doc || !doc.body) return false;
  var label = {label_json};
  var els = doc.querySelectorAll('button, a');
  for (var i = 0; i < els.length; i++) {{
    if ((els[i].textContent || '').indexOf(label) !== -1) {{
      els[i].scrollIntoView({{ block: 'center', inline: 'center' }});
      els[i].click();
      return true;
    }}
  }}
  return false;
}})()"#
        );
        let v = self.eval(js).await?;
        Ok(v.as_bool().unwrap_or(false))
    }
}
