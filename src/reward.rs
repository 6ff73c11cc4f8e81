//! Reward lists and the reward draw
//!
//! The winning index is drawn uniformly once per drop, before the ball moves.
//! Nothing in here knows where the ball lands.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use rand::Rng;

/// Draw the winning reward index uniformly from `[0, count)`.
///
/// Returns `None` when there is nothing to win.
#[inline]
pub fn select_reward<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(rng.random_range(0..count))
}

/// Split a reward file into trimmed, non-empty lines
pub fn parse_reward_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read a reward list from disk; an empty list counts as a failure
pub fn load_reward_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot load {}", path.display()))?;
    let items = parse_reward_lines(&text);
    ensure!(!items.is_empty(), "No rewards found in {}", path.display());
    log::info!("Loaded {} rewards from {}", items.len(), path.display());
    Ok(items)
}

/// Fetch a reward list over HTTP relative to the page (WASM only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_reward_file(url: &str) -> Result<Vec<String>> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let js_err = |e: wasm_bindgen::JsValue| anyhow::anyhow!("{:?}", e);

    let window = web_sys::window().context("no window")?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)
        .with_context(|| format!("Cannot load {url}"))?;
    let response: web_sys::Response = response.dyn_into().map_err(js_err)?;
    ensure!(response.ok(), "Cannot load {url}: HTTP {}", response.status());

    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .with_context(|| format!("{url} is not text"))?;
    let items = parse_reward_lines(&text);
    ensure!(!items.is_empty(), "No rewards found in {url}");
    log::info!("Loaded {} rewards from {}", items.len(), url);
    Ok(items)
}
