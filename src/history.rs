//! Reward history log
//!
//! Persisted to LocalStorage (JSON file on native), newest first, last 5 drops.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sim::BoardKind;

/// Maximum number of history entries to keep
pub const MAX_HISTORY: usize = 5;

/// A single revealed reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Board the reward came from
    #[serde(rename = "type")]
    pub kind: BoardKind,
    /// Reward text
    pub reward: String,
    /// Unix timestamp (ms) of the reveal
    pub timestamp: f64,
}

impl HistoryEntry {
    /// Wall-clock label (HH:MM, local time on the web, UTC natively)
    pub fn time_label(&self) -> String {
        format_clock(self.timestamp, utc_offset_minutes(self.timestamp))
    }
}

/// Rolling reward log
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "plinkoRewardHistory";

    /// Create empty history
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a reward at the front, evicting the oldest beyond `MAX_HISTORY`
    pub fn push(&mut self, kind: BoardKind, reward: impl Into<String>, timestamp: f64) {
        self.entries.insert(
            0,
            HistoryEntry {
                kind,
                reward: reward.into(),
                timestamp,
            },
        );
        self.entries.truncate(MAX_HISTORY);
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry (if any)
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Parse stored JSON; anything unreadable counts as an empty log
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<History>(json) {
            Ok(mut history) => {
                history.entries.truncate(MAX_HISTORY);
                history
            }
            Err(e) => {
                log::warn!("Discarding unreadable history: {}", e);
                Self::new()
            }
        }
    }

    /// Load history from a JSON file; a missing file is an empty log
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read history {}", path.display()))?;
        Ok(Self::from_json(&json))
    }

    /// Write history to a JSON file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Cannot serialize history")?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write history {}", path.display()))?;
        log::info!("History saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Load history from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let history = Self::from_json(&json);
                log::info!("Loaded {} history entries", history.entries.len());
                return history;
            }
        }

        log::info!("No reward history found, starting fresh");
        Self::new()
    }

    /// Save history to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Could not write reward history");
                }
            }
        }
    }

    /// Drop the stored log (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn remove_stored() {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        {
            let _ = storage.remove_item(Self::STORAGE_KEY);
        }
    }
}

/// Format a Unix timestamp (ms) as HH:MM, shifted by `offset_minutes` from UTC
pub fn format_clock(timestamp: f64, offset_minutes: i64) -> String {
    let minutes = (timestamp / 60_000.0).floor() as i64 + offset_minutes;
    let minute_of_day = minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

/// Browser's local offset from UTC at `timestamp`, in minutes east
#[cfg(target_arch = "wasm32")]
pub fn utc_offset_minutes(timestamp: f64) -> i64 {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    // getTimezoneOffset is minutes west of UTC
    -(date.get_timezone_offset() as i64)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn utc_offset_minutes(_timestamp: f64) -> i64 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_newest_first() {
        let mut history = History::new();
        history.push(BoardKind::Big, "Car", 1.0);
        history.push(BoardKind::Small, "Pen", 2.0);
        assert_eq!(history.latest().unwrap().reward, "Pen");
        assert_eq!(history.entries()[1].reward, "Car");
    }

    #[test]
    fn test_capped_at_max() {
        let mut history = History::new();
        for i in 0..12 {
            history.push(BoardKind::Small, format!("R{i}"), i as f64);
        }
        assert_eq!(history.len(), MAX_HISTORY);
        let rewards: Vec<_> = history.entries().iter().map(|e| e.reward.as_str()).collect();
        assert_eq!(rewards, vec!["R11", "R10", "R9", "R8", "R7"]);
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.push(BoardKind::Big, "Car", 1.0);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_json_shape_and_corrupt_input() {
        let mut history = History::new();
        history.push(BoardKind::Big, "Car", 1000.0);
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"type\":\"big\""));
        assert_eq!(History::from_json(&json), history);

        assert!(History::from_json("{not json").is_empty());
    }

    #[test]
    fn test_file_persistence() {
        let path = std::env::temp_dir().join(format!("plinko-history-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        assert!(History::load_from(&path).unwrap().is_empty());

        let mut history = History::new();
        history.push(BoardKind::Small, "Pen", 5.0);
        history.save_to(&path).unwrap();
        assert_eq!(History::load_from(&path).unwrap(), history);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0, 0), "00:00");
        // 13:05 on some day
        let ts = (3.0 * 86_400.0 + 13.0 * 3600.0 + 5.0 * 60.0 + 59.0) * 1000.0;
        assert_eq!(format_clock(ts, 0), "13:05");
    }

    #[test]
    fn test_format_clock_applies_offset() {
        let ts = (13.0 * 3600.0 + 5.0 * 60.0) * 1000.0;
        assert_eq!(format_clock(ts, 120), "15:05");
        assert_eq!(format_clock(ts, -330), "07:35");
        // Wraps across midnight both ways
        assert_eq!(format_clock(ts, 11 * 60), "00:05");
        assert_eq!(format_clock(0.0, -60), "23:00");
    }

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_time_label_native_is_utc() {
        let ts = (9.0 * 3600.0 + 41.0 * 60.0) * 1000.0;
        let entry = HistoryEntry {
            kind: BoardKind::Big,
            reward: "Kite".into(),
            timestamp: ts,
        };
        assert_eq!(utc_offset_minutes(ts), 0);
        assert_eq!(entry.time_label(), "09:41");
    }
}
