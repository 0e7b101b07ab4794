// Raw feed records as published by the telemetry provider
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of value slots a board exposes
pub const SLOT_COUNT: usize = 4;

/// Per-board labels describing what each value slot carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub info1: Option<String>,
    #[serde(default)]
    pub info2: Option<String>,
    #[serde(default)]
    pub info3: Option<String>,
    #[serde(default)]
    pub info4: Option<String>,
}

impl BoardConfig {
    /// Slot labels in slot order (`info1` first)
    pub fn labels(&self) -> [Option<&str>; SLOT_COUNT] {
        [
            self.info1.as_deref(),
            self.info2.as_deref(),
            self.info3.as_deref(),
            self.info4.as_deref(),
        ]
    }
}

/// One sampling instant from the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFeedRecord {
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub value1: Option<Value>,
    #[serde(default)]
    pub value2: Option<Value>,
    #[serde(default)]
    pub value3: Option<Value>,
    #[serde(default)]
    pub value4: Option<Value>,
}

impl RawFeedRecord {
    /// Numeric value of a zero-based slot.
    ///
    /// Numeric strings are accepted since some boards publish them; anything
    /// else, including non-finite numbers, reads as absent.
    pub fn slot_value(&self, slot: usize) -> Option<f64> {
        let raw = match slot {
            0 => self.value1.as_ref(),
            1 => self.value2.as_ref(),
            2 => self.value3.as_ref(),
            3 => self.value4.as_ref(),
            _ => None,
        }?;

        let value = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;

        value.is_finite().then_some(value)
    }
}

/// Response body of the provider's `getData` endpoint.
///
/// `feeds` is ordered newest first.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub board: Option<BoardConfig>,
    #[serde(default)]
    pub feeds: Option<Vec<RawFeedRecord>>,
}

impl FeedPayload {
    pub fn board(&self) -> BoardConfig {
        self.board.clone().unwrap_or_default()
    }

    pub fn feeds(&self) -> &[RawFeedRecord] {
        self.feeds.as_deref().unwrap_or_default()
    }

    pub fn latest(&self) -> Option<&RawFeedRecord> {
        self.feeds().first()
    }
}
