// Feed normalizer - Maps board-specific value slots onto canonical parameters
use super::feed::{BoardConfig, FeedPayload, RawFeedRecord, SLOT_COUNT};
use super::reading::{CanonicalReading, Parameter};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Rendered instead of `HH:MM` when a record carries no usable timestamp
pub const UNKNOWN_TIME: &str = "--:--";

/// Label probes per parameter, most specific first.
///
/// A probe matches a slot when the lower-cased slot label contains it.
const PROBES: [(Parameter, &[&str]); 5] = [
    (Parameter::Do, &["do"]),
    (Parameter::Ec, &["ec", "conductivity"]),
    (Parameter::Tds, &["tds"]),
    (Parameter::Turbidity, &["turbidity"]),
    (Parameter::Ph, &["ph"]),
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone)]
pub struct FeedNormalizer {
    display_offset: FixedOffset,
}

impl FeedNormalizer {
    /// `display_offset` is the zone used to render `HH:MM` reading times.
    pub fn new(display_offset: FixedOffset) -> Self {
        Self { display_offset }
    }

    pub fn normalize(&self, feed: &RawFeedRecord, board: &BoardConfig) -> CanonicalReading {
        let labels: Vec<Option<String>> = board
            .labels()
            .iter()
            .map(|label| label.map(|l| l.trim().to_lowercase()))
            .collect();

        let time = self.format_time(feed.updated_at.as_deref());
        PROBES
            .iter()
            .fold(CanonicalReading::new(time), |reading, (parameter, probes)| {
                reading.with_value(*parameter, resolve(&labels, feed, probes))
            })
    }

    /// Normalizes a whole payload into chronological order (oldest first).
    pub fn normalize_history(&self, payload: &FeedPayload) -> Vec<CanonicalReading> {
        let board = payload.board();
        payload
            .feeds()
            .iter()
            .rev()
            .map(|feed| self.normalize(feed, &board))
            .collect()
    }

    /// Normalizes the most recent record of a payload, if any.
    pub fn normalize_latest(&self, payload: &FeedPayload) -> Option<CanonicalReading> {
        let board = payload.board();
        payload.latest().map(|feed| self.normalize(feed, &board))
    }

    fn format_time(&self, updated_at: Option<&str>) -> String {
        match updated_at.and_then(parse_timestamp) {
            Some(ts) => ts
                .with_timezone(&self.display_offset)
                .format("%H:%M")
                .to_string(),
            None => {
                tracing::warn!("Feed record has unusable timestamp: {:?}", updated_at);
                UNKNOWN_TIME.to_string()
            }
        }
    }
}

/// First finite value found by trying probes in order, then slots in order.
/// An earlier match is never replaced by a later one.
fn resolve(labels: &[Option<String>], feed: &RawFeedRecord, probes: &[&str]) -> Option<f64> {
    probes.iter().find_map(|probe| {
        labels
            .iter()
            .take(SLOT_COUNT)
            .enumerate()
            .filter(|(_, label)| label.as_deref().is_some_and(|l| l.contains(probe)))
            .find_map(|(slot, _)| feed.slot_value(slot))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
