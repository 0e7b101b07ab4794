// Monitor state - The orchestrator's single mutable state and its transitions
use crate::application::advisory_provider::{
    AdvisoryError, AdvisoryRequest, AdvisoryResponse, Forecast,
};
use crate::domain::history::HistoryBuffer;
use crate::domain::reading::CanonicalReading;
use crate::domain::recommendations::fallback_recommendations;
use crate::infrastructure::config::AdvisoryMode;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Loading,
    Loaded,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySource {
    Model,
    Fallback,
}

/// What the advisory panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub recommendations: Vec<String>,
    pub forecast: Option<Forecast>,
    pub source: AdvisorySource,
    /// A model request is in flight
    pub pending: bool,
}

impl Advisory {
    fn fallback(latest: Option<&CanonicalReading>) -> Self {
        Self {
            recommendations: fallback_recommendations(latest),
            forecast: None,
            source: AdvisorySource::Fallback,
            pending: false,
        }
    }
}

/// Immutable view of the monitor published to readers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub history: Vec<CanonicalReading>,
    pub history_status: HistoryStatus,
    pub advisory: Advisory,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            history_status: HistoryStatus::Loading,
            advisory: Advisory::fallback(None),
        }
    }
}

impl DashboardSnapshot {
    pub fn latest(&self) -> Option<&CanonicalReading> {
        self.history.last()
    }
}

#[derive(Debug, Clone)]
pub struct AdvisoryPolicy {
    pub enabled: bool,
    pub mode: AdvisoryMode,
    pub cooldown: Duration,
    pub forecast_window: usize,
}

/// Owned by the orchestrator task. Every transition is synchronous so the
/// buffer is only ever mutated from one place.
#[derive(Debug)]
pub struct MonitorState {
    buffer: HistoryBuffer,
    history_status: HistoryStatus,
    advisory: Advisory,
    policy: AdvisoryPolicy,
    last_advisory_at: Option<Instant>,
    advisory_in_flight: bool,
    advisory_stale: bool,
}

impl MonitorState {
    pub fn new(capacity: usize, policy: AdvisoryPolicy) -> Self {
        Self {
            buffer: HistoryBuffer::new(capacity),
            history_status: HistoryStatus::Loading,
            advisory: Advisory::fallback(None),
            policy,
            last_advisory_at: None,
            advisory_in_flight: false,
            advisory_stale: false,
        }
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &HistoryBuffer {
        &self.buffer
    }

    #[cfg(test)]
    pub fn history_status(&self) -> HistoryStatus {
        self.history_status
    }

    #[cfg(test)]
    pub fn advisory(&self) -> &Advisory {
        &self.advisory
    }

    /// Applies a history snapshot (oldest first). An empty snapshot leaves
    /// the buffer untouched.
    pub fn apply_history(&mut self, readings: Vec<CanonicalReading>) {
        self.history_status = HistoryStatus::Loaded;
        if readings.is_empty() {
            return;
        }

        let before = self.latest_time();
        self.buffer.replace(readings);
        if self.latest_time() != before {
            self.on_latest_changed();
        }
    }

    pub fn history_failed(&mut self) {
        if self.history_status == HistoryStatus::Loading {
            self.history_status = HistoryStatus::Unavailable;
        }
    }

    /// Applies a live reading with the buffer's dedup rule. Returns whether
    /// it was stored.
    pub fn apply_live(&mut self, reading: CanonicalReading) -> bool {
        let stored = self.buffer.append(reading);
        if stored {
            self.on_latest_changed();
        }
        stored
    }

    /// Request to send now, if the advisory is enabled, stale, idle and out
    /// of its cooldown. Marks the request as in flight.
    pub fn next_advisory_request(&mut self, now: Instant) -> Option<AdvisoryRequest> {
        if !self.policy.enabled
            || !self.advisory_stale
            || self.advisory_in_flight
            || self.buffer.is_empty()
        {
            return None;
        }
        if self
            .last_advisory_at
            .is_some_and(|at| now.duration_since(at) < self.policy.cooldown)
        {
            return None;
        }

        let request = match self.policy.mode {
            AdvisoryMode::Recommendations => {
                AdvisoryRequest::Latest(self.buffer.latest()?.clone())
            }
            AdvisoryMode::Forecast => {
                let window = self.policy.forecast_window.max(2);
                let skip = self.buffer.len().saturating_sub(window);
                AdvisoryRequest::Window(self.buffer.iter().skip(skip).cloned().collect())
            }
        };

        self.advisory_stale = false;
        self.advisory_in_flight = true;
        self.last_advisory_at = Some(now);
        self.advisory.pending = true;
        Some(request)
    }

    /// Stores a model answer, or the rule-based fallback when the call failed.
    pub fn apply_advisory(&mut self, result: Result<AdvisoryResponse, AdvisoryError>) {
        self.advisory_in_flight = false;
        self.advisory = match result {
            Ok(AdvisoryResponse::Recommendations(recommendations))
                if !recommendations.is_empty() =>
            {
                Advisory {
                    recommendations,
                    forecast: None,
                    source: AdvisorySource::Model,
                    pending: false,
                }
            }
            Ok(AdvisoryResponse::Forecast(forecast)) => Advisory {
                recommendations: fallback_recommendations(self.buffer.latest()),
                forecast: Some(forecast),
                source: AdvisorySource::Model,
                pending: false,
            },
            Ok(AdvisoryResponse::Recommendations(_)) => {
                tracing::warn!("Advisory returned no recommendations, using fallback");
                Advisory::fallback(self.buffer.latest())
            }
            Err(e) => {
                tracing::warn!("Advisory unavailable, using fallback: {}", e);
                Advisory::fallback(self.buffer.latest())
            }
        };
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            history: self.buffer.to_vec(),
            history_status: self.history_status,
            advisory: self.advisory.clone(),
        }
    }

    fn latest_time(&self) -> Option<String> {
        self.buffer.latest().map(|r| r.time.clone())
    }

    fn on_latest_changed(&mut self) {
        if self.policy.enabled {
            self.advisory_stale = true;
        }
        // Rule-based advice tracks every reading until the model answers
        if self.advisory.source == AdvisorySource::Fallback {
            let pending = self.advisory.pending;
            self.advisory = Advisory::fallback(self.buffer.latest());
            self.advisory.pending = pending;
        }
    }
}
