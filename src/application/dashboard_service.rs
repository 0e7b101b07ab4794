// Dashboard service - Synchronous read API over the latest published snapshot
use crate::application::monitor_state::{Advisory, DashboardSnapshot, HistoryStatus};
use crate::domain::quality::{QualityAssessment, QualityClassifier};
use crate::domain::reading::{CanonicalReading, Parameter};
use crate::domain::trend::{self, TrendSignal};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub history_status: HistoryStatus,
    pub readings: usize,
    pub latest_time: Option<String>,
    pub feed_enabled: bool,
    pub advisory_enabled: bool,
    pub advisory_pending: bool,
    pub ph_aware: bool,
}

#[derive(Clone)]
pub struct DashboardService {
    snapshots: watch::Receiver<DashboardSnapshot>,
    classifier: QualityClassifier,
    feed_enabled: bool,
    advisory_enabled: bool,
}

impl DashboardService {
    pub fn new(
        snapshots: watch::Receiver<DashboardSnapshot>,
        classifier: QualityClassifier,
        feed_enabled: bool,
        advisory_enabled: bool,
    ) -> Self {
        Self {
            snapshots,
            classifier,
            feed_enabled,
            advisory_enabled,
        }
    }

    pub fn get_history(&self) -> Vec<CanonicalReading> {
        self.snapshots.borrow().history.clone()
    }

    pub fn get_latest(&self) -> Option<CanonicalReading> {
        self.snapshots.borrow().latest().cloned()
    }

    pub fn classify(&self, reading: &CanonicalReading) -> QualityAssessment {
        self.classifier.classify(reading)
    }

    /// Classification of the newest reading; "no data" while the buffer is empty.
    pub fn classify_latest(&self) -> QualityAssessment {
        let latest = self.get_latest().unwrap_or_default();
        self.classifier.classify(&latest)
    }

    pub fn trend(&self, parameter: Parameter) -> TrendSignal {
        trend::trend(&self.snapshots.borrow().history, parameter)
    }

    pub fn trends(&self) -> BTreeMap<&'static str, TrendSignal> {
        trend::trends(&self.snapshots.borrow().history)
    }

    pub fn advisory(&self) -> Advisory {
        self.snapshots.borrow().advisory.clone()
    }

    pub fn status(&self) -> MonitorStatus {
        let snapshot = self.snapshots.borrow();
        MonitorStatus {
            history_status: snapshot.history_status,
            readings: snapshot.history.len(),
            latest_time: snapshot.latest().map(|r| r.time.clone()),
            feed_enabled: self.feed_enabled,
            advisory_enabled: self.advisory_enabled,
            advisory_pending: snapshot.advisory.pending,
            ph_aware: self.classifier.ph_aware(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quality::QualityStatus;

    fn reading(time: &str, ec: f64) -> CanonicalReading {
        CanonicalReading::new(time)
            .with_value(Parameter::Do, Some(7.0))
            .with_value(Parameter::Ec, Some(ec))
            .with_value(Parameter::Tds, Some(200.0))
            .with_value(Parameter::Turbidity, Some(0.3))
    }

    #[test]
    fn test_reads_follow_published_snapshots() {
        let (tx, rx) = watch::channel(DashboardSnapshot::default());
        let service = DashboardService::new(rx, QualityClassifier::new(false), true, false);

        assert!(service.get_latest().is_none());
        assert_eq!(service.classify_latest().status, QualityStatus::NoData);
        assert_eq!(service.trend(Parameter::Ec), TrendSignal::Flat);

        tx.send_modify(|snapshot| {
            snapshot.history = vec![reading("10:00", 100.0), reading("10:05", 150.0)];
            snapshot.history_status = HistoryStatus::Loaded;
        });

        assert_eq!(service.get_history().len(), 2);
        assert_eq!(service.get_latest().unwrap().time, "10:05");
        assert_eq!(service.classify_latest().status, QualityStatus::Good);
        assert_eq!(service.trend(Parameter::Ec), TrendSignal::Up);
        assert_eq!(service.trends()["do"], TrendSignal::Flat);

        let status = service.status();
        assert_eq!(status.readings, 2);
        assert_eq!(status.latest_time.as_deref(), Some("10:05"));
        assert!(status.feed_enabled);
        assert!(!status.advisory_enabled);
    }
}
