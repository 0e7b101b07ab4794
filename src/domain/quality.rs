// Water quality classification against tiered safety thresholds
use super::reading::CanonicalReading;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const GOOD_DESCRIPTION: &str = "Safe and suitable for drinking.";
pub const MODERATE_DESCRIPTION: &str = "Acceptable for irrigation or general use.";
pub const POOR_DESCRIPTION: &str = "Water quality is unsafe; treatment required.";
pub const AWAITING_DATA_DESCRIPTION: &str = "Awaiting complete sensor data...";
pub const NO_DATA_DESCRIPTION: &str = "No live readings available right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    Good,
    Moderate,
    Poor,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub status: QualityStatus,
    pub description: String,
}

impl QualityAssessment {
    fn new(status: QualityStatus, description: &str) -> Self {
        Self {
            status,
            description: description.to_string(),
        }
    }

    /// True for the "incomplete reading" result, which shares the moderate
    /// status with a genuine moderate assessment.
    pub fn is_awaiting_data(&self) -> bool {
        self.status == QualityStatus::Moderate && self.description == AWAITING_DATA_DESCRIPTION
    }
}

/// Upper and lower bounds a reading must satisfy to reach a tier.
///
/// `min_do` and `max_tds` are inclusive, `max_ec` and `max_turbidity` exclusive.
#[derive(Debug, Clone)]
struct Tier {
    min_do: f64,
    max_ec: f64,
    max_tds: f64,
    max_turbidity: f64,
    ph: RangeInclusive<f64>,
}

const GOOD: Tier = Tier {
    min_do: 6.0,
    max_ec: 500.0,
    max_tds: 500.0,
    max_turbidity: 1.0,
    ph: 6.5..=8.5,
};

const MODERATE: Tier = Tier {
    min_do: 4.0,
    max_ec: 1500.0,
    max_tds: 1000.0,
    max_turbidity: 5.0,
    ph: 6.0..=9.0,
};

/// A reading with every value the classifier needs.
struct Complete {
    dissolved_oxygen: f64,
    ec: f64,
    tds: f64,
    turbidity: f64,
    ph: Option<f64>,
}

impl Tier {
    fn admits(&self, r: &Complete) -> bool {
        r.dissolved_oxygen >= self.min_do
            && r.ec < self.max_ec
            && r.tds <= self.max_tds
            && r.turbidity < self.max_turbidity
            && r.ph.is_none_or(|ph| self.ph.contains(&ph))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityClassifier {
    ph_aware: bool,
}

impl QualityClassifier {
    /// With `ph_aware` set, pH is required and must fall inside each tier's range.
    pub fn new(ph_aware: bool) -> Self {
        Self { ph_aware }
    }

    pub fn ph_aware(&self) -> bool {
        self.ph_aware
    }

    pub fn classify(&self, reading: &CanonicalReading) -> QualityAssessment {
        if reading.has_no_data() {
            return QualityAssessment::new(QualityStatus::NoData, NO_DATA_DESCRIPTION);
        }

        let Some(complete) = self.complete(reading) else {
            return QualityAssessment::new(QualityStatus::Moderate, AWAITING_DATA_DESCRIPTION);
        };

        if GOOD.admits(&complete) {
            QualityAssessment::new(QualityStatus::Good, GOOD_DESCRIPTION)
        } else if MODERATE.admits(&complete) {
            QualityAssessment::new(QualityStatus::Moderate, MODERATE_DESCRIPTION)
        } else {
            QualityAssessment::new(QualityStatus::Poor, POOR_DESCRIPTION)
        }
    }

    fn complete(&self, reading: &CanonicalReading) -> Option<Complete> {
        let ph = if self.ph_aware {
            Some(reading.ph?)
        } else {
            None
        };

        Some(Complete {
            dissolved_oxygen: reading.dissolved_oxygen?,
            ec: reading.ec?,
            tds: reading.tds?,
            turbidity: reading.turbidity?,
            ph,
        })
    }
}
