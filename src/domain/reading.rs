// Canonical reading domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A water-quality quantity the dashboard knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Do,
    Ec,
    Tds,
    Turbidity,
    Ph,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown parameter: {0}")]
pub struct UnknownParameter(pub String);

impl Parameter {
    /// Display and evaluation order used throughout the dashboard.
    pub const ALL: [Parameter; 5] = [
        Parameter::Do,
        Parameter::Ec,
        Parameter::Tds,
        Parameter::Turbidity,
        Parameter::Ph,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Do => "do",
            Parameter::Ec => "ec",
            Parameter::Tds => "tds",
            Parameter::Turbidity => "turbidity",
            Parameter::Ph => "ph",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Do => "DO",
            Parameter::Ec => "EC",
            Parameter::Tds => "TDS",
            Parameter::Turbidity => "Turbidity",
            Parameter::Ph => "pH",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Parameter::Do => Some("mg/L"),
            Parameter::Ec => Some("μS/cm"),
            Parameter::Tds => Some("ppm"),
            Parameter::Turbidity => Some("NTU"),
            Parameter::Ph => None,
        }
    }

    /// Number of fraction digits shown on the parameter tiles
    pub fn precision(&self) -> usize {
        match self {
            Parameter::Ec | Parameter::Tds => 0,
            Parameter::Do | Parameter::Turbidity | Parameter::Ph => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Parameter::Do => {
                "The amount of gaseous oxygen dissolved in the water, essential for aquatic life."
            }
            Parameter::Ec => "Electrical conductivity, a proxy for dissolved salts.",
            Parameter::Tds => "Total dissolved solids (minerals, salts, organic matter).",
            Parameter::Turbidity => "Water clarity, lower is better (<1 NTU ideal).",
            Parameter::Ph => "Acidity or alkalinity on the 0-14 scale, 7 is neutral.",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "do" => Ok(Parameter::Do),
            "ec" | "conductivity" => Ok(Parameter::Ec),
            "tds" => Ok(Parameter::Tds),
            "turbidity" => Ok(Parameter::Turbidity),
            "ph" => Ok(Parameter::Ph),
            _ => Err(UnknownParameter(s.to_string())),
        }
    }
}

/// Provider-agnostic sensor snapshot.
///
/// Every measurement is either a finite number or absent. Readings are built
/// once by the normalizer and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalReading {
    #[serde(default)]
    pub time: String,
    #[serde(rename = "do", default)]
    pub dissolved_oxygen: Option<f64>,
    #[serde(default)]
    pub ec: Option<f64>,
    #[serde(default)]
    pub tds: Option<f64>,
    #[serde(default)]
    pub turbidity: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
}

impl CanonicalReading {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            ..Self::default()
        }
    }

    /// Returns the reading with `parameter` set. Non-finite values are stored as absent.
    pub fn with_value(mut self, parameter: Parameter, value: Option<f64>) -> Self {
        let value = value.filter(|v| v.is_finite());
        match parameter {
            Parameter::Do => self.dissolved_oxygen = value,
            Parameter::Ec => self.ec = value,
            Parameter::Tds => self.tds = value,
            Parameter::Turbidity => self.turbidity = value,
            Parameter::Ph => self.ph = value,
        }
        self
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Do => self.dissolved_oxygen,
            Parameter::Ec => self.ec,
            Parameter::Tds => self.tds,
            Parameter::Turbidity => self.turbidity,
            Parameter::Ph => self.ph,
        }
    }

    /// True when no parameter carries a value
    pub fn has_no_data(&self) -> bool {
        Parameter::ALL.iter().all(|p| self.value(*p).is_none())
    }
}
