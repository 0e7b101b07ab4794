// Rule-based recommendations used whenever the advisory model is unavailable
use super::reading::{CanonicalReading, Parameter};

pub const NO_LIVE_DATA: &str =
    "No live sensor data available. Recommendations will resume once readings arrive.";

/// One advisory line per present parameter, in DO, EC, TDS, turbidity, pH order.
///
/// Never returns an empty list: a reading that yields no advice is one
/// without any values, which reports as no live data.
pub fn fallback_recommendations(reading: Option<&CanonicalReading>) -> Vec<String> {
    let advice: Vec<String> = reading
        .map(|reading| {
            Parameter::ALL
                .iter()
                .filter_map(|p| reading.value(*p).map(|v| advise(*p, v)))
                .collect()
        })
        .unwrap_or_default();

    if advice.is_empty() {
        vec![NO_LIVE_DATA.to_string()]
    } else {
        advice
    }
}

fn advise(parameter: Parameter, value: f64) -> String {
    match parameter {
        Parameter::Do => {
            if value < 4.0 {
                format!(
                    "Dissolved oxygen is critically low ({value:.2} mg/L). \
                     Aerate the water and check for organic load; aquatic life is at risk."
                )
            } else if value < 6.0 {
                format!(
                    "Dissolved oxygen is below the healthy range ({value:.2} mg/L). \
                     Increase aeration and monitor aquatic life."
                )
            } else {
                format!("Dissolved oxygen is healthy ({value:.2} mg/L). No action needed.")
            }
        }
        Parameter::Ec => {
            if value > 1500.0 {
                format!(
                    "Conductivity is high ({value:.0} μS/cm). \
                     Water is too saline for drinking or irrigation; \
                     consider desalination or dilution."
                )
            } else if value > 750.0 {
                format!(
                    "Conductivity is elevated ({value:.0} μS/cm). \
                     Check for salt intrusion or fertilizer runoff."
                )
            } else {
                format!("Conductivity is normal ({value:.0} μS/cm).")
            }
        }
        Parameter::Tds => {
            if value > 1000.0 {
                format!(
                    "Total dissolved solids are unsafe ({value:.0} ppm). \
                     Do not drink; treat with reverse osmosis or distillation."
                )
            } else if value > 500.0 {
                format!(
                    "Total dissolved solids exceed the drinking guideline ({value:.0} ppm). \
                     Filtration is recommended before consumption."
                )
            } else {
                format!("Total dissolved solids are acceptable ({value:.0} ppm).")
            }
        }
        Parameter::Turbidity => {
            if value > 5.0 {
                format!(
                    "Turbidity is high ({value:.2} NTU). \
                     Disinfection may be ineffective; filter and check for sediment or runoff."
                )
            } else if value > 1.0 {
                format!(
                    "Water is slightly cloudy ({value:.2} NTU). \
                     Consider sedimentation or filtration."
                )
            } else {
                format!("Water is clear ({value:.2} NTU).")
            }
        }
        Parameter::Ph => {
            if value < 6.5 {
                format!(
                    "pH is acidic ({value:.2}). \
                     Acidic water can corrode pipes; consider a neutralizing filter."
                )
            } else if value > 8.5 {
                format!(
                    "pH is alkaline ({value:.2}). \
                     Expect scaling and bitter taste; consider pH correction."
                )
            } else {
                format!("pH is within the safe range ({value:.2}).")
            }
        }
    }
}
