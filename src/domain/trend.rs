// Trend evaluation over the two most recent readings
use super::reading::{CanonicalReading, Parameter};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSignal {
    Up,
    Down,
    Flat,
}

/// Direction of `parameter` between the last two entries of `readings`.
///
/// Flat when fewer than two entries exist or either value is absent.
pub fn trend(readings: &[CanonicalReading], parameter: Parameter) -> TrendSignal {
    match readings {
        [.., previous, latest] => compare(previous, latest, parameter),
        _ => TrendSignal::Flat,
    }
}

/// Trend for every parameter, keyed by canonical key.
pub fn trends(readings: &[CanonicalReading]) -> BTreeMap<&'static str, TrendSignal> {
    Parameter::ALL
        .iter()
        .map(|p| (p.key(), trend(readings, *p)))
        .collect()
}

pub fn compare(
    previous: &CanonicalReading,
    latest: &CanonicalReading,
    parameter: Parameter,
) -> TrendSignal {
    match (previous.value(parameter), latest.value(parameter)) {
        (Some(old), Some(new)) => match new.partial_cmp(&old) {
            Some(Ordering::Greater) => TrendSignal::Up,
            Some(Ordering::Less) => TrendSignal::Down,
            _ => TrendSignal::Flat,
        },
        _ => TrendSignal::Flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ec(time: &str, value: Option<f64>) -> CanonicalReading {
        CanonicalReading::new(time).with_value(Parameter::Ec, value)
    }

    #[test]
    fn test_trend_directions() {
        let up = [ec("10:00", Some(100.0)), ec("10:01", Some(150.0))];
        let down = [ec("10:00", Some(150.0)), ec("10:01", Some(100.0))];
        let flat = [ec("10:00", Some(100.0)), ec("10:01", Some(100.0))];

        assert_eq!(trend(&up, Parameter::Ec), TrendSignal::Up);
        assert_eq!(trend(&down, Parameter::Ec), TrendSignal::Down);
        assert_eq!(trend(&flat, Parameter::Ec), TrendSignal::Flat);
    }

    #[test]
    fn test_trend_needs_two_values() {
        assert_eq!(trend(&[], Parameter::Ec), TrendSignal::Flat);
        assert_eq!(trend(&[ec("10:00", Some(100.0))], Parameter::Ec), TrendSignal::Flat);

        let gap = [ec("10:00", None), ec("10:01", Some(150.0))];
        assert_eq!(trend(&gap, Parameter::Ec), TrendSignal::Flat);
        assert_eq!(trend(&gap, Parameter::Do), TrendSignal::Flat);
    }

    #[test]
    fn test_only_last_two_entries_matter() {
        let readings = [
            ec("10:00", Some(900.0)),
            ec("10:01", Some(100.0)),
            ec("10:02", Some(120.0)),
        ];
        assert_eq!(trend(&readings, Parameter::Ec), TrendSignal::Up);
    }

    #[test]
    fn test_trends_covers_every_parameter() {
        let readings = [ec("10:00", Some(1.0)), ec("10:01", Some(0.5))];
        let all = trends(&readings);

        assert_eq!(all.len(), Parameter::ALL.len());
        assert_eq!(all["ec"], TrendSignal::Down);
        assert_eq!(all["ph"], TrendSignal::Flat);
    }
}
