use crate::utils::constants::AQI_BREAKPOINTS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity band of a US AQI reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollutionLevel {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    Unknown,
}

impl PollutionLevel {
    const BY_CLASS: [PollutionLevel; 6] = [
        PollutionLevel::Good,
        PollutionLevel::Moderate,
        PollutionLevel::UnhealthyForSensitiveGroups,
        PollutionLevel::Unhealthy,
        PollutionLevel::VeryUnhealthy,
        PollutionLevel::Hazardous,
    ];

    pub fn from_class(class: Option<u8>) -> Self {
        class
            .and_then(|c| Self::BY_CLASS.get(c as usize).copied())
            .unwrap_or(PollutionLevel::Unknown)
    }

    pub fn class(&self) -> Option<u8> {
        Self::BY_CLASS
            .iter()
            .position(|level| level == self)
            .map(|idx| idx as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollutionLevel::Good => "Good",
            PollutionLevel::Moderate => "Moderate",
            PollutionLevel::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            PollutionLevel::Unhealthy => "Unhealthy",
            PollutionLevel::VeryUnhealthy => "Very Unhealthy",
            PollutionLevel::Hazardous => "Hazardous",
            PollutionLevel::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::BY_CLASS
            .into_iter()
            .chain(std::iter::once(PollutionLevel::Unknown))
            .find(|level| level.as_str() == s)
    }
}

impl fmt::Display for PollutionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal class 0..=5 of an AQI reading; `None` when the reading is absent
pub fn pollution_class(aqi: Option<f64>) -> Option<u8> {
    let aqi = aqi.filter(|v| !v.is_nan())?;
    let class = AQI_BREAKPOINTS
        .iter()
        .position(|&upper| aqi <= upper)
        .unwrap_or(AQI_BREAKPOINTS.len());
    Some(class as u8)
}

/// Human-readable band of an AQI reading, derived from [`pollution_class`]
pub fn pollution_level(aqi: Option<f64>) -> PollutionLevel {
    PollutionLevel::from_class(pollution_class(aqi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(pollution_class(Some(0.0)), Some(0));
        assert_eq!(pollution_class(Some(50.0)), Some(0));
        assert_eq!(pollution_class(Some(50.5)), Some(1));
        assert_eq!(pollution_class(Some(100.0)), Some(1));
        assert_eq!(pollution_class(Some(150.0)), Some(2));
        assert_eq!(pollution_class(Some(200.0)), Some(3));
        assert_eq!(pollution_class(Some(300.0)), Some(4));
        assert_eq!(pollution_class(Some(300.1)), Some(5));
        assert_eq!(pollution_class(Some(999.0)), Some(5));

        assert_eq!(pollution_level(Some(42.0)), PollutionLevel::Good);
        assert_eq!(
            pollution_level(Some(120.0)),
            PollutionLevel::UnhealthyForSensitiveGroups
        );
        assert_eq!(pollution_level(Some(301.0)), PollutionLevel::Hazardous);
    }

    #[test]
    fn test_missing_aqi() {
        assert_eq!(pollution_class(None), None);
        assert_eq!(pollution_class(Some(f64::NAN)), None);
        assert_eq!(pollution_level(None), PollutionLevel::Unknown);
        assert_eq!(pollution_level(None).as_str(), "Unknown");
    }

    #[test]
    fn test_class_and_level_agree() {
        let mut previous = 0;
        let mut aqi = -10.0;
        while aqi <= 600.0 {
            let class = pollution_class(Some(aqi)).unwrap();
            let level = pollution_level(Some(aqi));

            assert!(class >= previous, "class decreased at {}", aqi);
            assert_eq!(level.class(), Some(class));

            let low_band = matches!(
                level,
                PollutionLevel::Good
                    | PollutionLevel::Moderate
                    | PollutionLevel::UnhealthyForSensitiveGroups
            );
            assert_eq!(class <= 2, low_band);

            previous = class;
            aqi += 0.5;
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            PollutionLevel::parse("Very Unhealthy"),
            Some(PollutionLevel::VeryUnhealthy)
        );
        assert_eq!(PollutionLevel::parse("Unknown"), Some(PollutionLevel::Unknown));
        assert_eq!(PollutionLevel::parse("bad"), None);
    }
}
