use serde::{Deserialize, Serialize};

/// Coarse bucket of the hour of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPart {
    Morning,
    Midday,
    Afternoon,
    Evening,
    Night,
}

impl DayPart {
    /// Left-closed, right-open buckets: 5-9, 10-14, 15-17, 18-22, rest is night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=9 => DayPart::Morning,
            10..=14 => DayPart::Midday,
            15..=17 => DayPart::Afternoon,
            18..=22 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPart::Morning => "morning",
            DayPart::Midday => "midday",
            DayPart::Afternoon => "afternoon",
            DayPart::Evening => "evening",
            DayPart::Night => "night",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parts_cover_every_hour_once() {
        let parts: Vec<DayPart> = (0..24).map(DayPart::from_hour).collect();
        let count = |p: DayPart| parts.iter().filter(|&&x| x == p).count();

        assert_eq!(count(DayPart::Morning), 5);
        assert_eq!(count(DayPart::Midday), 5);
        assert_eq!(count(DayPart::Afternoon), 3);
        assert_eq!(count(DayPart::Evening), 5);
        assert_eq!(count(DayPart::Night), 6);

        assert_eq!(DayPart::from_hour(4), DayPart::Night);
        assert_eq!(DayPart::from_hour(5), DayPart::Morning);
        assert_eq!(DayPart::from_hour(10), DayPart::Midday);
        assert_eq!(DayPart::from_hour(23), DayPart::Night);
    }

    #[test]
    fn test_seasons() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
    }
}
