use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Name used for the per-location raw file written by the fetcher
    pub fn file_stem(&self) -> String {
        self.name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validation() {
        let location = Location::new("Hà Nội", 21.0285, 105.8542);
        assert!(location.validate().is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        let location = Location::new("Nowhere", 91.0, 105.0);
        assert!(location.validate().is_err());

        let unnamed = Location::new("", 10.0, 105.0);
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_file_stem_keeps_unicode() {
        let location = Location::new("Hồ Chí Minh", 10.7769, 106.7009);
        assert_eq!(location.file_stem(), "Hồ Chí Minh");

        let odd = Location::new("A/B", 0.0, 0.0);
        assert_eq!(odd.file_stem(), "A_B");
    }
}
