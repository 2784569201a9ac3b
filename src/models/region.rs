use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic region of a location in the study roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    NorthWest,
    NorthEast,
    RedRiverDelta,
    NorthCentral,
    SouthCentralCoast,
    CentralHighlands,
    South,
}

const NORTH_WEST: &[&str] = &["Lai Châu", "Điện Biên Phủ", "Sơn La", "Lào Cai"];
const NORTH_EAST: &[&str] = &["Cao Bằng", "Lạng Sơn", "Tuyên Quang", "Thái Nguyên"];
const RED_RIVER_DELTA: &[&str] = &[
    "Hà Nội",
    "Hải Phòng",
    "Hạ Long",
    "Bắc Ninh",
    "Hưng Yên",
    "Ninh Bình",
    "Việt Trì",
];
const NORTH_CENTRAL: &[&str] = &["Thanh Hóa", "Vinh", "Hà Tĩnh", "Huế"];
const SOUTH_CENTRAL_COAST: &[&str] = &["Đà Nẵng", "Đông Hà", "Quảng Ngãi", "Nha Trang"];
const CENTRAL_HIGHLANDS: &[&str] = &["Buôn Ma Thuột", "Pleiku", "Đà Lạt"];
const SOUTH: &[&str] = &[
    "Hồ Chí Minh",
    "Biên Hòa",
    "Tây Ninh",
    "Cao Lãnh",
    "Long Xuyên",
    "Cần Thơ",
    "Vĩnh Long",
    "Cà Mau",
];

impl Region {
    pub const ALL: [Region; 7] = [
        Region::NorthWest,
        Region::NorthEast,
        Region::RedRiverDelta,
        Region::NorthCentral,
        Region::SouthCentralCoast,
        Region::CentralHighlands,
        Region::South,
    ];

    /// Location names that belong to this region
    pub fn members(&self) -> &'static [&'static str] {
        match self {
            Region::NorthWest => NORTH_WEST,
            Region::NorthEast => NORTH_EAST,
            Region::RedRiverDelta => RED_RIVER_DELTA,
            Region::NorthCentral => NORTH_CENTRAL,
            Region::SouthCentralCoast => SOUTH_CENTRAL_COAST,
            Region::CentralHighlands => CENTRAL_HIGHLANDS,
            Region::South => SOUTH,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::NorthWest => "Vùng I. Tây Bắc",
            Region::NorthEast => "Vùng II. Đông Bắc",
            Region::RedRiverDelta => "Vùng III. Bắc Bộ",
            Region::NorthCentral => "Vùng IV. Bắc Trung Bộ",
            Region::SouthCentralCoast => "Vùng V. Nam Trung Bộ",
            Region::CentralHighlands => "Vùng VI. Tây Nguyên",
            Region::South => "Vùng VII. Nam Bộ",
        }
    }

    /// Every location name known to the classifier
    pub fn roster() -> impl Iterator<Item = &'static str> {
        Region::ALL.iter().flat_map(|region| region.members().iter().copied())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a location name to its region. Names outside the roster yield `None`.
pub fn classify_region(name: &str) -> Option<Region> {
    Region::ALL
        .into_iter()
        .find(|region| region.members().contains(&name))
}
