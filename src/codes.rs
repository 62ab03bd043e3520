//! WMO weather codes as used by Open-Meteo.
//! See: https://open-meteo.com/en/docs#weathervariables

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub label: &'static str,
    pub icon: &'static str,
}

impl Condition {
    const fn new(label: &'static str, icon: &'static str) -> Self {
        Self { label, icon }
    }
}

pub const UNKNOWN: Condition = Condition::new("Unknown", "?");

/// Look up the display label and icon for a weather code.
pub fn lookup(code: i32) -> Condition {
    match code {
        0 => Condition::new("Açık", "☀️"),
        1 => Condition::new("Güneşli", "🌤️"),
        2 => Condition::new("Parçalı Bulutlu", "⛅"),
        3 => Condition::new("Bulutlu", "☁️"),
        45 => Condition::new("Sis", "🌫️"),
        48 => Condition::new("Kırağılı Sis", "🌫️"),
        51 | 53 => Condition::new("Çisenti", "🌦️"),
        55 => Condition::new("Yoğun Çisenti", "🌧️"),
        61 | 63 => Condition::new("Yağmur", "🌧️"),
        65 => Condition::new("Kuvvetli Yağmur", "⛈️"),
        71 | 73 => Condition::new("Kar", "🌨️"),
        75 => Condition::new("Yoğun Kar", "❄️"),
        80 => Condition::new("Sağanak", "🌦️"),
        81 => Condition::new("Sağanak", "🌧️"),
        82 => Condition::new("Kuvvetli Sağanak", "⛈️"),
        95 => Condition::new("Gök Gürültülü", "⛈️"),
        96 => Condition::new("Dolu", "⛈️"),
        99 => Condition::new("Kuvvetli Dolu", "⛈️"),
        _ => UNKNOWN,
    }
}
