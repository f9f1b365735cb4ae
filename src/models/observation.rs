use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One station's min/max temperature for one date, in whole degrees
/// Fahrenheit. Unique on (station, date) — the store enforces the key.
///
/// Feed sentinels never reach this type: both readers drop a row before
/// constructing an `Observation` when either temperature is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    pub date: NaiveDate,
    pub tmax: i32,
    pub tmin: i32,
}

impl Observation {
    pub fn new(station: impl Into<String>, date: NaiveDate, tmax: i32, tmin: i32) -> Self {
        Self {
            station: station.into(),
            date,
            tmax,
            tmin,
        }
    }

    /// Daily mean used by the GDD formula.
    pub fn mean_temperature(&self) -> f32 {
        (self.tmax + self.tmin) as f32 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_temperature() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let obs = Observation::new("72295", date, 81, 62);
        assert_eq!(obs.mean_temperature(), 71.5);
    }
}
