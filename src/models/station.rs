use serde::{Deserialize, Serialize};
use validator::Validate;

/// A temperature station loaded during bootstrap. Immutable once stored.
///
/// Coordinates are projected Web Mercator meters matching the output grid
/// extent. `gsod_daily` marks stations whose GSOD record is fetched alongside
/// the CPC daily report to fill its coverage gaps.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    #[validate(length(min = 1, max = 11))]
    pub id: String,

    pub source: String,

    pub name: String,

    #[validate(range(min = -20000000.0, max = -7000000.0))]
    pub easting: f64,

    #[validate(range(min = 1800000.0, max = 11600000.0))]
    pub northing: f64,

    pub elevation: f64,

    pub gsod_daily: bool,
}

impl Station {
    pub fn new(
        id: String,
        source: String,
        name: String,
        easting: f64,
        northing: f64,
        elevation: f64,
        gsod_daily: bool,
    ) -> Self {
        Self {
            id,
            source,
            name,
            easting,
            northing,
            elevation,
            gsod_daily,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SOURCE_GSOD;

    fn station(easting: f64, northing: f64) -> Station {
        Station::new(
            "72295023174".to_string(),
            SOURCE_GSOD.to_string(),
            "Los Angeles Intl".to_string(),
            easting,
            northing,
            38.1,
            true,
        )
    }

    #[test]
    fn test_station_validation() {
        let valid = station(-13180000.0, 4000000.0);
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn test_station_outside_extent() {
        let outside = station(500000.0, 4000000.0);
        assert!(outside.validate().is_err());
    }

    #[test]
    fn test_station_id_length() {
        let mut bad = station(-13180000.0, 4000000.0);
        bad.id = "too-long-station-id".to_string();
        assert!(bad.validate().is_err());
    }
}
