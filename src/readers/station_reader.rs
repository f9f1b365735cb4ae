use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::Station;

/// Reads the station metadata file used to bootstrap the temperature store.
///
/// Comma-separated rows: id, source, name, easting, northing, elevation,
/// gsod_daily. Header or comment lines (anything whose first field is not a
/// station id starting with a digit) are skipped.
pub struct StationReader {
    skip_headers: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_headers: true }
    }

    pub fn read_stations(&self, path: &Path) -> Result<Vec<Station>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut stations = Vec::new();

        for line_result in reader.lines() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            if self.skip_headers
                && !line
                    .trim_start()
                    .chars()
                    .next()
                    .unwrap_or(' ')
                    .is_ascii_digit()
            {
                continue;
            }
            if let Some(station) = self.parse_station_line(&line)? {
                stations.push(station);
            }
        }

        Ok(stations)
    }

    fn parse_station_line(&self, line: &str) -> Result<Option<Station>> {
        let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if parts.len() < 7 {
            return Ok(None); // skip malformed lines
        }

        let easting = parts[3].parse::<f64>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid easting: '{}'", parts[3]))
        })?;
        let northing = parts[4].parse::<f64>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid northing: '{}'", parts[4]))
        })?;
        let elevation = parts[5].parse::<f64>().map_err(|_| {
            PipelineError::InvalidFormat(format!("Invalid elevation: '{}'", parts[5]))
        })?;
        let gsod_daily = matches!(parts[6], "1" | "true" | "TRUE");

        Ok(Some(Station::new(
            parts[0].to_string(),
            parts[1].to_string(),
            parts[2].to_string(),
            easting,
            northing,
            elevation,
            gsod_daily,
        )))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_stations_skips_headers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id, source, name, easting, northing, elevation, gsod_daily").unwrap();
        writeln!(file, "72295, CPC, Los Angeles, -13180000, 4000000, 38.1, 0").unwrap();
        writeln!(file, "72295023174, GSOD, Los Angeles Intl, -13170000, 4010000, 29.6, 1").unwrap();

        let stations = StationReader::new().read_stations(file.path()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, "72295");
        assert!(!stations[0].gsod_daily);
        assert_eq!(stations[1].id, "72295023174");
        assert!(stations[1].gsod_daily);
    }

    #[test]
    fn test_bad_coordinate_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "72295, CPC, Los Angeles, west, 4000000, 38.1, 0").unwrap();
        assert!(StationReader::new().read_stations(file.path()).is_err());
    }
}
