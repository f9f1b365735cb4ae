use chrono::NaiveDate;
use reqwest::Client;

use crate::error::{PipelineError, Result};
use crate::models::Observation;
use crate::utils::{CPC_DATE_LINE, CPC_MISSING_SENTINEL};

/// One fetched CPC daily global report: the date the report covers (embedded
/// in the report, never chosen by the caller) and its usable observations.
#[derive(Debug, Clone)]
pub struct CpcReport {
    pub date: NaiveDate,
    pub observations: Vec<Observation>,
}

/// Reader for the CPC daily global temperature report, a fixed-width text
/// file covering exactly one date.
///
/// Layout: a header block, the report date in `%Y%m%d` on line 21 (0-based),
/// then one fixed-column row per station with tmax in columns 0..4, tmin in
/// 4..8 and the station id in 28..33. Rows where either temperature is the
/// -999 sentinel are dropped.
pub struct CpcReader {
    client: Client,
    url: String,
}

impl CpcReader {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Fetch and parse the current report. Transport failures surface as
    /// `FeedUnavailable`; no retry.
    pub async fn fetch(&self) -> Result<CpcReport> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_report(&body)
    }
}

/// Parse a full report body. Pure, so fixtures exercise it directly.
pub fn parse_report(body: &str) -> Result<CpcReport> {
    let mut date: Option<NaiveDate> = None;
    let mut observations = Vec::new();

    for (i, line) in body.lines().enumerate() {
        if i == CPC_DATE_LINE {
            let parsed = NaiveDate::parse_from_str(line.trim(), "%Y%m%d").map_err(|e| {
                PipelineError::FeedMalformed(format!(
                    "report date line {:?} is not YYYYMMDD: {}",
                    line.trim(),
                    e
                ))
            })?;
            date = Some(parsed);
            continue;
        }
        if i <= CPC_DATE_LINE {
            continue; // header block
        }
        let date = date.ok_or_else(|| {
            PipelineError::FeedMalformed("data rows before the report date line".to_string())
        })?;
        if let Some((id, tmax, tmin)) = parse_row(line) {
            observations.push(Observation::new(id, date, tmax, tmin));
        }
    }

    let date = date.ok_or_else(|| {
        PipelineError::FeedMalformed("report ended before the date line".to_string())
    })?;
    Ok(CpcReport { date, observations })
}

/// Parse one station row. Returns None for rows to skip: trailing notes,
/// truncated lines, or either temperature at the missing sentinel.
fn parse_row(line: &str) -> Option<(String, i32, i32)> {
    let tmax = fixed_int(line, 0, 4)?;
    if tmax == CPC_MISSING_SENTINEL {
        return None;
    }
    let tmin = fixed_int(line, 4, 8)?;
    if tmin == CPC_MISSING_SENTINEL {
        return None;
    }
    let id = line.get(28..33)?.trim();
    if id.is_empty() {
        return None;
    }
    Some((id.to_string(), tmax, tmin))
}

fn fixed_int(line: &str, start: usize, end: usize) -> Option<i32> {
    line.get(start..end)?.trim().parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// 21 filler header lines, the date line, then data rows.
    fn report(date_line: &str, rows: &[&str]) -> String {
        let mut lines: Vec<String> = (0..21).map(|i| format!("header {}", i)).collect();
        lines.push(date_line.to_string());
        lines.extend(rows.iter().map(|r| r.to_string()));
        lines.join("\n")
    }

    fn row(tmax: i32, tmin: i32, id: &str) -> String {
        // tmax cols 0..4, tmin cols 4..8, id cols 28..33
        format!("{:>4}{:>4}{:20}{:>5}", tmax, tmin, "", id)
    }

    #[test]
    fn test_parses_date_and_rows() {
        let body = report("20230601", &[&row(81, 62, "72295"), &row(68, 54, "72494")]);
        let parsed = parse_report(&body).unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(
            parsed.observations,
            vec![
                Observation::new("72295", parsed.date, 81, 62),
                Observation::new("72494", parsed.date, 68, 54),
            ]
        );
    }

    #[test]
    fn test_sentinel_rows_are_dropped() {
        let body = report(
            "20230601",
            &[
                &row(-999, 62, "72295"),
                &row(81, -999, "72389"),
                &row(68, 54, "72494"),
            ],
        );
        let parsed = parse_report(&body).unwrap();
        assert_eq!(parsed.observations.len(), 1);
        assert_eq!(parsed.observations[0].station, "72494");
    }

    #[test]
    fn test_short_and_garbled_rows_are_skipped() {
        let body = report("20230601", &[&row(68, 54, "72494"), "", "END OF REPORT"]);
        let parsed = parse_report(&body).unwrap();
        assert_eq!(parsed.observations.len(), 1);
    }

    #[test]
    fn test_bad_date_line_is_malformed() {
        let body = report("June 1, 2023", &[&row(68, 54, "72494")]);
        let err = parse_report(&body).unwrap_err();
        assert!(matches!(err, PipelineError::FeedMalformed(_)));
    }

    #[test]
    fn test_truncated_report_is_malformed() {
        assert!(matches!(
            parse_report("only one line").unwrap_err(),
            PipelineError::FeedMalformed(_)
        ));
    }
}
