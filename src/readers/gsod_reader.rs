use chrono::NaiveDate;
use reqwest::Client;

use crate::error::{PipelineError, Result};
use crate::models::Observation;
use crate::utils::GSOD_MISSING_SENTINEL;

/// Reader for NCDC's Global Summary of Day via the CDO order service.
///
/// Two-request flow: a form-encoded POST submits the date range and station
/// list, the HTML response embeds a link to a generated comma-delimited
/// result file, and a second GET fetches it. Temperatures come as decimal
/// tenths with a trailing unit letter ("64.2F") and are rounded to whole
/// degrees; the 9999.9 sentinel (10000 after rounding) marks a missing
/// reading. Station ids are the USAF and WBAN codes concatenated.
pub struct GsodReader {
    client: Client,
    query_url: String,
}

impl GsodReader {
    pub fn new(client: Client, query_url: impl Into<String>) -> Self {
        Self {
            client,
            query_url: query_url.into(),
        }
    }

    /// Query the given station set over an inclusive date range.
    pub async fn fetch(
        &self,
        begin: NaiveDate,
        end: NaiveDate,
        stations: &[String],
    ) -> Result<Vec<Observation>> {
        let params = query_params(begin, end, stations);
        let page = self
            .client
            .post(&self.query_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let link = extract_result_link(&page)?;
        let data = self
            .client
            .get(&link)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_result_csv(&data)
    }
}

/// CDO order form fields. The station list is a repeated key.
fn query_params(begin: NaiveDate, end: NaiveDate, stations: &[String]) -> Vec<(String, String)> {
    let mut params = vec![
        ("p_ndatasetid".to_string(), "10".to_string()),
        ("datasetabbv".to_string(), "GSOD".to_string()),
        ("p_cqueryby".to_string(), "ENTIRE".to_string()),
        ("p_csubqueryby".to_string(), String::new()),
        ("p_nrgnid".to_string(), String::new()),
        ("p_ncntryid".to_string(), String::new()),
        ("p_nstprovid".to_string(), String::new()),
        ("volume".to_string(), "0".to_string()),
        ("datequerytype".to_string(), "RANGE".to_string()),
        ("outform".to_string(), "COMMADEL".to_string()),
        ("startYear".to_string(), begin.format("%Y").to_string()),
        ("startMonth".to_string(), begin.format("%m").to_string()),
        ("startDay".to_string(), begin.format("%d").to_string()),
        ("endYear".to_string(), end.format("%Y").to_string()),
        ("endMonth".to_string(), end.format("%m").to_string()),
        ("endDay".to_string(), end.format("%d").to_string()),
    ];
    for station in stations {
        params.push(("p_asubqueryitems".to_string(), station.clone()));
    }
    params
}

/// Find the generated result-file URL in the order-confirmation page.
/// A missing link means the service answered with something unexpected.
pub fn extract_result_link(page: &str) -> Result<String> {
    let marker = "/pub/orders/CDO";
    let pos = page.find(marker).ok_or_else(|| {
        PipelineError::FeedMalformed("no result file link in CDO response".to_string())
    })?;
    let quote = page[..pos].rfind('"').ok_or_else(|| {
        PipelineError::FeedMalformed("unquoted result file link in CDO response".to_string())
    })?;
    let rest = &page[quote + 1..];
    let end = rest.find('"').ok_or_else(|| {
        PipelineError::FeedMalformed("unterminated result file link in CDO response".to_string())
    })?;
    let link = &rest[..end];
    if !link.ends_with(".txt") {
        return Err(PipelineError::FeedMalformed(format!(
            "unexpected result file link {:?}",
            link
        )));
    }
    Ok(link.to_string())
}

/// Parse the comma-delimited result file. Pure, so fixtures exercise it
/// directly.
pub fn parse_result_csv(data: &str) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 19 {
            continue; // trailer or blank line
        }
        let tmax = match rounded_tenths(&record[17])? {
            Some(v) => v,
            None => continue,
        };
        let tmin = match rounded_tenths(&record[18])? {
            Some(v) => v,
            None => continue,
        };
        let station = format!("{}{}", &record[0], &record[1]);
        let date = NaiveDate::parse_from_str(record[2].trim(), "%Y%m%d")?;
        observations.push(Observation::new(station, date, tmax, tmin));
    }
    Ok(observations)
}

/// "64.2F" -> Some(64); the sentinel value maps to None.
fn rounded_tenths(field: &str) -> Result<Option<i32>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    // Final character is a unit/quality letter. Anything else means the
    // feed handed back a field shape we do not understand.
    let numeric = field
        .strip_suffix(|c: char| c.is_ascii_alphabetic())
        .ok_or_else(|| {
            PipelineError::FeedMalformed(format!(
                "missing unit letter in temperature field {:?}",
                field
            ))
        })?;
    let value = numeric.trim().parse::<f64>().map_err(|_| {
        PipelineError::FeedMalformed(format!("unparseable temperature field {:?}", field))
    })?;
    let rounded = value.round() as i32;
    if rounded == GSOD_MISSING_SENTINEL {
        return Ok(None);
    }
    Ok(Some(rounded))
}
