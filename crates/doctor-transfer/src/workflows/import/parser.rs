use serde::Deserialize;
use std::io::Read;

pub(crate) const MERIT_COLUMN: &str = "SN/Intern Merit";
pub(crate) const NAME_COLUMN: &str = "Full Name";

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VacancyRow {
    #[serde(rename = "DISTRICT", default)]
    pub(crate) district: Option<String>,
    #[serde(rename = "INSTITUTION", default)]
    pub(crate) institution: Option<String>,
    #[serde(rename = "DESIGNATION", default)]
    pub(crate) designation: Option<String>,
    #[serde(rename = "VACANCIES", default)]
    pub(crate) vacancies: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DifficultStationRow {
    #[serde(rename = "RDHS", default)]
    pub(crate) district: Option<String>,
    #[serde(rename = "STATION", default)]
    pub(crate) station: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DoctorRow {
    #[serde(rename = "SN/Intern Merit", default)]
    pub(crate) merit_rank: Option<String>,
    #[serde(rename = "Full Name", default)]
    pub(crate) full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferenceRow {
    #[serde(rename = "Merit Rank", default)]
    pub(crate) merit_rank: Option<String>,
    #[serde(rename = "Institution", default)]
    pub(crate) institution: Option<String>,
    #[serde(rename = "Designation", default)]
    pub(crate) designation: Option<String>,
    #[serde(rename = "Preference", default)]
    pub(crate) preference: Option<String>,
}

pub(crate) fn parse_rows<T, R>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = reader_for(reader);
    csv_reader.deserialize::<T>().collect()
}

/// Header names plus deserialized rows, for imports that validate columns first.
pub(crate) fn parse_with_headers<T, R>(reader: R) -> Result<(Vec<String>, Vec<T>), csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = reader_for(reader);
    let headers = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();
    let rows = csv_reader.deserialize::<T>().collect::<Result<Vec<T>, _>>()?;
    Ok((headers, rows))
}

/// Trimmed, non-empty field content.
pub(crate) fn field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
