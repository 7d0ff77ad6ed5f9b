//! CSV intake for the transfer round: vacancy schedules, difficult-station lists, merit
//! lists and ranked preference sheets.

mod normalizer;
mod parser;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::workflows::allocation::domain::{DoctorId, Preference, VacancyId};
use crate::workflows::transfer::repository::{NewDoctor, RepositoryError, TransferRepository};
use normalizer::{clean_merit_rank, normalize_name, parse_count};
use parser::{
    field, parse_rows, parse_with_headers, DifficultStationRow, DoctorRow, PreferenceRow,
    VacancyRow, MERIT_COLUMN, NAME_COLUMN,
};

/// Highest merit rank accepted from a merit list.
pub const MAX_MERIT_RANK: u32 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV must contain {expected} columns. Found: {found}")]
    MissingColumns { expected: String, found: String },
    #[error("could not store imported data: {0}")]
    Repository(#[from] RepositoryError),
}

/// Counts reported back to the operator after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub imported: usize,
    pub skipped: usize,
}

impl ImportSummary {
    fn record(&mut self, imported: bool) {
        self.rows += 1;
        if imported {
            self.imported += 1;
        } else {
            self.skipped += 1;
        }
    }
}

pub struct TransferImporter;

impl TransferImporter {
    /// Vacancy schedule with `DISTRICT, INSTITUTION, DESIGNATION, VACANCIES` columns.
    ///
    /// Summary rows (`TOTAL`), blank locations and non-positive counts are skipped. An
    /// existing (institution, designation) vacancy has its count overwritten.
    pub fn vacancies<R, S>(repository: &S, reader: R) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        S: TransferRepository + ?Sized,
    {
        let mut summary = ImportSummary::default();

        for row in parse_rows::<VacancyRow, _>(reader)? {
            let (Some(district), Some(institution), Some(designation)) = (
                field(&row.district),
                field(&row.institution),
                field(&row.designation),
            ) else {
                summary.record(false);
                continue;
            };
            if designation.eq_ignore_ascii_case("TOTAL") {
                summary.record(false);
                continue;
            }
            let Some(count) = row.vacancies.as_deref().and_then(parse_count) else {
                summary.record(false);
                continue;
            };

            let district_id = repository.upsert_district(district)?;
            let institution_id = repository.upsert_institution(district_id, institution)?;
            repository.upsert_vacancy(institution_id, designation, count)?;
            summary.record(true);
        }

        info!(
            rows = summary.rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "vacancy schedule imported"
        );
        Ok(summary)
    }

    /// Difficult-station list with `RDHS, STATION` columns. Every vacancy of a matching
    /// institution is flagged; unknown districts or stations are skipped.
    pub fn difficult_stations<R, S>(
        repository: &S,
        reader: R,
    ) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        S: TransferRepository + ?Sized,
    {
        let snapshot = repository.snapshot()?;
        let mut summary = ImportSummary::default();

        for row in parse_rows::<DifficultStationRow, _>(reader)? {
            let (Some(district_name), Some(station)) = (field(&row.district), field(&row.station))
            else {
                summary.record(false);
                continue;
            };

            let institution = snapshot
                .districts
                .iter()
                .find(|district| district.name == district_name)
                .and_then(|district| {
                    snapshot.institutions.iter().find(|institution| {
                        institution.district_id == district.id && institution.name == station
                    })
                });

            match institution {
                Some(institution) => {
                    let flagged = repository.mark_difficult_station(institution.id)?;
                    debug!(station, flagged, "difficult station flagged");
                    summary.record(true);
                }
                None => summary.record(false),
            }
        }

        info!(
            rows = summary.rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "difficult stations imported"
        );
        Ok(summary)
    }

    /// Merit list with `SN/Intern Merit` and `Full Name` columns. Replaces every doctor
    /// currently stored.
    pub fn doctors<R, S>(repository: &S, reader: R) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        S: TransferRepository + ?Sized,
    {
        let (headers, rows) = parse_with_headers::<DoctorRow, _>(reader)?;
        if !headers.iter().any(|h| h == MERIT_COLUMN) || !headers.iter().any(|h| h == NAME_COLUMN)
        {
            return Err(ImportError::MissingColumns {
                expected: format!("'{MERIT_COLUMN}' and '{NAME_COLUMN}'"),
                found: headers.join(", "),
            });
        }

        let mut summary = ImportSummary::default();
        let mut seen = HashSet::new();
        let mut doctors = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row_number = index + 1;
            let (Some(raw_rank), Some(full_name)) = (field(&row.merit_rank), field(&row.full_name))
            else {
                summary.record(false);
                continue;
            };

            let cleaned = clean_merit_rank(raw_rank);
            let merit_rank = match cleaned.parse::<u32>() {
                Ok(rank) if (1..=MAX_MERIT_RANK).contains(&rank) => rank,
                Ok(rank) => {
                    warn!(row_number, rank, full_name, "merit rank out of range");
                    summary.record(false);
                    continue;
                }
                Err(_) => {
                    warn!(row_number, raw_rank, full_name, "unparseable merit rank");
                    summary.record(false);
                    continue;
                }
            };

            if !seen.insert(merit_rank) {
                summary.record(false);
                continue;
            }

            doctors.push(NewDoctor {
                full_name: full_name.to_string(),
                merit_rank,
            });
            summary.record(true);
        }

        repository.replace_doctors(doctors)?;
        info!(
            rows = summary.rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "merit list imported"
        );
        Ok(summary)
    }

    /// Ranked preference sheet with `Merit Rank, Institution, Designation, Preference`
    /// columns, where `Preference` is 1-based. Vacancies are matched on normalised
    /// institution and designation names. Each doctor present in the sheet has their list
    /// replaced.
    pub fn preferences<R, S>(repository: &S, reader: R) -> Result<ImportSummary, ImportError>
    where
        R: Read,
        S: TransferRepository + ?Sized,
    {
        let snapshot = repository.snapshot()?;

        let mut vacancy_index: HashMap<(String, String), VacancyId> = HashMap::new();
        for vacancy in &snapshot.vacancies {
            let (institution, _) = snapshot.placement_of(vacancy);
            vacancy_index
                .entry((normalize_name(&institution), normalize_name(&vacancy.designation)))
                .or_insert(vacancy.id);
        }

        let mut summary = ImportSummary::default();
        let mut lists: BTreeMap<DoctorId, Vec<Preference>> = BTreeMap::new();

        for row in parse_rows::<PreferenceRow, _>(reader)? {
            let doctor = field(&row.merit_rank)
                .map(clean_merit_rank)
                .and_then(|rank| rank.parse::<u32>().ok())
                .and_then(|rank| snapshot.doctor_by_rank(rank));
            let vacancy_id = match (field(&row.institution), field(&row.designation)) {
                (Some(institution), Some(designation)) => vacancy_index
                    .get(&(normalize_name(institution), normalize_name(designation)))
                    .copied(),
                _ => None,
            };
            let position = field(&row.preference)
                .and_then(|value| value.parse::<u32>().ok())
                .filter(|position| *position > 0);

            let (Some(doctor), Some(vacancy_id), Some(position)) = (doctor, vacancy_id, position)
            else {
                summary.record(false);
                continue;
            };

            let list = lists.entry(doctor.id).or_default();
            if list.iter().any(|p| p.vacancy_id == vacancy_id) {
                summary.record(false);
                continue;
            }
            list.push(Preference {
                doctor_id: doctor.id,
                vacancy_id,
                order_index: position - 1,
            });
            summary.record(true);
        }

        for (doctor_id, mut preferences) in lists {
            preferences.sort_by_key(|preference| preference.order_index);
            repository.replace_preferences(doctor_id, preferences)?;
        }

        info!(
            rows = summary.rows,
            imported = summary.imported,
            skipped = summary.skipped,
            "preference sheet imported"
        );
        Ok(summary)
    }
}
