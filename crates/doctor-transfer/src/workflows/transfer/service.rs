use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::catalog;
use super::report::{couple_views, TransferReport};
use super::repository::{RepositoryError, TransferRepository};
use super::views::{
    AssignmentView, AuthSession, CoupleInfo, CoupleMember, CoupleView, DoctorListing,
    DoctorReportEntry, FilterOptions, PositionStatus, PositionView, PreferenceItem, SessionRole,
    SummaryReport, VacancyFilter, VacancyListing, VacancyReportEntry,
};
use crate::config::AdminConfig;
use crate::workflows::allocation::domain::{
    CoupleApplicationId, Doctor, DoctorId, Preference, TransferSnapshot, VacancyId,
};
use crate::workflows::allocation::query::AssignmentQuery;
use crate::workflows::allocation::ranking::effective_rank;
use crate::workflows::import::{ImportError, ImportSummary, TransferImporter};

/// Default page size for the doctor directory.
pub const DOCTOR_PAGE_SIZE: usize = 20;

/// Service composing the repository with the allocation core. Doctors are addressed by
/// merit rank, which is how they sign in.
pub struct TransferService<R> {
    repository: Arc<R>,
    admin: AdminConfig,
}

impl<R> TransferService<R>
where
    R: TransferRepository + 'static,
{
    pub fn new(repository: Arc<R>, admin: AdminConfig) -> Self {
        Self { repository, admin }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    fn snapshot(&self) -> Result<TransferSnapshot, TransferServiceError> {
        Ok(self.repository.snapshot()?)
    }

    fn find_doctor(
        snapshot: &TransferSnapshot,
        merit_rank: u32,
    ) -> Result<Doctor, TransferServiceError> {
        snapshot
            .doctor_by_rank(merit_rank)
            .cloned()
            .ok_or(TransferServiceError::DoctorNotFound { merit_rank })
    }

    /// Doctors ordered by merit rank, at most `limit` of them.
    pub fn list_doctors(&self, limit: usize) -> Result<DoctorListing, TransferServiceError> {
        let mut doctors = self.snapshot()?.doctors;
        doctors.sort_by_key(|doctor| doctor.merit_rank);
        doctors.truncate(limit);
        Ok(DoctorListing {
            count: doctors.len(),
            doctors,
        })
    }

    pub fn doctor_by_rank(&self, merit_rank: u32) -> Result<Doctor, TransferServiceError> {
        Self::find_doctor(&self.snapshot()?, merit_rank)
    }

    pub fn doctor(&self, id: DoctorId) -> Result<Doctor, TransferServiceError> {
        self.snapshot()?
            .doctor(id)
            .cloned()
            .ok_or(TransferServiceError::Repository(RepositoryError::NotFound))
    }

    pub fn preferences(&self, merit_rank: u32) -> Result<Vec<Preference>, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor = Self::find_doctor(&snapshot, merit_rank)?;
        Ok(snapshot.preferences_of(doctor.id))
    }

    /// Replaces the doctor's ranked list. Duplicate or unknown vacancies reject the whole
    /// submission.
    pub fn save_preferences(
        &self,
        merit_rank: u32,
        mut items: Vec<PreferenceItem>,
    ) -> Result<Vec<Preference>, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor = Self::find_doctor(&snapshot, merit_rank)?;

        let unique: HashSet<VacancyId> = items.iter().map(|item| item.vacancy_id).collect();
        if unique.len() != items.len() {
            return Err(TransferServiceError::DuplicatePreferences {
                duplicates: items.len() - unique.len(),
            });
        }
        if let Some(missing) = items
            .iter()
            .find(|item| snapshot.vacancy(item.vacancy_id).is_none())
        {
            return Err(TransferServiceError::UnknownVacancy {
                vacancy_id: missing.vacancy_id.0,
            });
        }

        items.sort_by_key(|item| item.order_index);
        let preferences: Vec<Preference> = items
            .into_iter()
            .map(|item| Preference {
                doctor_id: doctor.id,
                vacancy_id: item.vacancy_id,
                order_index: item.order_index,
            })
            .collect();

        self.repository
            .replace_preferences(doctor.id, preferences.clone())?;
        info!(
            merit_rank,
            count = preferences.len(),
            "preferences saved"
        );
        Ok(preferences)
    }

    pub fn assignment(&self, merit_rank: u32) -> Result<AssignmentView, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor = Self::find_doctor(&snapshot, merit_rank)?;

        let view = match AssignmentQuery::new(&snapshot).assignment(doctor.id) {
            Some(vacancy) => {
                let listing = VacancyListing::from_snapshot(&snapshot, vacancy);
                let message = format!(
                    "Assigned to {}, {} as {}",
                    listing.institution, listing.district, listing.designation
                );
                AssignmentView {
                    assigned: true,
                    vacancy: Some(listing),
                    message,
                }
            }
            None => AssignmentView {
                assigned: false,
                vacancy: None,
                message: "No vacancy assigned yet. Assignment will happen after all \
                          preferences are submitted."
                    .to_string(),
            },
        };
        Ok(view)
    }

    pub fn position(&self, merit_rank: u32) -> Result<PositionView, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor = Self::find_doctor(&snapshot, merit_rank)?;

        if snapshot.preferences_of(doctor.id).is_empty() {
            return Ok(PositionView {
                status: PositionStatus::NoPreferences,
                position: PositionStatus::NoPreferences.label().to_string(),
                merit_rank,
                vacancy: None,
                preference_position: None,
                message: "Please set your preferences first".to_string(),
            });
        }

        let view = match AssignmentQuery::new(&snapshot).position(doctor.id) {
            Some(placement) => {
                let listing = VacancyListing::from_snapshot(&snapshot, &placement.vacancy);
                PositionView {
                    status: PositionStatus::Assigned,
                    position: format!("Assigned to {}, {}", listing.institution, listing.district),
                    merit_rank,
                    vacancy: Some(listing),
                    preference_position: Some(placement.preference_position),
                    message: format!(
                        "You have been assigned to your preference #{}",
                        placement.preference_position
                    ),
                }
            }
            None => PositionView {
                status: PositionStatus::NotAssigned,
                position: PositionStatus::NotAssigned.label().to_string(),
                merit_rank,
                vacancy: None,
                preference_position: None,
                message: "Assignment will happen after all preferences are submitted"
                    .to_string(),
            },
        };
        Ok(view)
    }

    /// Pairs two doctors. Both must exist, differ, and be free of active applications.
    pub fn apply_couple(
        &self,
        doctor1_rank: u32,
        doctor2_rank: u32,
    ) -> Result<CoupleView, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor1 = Self::find_doctor(&snapshot, doctor1_rank)?;
        let doctor2 = Self::find_doctor(&snapshot, doctor2_rank)?;

        if doctor1.id == doctor2.id {
            return Err(TransferServiceError::SelfCouple);
        }
        if snapshot
            .active_couples()
            .any(|couple| couple.involves(doctor1.id) || couple.involves(doctor2.id))
        {
            return Err(TransferServiceError::AlreadyCoupled);
        }

        let couple = self
            .repository
            .insert_couple(doctor1.id, doctor2.id, Utc::now())
            .map_err(|error| match error {
                RepositoryError::Conflict => TransferServiceError::AlreadyCoupled,
                other => TransferServiceError::Repository(other),
            })?;
        info!(
            couple_id = couple.id.0,
            doctor1_rank, doctor2_rank, "couple application created"
        );

        Ok(CoupleView {
            id: couple.id,
            effective_merit_rank: doctor1.merit_rank.max(doctor2.merit_rank),
            doctor1: CoupleMember::from(&doctor1),
            doctor2: CoupleMember::from(&doctor2),
            created_at: couple.created_at,
        })
    }

    pub fn couple_info(&self, merit_rank: u32) -> Result<CoupleInfo, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let doctor = Self::find_doctor(&snapshot, merit_rank)?;

        let couple = snapshot
            .active_couples()
            .find(|couple| couple.involves(doctor.id));
        let partner = couple
            .and_then(|couple| couple.partner_of(doctor.id))
            .and_then(|partner_id| snapshot.doctor(partner_id));

        Ok(CoupleInfo {
            is_in_couple: couple.is_some(),
            couple_application_id: couple.map(|couple| couple.id),
            partner: partner.map(CoupleMember::from),
            effective_merit_rank: effective_rank(&doctor, &snapshot.couples, &snapshot.doctors),
        })
    }

    /// Withdraws a couple application; the record is kept but no longer active.
    pub fn remove_couple(&self, id: CoupleApplicationId) -> Result<(), TransferServiceError> {
        match self.repository.deactivate_couple(id) {
            Ok(()) => {
                info!(couple_id = id.0, "couple application withdrawn");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                Err(TransferServiceError::CoupleNotFound { id: id.0 })
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn couples(&self) -> Result<Vec<CoupleView>, TransferServiceError> {
        Ok(couple_views(&self.snapshot()?))
    }

    pub fn vacancies(
        &self,
        filter: &VacancyFilter,
    ) -> Result<Vec<VacancyListing>, TransferServiceError> {
        Ok(catalog::search_vacancies(&self.snapshot()?, filter))
    }

    pub fn filter_options(&self) -> Result<FilterOptions, TransferServiceError> {
        Ok(catalog::filter_options(&self.snapshot()?))
    }

    pub fn summary_report(&self) -> Result<SummaryReport, TransferServiceError> {
        let snapshot = self.snapshot()?;
        let summary = TransferReport::new(&snapshot).summary();
        debug!(
            assigned = summary.assignment_summary.assigned_count,
            total = summary.assignment_summary.total_doctors,
            "summary report built"
        );
        Ok(summary)
    }

    pub fn doctor_report(&self) -> Result<Vec<DoctorReportEntry>, TransferServiceError> {
        let snapshot = self.snapshot()?;
        Ok(TransferReport::new(&snapshot).doctors())
    }

    pub fn vacancy_report(&self) -> Result<Vec<VacancyReportEntry>, TransferServiceError> {
        let snapshot = self.snapshot()?;
        Ok(TransferReport::new(&snapshot).vacancies())
    }

    pub fn couple_report(&self) -> Result<Vec<CoupleView>, TransferServiceError> {
        self.couples()
    }

    pub fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, TransferServiceError> {
        if !self.admin.verify(username, password) {
            return Err(TransferServiceError::Unauthorized);
        }
        Ok(AuthSession {
            role: SessionRole::Admin,
            name: "Administrator".to_string(),
            doctor_id: None,
            merit_rank: None,
        })
    }

    pub fn doctor_login(&self, merit_rank: u32) -> Result<AuthSession, TransferServiceError> {
        let doctor = self.doctor_by_rank(merit_rank)?;
        Ok(AuthSession {
            role: SessionRole::Doctor,
            name: doctor.full_name,
            doctor_id: Some(doctor.id),
            merit_rank: Some(doctor.merit_rank),
        })
    }

    pub fn import_vacancies<T: Read>(
        &self,
        reader: T,
    ) -> Result<ImportSummary, TransferServiceError> {
        Ok(TransferImporter::vacancies(self.repository.as_ref(), reader)?)
    }

    pub fn import_difficult_stations<T: Read>(
        &self,
        reader: T,
    ) -> Result<ImportSummary, TransferServiceError> {
        Ok(TransferImporter::difficult_stations(
            self.repository.as_ref(),
            reader,
        )?)
    }

    pub fn import_doctors<T: Read>(
        &self,
        reader: T,
    ) -> Result<ImportSummary, TransferServiceError> {
        Ok(TransferImporter::doctors(self.repository.as_ref(), reader)?)
    }

    pub fn import_preferences<T: Read>(
        &self,
        reader: T,
    ) -> Result<ImportSummary, TransferServiceError> {
        Ok(TransferImporter::preferences(self.repository.as_ref(), reader)?)
    }

    pub fn clear_all(&self) -> Result<(), TransferServiceError> {
        self.repository.clear()?;
        info!("all transfer data cleared");
        Ok(())
    }
}

/// Error raised by the transfer service.
#[derive(Debug, thiserror::Error)]
pub enum TransferServiceError {
    #[error("Doctor with merit rank {merit_rank} not found")]
    DoctorNotFound { merit_rank: u32 },
    #[error("Couple application {id} not found")]
    CoupleNotFound { id: u32 },
    #[error("Cannot apply as couple with yourself")]
    SelfCouple,
    #[error("One or both doctors are already in a couple application")]
    AlreadyCoupled,
    #[error("Duplicate preferences detected. Found {duplicates} duplicate(s)")]
    DuplicatePreferences { duplicates: usize },
    #[error("Vacancy {vacancy_id} does not exist")]
    UnknownVacancy { vacancy_id: u32 },
    #[error("invalid credentials")]
    Unauthorized,
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
