use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::allocation::domain::{
    CoupleApplication, CoupleApplicationId, DistrictId, DoctorId, InstitutionId, Preference,
    TransferSnapshot, VacancyId,
};

/// Doctor row awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub full_name: String,
    pub merit_rank: u32,
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `snapshot` must return a consistent copy of every collection; the allocation pass never
/// reads the store directly.
pub trait TransferRepository: Send + Sync {
    fn snapshot(&self) -> Result<TransferSnapshot, RepositoryError>;

    /// Replaces every preference of `doctor_id` with `preferences`.
    fn replace_preferences(
        &self,
        doctor_id: DoctorId,
        preferences: Vec<Preference>,
    ) -> Result<(), RepositoryError>;

    /// Stores an active couple application. Fails with `Conflict` when either doctor is
    /// already part of an active application; the check and the insert are atomic.
    fn insert_couple(
        &self,
        doctor1_id: DoctorId,
        doctor2_id: DoctorId,
        created_at: DateTime<Utc>,
    ) -> Result<CoupleApplication, RepositoryError>;

    fn deactivate_couple(&self, id: CoupleApplicationId) -> Result<(), RepositoryError>;

    /// Finds a district by exact name or creates it.
    fn upsert_district(&self, name: &str) -> Result<DistrictId, RepositoryError>;

    fn upsert_institution(
        &self,
        district_id: DistrictId,
        name: &str,
    ) -> Result<InstitutionId, RepositoryError>;

    /// Creates the (institution, designation) vacancy or overwrites its count.
    fn upsert_vacancy(
        &self,
        institution_id: InstitutionId,
        designation: &str,
        count: u32,
    ) -> Result<VacancyId, RepositoryError>;

    /// Flags every vacancy of the institution, returning how many were touched.
    fn mark_difficult_station(&self, institution_id: InstitutionId)
        -> Result<usize, RepositoryError>;

    /// Drops all doctors (and anything that references them) and stores `doctors`.
    fn replace_doctors(&self, doctors: Vec<NewDoctor>) -> Result<usize, RepositoryError>;

    fn clear(&self) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
