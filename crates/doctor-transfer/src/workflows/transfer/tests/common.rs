use std::io::Cursor;
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::AdminConfig;
use crate::workflows::allocation::domain::{
    CoupleApplication, CoupleApplicationId, DistrictId, DoctorId, InstitutionId, Preference,
    TransferSnapshot, VacancyId,
};
use crate::workflows::import::TransferImporter;
use crate::workflows::transfer::repository::{NewDoctor, RepositoryError, TransferRepository};
use crate::workflows::transfer::{
    transfer_router, InMemoryTransferRepository, PreferenceItem, TransferService,
};

pub(super) const VACANCIES_CSV: &str = "DISTRICT,INSTITUTION,DESIGNATION,VACANCIES\n\
    Colombo,National Hospital,Medical Officer,1\n\
    Colombo,National Hospital,Registrar,2\n\
    Kandy,Teaching Hospital Kandy,Medical Officer,1\n";

pub(super) const DOCTORS_CSV: &str = "SN/Intern Merit,Full Name\n\
    1,Dr. Amara Perera\n\
    2,Dr. Bimal Silva\n\
    3,Dr. Chathuri Fernando\n\
    4,Dr. Dilan Jayasinghe\n";

pub(super) const NATIONAL_MO: VacancyId = VacancyId(1);
pub(super) const NATIONAL_REGISTRAR: VacancyId = VacancyId(2);
pub(super) const KANDY_MO: VacancyId = VacancyId(3);

pub(super) fn admin() -> AdminConfig {
    AdminConfig {
        username: "admin".to_string(),
        password: "transfer-round".to_string(),
    }
}

pub(super) fn seeded_repository() -> Arc<InMemoryTransferRepository> {
    let repository = InMemoryTransferRepository::default();
    TransferImporter::vacancies(&repository, Cursor::new(VACANCIES_CSV)).expect("vacancies");
    TransferImporter::doctors(&repository, Cursor::new(DOCTORS_CSV)).expect("doctors");
    Arc::new(repository)
}

pub(super) fn build_service() -> (
    TransferService<InMemoryTransferRepository>,
    Arc<InMemoryTransferRepository>,
) {
    let repository = seeded_repository();
    let service = TransferService::new(repository.clone(), admin());
    (service, repository)
}

/// Ranked list in the given order, `order_index` starting at 0.
pub(super) fn ranked(vacancies: &[VacancyId]) -> Vec<PreferenceItem> {
    vacancies
        .iter()
        .enumerate()
        .map(|(index, vacancy_id)| PreferenceItem {
            vacancy_id: *vacancy_id,
            order_index: index as u32,
        })
        .collect()
}

pub(super) fn transfer_router_with_service(
    service: TransferService<InMemoryTransferRepository>,
) -> axum::Router {
    transfer_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

impl TransferRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<TransferSnapshot, RepositoryError> {
        Err(unavailable())
    }

    fn replace_preferences(
        &self,
        _doctor_id: DoctorId,
        _preferences: Vec<Preference>,
    ) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn insert_couple(
        &self,
        _doctor1_id: DoctorId,
        _doctor2_id: DoctorId,
        _created_at: DateTime<Utc>,
    ) -> Result<CoupleApplication, RepositoryError> {
        Err(unavailable())
    }

    fn deactivate_couple(&self, _id: CoupleApplicationId) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn upsert_district(&self, _name: &str) -> Result<DistrictId, RepositoryError> {
        Err(unavailable())
    }

    fn upsert_institution(
        &self,
        _district_id: DistrictId,
        _name: &str,
    ) -> Result<InstitutionId, RepositoryError> {
        Err(unavailable())
    }

    fn upsert_vacancy(
        &self,
        _institution_id: InstitutionId,
        _designation: &str,
        _count: u32,
    ) -> Result<VacancyId, RepositoryError> {
        Err(unavailable())
    }

    fn mark_difficult_station(
        &self,
        _institution_id: InstitutionId,
    ) -> Result<usize, RepositoryError> {
        Err(unavailable())
    }

    fn replace_doctors(&self, _doctors: Vec<NewDoctor>) -> Result<usize, RepositoryError> {
        Err(unavailable())
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        Err(unavailable())
    }
}
