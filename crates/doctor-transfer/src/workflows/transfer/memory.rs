use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::repository::{NewDoctor, RepositoryError, TransferRepository};
use crate::workflows::allocation::domain::{
    CoupleApplication, CoupleApplicationId, District, DistrictId, Doctor, DoctorId, Institution,
    InstitutionId, Preference, TransferSnapshot, Vacancy, VacancyId,
};

#[derive(Debug, Default)]
struct Store {
    data: TransferSnapshot,
    next_district: u32,
    next_institution: u32,
    next_vacancy: u32,
    next_doctor: u32,
    next_couple: u32,
}

fn next(counter: &mut u32) -> u32 {
    *counter += 1;
    *counter
}

/// Process-local store keeping every collection behind one mutex, so snapshots are
/// always consistent.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTransferRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryTransferRepository {
    /// Seeds the store with an existing snapshot, continuing identifiers after its maxima.
    pub fn with_snapshot(snapshot: TransferSnapshot) -> Self {
        let store = Store {
            next_district: snapshot.districts.iter().map(|d| d.id.0).max().unwrap_or(0),
            next_institution: snapshot
                .institutions
                .iter()
                .map(|i| i.id.0)
                .max()
                .unwrap_or(0),
            next_vacancy: snapshot.vacancies.iter().map(|v| v.id.0).max().unwrap_or(0),
            next_doctor: snapshot.doctors.iter().map(|d| d.id.0).max().unwrap_or(0),
            next_couple: snapshot.couples.iter().map(|c| c.id.0).max().unwrap_or(0),
            data: snapshot,
        };
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("transfer store mutex poisoned".to_string()))
    }
}

impl TransferRepository for InMemoryTransferRepository {
    fn snapshot(&self) -> Result<TransferSnapshot, RepositoryError> {
        Ok(self.lock()?.data.clone())
    }

    fn replace_preferences(
        &self,
        doctor_id: DoctorId,
        preferences: Vec<Preference>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.data.doctor(doctor_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        guard
            .data
            .preferences
            .retain(|preference| preference.doctor_id != doctor_id);
        guard.data.preferences.extend(preferences);
        Ok(())
    }

    fn insert_couple(
        &self,
        doctor1_id: DoctorId,
        doctor2_id: DoctorId,
        created_at: DateTime<Utc>,
    ) -> Result<CoupleApplication, RepositoryError> {
        let mut guard = self.lock()?;
        let overlapping = guard
            .data
            .active_couples()
            .any(|couple| couple.involves(doctor1_id) || couple.involves(doctor2_id));
        if overlapping {
            return Err(RepositoryError::Conflict);
        }

        let id = CoupleApplicationId(next(&mut guard.next_couple));
        let couple = CoupleApplication {
            id,
            doctor1_id,
            doctor2_id,
            created_at,
            is_active: true,
        };
        guard.data.couples.push(couple.clone());
        Ok(couple)
    }

    fn deactivate_couple(&self, id: CoupleApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let couple = guard
            .data
            .couples
            .iter_mut()
            .find(|couple| couple.id == id)
            .ok_or(RepositoryError::NotFound)?;
        couple.is_active = false;
        Ok(())
    }

    fn upsert_district(&self, name: &str) -> Result<DistrictId, RepositoryError> {
        let mut guard = self.lock()?;
        if let Some(existing) = guard.data.districts.iter().find(|d| d.name == name) {
            return Ok(existing.id);
        }
        let id = DistrictId(next(&mut guard.next_district));
        guard.data.districts.push(District {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    fn upsert_institution(
        &self,
        district_id: DistrictId,
        name: &str,
    ) -> Result<InstitutionId, RepositoryError> {
        let mut guard = self.lock()?;
        if let Some(existing) = guard
            .data
            .institutions
            .iter()
            .find(|i| i.district_id == district_id && i.name == name)
        {
            return Ok(existing.id);
        }
        let id = InstitutionId(next(&mut guard.next_institution));
        guard.data.institutions.push(Institution {
            id,
            district_id,
            name: name.to_string(),
        });
        Ok(id)
    }

    fn upsert_vacancy(
        &self,
        institution_id: InstitutionId,
        designation: &str,
        count: u32,
    ) -> Result<VacancyId, RepositoryError> {
        let mut guard = self.lock()?;
        if let Some(existing) = guard
            .data
            .vacancies
            .iter_mut()
            .find(|v| v.institution_id == institution_id && v.designation == designation)
        {
            existing.count = count;
            return Ok(existing.id);
        }
        let id = VacancyId(next(&mut guard.next_vacancy));
        guard.data.vacancies.push(Vacancy {
            id,
            institution_id,
            designation: designation.to_string(),
            count,
            is_difficult_station: false,
        });
        Ok(id)
    }

    fn mark_difficult_station(
        &self,
        institution_id: InstitutionId,
    ) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        let mut touched = 0;
        for vacancy in guard
            .data
            .vacancies
            .iter_mut()
            .filter(|v| v.institution_id == institution_id)
        {
            vacancy.is_difficult_station = true;
            touched += 1;
        }
        Ok(touched)
    }

    fn replace_doctors(&self, doctors: Vec<NewDoctor>) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        guard.data.doctors.clear();
        guard.data.preferences.clear();
        guard.data.couples.clear();

        let inserted = doctors.len();
        for doctor in doctors {
            let id = DoctorId(next(&mut guard.next_doctor));
            guard.data.doctors.push(Doctor {
                id,
                full_name: doctor.full_name,
                merit_rank: doctor.merit_rank,
            });
        }
        Ok(inserted)
    }

    fn clear(&self) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        guard.data = TransferSnapshot::default();
        Ok(())
    }
}
