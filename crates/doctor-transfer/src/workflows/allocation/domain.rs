use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for doctors taking part in the transfer round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoctorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VacancyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DistrictId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CoupleApplicationId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub district_id: DistrictId,
    pub name: String,
}

/// A post at one institution; `count` is the number of doctors it can absorb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: VacancyId,
    pub institution_id: InstitutionId,
    pub designation: String,
    pub count: u32,
    pub is_difficult_station: bool,
}

/// Doctor with a merit rank; a lower rank is served first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub full_name: String,
    pub merit_rank: u32,
}

/// One entry of a doctor's ranked wish list. `order_index` 0 is the most preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub doctor_id: DoctorId,
    pub vacancy_id: VacancyId,
    pub order_index: u32,
}

/// Pairing of two doctors who share the worse of their two merit ranks while active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleApplication {
    pub id: CoupleApplicationId,
    pub doctor1_id: DoctorId,
    pub doctor2_id: DoctorId,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl CoupleApplication {
    pub fn involves(&self, doctor_id: DoctorId) -> bool {
        self.doctor1_id == doctor_id || self.doctor2_id == doctor_id
    }

    /// The other member of the pair, if `doctor_id` is one of them.
    pub fn partner_of(&self, doctor_id: DoctorId) -> Option<DoctorId> {
        if self.doctor1_id == doctor_id {
            Some(self.doctor2_id)
        } else if self.doctor2_id == doctor_id {
            Some(self.doctor1_id)
        } else {
            None
        }
    }
}

/// Consistent, owned copy of every collection the transfer round reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferSnapshot {
    pub districts: Vec<District>,
    pub institutions: Vec<Institution>,
    pub vacancies: Vec<Vacancy>,
    pub doctors: Vec<Doctor>,
    pub preferences: Vec<Preference>,
    pub couples: Vec<CoupleApplication>,
}

impl TransferSnapshot {
    pub fn allocation(&self) -> AllocationSnapshot<'_> {
        AllocationSnapshot {
            doctors: &self.doctors,
            preferences: &self.preferences,
            vacancies: &self.vacancies,
            couples: &self.couples,
        }
    }

    pub fn doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|doctor| doctor.id == id)
    }

    pub fn doctor_by_rank(&self, merit_rank: u32) -> Option<&Doctor> {
        self.doctors
            .iter()
            .find(|doctor| doctor.merit_rank == merit_rank)
    }

    pub fn vacancy(&self, id: VacancyId) -> Option<&Vacancy> {
        self.vacancies.iter().find(|vacancy| vacancy.id == id)
    }

    pub fn institution(&self, id: InstitutionId) -> Option<&Institution> {
        self.institutions
            .iter()
            .find(|institution| institution.id == id)
    }

    pub fn district(&self, id: DistrictId) -> Option<&District> {
        self.districts.iter().find(|district| district.id == id)
    }

    /// Institution and district names for a vacancy, empty when the chain is broken.
    pub fn placement_of(&self, vacancy: &Vacancy) -> (String, String) {
        let institution = self.institution(vacancy.institution_id);
        let district = institution.and_then(|institution| self.district(institution.district_id));
        (
            institution
                .map(|institution| institution.name.clone())
                .unwrap_or_default(),
            district
                .map(|district| district.name.clone())
                .unwrap_or_default(),
        )
    }

    /// The doctor's preferences sorted by `order_index`.
    pub fn preferences_of(&self, doctor_id: DoctorId) -> Vec<Preference> {
        let mut preferences: Vec<Preference> = self
            .preferences
            .iter()
            .filter(|preference| preference.doctor_id == doctor_id)
            .copied()
            .collect();
        preferences.sort_by_key(|preference| preference.order_index);
        preferences
    }

    pub fn active_couples(&self) -> impl Iterator<Item = &CoupleApplication> {
        self.couples.iter().filter(|couple| couple.is_active)
    }
}

/// Borrowed view over the collections the allocation pass consumes.
#[derive(Debug, Clone, Copy)]
pub struct AllocationSnapshot<'a> {
    pub doctors: &'a [Doctor],
    pub preferences: &'a [Preference],
    pub vacancies: &'a [Vacancy],
    pub couples: &'a [CoupleApplication],
}
