use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::domain::{AllocationSnapshot, DoctorId, Preference, Vacancy, VacancyId};
use super::ranking::EffectiveRanks;

/// Per-doctor preference lists in `order_index` order.
#[derive(Debug, Clone, Default)]
pub struct PreferenceBook {
    lists: HashMap<DoctorId, Vec<Preference>>,
}

impl PreferenceBook {
    pub fn from_preferences(preferences: &[Preference]) -> Self {
        let mut lists: HashMap<DoctorId, Vec<Preference>> = HashMap::new();
        for preference in preferences {
            lists
                .entry(preference.doctor_id)
                .or_default()
                .push(*preference);
        }
        for list in lists.values_mut() {
            list.sort_by_key(|preference| preference.order_index);
        }
        Self { lists }
    }

    pub fn for_doctor(&self, doctor_id: DoctorId) -> &[Preference] {
        self.lists
            .get(&doctor_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Remaining seats per vacancy for the duration of one pass.
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    remaining: HashMap<VacancyId, u32>,
}

impl CapacityTable {
    pub fn from_vacancies(vacancies: &[Vacancy]) -> Self {
        let remaining = vacancies
            .iter()
            .map(|vacancy| (vacancy.id, vacancy.count))
            .collect();
        Self { remaining }
    }

    /// Takes one seat if the vacancy exists and still has one.
    pub fn claim(&mut self, vacancy_id: VacancyId) -> bool {
        match self.remaining.get_mut(&vacancy_id) {
            Some(seats) if *seats > 0 => {
                *seats -= 1;
                true
            }
            _ => false,
        }
    }
}

/// A doctor's placement and the preference entry that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub vacancy_id: VacancyId,
    pub order_index: u32,
}

impl Assignment {
    /// 1-based position of the assigned vacancy in the doctor's own list.
    pub fn preference_position(&self) -> u32 {
        self.order_index + 1
    }
}

/// Outcome of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    by_doctor: HashMap<DoctorId, Assignment>,
    processing_order: Vec<(DoctorId, u32)>,
    ranks: EffectiveRanks,
}

impl Assignments {
    pub fn get(&self, doctor_id: DoctorId) -> Option<&Assignment> {
        self.by_doctor.get(&doctor_id)
    }

    pub fn vacancy_for(&self, doctor_id: DoctorId) -> Option<VacancyId> {
        self.get(doctor_id).map(|assignment| assignment.vacancy_id)
    }

    /// Doctors in the order they were served, with the effective rank used.
    pub fn processing_order(&self) -> &[(DoctorId, u32)] {
        &self.processing_order
    }

    pub fn effective_rank(&self, doctor_id: DoctorId) -> Option<u32> {
        self.ranks.get(doctor_id)
    }

    pub fn assigned_count(&self) -> usize {
        self.by_doctor.len()
    }

    /// Doctors placed in each vacancy, in the order they were served.
    pub fn by_vacancy(&self) -> HashMap<VacancyId, Vec<DoctorId>> {
        let mut placed: HashMap<VacancyId, Vec<DoctorId>> = HashMap::new();
        for (doctor_id, _) in &self.processing_order {
            if let Some(vacancy_id) = self.vacancy_for(*doctor_id) {
                let doctors = placed.entry(vacancy_id).or_default();
                if !doctors.contains(doctor_id) {
                    doctors.push(*doctor_id);
                }
            }
        }
        placed
    }

    pub fn occupancy(&self) -> HashMap<VacancyId, u32> {
        let mut occupancy = HashMap::new();
        for assignment in self.by_doctor.values() {
            *occupancy.entry(assignment.vacancy_id).or_insert(0) += 1;
        }
        occupancy
    }

    /// Plain doctor to vacancy mapping.
    pub fn to_map(&self) -> HashMap<DoctorId, VacancyId> {
        self.by_doctor
            .iter()
            .map(|(doctor_id, assignment)| (*doctor_id, assignment.vacancy_id))
            .collect()
    }
}

/// Serial priority allocation over the whole population.
///
/// Doctors are served in ascending effective rank; ties keep the order of
/// `snapshot.doctors`. Each doctor takes the first vacancy in their list that still has a
/// seat. Earlier placements are never revisited. Preferences pointing at vacancies absent
/// from the snapshot are skipped.
pub fn resolve_assignments(snapshot: AllocationSnapshot<'_>) -> Assignments {
    let ranks = EffectiveRanks::resolve(snapshot.doctors, snapshot.couples);
    let book = PreferenceBook::from_preferences(snapshot.preferences);
    let mut capacity = CapacityTable::from_vacancies(snapshot.vacancies);

    let mut queue: Vec<(DoctorId, u32)> = snapshot
        .doctors
        .iter()
        .map(|doctor| {
            let rank = ranks.get(doctor.id).unwrap_or(doctor.merit_rank);
            (doctor.id, rank)
        })
        .collect();
    queue.sort_by_key(|(_, rank)| *rank);

    let mut by_doctor = HashMap::with_capacity(queue.len());
    for (doctor_id, _) in &queue {
        if by_doctor.contains_key(doctor_id) {
            continue;
        }

        let claimed = book
            .for_doctor(*doctor_id)
            .iter()
            .find(|preference| capacity.claim(preference.vacancy_id));

        if let Some(preference) = claimed {
            by_doctor.insert(
                *doctor_id,
                Assignment {
                    vacancy_id: preference.vacancy_id,
                    order_index: preference.order_index,
                },
            );
        }
    }

    debug!(
        doctors = queue.len(),
        assigned = by_doctor.len(),
        "allocation pass complete"
    );

    Assignments {
        by_doctor,
        processing_order: queue,
        ranks,
    }
}
