use serde::Serialize;

use super::domain::{DoctorId, TransferSnapshot, Vacancy};
use super::engine::resolve_assignments;

/// Assigned vacancy together with its 1-based place in the doctor's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementPosition {
    pub vacancy: Vacancy,
    pub preference_position: u32,
}

/// Answers per-doctor questions by running a fresh allocation pass over one snapshot.
///
/// Nothing is cached between calls: callers wanting several mutually consistent answers
/// must hold on to the same snapshot.
pub struct AssignmentQuery<'a> {
    snapshot: &'a TransferSnapshot,
}

impl<'a> AssignmentQuery<'a> {
    pub fn new(snapshot: &'a TransferSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn assignment(&self, doctor_id: DoctorId) -> Option<&'a Vacancy> {
        let assignments = resolve_assignments(self.snapshot.allocation());
        let vacancy_id = assignments.vacancy_for(doctor_id)?;
        self.snapshot.vacancy(vacancy_id)
    }

    pub fn position(&self, doctor_id: DoctorId) -> Option<PlacementPosition> {
        let assignments = resolve_assignments(self.snapshot.allocation());
        let assignment = assignments.get(doctor_id)?;
        let vacancy = self.snapshot.vacancy(assignment.vacancy_id)?;

        Some(PlacementPosition {
            vacancy: vacancy.clone(),
            preference_position: assignment.preference_position(),
        })
    }
}
