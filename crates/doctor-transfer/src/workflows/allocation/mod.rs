//! Merit-ordered vacancy allocation.
//!
//! Doctors are served one at a time in ascending effective rank and each takes the first
//! vacancy on their list that still has a seat. Couple applications make both partners
//! share the worse of their two ranks. The pass is pure: it reads a snapshot and returns a
//! fresh mapping every time.

pub mod domain;
pub mod engine;
pub mod query;
pub mod ranking;

pub use domain::{
    AllocationSnapshot, CoupleApplication, CoupleApplicationId, District, DistrictId, Doctor,
    DoctorId, Institution, InstitutionId, Preference, TransferSnapshot, Vacancy, VacancyId,
};
pub use engine::{resolve_assignments, Assignment, Assignments, CapacityTable, PreferenceBook};
pub use query::{AssignmentQuery, PlacementPosition};
pub use ranking::{effective_rank, EffectiveRanks};
