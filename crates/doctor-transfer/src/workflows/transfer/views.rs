use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::allocation::domain::{
    CoupleApplicationId, Doctor, DoctorId, TransferSnapshot, Vacancy, VacancyId,
};

/// Request item used when a doctor submits their ranked list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub vacancy_id: VacancyId,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorListing {
    pub count: usize,
    pub doctors: Vec<Doctor>,
}

/// Vacancy with its institution and district spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyListing {
    pub id: VacancyId,
    pub designation: String,
    pub count: u32,
    pub is_difficult_station: bool,
    pub institution: String,
    pub district: String,
}

impl VacancyListing {
    pub fn from_snapshot(snapshot: &TransferSnapshot, vacancy: &Vacancy) -> Self {
        let (institution, district) = snapshot.placement_of(vacancy);
        Self {
            id: vacancy.id,
            designation: vacancy.designation.clone(),
            count: vacancy.count,
            is_difficult_station: vacancy.is_difficult_station,
            institution,
            district,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentView {
    pub assigned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy: Option<VacancyListing>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    NoPreferences,
    NotAssigned,
    Assigned,
}

impl PositionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoPreferences => "No preferences set",
            Self::NotAssigned => "No assignment yet",
            Self::Assigned => "Assigned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionView {
    pub status: PositionStatus,
    pub position: String,
    pub merit_rank: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy: Option<VacancyListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_position: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoupleMember {
    pub id: DoctorId,
    pub merit_rank: u32,
    pub full_name: String,
}

impl From<&Doctor> for CoupleMember {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            merit_rank: doctor.merit_rank,
            full_name: doctor.full_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoupleView {
    pub id: CoupleApplicationId,
    pub doctor1: CoupleMember,
    pub doctor2: CoupleMember,
    pub effective_merit_rank: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoupleInfo {
    pub is_in_couple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub couple_application_id: Option<CoupleApplicationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<CoupleMember>,
    pub effective_merit_rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupleRequest {
    pub doctor1_merit_rank: u32,
    pub doctor2_merit_rank: u32,
}

/// Query parameters accepted by the vacancy browser. Text filters are case-insensitive
/// substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VacancyFilter {
    pub search: Option<String>,
    pub district: Option<String>,
    pub institution: Option<String>,
    pub designation: Option<String>,
    pub is_difficult_station: Option<bool>,
    pub min_count: Option<u32>,
    pub max_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountRange {
    pub min_count: u32,
    pub max_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub districts: Vec<String>,
    pub institutions: Vec<String>,
    pub designations: Vec<String>,
    pub count_range: CountRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceLine {
    pub vacancy_id: VacancyId,
    pub designation: String,
    pub institution: String,
    pub count: u32,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorReportEntry {
    pub id: DoctorId,
    pub merit_rank: u32,
    pub effective_merit_rank: u32,
    pub full_name: String,
    pub preferences_count: usize,
    pub preferences: Vec<PreferenceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vacancy: Option<VacancyListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorRef {
    pub merit_rank: u32,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyPreferenceLine {
    pub merit_rank: u32,
    pub full_name: String,
    pub order_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VacancyReportEntry {
    pub id: VacancyId,
    pub designation: String,
    pub count: u32,
    pub is_difficult_station: bool,
    pub institution: String,
    pub district: String,
    pub preference_count: usize,
    pub assigned_doctors: Vec<DoctorRef>,
    pub all_preferences: Vec<VacancyPreferenceLine>,
    pub is_fully_assigned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferStatistics {
    pub total_doctors: usize,
    pub total_vacancies: usize,
    pub total_positions: u64,
    pub difficult_stations: usize,
    pub total_couples: usize,
    pub average_preferences_per_doctor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentSummary {
    pub total_doctors: usize,
    pub assigned_count: usize,
    pub unassigned_count: usize,
    pub assignment_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub doctors: Vec<DoctorReportEntry>,
    pub vacancy_applications: Vec<VacancyReportEntry>,
    pub couples: Vec<CoupleView>,
    pub statistics: TransferStatistics,
    pub assignment_summary: AssignmentSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    Admin,
    Doctor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub role: SessionRole,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<DoctorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merit_rank: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}
