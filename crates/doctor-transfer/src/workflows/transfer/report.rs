use std::cmp::Reverse;
use std::collections::HashMap;

use super::views::{
    AssignmentSummary, CoupleMember, CoupleView, DoctorRef, DoctorReportEntry, PreferenceLine,
    SummaryReport, TransferStatistics, VacancyListing, VacancyPreferenceLine, VacancyReportEntry,
};
use crate::workflows::allocation::domain::{Doctor, DoctorId, TransferSnapshot, Vacancy, VacancyId};
use crate::workflows::allocation::engine::{resolve_assignments, Assignments, PreferenceBook};

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Report builders fed by a single allocation pass over one snapshot.
///
/// Doctor, vacancy and preference lookups are indexed once so each report stays linear
/// in the size of the snapshot.
pub struct TransferReport<'a> {
    snapshot: &'a TransferSnapshot,
    assignments: Assignments,
    book: PreferenceBook,
    doctors: HashMap<DoctorId, &'a Doctor>,
    vacancies: HashMap<VacancyId, &'a Vacancy>,
}

impl<'a> TransferReport<'a> {
    pub fn new(snapshot: &'a TransferSnapshot) -> Self {
        let assignments = resolve_assignments(snapshot.allocation());
        let book = PreferenceBook::from_preferences(&snapshot.preferences);
        let mut doctors = HashMap::with_capacity(snapshot.doctors.len());
        for doctor in &snapshot.doctors {
            doctors.entry(doctor.id).or_insert(doctor);
        }
        let mut vacancies = HashMap::with_capacity(snapshot.vacancies.len());
        for vacancy in &snapshot.vacancies {
            vacancies.entry(vacancy.id).or_insert(vacancy);
        }

        Self {
            snapshot,
            assignments,
            book,
            doctors,
            vacancies,
        }
    }

    /// One entry per doctor, ordered by merit rank.
    pub fn doctors(&self) -> Vec<DoctorReportEntry> {
        let mut doctors: Vec<_> = self.snapshot.doctors.iter().collect();
        doctors.sort_by_key(|doctor| doctor.merit_rank);

        doctors
            .into_iter()
            .map(|doctor| {
                let preferences: Vec<PreferenceLine> = self
                    .book
                    .for_doctor(doctor.id)
                    .iter()
                    .filter_map(|preference| {
                        let vacancy = self.vacancies.get(&preference.vacancy_id)?;
                        let (institution, _) = self.snapshot.placement_of(vacancy);
                        Some(PreferenceLine {
                            vacancy_id: vacancy.id,
                            designation: vacancy.designation.clone(),
                            institution,
                            count: vacancy.count,
                            order_index: preference.order_index,
                        })
                    })
                    .collect();

                let assignment = self.assignments.get(doctor.id);
                let assigned_vacancy = assignment
                    .and_then(|assignment| self.vacancies.get(&assignment.vacancy_id))
                    .map(|vacancy| VacancyListing::from_snapshot(self.snapshot, vacancy));

                DoctorReportEntry {
                    id: doctor.id,
                    merit_rank: doctor.merit_rank,
                    effective_merit_rank: self
                        .assignments
                        .effective_rank(doctor.id)
                        .unwrap_or(doctor.merit_rank),
                    full_name: doctor.full_name.clone(),
                    preferences_count: preferences.len(),
                    preferences,
                    assigned_vacancy,
                    preference_position: assignment.map(|a| a.preference_position()),
                }
            })
            .collect()
    }

    /// One entry per vacancy, most requested first.
    pub fn vacancies(&self) -> Vec<VacancyReportEntry> {
        let mut requests_by_vacancy: HashMap<VacancyId, Vec<VacancyPreferenceLine>> =
            HashMap::new();
        for preference in &self.snapshot.preferences {
            if let Some(doctor) = self.doctors.get(&preference.doctor_id) {
                requests_by_vacancy
                    .entry(preference.vacancy_id)
                    .or_default()
                    .push(VacancyPreferenceLine {
                        merit_rank: doctor.merit_rank,
                        full_name: doctor.full_name.clone(),
                        order_index: preference.order_index,
                    });
            }
        }
        let mut placed = self.assignments.by_vacancy();

        let mut entries: Vec<VacancyReportEntry> = self
            .snapshot
            .vacancies
            .iter()
            .map(|vacancy| {
                let listing = VacancyListing::from_snapshot(self.snapshot, vacancy);

                let mut requests = requests_by_vacancy.remove(&vacancy.id).unwrap_or_default();
                requests.sort_by_key(|line| (line.order_index, line.merit_rank));

                let assigned_doctors: Vec<DoctorRef> = placed
                    .remove(&vacancy.id)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|doctor_id| self.doctors.get(&doctor_id).copied())
                    .map(|doctor| DoctorRef {
                        merit_rank: doctor.merit_rank,
                        full_name: doctor.full_name.clone(),
                    })
                    .collect();

                VacancyReportEntry {
                    id: listing.id,
                    designation: listing.designation,
                    count: listing.count,
                    is_difficult_station: listing.is_difficult_station,
                    institution: listing.institution,
                    district: listing.district,
                    preference_count: requests.len(),
                    is_fully_assigned: assigned_doctors.len() as u64 >= u64::from(vacancy.count),
                    assigned_doctors,
                    all_preferences: requests,
                }
            })
            .collect();

        entries.sort_by_key(|entry| Reverse(entry.preference_count));
        entries
    }

    pub fn couples(&self) -> Vec<CoupleView> {
        couple_views(self.snapshot)
    }

    pub fn summary(&self) -> SummaryReport {
        let doctors = self.doctors();
        let vacancy_applications = self.vacancies();
        let couples = self.couples();

        let total_doctors = doctors.len();
        let total_preferences: usize = doctors.iter().map(|d| d.preferences_count).sum();
        let average_preferences_per_doctor = if total_doctors > 0 {
            round_one_decimal(total_preferences as f64 / total_doctors as f64)
        } else {
            0.0
        };

        let statistics = TransferStatistics {
            total_doctors,
            total_vacancies: self.snapshot.vacancies.len(),
            total_positions: self
                .snapshot
                .vacancies
                .iter()
                .map(|vacancy| u64::from(vacancy.count))
                .sum(),
            difficult_stations: self
                .snapshot
                .vacancies
                .iter()
                .filter(|vacancy| vacancy.is_difficult_station)
                .count(),
            total_couples: couples.len(),
            average_preferences_per_doctor,
        };

        let assigned_count = self.assignments.assigned_count();
        let assignment_summary = AssignmentSummary {
            total_doctors,
            assigned_count,
            unassigned_count: total_doctors.saturating_sub(assigned_count),
            assignment_rate: if total_doctors > 0 {
                round_one_decimal(assigned_count as f64 / total_doctors as f64 * 100.0)
            } else {
                0.0
            },
        };

        SummaryReport {
            doctors,
            vacancy_applications,
            couples,
            statistics,
            assignment_summary,
        }
    }
}

/// Active couple applications with both members present, ordered by shared rank.
pub fn couple_views(snapshot: &TransferSnapshot) -> Vec<CoupleView> {
    let mut views: Vec<CoupleView> = snapshot
        .active_couples()
        .filter_map(|couple| {
            let doctor1 = snapshot.doctor(couple.doctor1_id)?;
            let doctor2 = snapshot.doctor(couple.doctor2_id)?;
            Some(CoupleView {
                id: couple.id,
                doctor1: CoupleMember::from(doctor1),
                doctor2: CoupleMember::from(doctor2),
                effective_merit_rank: doctor1.merit_rank.max(doctor2.merit_rank),
                created_at: couple.created_at,
            })
        })
        .collect();
    views.sort_by_key(|view| view.effective_merit_rank);
    views
}
