use chrono::{TimeZone, Utc};
use doctor_transfer::workflows::allocation::{
    effective_rank, resolve_assignments, AssignmentQuery, CoupleApplication, CoupleApplicationId,
    Doctor, DoctorId, EffectiveRanks, InstitutionId, Preference, TransferSnapshot, Vacancy,
    VacancyId,
};

fn doctor(id: u32, merit_rank: u32) -> Doctor {
    Doctor {
        id: DoctorId(id),
        full_name: format!("Dr. {id}"),
        merit_rank,
    }
}

fn vacancy(id: u32, count: u32) -> Vacancy {
    Vacancy {
        id: VacancyId(id),
        institution_id: InstitutionId(1),
        designation: format!("Post {id}"),
        count,
        is_difficult_station: false,
    }
}

fn prefers(doctor: u32, vacancies: &[u32]) -> Vec<Preference> {
    vacancies
        .iter()
        .enumerate()
        .map(|(index, vacancy)| Preference {
            doctor_id: DoctorId(doctor),
            vacancy_id: VacancyId(*vacancy),
            order_index: index as u32,
        })
        .collect()
}

fn couple(id: u32, doctor1: u32, doctor2: u32, is_active: bool) -> CoupleApplication {
    CoupleApplication {
        id: CoupleApplicationId(id),
        doctor1_id: DoctorId(doctor1),
        doctor2_id: DoctorId(doctor2),
        created_at: Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        is_active,
    }
}

fn snapshot(
    doctors: Vec<Doctor>,
    vacancies: Vec<Vacancy>,
    preferences: Vec<Vec<Preference>>,
    couples: Vec<CoupleApplication>,
) -> TransferSnapshot {
    TransferSnapshot {
        doctors,
        vacancies,
        preferences: preferences.into_iter().flatten().collect(),
        couples,
        ..TransferSnapshot::default()
    }
}

#[test]
fn higher_merit_wins_a_single_seat() {
    let snapshot = snapshot(
        vec![doctor(1, 1), doctor(2, 2)],
        vec![vacancy(1, 1)],
        vec![prefers(1, &[1]), prefers(2, &[1])],
        Vec::new(),
    );

    let assignments = resolve_assignments(snapshot.allocation());
    assert_eq!(assignments.vacancy_for(DoctorId(1)), Some(VacancyId(1)));
    assert_eq!(assignments.vacancy_for(DoctorId(2)), None);
}

#[test]
fn doctors_only_fall_through_to_listed_vacancies() {
    let snapshot = snapshot(
        vec![doctor(1, 1), doctor(2, 2)],
        vec![vacancy(1, 1), vacancy(2, 1)],
        vec![prefers(1, &[1, 2]), prefers(2, &[1])],
        Vec::new(),
    );

    let assignments = resolve_assignments(snapshot.allocation());
    assert_eq!(assignments.vacancy_for(DoctorId(1)), Some(VacancyId(1)));
    assert_eq!(
        assignments.vacancy_for(DoctorId(2)),
        None,
        "V2 is free but was never listed"
    );
    assert_eq!(assignments.occupancy().get(&VacancyId(2)), None);
}

#[test]
fn couple_rank_can_push_a_top_doctor_behind_others() {
    let snapshot = snapshot(
        vec![doctor(1, 1), doctor(2, 100), doctor(3, 50)],
        vec![vacancy(1, 1)],
        vec![prefers(1, &[1]), prefers(3, &[1])],
        vec![couple(1, 1, 2, true)],
    );

    let assignments = resolve_assignments(snapshot.allocation());
    assert_eq!(assignments.vacancy_for(DoctorId(3)), Some(VacancyId(1)));
    assert_eq!(assignments.vacancy_for(DoctorId(1)), None);

    let order: Vec<DoctorId> = assignments
        .processing_order()
        .iter()
        .map(|(doctor_id, _)| *doctor_id)
        .collect();
    assert_eq!(order, vec![DoctorId(3), DoctorId(1), DoctorId(2)]);
    assert_eq!(assignments.effective_rank(DoctorId(1)), Some(100));
}

#[test]
fn position_is_one_based_preference_index() {
    let snapshot = snapshot(
        vec![doctor(1, 1), doctor(2, 2)],
        vec![vacancy(5, 1), vacancy(3, 1), vacancy(9, 1)],
        vec![prefers(1, &[5]), prefers(2, &[5, 3, 9])],
        Vec::new(),
    );

    let query = AssignmentQuery::new(&snapshot);
    let placement = query.position(DoctorId(2)).expect("doctor 2 placed");
    assert_eq!(placement.vacancy.id, VacancyId(3));
    assert_eq!(placement.preference_position, 2);
    assert_eq!(query.assignment(DoctorId(2)).map(|v| v.id), Some(VacancyId(3)));
}

#[test]
fn capacity_is_never_exceeded_and_each_doctor_placed_once() {
    let doctors: Vec<Doctor> = (1..=12).map(|id| doctor(id, id * 3 % 13)).collect();
    let vacancies = vec![vacancy(1, 2), vacancy(2, 3), vacancy(3, 1)];
    let preferences = (1..=12)
        .map(|id| match id % 3 {
            0 => prefers(id, &[1, 2, 3]),
            1 => prefers(id, &[3, 1]),
            _ => prefers(id, &[2, 2, 1]),
        })
        .collect();
    let snapshot = snapshot(doctors, vacancies, preferences, vec![couple(1, 4, 9, true)]);

    let assignments = resolve_assignments(snapshot.allocation());
    let occupancy = assignments.occupancy();
    for vacancy in &snapshot.vacancies {
        let taken = occupancy.get(&vacancy.id).copied().unwrap_or(0);
        assert!(taken <= vacancy.count, "{:?} overfilled", vacancy.id);
    }
    assert_eq!(assignments.assigned_count(), 6);
    assert_eq!(assignments.to_map().len(), assignments.assigned_count());
}

#[test]
fn strictly_better_rank_takes_contested_top_choice() {
    let snapshot = snapshot(
        vec![doctor(1, 7), doctor(2, 3)],
        vec![vacancy(1, 1), vacancy(2, 1)],
        vec![prefers(1, &[1, 2]), prefers(2, &[1])],
        Vec::new(),
    );

    let assignments = resolve_assignments(snapshot.allocation());
    assert_eq!(assignments.vacancy_for(DoctorId(2)), Some(VacancyId(1)));
    assert_eq!(assignments.vacancy_for(DoctorId(1)), Some(VacancyId(2)));
    assert_eq!(
        assignments.get(DoctorId(1)).map(|a| a.preference_position()),
        Some(2)
    );
}

#[test]
fn couple_members_share_the_worse_rank() {
    let doctors = vec![doctor(1, 5), doctor(2, 50), doctor(3, 20)];
    let couples = vec![couple(1, 1, 2, true), couple(2, 3, 2, false)];

    assert_eq!(effective_rank(&doctors[0], &couples, &doctors), 50);
    assert_eq!(effective_rank(&doctors[1], &couples, &doctors), 50);
    assert_eq!(effective_rank(&doctors[2], &couples, &doctors), 20);

    let ranks = EffectiveRanks::resolve(&doctors, &couples);
    assert_eq!(ranks.get(DoctorId(1)), Some(50));
    assert_eq!(ranks.get(DoctorId(2)), Some(50));
    assert_eq!(ranks.get(DoctorId(3)), Some(20));
}

#[test]
fn repeated_passes_over_one_snapshot_agree() {
    let snapshot = snapshot(
        vec![doctor(1, 4), doctor(2, 4), doctor(3, 1)],
        vec![vacancy(1, 1), vacancy(2, 1)],
        vec![prefers(1, &[1, 2]), prefers(2, &[1, 2]), prefers(3, &[2])],
        Vec::new(),
    );

    let first = resolve_assignments(snapshot.allocation());
    let second = resolve_assignments(snapshot.allocation());
    assert_eq!(first.to_map(), second.to_map());
    assert_eq!(first.processing_order(), second.processing_order());

    // Ties keep enumeration order, so doctor 1 is served before doctor 2.
    assert_eq!(first.vacancy_for(DoctorId(1)), Some(VacancyId(1)));
    assert_eq!(first.vacancy_for(DoctorId(2)), None);
}

#[test]
fn dangling_vacancy_references_are_skipped() {
    let snapshot = snapshot(
        vec![doctor(1, 1)],
        vec![vacancy(2, 1)],
        vec![prefers(1, &[99, 2])],
        Vec::new(),
    );

    let assignments = resolve_assignments(snapshot.allocation());
    let assignment = assignments.get(DoctorId(1)).expect("doctor placed");
    assert_eq!(assignment.vacancy_id, VacancyId(2));
    assert_eq!(assignment.preference_position(), 2);
}
