use std::collections::HashMap;

use super::domain::{CoupleApplication, Doctor, DoctorId};

/// Rank used to order a single doctor in the allocation pass.
///
/// A doctor in an active couple application takes the worse (numerically larger) of the
/// two merit ranks. When the partner is missing from `doctors` the doctor's own rank is
/// used. If several active applications reference the doctor, the first one wins.
pub fn effective_rank(doctor: &Doctor, couples: &[CoupleApplication], doctors: &[Doctor]) -> u32 {
    let partner_id = couples
        .iter()
        .filter(|couple| couple.is_active)
        .find_map(|couple| couple.partner_of(doctor.id));

    let partner = partner_id.and_then(|id| doctors.iter().find(|candidate| candidate.id == id));

    match partner {
        Some(partner) => doctor.merit_rank.max(partner.merit_rank),
        None => doctor.merit_rank,
    }
}

/// Effective ranks for a whole population, computed with a single partner index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveRanks {
    ranks: HashMap<DoctorId, u32>,
}

impl EffectiveRanks {
    pub fn resolve(doctors: &[Doctor], couples: &[CoupleApplication]) -> Self {
        let merit: HashMap<DoctorId, u32> = doctors
            .iter()
            .map(|doctor| (doctor.id, doctor.merit_rank))
            .collect();

        let mut partners: HashMap<DoctorId, DoctorId> = HashMap::new();
        for couple in couples.iter().filter(|couple| couple.is_active) {
            partners
                .entry(couple.doctor1_id)
                .or_insert(couple.doctor2_id);
            partners
                .entry(couple.doctor2_id)
                .or_insert(couple.doctor1_id);
        }

        let ranks = doctors
            .iter()
            .map(|doctor| {
                let partner_rank = partners
                    .get(&doctor.id)
                    .and_then(|partner| merit.get(partner));
                let rank = match partner_rank {
                    Some(partner_rank) => doctor.merit_rank.max(*partner_rank),
                    None => doctor.merit_rank,
                };
                (doctor.id, rank)
            })
            .collect();

        Self { ranks }
    }

    pub fn get(&self, doctor_id: DoctorId) -> Option<u32> {
        self.ranks.get(&doctor_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::allocation::domain::CoupleApplicationId;
    use chrono::{TimeZone, Utc};

    fn doctor(id: u32, merit_rank: u32) -> Doctor {
        Doctor {
            id: DoctorId(id),
            full_name: format!("Doctor {id}"),
            merit_rank,
        }
    }

    fn couple(id: u32, first: u32, second: u32, is_active: bool) -> CoupleApplication {
        CoupleApplication {
            id: CoupleApplicationId(id),
            doctor1_id: DoctorId(first),
            doctor2_id: DoctorId(second),
            created_at: Utc.with_ymd_and_hms(2025, 8, 26, 18, 58, 32).unwrap(),
            is_active,
        }
    }

    #[test]
    fn uncoupled_doctor_keeps_merit_rank() {
        let doctors = vec![doctor(1, 7), doctor(2, 3)];
        assert_eq!(effective_rank(&doctors[0], &[], &doctors), 7);

        let ranks = EffectiveRanks::resolve(&doctors, &[]);
        assert_eq!(ranks.get(DoctorId(1)), Some(7));
        assert_eq!(ranks.get(DoctorId(2)), Some(3));
    }

    #[test]
    fn both_partners_share_the_worse_rank() {
        let doctors = vec![doctor(1, 5), doctor(2, 50)];
        let couples = vec![couple(1, 1, 2, true)];

        assert_eq!(effective_rank(&doctors[0], &couples, &doctors), 50);
        assert_eq!(effective_rank(&doctors[1], &couples, &doctors), 50);

        let ranks = EffectiveRanks::resolve(&doctors, &couples);
        assert_eq!(ranks.get(DoctorId(1)), Some(50));
        assert_eq!(ranks.get(DoctorId(2)), Some(50));
    }

    #[test]
    fn inactive_couples_are_ignored() {
        let doctors = vec![doctor(1, 5), doctor(2, 50)];
        let couples = vec![couple(1, 1, 2, false)];

        assert_eq!(effective_rank(&doctors[0], &couples, &doctors), 5);
        assert_eq!(
            EffectiveRanks::resolve(&doctors, &couples).get(DoctorId(1)),
            Some(5)
        );
    }

    #[test]
    fn missing_partner_falls_back_to_own_rank() {
        let doctors = vec![doctor(1, 5)];
        let couples = vec![couple(1, 1, 99, true)];

        assert_eq!(effective_rank(&doctors[0], &couples, &doctors), 5);
        assert_eq!(
            EffectiveRanks::resolve(&doctors, &couples).get(DoctorId(1)),
            Some(5)
        );
    }

    #[test]
    fn first_active_couple_wins_on_conflicting_data() {
        let doctors = vec![doctor(1, 5), doctor(2, 20), doctor(3, 80)];
        let couples = vec![couple(1, 1, 2, true), couple(2, 3, 1, true)];

        assert_eq!(effective_rank(&doctors[0], &couples, &doctors), 20);
        let ranks = EffectiveRanks::resolve(&doctors, &couples);
        assert_eq!(ranks.get(DoctorId(1)), Some(20));
        assert_eq!(ranks.get(DoctorId(3)), Some(80));
    }

    #[test]
    fn resolver_agrees_with_single_doctor_lookup() {
        let doctors = vec![doctor(1, 12), doctor(2, 4), doctor(3, 9), doctor(4, 1)];
        let couples = vec![couple(1, 2, 3, true), couple(2, 4, 1, false)];
        let ranks = EffectiveRanks::resolve(&doctors, &couples);

        for doctor in &doctors {
            assert_eq!(
                ranks.get(doctor.id),
                Some(effective_rank(doctor, &couples, &doctors))
            );
        }
    }
}
