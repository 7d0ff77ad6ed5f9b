use std::collections::BTreeSet;

use super::views::{CountRange, FilterOptions, VacancyFilter, VacancyListing};
use crate::workflows::allocation::domain::TransferSnapshot;

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn active_term(term: &Option<String>) -> Option<&str> {
    term.as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
}

impl VacancyFilter {
    pub fn matches(&self, listing: &VacancyListing) -> bool {
        if let Some(search) = active_term(&self.search) {
            let hit = contains_ignore_case(&listing.designation, search)
                || contains_ignore_case(&listing.institution, search)
                || contains_ignore_case(&listing.district, search);
            if !hit {
                return false;
            }
        }

        let field_filters = [
            (&self.district, &listing.district),
            (&self.institution, &listing.institution),
            (&self.designation, &listing.designation),
        ];
        for (filter, value) in field_filters {
            if let Some(term) = active_term(filter) {
                if !contains_ignore_case(value, term) {
                    return false;
                }
            }
        }

        if let Some(flag) = self.is_difficult_station {
            if listing.is_difficult_station != flag {
                return false;
            }
        }
        if let Some(min) = self.min_count {
            if listing.count < min {
                return false;
            }
        }
        if let Some(max) = self.max_count {
            if listing.count > max {
                return false;
            }
        }

        true
    }
}

/// Vacancies matching `filter`, ordered by district, institution, then designation.
pub fn search_vacancies(
    snapshot: &TransferSnapshot,
    filter: &VacancyFilter,
) -> Vec<VacancyListing> {
    let mut listings: Vec<VacancyListing> = snapshot
        .vacancies
        .iter()
        .map(|vacancy| VacancyListing::from_snapshot(snapshot, vacancy))
        .filter(|listing| filter.matches(listing))
        .collect();

    listings.sort_by(|a, b| {
        a.district
            .cmp(&b.district)
            .then_with(|| a.institution.cmp(&b.institution))
            .then_with(|| a.designation.cmp(&b.designation))
    });
    listings
}

pub fn filter_options(snapshot: &TransferSnapshot) -> FilterOptions {
    let districts: BTreeSet<String> = snapshot
        .districts
        .iter()
        .map(|district| district.name.clone())
        .collect();
    let institutions: BTreeSet<String> = snapshot
        .institutions
        .iter()
        .map(|institution| institution.name.clone())
        .collect();
    let designations: BTreeSet<String> = snapshot
        .vacancies
        .iter()
        .map(|vacancy| vacancy.designation.clone())
        .collect();

    let counts = snapshot.vacancies.iter().map(|vacancy| vacancy.count);
    let count_range = match (counts.clone().min(), counts.max()) {
        (Some(min_count), Some(max_count)) => CountRange {
            min_count,
            max_count,
        },
        _ => CountRange::default(),
    };

    FilterOptions {
        districts: districts.into_iter().collect(),
        institutions: institutions.into_iter().collect(),
        designations: designations.into_iter().collect(),
        count_range,
    }
}
