use crate::infra::{open_csv, parse_couple};
use clap::Args;
use doctor_transfer::config::AdminConfig;
use doctor_transfer::error::AppError;
use doctor_transfer::workflows::transfer::{
    DoctorReportEntry, InMemoryTransferRepository, SummaryReport, TransferService,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AllocateArgs {
    /// Vacancy schedule CSV (DISTRICT, INSTITUTION, DESIGNATION, VACANCIES)
    #[arg(long)]
    pub(crate) vacancies: PathBuf,
    /// Merit list CSV (SN/Intern Merit, Full Name)
    #[arg(long)]
    pub(crate) doctors: PathBuf,
    /// Preference sheet CSV (Merit Rank, Institution, Designation, Preference)
    #[arg(long)]
    pub(crate) preferences: PathBuf,
    /// Optional difficult-station list CSV (RDHS, STATION)
    #[arg(long)]
    pub(crate) difficult_stations: Option<PathBuf>,
    /// Couple application as two merit ranks, e.g. `--couple 12,40`. Repeatable.
    #[arg(long = "couple", value_parser = parse_couple)]
    pub(crate) couples: Vec<(u32, u32)>,
    /// Print one JSON object per doctor instead of the text table.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllocationRow {
    pub(crate) merit_rank: u32,
    pub(crate) effective_merit_rank: u32,
    pub(crate) full_name: String,
    pub(crate) institution: Option<String>,
    pub(crate) district: Option<String>,
    pub(crate) designation: Option<String>,
    pub(crate) preference_position: Option<u32>,
}

impl From<&DoctorReportEntry> for AllocationRow {
    fn from(entry: &DoctorReportEntry) -> Self {
        let vacancy = entry.assigned_vacancy.as_ref();
        Self {
            merit_rank: entry.merit_rank,
            effective_merit_rank: entry.effective_merit_rank,
            full_name: entry.full_name.clone(),
            institution: vacancy.map(|v| v.institution.clone()),
            district: vacancy.map(|v| v.district.clone()),
            designation: vacancy.map(|v| v.designation.clone()),
            preference_position: entry.preference_position,
        }
    }
}

/// Runs one allocation pass over CSV inputs without starting the server.
pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let summary = allocate(&args)?;
    let rows: Vec<AllocationRow> = summary.doctors.iter().map(AllocationRow::from).collect();

    if args.json {
        for row in &rows {
            match serde_json::to_string(row) {
                Ok(line) => println!("{line}"),
                Err(err) => eprintln!("failed to render row for rank {}: {err}", row.merit_rank),
            }
        }
        return Ok(());
    }

    render_allocation(&summary, &rows);
    Ok(())
}

pub(crate) fn allocate(args: &AllocateArgs) -> Result<SummaryReport, AppError> {
    let service = TransferService::new(
        Arc::new(InMemoryTransferRepository::default()),
        AdminConfig {
            username: String::new(),
            password: String::new(),
        },
    );

    service.import_vacancies(open_csv(&args.vacancies)?)?;
    if let Some(path) = &args.difficult_stations {
        service.import_difficult_stations(open_csv(path)?)?;
    }
    service.import_doctors(open_csv(&args.doctors)?)?;
    service.import_preferences(open_csv(&args.preferences)?)?;

    for (first, second) in &args.couples {
        service.apply_couple(*first, *second)?;
    }

    Ok(service.summary_report()?)
}

fn render_allocation(summary: &SummaryReport, rows: &[AllocationRow]) {
    let stats = &summary.statistics;
    println!("Transfer allocation");
    println!(
        "{} doctors | {} vacancies ({} positions, {} difficult) | {} couples",
        stats.total_doctors,
        stats.total_vacancies,
        stats.total_positions,
        stats.difficult_stations,
        stats.total_couples
    );
    println!(
        "Average preferences per doctor: {:.1}",
        stats.average_preferences_per_doctor
    );

    println!("\nAssignments (merit order)");
    for row in rows {
        let rank_note = if row.effective_merit_rank != row.merit_rank {
            format!(" (couple rank {})", row.effective_merit_rank)
        } else {
            String::new()
        };
        match (&row.institution, &row.district, &row.designation) {
            (Some(institution), Some(district), Some(designation)) => println!(
                "- #{}{} {}: {}, {} as {} (preference #{})",
                row.merit_rank,
                rank_note,
                row.full_name,
                institution,
                district,
                designation,
                row.preference_position.unwrap_or_default()
            ),
            _ => println!(
                "- #{}{} {}: not assigned",
                row.merit_rank, rank_note, row.full_name
            ),
        }
    }

    let assignment = &summary.assignment_summary;
    println!(
        "\nAssigned {}/{} ({:.1}%), {} unassigned",
        assignment.assigned_count,
        assignment.total_doctors,
        assignment.assignment_rate,
        assignment.unassigned_count
    );
}
