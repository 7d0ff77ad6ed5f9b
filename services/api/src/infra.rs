use doctor_transfer::config::SeedConfig;
use doctor_transfer::error::AppError;
use doctor_transfer::workflows::import::ImportSummary;
use doctor_transfer::workflows::transfer::{InMemoryTransferRepository, TransferService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type SharedTransferService = Arc<TransferService<InMemoryTransferRepository>>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn open_csv(path: &Path) -> Result<BufReader<File>, AppError> {
    let file = File::open(path)?;
    Ok(BufReader::new(file))
}

/// Loads the configured seed files, vacancies first so difficult stations can match.
pub(crate) fn seed_service(
    service: &TransferService<InMemoryTransferRepository>,
    seed: &SeedConfig,
) -> Result<(), AppError> {
    if let Some(path) = &seed.vacancies {
        let summary = service.import_vacancies(open_csv(path)?)?;
        log_seed("vacancies", path, summary);
    }
    if let Some(path) = &seed.difficult_stations {
        let summary = service.import_difficult_stations(open_csv(path)?)?;
        log_seed("difficult stations", path, summary);
    }
    if let Some(path) = &seed.doctors {
        let summary = service.import_doctors(open_csv(path)?)?;
        log_seed("doctors", path, summary);
    }
    Ok(())
}

fn log_seed(kind: &str, path: &Path, summary: ImportSummary) {
    info!(
        kind,
        path = %path.display(),
        imported = summary.imported,
        skipped = summary.skipped,
        "seed data loaded"
    );
}

/// Parses a `RANK,RANK` pair naming the two members of a couple application.
pub(crate) fn parse_couple(raw: &str) -> Result<(u32, u32), String> {
    let (first, second) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected RANK,RANK but got '{raw}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("failed to parse merit rank '{}' ({err})", value.trim()))
    };
    Ok((parse(first)?, parse(second)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn couple_pairs_parse_with_spaces() {
        assert_eq!(parse_couple("12, 40"), Ok((12, 40)));
        assert!(parse_couple("12").is_err());
        assert!(parse_couple("12,x").is_err());
    }
}
