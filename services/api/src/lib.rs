mod allocate;
mod cli;
mod infra;
mod routes;
mod server;

use doctor_transfer::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
