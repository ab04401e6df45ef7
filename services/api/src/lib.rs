mod cli;
mod infra;
mod routes;
mod server;

use internsafe::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
