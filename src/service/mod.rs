//! HTTP and command-line shell around the policy engine.

mod cli;
mod render;
pub mod routes;
mod server;
pub mod state;

pub use routes::policy_router;
pub use state::AppState;

use crate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
