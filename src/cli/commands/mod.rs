//! CLI command implementations.

mod ask;
mod assist;
mod config;
mod doctor;
mod run;
mod serve;

pub use ask::run_ask;
pub use assist::run_assist;
pub use config::run_config;
pub use doctor::run_doctor;
pub use run::run_pipeline;
pub use serve::{router, run_serve, AppState};
