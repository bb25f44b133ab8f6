//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod risk;
mod serve;
mod video;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use risk::run_risk;
pub use serve::{router, run_serve, AppState};
pub use video::run_video;
