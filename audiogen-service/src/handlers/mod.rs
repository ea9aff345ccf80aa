pub mod download;
pub mod generate;
pub mod health;

pub use download::download;
pub use generate::generate;
pub use health::{health_check, metrics_endpoint, readiness_check};
