pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

use tracing::level_filters::LevelFilter;

pub fn init(level: LevelFilter) {
    infra::logging::init(level);
}
