pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod utils;

pub use db::DbPool;

use std::sync::Arc;

use analysis::Analyzer;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub analyzer: Arc<dyn Analyzer>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            config,
            db,
            analyzer,
        }
    }
}
