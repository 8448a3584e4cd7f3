//! Error types for the coupon sweeper.

use alo_db::DbError;

use crate::config::ConfigError;

/// Coupon sweeper errors.
#[derive(Debug, thiserror::Error)]
pub enum SweeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type SweeperResult<T> = Result<T, SweeperError>;
