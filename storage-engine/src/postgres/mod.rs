//! PostgreSQL adapters built on sqlx.

mod banner_store;
mod pool;
pub mod query;
mod user_repository;

pub use banner_store::{PgBannerStore, PgBannerTransaction};
pub use pool::{create_pool, mask_password, run_migrations};
pub use query::BannerQuery;
pub use user_repository::PgUserRepository;

use shared::Error;

const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_UNIQUE_VIOLATION: &str = "23505";

pub fn has_pg_error_code(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|c| c == code)
}

/// Classifies a driver error by SQLSTATE.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> Error {
    if has_pg_error_code(&err, PG_FOREIGN_KEY_VIOLATION) {
        return Error::validation("referenced feature or tag does not exist");
    }
    if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
        let constraint = err
            .as_database_error()
            .and_then(|db_err| db_err.constraint())
            .unwrap_or("unique constraint")
            .to_string();
        return Error::AlreadyExists(constraint);
    }

    tracing::error!("Database error: {}", err);
    Error::store(err.to_string())
}
