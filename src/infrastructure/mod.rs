//! Adapters behind the domain ports: diesel repositories, the filesystem
//! object store, the JWT identity verifier and the change-event poller.

pub mod catalog_repo;
pub mod change_feed;
pub mod identity;
pub mod marketing_repo;
pub mod models;
pub mod order_repo;
pub mod raffle_repo;
pub mod storage;
pub mod user_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::DatabaseErrorKind;

use crate::db::DbPool;
use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => DomainError::NotFound,
            diesel::result::Error::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation => DomainError::Backend(info.message().to_owned()),
                _ => DomainError::Internal(info.message().to_owned()),
            },
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// One pool shared by every diesel-backed port.
#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn conn(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, DomainError> {
        Ok(self.pool.get()?)
    }
}
