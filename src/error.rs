use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Failure taxonomy of the store layer. Reads signal absence with `None`
/// rather than an error; everything else lands here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referential integrity: a car write named an engine that is not in the
    /// engine table, caught either by the pre-insert check or by the foreign
    /// key itself.
    #[error("engine_id '{0}' does not exist in the engine table")]
    EngineMissing(Uuid),

    /// An update targeted a row that does not exist.
    #[error("{entity} with id '{id}' does not exist")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
