use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Engine, EngineRequest};
use crate::validation;

/// CRUD access to the engine table. Every operation is a single
/// parameterized statement; no transaction is needed for single-row,
/// single-table mutations.
#[derive(Clone)]
pub struct EngineRepository {
    pool: PgPool,
}

impl EngineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Absence is `None`, never an error.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Engine>, StoreError> {
        let engine = sqlx::query_as::<_, Engine>(
            "SELECT id, displacement, no_of_cylinders, car_range FROM engine WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(engine)
    }

    pub async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM engine WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn create(&self, request: &EngineRequest) -> Result<Engine, StoreError> {
        validation::validate_engine_request(request)?;

        let engine = sqlx::query_as::<_, Engine>(
            "INSERT INTO engine (id, displacement, no_of_cylinders, car_range) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, displacement, no_of_cylinders, car_range",
        )
        .bind(Uuid::new_v4())
        .bind(request.displacement)
        .bind(request.no_of_cylinders)
        .bind(request.car_range)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("created engine {}", engine.engine_id);
        Ok(engine)
    }

    /// Full replace of the mutable fields. Fails with `NotFound` when no row
    /// matches `id`.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        request: &EngineRequest,
    ) -> Result<Engine, StoreError> {
        validation::validate_engine_request(request)?;

        let engine = sqlx::query_as::<_, Engine>(
            "UPDATE engine SET displacement = $1, no_of_cylinders = $2, car_range = $3 \
             WHERE id = $4 \
             RETURNING id, displacement, no_of_cylinders, car_range",
        )
        .bind(request.displacement)
        .bind(request.no_of_cylinders)
        .bind(request.car_range)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "engine",
            id,
        })?;

        Ok(engine)
    }

    /// Returns the deleted row so callers can report what was removed, or
    /// `None` when no row matched.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Option<Engine>, StoreError> {
        let engine = sqlx::query_as::<_, Engine>(
            "DELETE FROM engine WHERE id = $1 \
             RETURNING id, displacement, no_of_cylinders, car_range",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(engine) = &engine {
            tracing::info!("deleted engine {}", engine.engine_id);
        }
        Ok(engine)
    }
}
