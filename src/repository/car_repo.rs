use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Car, CarRequest, Engine, FuelType};
use crate::validation;

/// Column shape of a car read. `WithEngine` pays for the engine join;
/// `CarOnly` fetches car columns only and leaves the engine at its zero
/// value apart from the stored reference id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarProjection {
    CarOnly,
    WithEngine,
}

const SELECT_CAR_WITH_ENGINE_BY_ID: &str =
    "SELECT c.id, c.name, c.year, c.brand, c.fuel_type, c.engine_id, c.price, c.created_at, c.updated_at, \
     e.id AS joined_engine_id, e.displacement, e.no_of_cylinders, e.car_range \
     FROM car c LEFT JOIN engine e ON c.engine_id = e.id WHERE c.id = $1";

const SELECT_CARS_WITH_ENGINE_BY_BRAND: &str =
    "SELECT c.id, c.name, c.year, c.brand, c.fuel_type, c.engine_id, c.price, c.created_at, c.updated_at, \
     e.id AS joined_engine_id, e.displacement, e.no_of_cylinders, e.car_range \
     FROM car c LEFT JOIN engine e ON c.engine_id = e.id WHERE c.brand = $1";

const SELECT_CARS_BY_BRAND: &str =
    "SELECT id, name, year, brand, fuel_type, engine_id, price, created_at, updated_at \
     FROM car WHERE brand = $1";

const SELECT_ENGINE_BY_ID: &str =
    "SELECT id, displacement, no_of_cylinders, car_range FROM engine WHERE id = $1";

#[derive(FromRow)]
struct CarRow {
    id: Uuid,
    name: String,
    year: String,
    brand: String,
    fuel_type: String,
    engine_id: Uuid,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CarWithEngineRow {
    id: Uuid,
    name: String,
    year: String,
    brand: String,
    fuel_type: String,
    engine_id: Uuid,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    joined_engine_id: Option<Uuid>,
    displacement: Option<i64>,
    no_of_cylinders: Option<i64>,
    car_range: Option<i64>,
}

/// CRUD access to the car table. Writes are gated by request validation and
/// by an existence check against the referenced engine; mutations that span
/// more than one statement run inside a transaction.
#[derive(Clone)]
pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Single car joined with its engine. The LEFT JOIN tolerates a dangling
    /// engine reference; absence of the car is `None`, never an error.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Car>, StoreError> {
        let row = sqlx::query_as::<_, CarWithEngineRow>(SELECT_CAR_WITH_ENGINE_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(car_from_joined_row(row)?)),
            None => Ok(None),
        }
    }

    /// Cars matching `brand`, in storage order. The projection picks one of
    /// two fixed query shapes; the query text is never assembled per call.
    pub async fn find_by_brand(
        &self,
        brand: &str,
        projection: CarProjection,
    ) -> Result<Vec<Car>, StoreError> {
        match projection {
            CarProjection::WithEngine => {
                let rows = sqlx::query_as::<_, CarWithEngineRow>(SELECT_CARS_WITH_ENGINE_BY_BRAND)
                    .bind(brand)
                    .fetch_all(&self.pool)
                    .await?;

                let mut cars = Vec::with_capacity(rows.len());
                for row in rows {
                    cars.push(car_from_joined_row(row)?);
                }
                Ok(cars)
            }
            CarProjection::CarOnly => {
                let rows = sqlx::query_as::<_, CarRow>(SELECT_CARS_BY_BRAND)
                    .bind(brand)
                    .fetch_all(&self.pool)
                    .await?;

                let mut cars = Vec::with_capacity(rows.len());
                for row in rows {
                    cars.push(car_from_row(row)?);
                }
                Ok(cars)
            }
        }
    }

    /// Two-phase create: read the referenced engine first so a missing
    /// reference fails with a precise error instead of a bare constraint
    /// violation, then insert inside a transaction. The engine row read in
    /// phase one is embedded in the returned car.
    pub async fn create(&self, request: &CarRequest) -> Result<Car, StoreError> {
        validation::validate_car_request(request)?;

        let engine = sqlx::query_as::<_, Engine>(SELECT_ENGINE_BY_ID)
            .bind(request.engine.engine_id)
            .fetch_optional(&self.pool)
            .await?;
        let engine = match engine {
            Some(engine) => engine,
            None => {
                tracing::warn!(
                    "rejecting car create: engine {} does not exist",
                    request.engine.engine_id
                );
                return Err(StoreError::EngineMissing(request.engine.engine_id));
            }
        };

        let mut tx = self.pool.begin().await?;

        // One clock read for both timestamps, so created_at == updated_at on
        // the persisted row. An error before commit rolls the transaction
        // back on drop.
        let now = Utc::now();
        let row = sqlx::query_as::<_, CarRow>(
            "INSERT INTO car (id, name, year, brand, fuel_type, engine_id, price, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, name, year, brand, fuel_type, engine_id, price, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.year)
        .bind(&request.brand)
        .bind(&request.fuel_type)
        .bind(engine.engine_id)
        .bind(request.price)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_engine_fk_violation(e, request.engine.engine_id))?;

        tx.commit().await?;

        let mut car = car_from_row(row)?;
        car.engine = engine;
        tracing::info!("created car {}", car.car_id);
        Ok(car)
    }

    /// Full replace of the mutable fields. Re-checks engine existence when
    /// the engine reference changes, refreshes `updated_at`, and leaves
    /// `created_at` untouched.
    pub async fn update_by_id(&self, id: Uuid, request: &CarRequest) -> Result<Car, StoreError> {
        validation::validate_car_request(request)?;

        let mut tx = self.pool.begin().await?;

        let current_engine_id =
            sqlx::query_scalar::<_, Uuid>("SELECT engine_id FROM car WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound { entity: "car", id })?;

        let engine = sqlx::query_as::<_, Engine>(SELECT_ENGINE_BY_ID)
            .bind(request.engine.engine_id)
            .fetch_optional(&mut *tx)
            .await?;
        let engine = match engine {
            Some(engine) => engine,
            // An unchanged-but-dangling reference degrades to the zero-value
            // engine, like the join reads do.
            None if request.engine.engine_id == current_engine_id => Engine {
                engine_id: current_engine_id,
                ..Engine::default()
            },
            None => {
                tracing::warn!(
                    "rejecting car update: engine {} does not exist",
                    request.engine.engine_id
                );
                return Err(StoreError::EngineMissing(request.engine.engine_id));
            }
        };

        let row = sqlx::query_as::<_, CarRow>(
            "UPDATE car SET name = $1, year = $2, brand = $3, fuel_type = $4, engine_id = $5, price = $6, updated_at = $7 \
             WHERE id = $8 \
             RETURNING id, name, year, brand, fuel_type, engine_id, price, created_at, updated_at",
        )
        .bind(&request.name)
        .bind(&request.year)
        .bind(&request.brand)
        .bind(&request.fuel_type)
        .bind(engine.engine_id)
        .bind(request.price)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_engine_fk_violation(e, request.engine.engine_id))?;

        tx.commit().await?;

        let mut car = car_from_row(row)?;
        car.engine = engine;
        Ok(car)
    }

    /// Returns the deleted row or `None`. The embedded engine carries only
    /// the reference id; no join target is read for a row that is gone.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Option<Car>, StoreError> {
        let row = sqlx::query_as::<_, CarRow>(
            "DELETE FROM car WHERE id = $1 \
             RETURNING id, name, year, brand, fuel_type, engine_id, price, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let car = car_from_row(row)?;
                tracing::info!("deleted car {}", car.car_id);
                Ok(Some(car))
            }
            None => Ok(None),
        }
    }
}

fn parse_fuel_type(raw: &str) -> Result<FuelType, sqlx::Error> {
    raw.parse::<FuelType>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn car_from_row(row: CarRow) -> Result<Car, sqlx::Error> {
    Ok(Car {
        car_id: row.id,
        name: row.name,
        year: row.year,
        brand: row.brand,
        fuel_type: parse_fuel_type(&row.fuel_type)?,
        engine: Engine {
            engine_id: row.engine_id,
            ..Engine::default()
        },
        price: row.price,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn car_from_joined_row(row: CarWithEngineRow) -> Result<Car, sqlx::Error> {
    let engine = match row.joined_engine_id {
        Some(engine_id) => Engine {
            engine_id,
            displacement: row.displacement.unwrap_or_default(),
            no_of_cylinders: row.no_of_cylinders.unwrap_or_default(),
            car_range: row.car_range.unwrap_or_default(),
        },
        // Dangling reference: keep the stored id, leave the fields empty.
        None => Engine {
            engine_id: row.engine_id,
            ..Engine::default()
        },
    };

    Ok(Car {
        car_id: row.id,
        name: row.name,
        year: row.year,
        brand: row.brand,
        fuel_type: parse_fuel_type(&row.fuel_type)?,
        engine,
        price: row.price,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// SQLSTATE 23503: the write lost the race against a concurrent engine delete
// and the foreign key caught it. Callers see the same error as the pre-check.
fn map_engine_fk_violation(err: sqlx::Error, engine_id: Uuid) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            return StoreError::EngineMissing(engine_id);
        }
    }
    StoreError::Database(err)
}
