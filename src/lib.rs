//! PostgreSQL persistence layer for the car catalog.
//!
//! Two entities, Car and Engine, with validated CRUD access: request
//! validation gates every write, car writes enforce that the referenced
//! engine exists, all statements are parameterized, and multi-statement
//! mutations run inside a transaction.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use config::Config;
pub use error::StoreError;
pub use models::{Car, CarRequest, Engine, EngineRequest, FuelType};
pub use repository::{CarProjection, CarRepository, EngineRepository};
pub use validation::{validate_car_request, validate_engine_request, ValidationError};
