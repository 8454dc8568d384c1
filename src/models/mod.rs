pub mod car;
pub mod engine;

pub use car::{Car, CarRequest, FuelType, ParseFuelTypeError};
pub use engine::{Engine, EngineRequest};
