pub mod car_repo;
pub mod engine_repo;

pub use car_repo::{CarProjection, CarRepository};
pub use engine_repo::EngineRepository;
