use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Engine {
    #[sqlx(rename = "id")]
    pub engine_id: Uuid,
    pub displacement: i64,
    pub no_of_cylinders: i64,
    pub car_range: i64,
}

/// Caller-supplied payload for creating or replacing an engine.
/// Identifiers are generated server-side, so requests never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub displacement: i64,
    pub no_of_cylinders: i64,
    pub car_range: i64,
}
