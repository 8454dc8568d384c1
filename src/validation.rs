//! Request validation. Pure functions, evaluated in a fixed order with the
//! first failing rule reported; storage is never touched here.

use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::models::{CarRequest, Engine, EngineRequest, FuelType};

const MIN_YEAR: i32 = 1779;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name is required")]
    NameRequired,
    #[error("year is required")]
    YearRequired,
    #[error("year must be a valid number")]
    YearNotNumeric,
    #[error("year must be between 1779 and the current year")]
    YearOutOfRange,
    #[error("brand is required")]
    BrandRequired,
    #[error("fuel_type must be one of: Petrol, Diesel, Electric, Hybrid")]
    UnknownFuelType,
    #[error("engine_id is required")]
    EngineIdRequired,
    #[error("displacement must be greater than 0")]
    DisplacementNotPositive,
    #[error("no_of_cylinders must be greater than 0")]
    CylindersNotPositive,
    #[error("car_range must be greater than 0")]
    CarRangeNotPositive,
    #[error("price must be greater than 0")]
    PriceNotPositive,
}

pub fn validate_car_request(request: &CarRequest) -> Result<(), ValidationError> {
    validate_name(&request.name)?;
    validate_year(&request.year)?;
    validate_brand(&request.brand)?;
    validate_fuel_type(&request.fuel_type)?;
    validate_engine(&request.engine)?;
    validate_price(request.price)?;
    Ok(())
}

pub fn validate_engine_request(request: &EngineRequest) -> Result<(), ValidationError> {
    validate_displacement(request.displacement)?;
    validate_cylinders(request.no_of_cylinders)?;
    validate_car_range(request.car_range)?;
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(())
}

fn validate_year(year: &str) -> Result<(), ValidationError> {
    if year.is_empty() {
        return Err(ValidationError::YearRequired);
    }
    let year: i32 = year.parse().map_err(|_| ValidationError::YearNotNumeric)?;
    // The upper bound follows the wall clock, so it is read on every call.
    let current_year = Utc::now().year();
    if year < MIN_YEAR || year > current_year {
        return Err(ValidationError::YearOutOfRange);
    }
    Ok(())
}

fn validate_brand(brand: &str) -> Result<(), ValidationError> {
    if brand.is_empty() {
        return Err(ValidationError::BrandRequired);
    }
    Ok(())
}

fn validate_fuel_type(fuel_type: &str) -> Result<(), ValidationError> {
    fuel_type
        .parse::<FuelType>()
        .map_err(|_| ValidationError::UnknownFuelType)?;
    Ok(())
}

fn validate_engine(engine: &Engine) -> Result<(), ValidationError> {
    if engine.engine_id.is_nil() {
        return Err(ValidationError::EngineIdRequired);
    }
    validate_displacement(engine.displacement)?;
    validate_cylinders(engine.no_of_cylinders)?;
    validate_car_range(engine.car_range)?;
    Ok(())
}

fn validate_displacement(displacement: i64) -> Result<(), ValidationError> {
    if displacement <= 0 {
        return Err(ValidationError::DisplacementNotPositive);
    }
    Ok(())
}

fn validate_cylinders(no_of_cylinders: i64) -> Result<(), ValidationError> {
    if no_of_cylinders <= 0 {
        return Err(ValidationError::CylindersNotPositive);
    }
    Ok(())
}

fn validate_car_range(car_range: i64) -> Result<(), ValidationError> {
    if car_range <= 0 {
        return Err(ValidationError::CarRangeNotPositive);
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price <= 0.0 {
        return Err(ValidationError::PriceNotPositive);
    }
    Ok(())
}
