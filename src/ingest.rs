//! Registration of entities and ingestion of sensor logs.
//!
//! Every write runs in its own transaction so the referential check and the
//! insert observe the same snapshot. Foreign keys in the schema back the
//! checks up; a violation that slips past them still maps to
//! `AppError::Validation` through `From<DbErr>`.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};

use crate::common::time;
use crate::entity::{houses, persons, rooms, sensor_logs, sensors, SensorKind};
use crate::error::{AppError, AppResult};

/// Room numbers a sensor may be installed in.
pub const SENSOR_ROOM_IDS: RangeInclusive<i32> = 1..=100;

// Column widths from the schema, counted in characters.
const DIRECTION_MAX: usize = 256;
const ORIENTATION_MAX: usize = 32;
const UNIT_MAX: usize = 32;
const NAME_MAX: usize = 128;

/// Register a sensor in an existing room.
///
/// Registration is not deduplicated: the same payload twice yields two
/// sensors.
///
/// # Errors
///
/// `AppError::Validation` for an unknown type, a blank or over-long unit, a
/// room id outside 1..=100, or a room that does not exist.
pub async fn register_sensor(
    db: &DatabaseConnection,
    sensor_type: &str,
    unit: &str,
    room_id: i32,
) -> AppResult<sensors::Model> {
    let kind = sensor_type
        .parse::<SensorKind>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let unit = require_text("unit", unit, UNIT_MAX)?;
    if !SENSOR_ROOM_IDS.contains(&room_id) {
        return Err(AppError::Validation(format!(
            "room_id must be between {} and {}, got {room_id}",
            SENSOR_ROOM_IDS.start(),
            SENSOR_ROOM_IDS.end()
        )));
    }

    let txn = db.begin().await?;

    if rooms::Entity::find_by_id(room_id).one(&txn).await?.is_none() {
        return Err(AppError::Validation(format!("room {room_id} does not exist")));
    }

    let sensor = sensors::ActiveModel {
        room_id: Set(room_id),
        sensor_type: Set(kind),
        unit: Set(unit),
        created_at: Set(time::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        sensor_id = sensor.id,
        room_id,
        sensor_type = %kind,
        "Registered sensor"
    );
    Ok(sensor)
}

/// Append one reading for a sensor.
///
/// The log inherits the sensor's type. When `recorded_at` is `None` the
/// server clock is used.
///
/// # Errors
///
/// `AppError::NotFound` if the sensor does not exist (nothing is written),
/// `AppError::Validation` if `measure` is NaN or infinite.
pub async fn append_log(
    db: &DatabaseConnection,
    sensor_id: i32,
    measure: f64,
    recorded_at: Option<DateTime<Utc>>,
) -> AppResult<sensor_logs::Model> {
    if !measure.is_finite() {
        return Err(AppError::Validation(format!(
            "measure must be a finite number, got {measure}"
        )));
    }

    let recorded_at = recorded_at.map_or_else(time::now, time::normalize);

    let txn = db.begin().await?;

    let sensor = sensors::Entity::find_by_id(sensor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("sensor {sensor_id} does not exist")))?;

    let log = sensor_logs::ActiveModel {
        sensor_id: Set(sensor.id),
        sensor_type: Set(sensor.sensor_type),
        recorded_at: Set(recorded_at),
        measure: Set(measure),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::debug!(
        log_id = log.id,
        sensor_id,
        sensor_type = %sensor.sensor_type,
        "Appended sensor log"
    );
    Ok(log)
}

/// Register a house.
///
/// # Errors
///
/// `AppError::Validation` if `direction` is blank or longer than 256
/// characters.
pub async fn register_house(db: &DatabaseConnection, direction: &str) -> AppResult<houses::Model> {
    let direction = require_text("direction", direction, DIRECTION_MAX)?;

    let house = houses::ActiveModel {
        direction: Set(direction),
        created_at: Set(time::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(house_id = house.id, "Registered house");
    Ok(house)
}

/// Register a room in an existing house.
///
/// # Errors
///
/// `AppError::Validation` if the house does not exist, `num_windows` is
/// negative, or `orientation` is longer than 32 characters.
pub async fn register_room(
    db: &DatabaseConnection,
    house_id: i32,
    num_windows: i32,
    orientation: Option<&str>,
) -> AppResult<rooms::Model> {
    if num_windows < 0 {
        return Err(AppError::Validation(format!(
            "num_windows must not be negative, got {num_windows}"
        )));
    }
    let orientation = orientation
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_lowercase)
        .map(|o| check_length("orientation", &o, ORIENTATION_MAX).map(|()| o))
        .transpose()?;

    let txn = db.begin().await?;

    if houses::Entity::find_by_id(house_id).one(&txn).await?.is_none() {
        return Err(AppError::Validation(format!("house {house_id} does not exist")));
    }

    let room = rooms::ActiveModel {
        house_id: Set(house_id),
        num_windows: Set(num_windows),
        orientation: Set(orientation),
        created_at: Set(time::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(room_id = room.id, house_id, "Registered room");
    Ok(room)
}

/// Register a person living in a house, optionally placed in one of its rooms.
///
/// # Errors
///
/// `AppError::Validation` for a blank or over-long name, an unknown house, an
/// unknown room, or a room belonging to a different house.
pub async fn register_person(
    db: &DatabaseConnection,
    name: &str,
    house_id: i32,
    room_id: Option<i32>,
) -> AppResult<persons::Model> {
    let name = require_text("name", name, NAME_MAX)?;

    let txn = db.begin().await?;

    if houses::Entity::find_by_id(house_id).one(&txn).await?.is_none() {
        return Err(AppError::Validation(format!("house {house_id} does not exist")));
    }

    if let Some(room_id) = room_id {
        let room = rooms::Entity::find_by_id(room_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Validation(format!("room {room_id} does not exist")))?;
        if room.house_id != house_id {
            return Err(AppError::Validation(format!(
                "room {room_id} belongs to house {}, not house {house_id}",
                room.house_id
            )));
        }
    }

    let person = persons::ActiveModel {
        name: Set(name),
        house_id: Set(house_id),
        room_id: Set(room_id),
        created_at: Set(time::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(person_id = person.id, house_id, "Registered person");
    Ok(person)
}

fn require_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    check_length(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

fn check_length(field: &str, value: &str, max_chars: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_chars} characters, got {len}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("unit", "  cm ", UNIT_MAX).unwrap(), "cm");
        assert!(matches!(
            require_text("unit", "   ", UNIT_MAX),
            Err(AppError::Validation(msg)) if msg.contains("unit")
        ));
    }

    #[test]
    fn length_limit_counts_characters_after_trimming() {
        let at_limit = "é".repeat(UNIT_MAX);
        assert_eq!(require_text("unit", &format!(" {at_limit} "), UNIT_MAX).unwrap(), at_limit);
        assert!(matches!(
            require_text("unit", &"x".repeat(UNIT_MAX + 1), UNIT_MAX),
            Err(AppError::Validation(msg)) if msg.contains("at most 32")
        ));
    }
}
