//! Dashboard tiles: live counts and the most recent record of each kind.
//!
//! Both shapes are single-element arrays because that is what the dashboard
//! polls for.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::entity::SensorKind;
use crate::error::{AppError, AppResult};
use crate::query::{self, EntityKind, Record};

use super::logs::LogResponse;
use super::registry::{HouseResponse, PersonResponse, RoomResponse, SensorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct CountRow {
    #[serde(rename = "COUNT(*)")]
    pub count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RecordResponse {
    House(HouseResponse),
    Room(RoomResponse),
    Sensor(SensorResponse),
    Person(PersonResponse),
    Log(LogResponse),
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        match record {
            Record::House(h) => Self::House(h.into()),
            Record::Room(r) => Self::Room(r.into()),
            Record::Sensor(s) => Self::Sensor(s.into()),
            Record::Person(p) => Self::Person(p.into()),
            Record::Log(l) => Self::Log(l.into()),
        }
    }
}

fn sensor_kind(raw: &str) -> AppResult<SensorKind> {
    raw.parse::<SensorKind>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

async fn count_rows(state: &AppState, kind: EntityKind) -> AppResult<Json<Vec<CountRow>>> {
    let count = query::count_entities(&state.db, kind).await?;
    Ok(Json(vec![CountRow { count }]))
}

async fn latest(state: &AppState, kind: EntityKind) -> AppResult<Json<Vec<RecordResponse>>> {
    let record = query::most_recent(&state.db, kind).await?;
    Ok(Json(vec![record.into()]))
}

/// Number of registered sensors
#[utoipa::path(
    get,
    path = "/count-sensors",
    responses(
        (status = 200, description = "Live count", body = Vec<CountRow>),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "stats"
)]
pub async fn count_sensors(State(state): State<AppState>) -> AppResult<Json<Vec<CountRow>>> {
    count_rows(&state, EntityKind::Sensor).await
}

/// Number of registered persons
#[utoipa::path(
    get,
    path = "/count-persons",
    responses(
        (status = 200, description = "Live count", body = Vec<CountRow>),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "stats"
)]
pub async fn count_persons(State(state): State<AppState>) -> AppResult<Json<Vec<CountRow>>> {
    count_rows(&state, EntityKind::Person).await
}

/// Number of registered houses
#[utoipa::path(
    get,
    path = "/count-houses",
    responses(
        (status = 200, description = "Live count", body = Vec<CountRow>),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "stats"
)]
pub async fn count_houses(State(state): State<AppState>) -> AppResult<Json<Vec<CountRow>>> {
    count_rows(&state, EntityKind::House).await
}

/// Number of registered rooms
#[utoipa::path(
    get,
    path = "/count-rooms",
    responses(
        (status = 200, description = "Live count", body = Vec<CountRow>),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "stats"
)]
pub async fn count_rooms(State(state): State<AppState>) -> AppResult<Json<Vec<CountRow>>> {
    count_rows(&state, EntityKind::Room).await
}

/// Number of logs of one sensor type
#[utoipa::path(
    get,
    path = "/count-logs/{sensor_type}",
    params(
        ("sensor_type" = String, Path, description = "ultrasonic, magnetic, push-button, ir or sound"),
    ),
    responses(
        (status = 200, description = "Live count", body = Vec<CountRow>),
        (status = 400, description = "Unknown sensor type"),
    ),
    tag = "stats"
)]
pub async fn count_logs(
    State(state): State<AppState>,
    Path(sensor_type): Path<String>,
) -> AppResult<Json<Vec<CountRow>>> {
    count_rows(&state, EntityKind::Log(sensor_kind(&sensor_type)?)).await
}

/// Most recently registered sensor
#[utoipa::path(
    get,
    path = "/recent-sensor",
    responses(
        (status = 200, description = "Newest sensor", body = Vec<SensorResponse>),
        (status = 404, description = "No sensor registered yet"),
    ),
    tag = "stats"
)]
pub async fn recent_sensor(State(state): State<AppState>) -> AppResult<Json<Vec<RecordResponse>>> {
    latest(&state, EntityKind::Sensor).await
}

/// Most recently registered person
#[utoipa::path(
    get,
    path = "/recent-person",
    responses(
        (status = 200, description = "Newest person", body = Vec<PersonResponse>),
        (status = 404, description = "No person registered yet"),
    ),
    tag = "stats"
)]
pub async fn recent_person(State(state): State<AppState>) -> AppResult<Json<Vec<RecordResponse>>> {
    latest(&state, EntityKind::Person).await
}

/// Most recently registered house
#[utoipa::path(
    get,
    path = "/recent-house",
    responses(
        (status = 200, description = "Newest house", body = Vec<HouseResponse>),
        (status = 404, description = "No house registered yet"),
    ),
    tag = "stats"
)]
pub async fn recent_house(State(state): State<AppState>) -> AppResult<Json<Vec<RecordResponse>>> {
    latest(&state, EntityKind::House).await
}

/// Most recently registered room
#[utoipa::path(
    get,
    path = "/recent-room",
    responses(
        (status = 200, description = "Newest room", body = Vec<RoomResponse>),
        (status = 404, description = "No room registered yet"),
    ),
    tag = "stats"
)]
pub async fn recent_room(State(state): State<AppState>) -> AppResult<Json<Vec<RecordResponse>>> {
    latest(&state, EntityKind::Room).await
}

/// Latest log of one sensor type
///
/// Latest by `date_`; among equal timestamps the last one stored wins.
#[utoipa::path(
    get,
    path = "/recent-log/{sensor_type}",
    params(
        ("sensor_type" = String, Path, description = "ultrasonic, magnetic, push-button, ir or sound"),
    ),
    responses(
        (status = 200, description = "Latest log", body = Vec<LogResponse>),
        (status = 400, description = "Unknown sensor type"),
        (status = 404, description = "No log of this type yet"),
    ),
    tag = "stats"
)]
pub async fn recent_log(
    State(state): State<AppState>,
    Path(sensor_type): Path<String>,
) -> AppResult<Json<Vec<RecordResponse>>> {
    latest(&state, EntityKind::Log(sensor_kind(&sensor_type)?)).await
}
