use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::time;
use crate::entity::{houses, persons, rooms, sensors, SensorKind};

#[derive(Debug, Serialize, ToSchema)]
pub struct HouseResponse {
    pub id: i32,
    /// Street address
    pub direction: String,
    #[serde(serialize_with = "time::serialize")]
    #[schema(value_type = String, example = "2024-05-01T12:00:00.000Z")]
    pub created_at: DateTime<Utc>,
}

impl From<houses::Model> for HouseResponse {
    fn from(h: houses::Model) -> Self {
        Self {
            id: h.id,
            direction: h.direction,
            created_at: h.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    pub id: i32,
    pub house_id: i32,
    pub num_windows: i32,
    /// Compass orientation, e.g. "north"
    pub orientation: Option<String>,
    #[serde(serialize_with = "time::serialize")]
    #[schema(value_type = String, example = "2024-05-01T12:00:00.000Z")]
    pub created_at: DateTime<Utc>,
}

impl From<rooms::Model> for RoomResponse {
    fn from(r: rooms::Model) -> Self {
        Self {
            id: r.id,
            house_id: r.house_id,
            num_windows: r.num_windows,
            orientation: r.orientation,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SensorResponse {
    pub id: i32,
    #[serde(rename = "type_")]
    pub sensor_type: SensorKind,
    pub unit: String,
    pub room_id: i32,
    #[serde(serialize_with = "time::serialize")]
    #[schema(value_type = String, example = "2024-05-01T12:00:00.000Z")]
    pub created_at: DateTime<Utc>,
}

impl From<sensors::Model> for SensorResponse {
    fn from(s: sensors::Model) -> Self {
        Self {
            id: s.id,
            sensor_type: s.sensor_type,
            unit: s.unit,
            room_id: s.room_id,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PersonResponse {
    pub id: i32,
    pub name: String,
    pub house_id: i32,
    pub room_id: Option<i32>,
    #[serde(serialize_with = "time::serialize")]
    #[schema(value_type = String, example = "2024-05-01T12:00:00.000Z")]
    pub created_at: DateTime<Utc>,
}

impl From<persons::Model> for PersonResponse {
    fn from(p: persons::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            house_id: p.house_id,
            room_id: p.room_id,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSensorRequest {
    /// ultrasonic, magnetic, push-button, ir or sound (case-insensitive)
    #[serde(rename = "type_")]
    pub sensor_type: String,
    pub unit: String,
    pub room_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddHouseRequest {
    pub direction: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRoomRequest {
    pub house_id: i32,
    #[serde(default)]
    pub num_windows: i32,
    pub orientation: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPersonRequest {
    pub name: String,
    pub house_id: i32,
    pub room_id: Option<i32>,
}
