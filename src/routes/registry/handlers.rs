use axum::{extract::State, Json};

use crate::common::AppState;
use crate::error::AppResult;
use crate::routes::extract::AppJson;
use crate::{ingest, query};

use super::types::{
    AddHouseRequest, AddPersonRequest, AddRoomRequest, AddSensorRequest, HouseResponse,
    PersonResponse, RoomResponse, SensorResponse,
};

/// Register a sensor
///
/// The room must already exist. Registering the same payload twice creates
/// two sensors.
#[utoipa::path(
    post,
    path = "/add-sensor",
    request_body = AddSensorRequest,
    responses(
        (status = 200, description = "Sensor registered", body = SensorResponse),
        (status = 400, description = "Unknown type, blank unit or missing room"),
        (status = 503, description = "Storage unavailable"),
    ),
    tag = "registry"
)]
pub async fn add_sensor(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddSensorRequest>,
) -> AppResult<Json<SensorResponse>> {
    let sensor = ingest::register_sensor(&state.db, &req.sensor_type, &req.unit, req.room_id).await?;
    Ok(Json(sensor.into()))
}

/// Register a house
#[utoipa::path(
    post,
    path = "/add-house",
    request_body = AddHouseRequest,
    responses(
        (status = 200, description = "House registered", body = HouseResponse),
        (status = 400, description = "Blank direction"),
    ),
    tag = "registry"
)]
pub async fn add_house(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddHouseRequest>,
) -> AppResult<Json<HouseResponse>> {
    let house = ingest::register_house(&state.db, &req.direction).await?;
    Ok(Json(house.into()))
}

/// Register a room in a house
#[utoipa::path(
    post,
    path = "/add-room",
    request_body = AddRoomRequest,
    responses(
        (status = 200, description = "Room registered", body = RoomResponse),
        (status = 400, description = "Missing house or negative window count"),
    ),
    tag = "registry"
)]
pub async fn add_room(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddRoomRequest>,
) -> AppResult<Json<RoomResponse>> {
    let room = ingest::register_room(
        &state.db,
        req.house_id,
        req.num_windows,
        req.orientation.as_deref(),
    )
    .await?;
    Ok(Json(room.into()))
}

/// Register a person
#[utoipa::path(
    post,
    path = "/add-person",
    request_body = AddPersonRequest,
    responses(
        (status = 200, description = "Person registered", body = PersonResponse),
        (status = 400, description = "Blank name, missing house, or room outside the house"),
    ),
    tag = "registry"
)]
pub async fn add_person(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddPersonRequest>,
) -> AppResult<Json<PersonResponse>> {
    let person = ingest::register_person(&state.db, &req.name, req.house_id, req.room_id).await?;
    Ok(Json(person.into()))
}

/// List all sensors
#[utoipa::path(
    get,
    path = "/get-all-sensors",
    responses(
        (status = 200, description = "Sensors ordered by id", body = Vec<SensorResponse>),
    ),
    tag = "registry"
)]
pub async fn list_sensors(State(state): State<AppState>) -> AppResult<Json<Vec<SensorResponse>>> {
    let sensors = query::list_sensors(&state.db).await?;
    Ok(Json(sensors.into_iter().map(Into::into).collect()))
}

/// List all houses
#[utoipa::path(
    get,
    path = "/get-all-houses",
    responses(
        (status = 200, description = "Houses ordered by id", body = Vec<HouseResponse>),
    ),
    tag = "registry"
)]
pub async fn list_houses(State(state): State<AppState>) -> AppResult<Json<Vec<HouseResponse>>> {
    let houses = query::list_houses(&state.db).await?;
    Ok(Json(houses.into_iter().map(Into::into).collect()))
}

/// List all rooms
#[utoipa::path(
    get,
    path = "/get-all-rooms",
    responses(
        (status = 200, description = "Rooms ordered by id", body = Vec<RoomResponse>),
    ),
    tag = "registry"
)]
pub async fn list_rooms(State(state): State<AppState>) -> AppResult<Json<Vec<RoomResponse>>> {
    let rooms = query::list_rooms(&state.db).await?;
    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

/// List all persons
#[utoipa::path(
    get,
    path = "/get-all-persons",
    responses(
        (status = 200, description = "Persons ordered by id", body = Vec<PersonResponse>),
    ),
    tag = "registry"
)]
pub async fn list_persons(State(state): State<AppState>) -> AppResult<Json<Vec<PersonResponse>>> {
    let persons = query::list_persons(&state.db).await?;
    Ok(Json(persons.into_iter().map(Into::into).collect()))
}
