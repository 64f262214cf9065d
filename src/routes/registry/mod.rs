mod handlers;
mod types;

pub use handlers::{
    add_house, add_person, add_room, add_sensor, list_houses, list_persons, list_rooms,
    list_sensors,
};
pub use types::{
    AddHouseRequest, AddPersonRequest, AddRoomRequest, AddSensorRequest, HouseResponse,
    PersonResponse, RoomResponse, SensorResponse,
};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_add_house, __path_add_person, __path_add_room, __path_add_sensor, __path_list_houses,
    __path_list_persons, __path_list_rooms, __path_list_sensors,
};
