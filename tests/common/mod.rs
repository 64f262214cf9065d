//! Shared fixtures: an in-memory SQLite database migrated by the real
//! migrator, plus seed helpers.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use secure_sense::common::time;
use secure_sense::config::Config;
use secure_sense::db;
use secure_sense::entity::{houses, rooms, sensors};
use secure_sense::ingest;

/// Config pointing at a private in-memory database.
///
/// Each SQLite memory connection is its own database, so the pool is pinned
/// to a single connection.
pub fn test_config() -> Config {
    let mut config = Config::new("sqlite::memory:");
    config.db_pool_max = 1;
    config.disable_rate_limiting = true;
    config
}

pub async fn setup_db() -> DatabaseConnection {
    let db = db::connect(&test_config())
        .await
        .expect("connect to in-memory sqlite");
    db::migrate(&db).await.expect("run migrations");
    db
}

pub async fn seed_house(db: &DatabaseConnection) -> houses::Model {
    ingest::register_house(db, "12 Rue du Lac").await.expect("seed house")
}

pub async fn seed_room(db: &DatabaseConnection) -> rooms::Model {
    let house = seed_house(db).await;
    ingest::register_room(db, house.id, 2, Some("north"))
        .await
        .expect("seed room")
}

pub async fn seed_sensor(db: &DatabaseConnection, sensor_type: &str) -> sensors::Model {
    let room = seed_room(db).await;
    ingest::register_sensor(db, sensor_type, "cm", room.id)
        .await
        .expect("seed sensor")
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    time::parse(raw).expect("valid test timestamp")
}
