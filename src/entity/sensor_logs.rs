use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::SensorKind;

/// One immutable reading. Rows are only ever inserted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sensor_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sensor_id: i32,
    /// Copied from the owning sensor when the row is written.
    pub sensor_type: SensorKind,
    pub recorded_at: DateTimeUtc,
    pub measure: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sensors::Entity",
        from = "Column::SensorId",
        to = "super::sensors::Column::Id"
    )]
    Sensor,
}

impl Related<super::sensors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
