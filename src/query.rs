//! Counts, most-recent lookups and time-windowed log series.
//!
//! Every function issues fresh statements against the pool; nothing is
//! cached between calls, so a count always reflects the committed rows at
//! the moment it runs.

use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};

use crate::entity::{houses, persons, rooms, sensor_logs, sensors, SensorKind};
use crate::error::{AppError, AppResult};

/// What a count or most-recent query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    House,
    Room,
    Sensor,
    Person,
    Log(SensorKind),
}

impl EntityKind {
    fn label(self) -> String {
        match self {
            Self::House => "house".to_string(),
            Self::Room => "room".to_string(),
            Self::Sensor => "sensor".to_string(),
            Self::Person => "person".to_string(),
            Self::Log(kind) => format!("{kind} log"),
        }
    }
}

/// Newest row of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    House(houses::Model),
    Room(rooms::Model),
    Sensor(sensors::Model),
    Person(persons::Model),
    Log(sensor_logs::Model),
}

/// Live row count for `kind`.
///
/// # Errors
///
/// Propagates storage errors; never substitutes a zero.
pub async fn count_entities<C: ConnectionTrait>(db: &C, kind: EntityKind) -> AppResult<u64> {
    let count = match kind {
        EntityKind::House => houses::Entity::find().count(db).await?,
        EntityKind::Room => rooms::Entity::find().count(db).await?,
        EntityKind::Sensor => sensors::Entity::find().count(db).await?,
        EntityKind::Person => persons::Entity::find().count(db).await?,
        EntityKind::Log(sensor_type) => {
            sensor_logs::Entity::find()
                .filter(sensor_logs::Column::SensorType.eq(sensor_type))
                .count(db)
                .await?
        }
    };

    tracing::debug!(kind = %kind.label(), count, "Counted rows");
    Ok(count)
}

/// Newest record of `kind`: highest insertion id for entities, latest
/// `recorded_at` (then highest id) for logs.
///
/// # Errors
///
/// `AppError::NotFound` when the table holds no row of that kind.
pub async fn most_recent<C: ConnectionTrait>(db: &C, kind: EntityKind) -> AppResult<Record> {
    let record = match kind {
        EntityKind::House => houses::Entity::find()
            .order_by_desc(houses::Column::Id)
            .one(db)
            .await?
            .map(Record::House),
        EntityKind::Room => rooms::Entity::find()
            .order_by_desc(rooms::Column::Id)
            .one(db)
            .await?
            .map(Record::Room),
        EntityKind::Sensor => sensors::Entity::find()
            .order_by_desc(sensors::Column::Id)
            .one(db)
            .await?
            .map(Record::Sensor),
        EntityKind::Person => persons::Entity::find()
            .order_by_desc(persons::Column::Id)
            .one(db)
            .await?
            .map(Record::Person),
        EntityKind::Log(sensor_type) => sensor_logs::Entity::find()
            .filter(sensor_logs::Column::SensorType.eq(sensor_type))
            .order_by_desc(sensor_logs::Column::RecordedAt)
            .order_by_desc(sensor_logs::Column::Id)
            .one(db)
            .await?
            .map(Record::Log),
    };

    record.ok_or_else(|| AppError::NotFound(format!("no {} recorded yet", kind.label())))
}

pub async fn list_houses<C: ConnectionTrait>(db: &C) -> AppResult<Vec<houses::Model>> {
    Ok(houses::Entity::find()
        .order_by_asc(houses::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_rooms<C: ConnectionTrait>(db: &C) -> AppResult<Vec<rooms::Model>> {
    Ok(rooms::Entity::find()
        .order_by_asc(rooms::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_sensors<C: ConnectionTrait>(db: &C) -> AppResult<Vec<sensors::Model>> {
    Ok(sensors::Entity::find()
        .order_by_asc(sensors::Column::Id)
        .all(db)
        .await?)
}

pub async fn list_persons<C: ConnectionTrait>(db: &C) -> AppResult<Vec<persons::Model>> {
    Ok(persons::Entity::find()
        .order_by_asc(persons::Column::Id)
        .all(db)
        .await?)
}

/// A window over the logs of one sensor type, optionally narrowed to one
/// sensor and to an inclusive `[from, to]` time range.
///
/// The window is a plain value: every call to [`SeriesWindow::open`] runs
/// the query again from the start.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesWindow {
    pub sensor_type: SensorKind,
    pub sensor_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl SeriesWindow {
    #[must_use]
    pub fn new(sensor_type: SensorKind) -> Self {
        Self {
            sensor_type,
            sensor_id: None,
            from: None,
            to: None,
        }
    }

    #[must_use]
    pub fn for_sensor(mut self, sensor_id: i32) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    #[must_use]
    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Check the window against the current data.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` when `from` is after `to` or the sensor is of
    /// another type, `AppError::NotFound` when the sensor does not exist.
    pub async fn validate<C: ConnectionTrait>(&self, db: &C) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(AppError::Validation(
                "'from' must not be after 'to'".to_string(),
            ));
        }

        if let Some(sensor_id) = self.sensor_id {
            let sensor = sensors::Entity::find_by_id(sensor_id)
                .one(db)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("sensor {sensor_id} does not exist")))?;
            if sensor.sensor_type != self.sensor_type {
                return Err(AppError::Validation(format!(
                    "sensor {sensor_id} is a {} sensor, not {}",
                    sensor.sensor_type, self.sensor_type
                )));
            }
        }

        Ok(())
    }

    fn select(&self) -> Select<sensor_logs::Entity> {
        let mut query = sensor_logs::Entity::find()
            .filter(sensor_logs::Column::SensorType.eq(self.sensor_type));

        if let Some(sensor_id) = self.sensor_id {
            query = query.filter(sensor_logs::Column::SensorId.eq(sensor_id));
        }
        if let Some(from) = self.from {
            query = query.filter(sensor_logs::Column::RecordedAt.gte(from));
        }
        if let Some(to) = self.to {
            query = query.filter(sensor_logs::Column::RecordedAt.lte(to));
        }

        query
            .order_by_asc(sensor_logs::Column::RecordedAt)
            .order_by_asc(sensor_logs::Column::Id)
    }

    /// Validate the window and start streaming its rows, oldest first.
    ///
    /// Rows are pulled from the database as the stream is polled, so memory
    /// stays flat however long the series is. The stream holds one pooled
    /// connection until it is dropped.
    ///
    /// # Errors
    ///
    /// Validation errors from [`SeriesWindow::validate`], or a connection
    /// error if the query cannot start.
    pub async fn open<'a>(
        &self,
        db: &'a DatabaseConnection,
    ) -> AppResult<impl Stream<Item = AppResult<sensor_logs::Model>> + Send + 'a> {
        self.validate(db).await?;

        let rows = self.select().stream(db).await?;
        Ok(rows.map_err(AppError::from))
    }

    /// Buffered form of [`SeriesWindow::open`].
    ///
    /// # Errors
    ///
    /// Same as [`SeriesWindow::open`], plus any error raised mid-stream.
    pub async fn collect(&self, db: &DatabaseConnection) -> AppResult<Vec<sensor_logs::Model>> {
        self.open(db).await?.try_collect().await
    }
}
