use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::time;
use crate::entity::{sensor_logs, SensorKind};
use crate::error::AppResult;
use crate::query::SeriesWindow;

/// One log row as the dashboard charts it.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogResponse {
    pub id: i32,
    pub sensor_id: i32,
    #[serde(rename = "type_")]
    pub sensor_type: SensorKind,
    #[serde(rename = "date_", serialize_with = "time::serialize")]
    #[schema(value_type = String, example = "2024-05-01T12:00:00.000Z")]
    pub recorded_at: DateTime<Utc>,
    pub measure: f64,
}

impl From<sensor_logs::Model> for LogResponse {
    fn from(log: sensor_logs::Model) -> Self {
        Self {
            id: log.id,
            sensor_id: log.sensor_id,
            sensor_type: log.sensor_type,
            recorded_at: log.recorded_at,
            measure: log.measure,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddLogRequest {
    pub sensor_id: i32,
    pub measure: f64,
    /// Reading time; the server clock is used when omitted
    #[serde(rename = "date_", default)]
    #[schema(example = "2024-05-01T12:00:00Z")]
    pub recorded_at: Option<String>,
}

impl AddLogRequest {
    pub fn timestamp(&self) -> AppResult<Option<DateTime<Utc>>> {
        self.recorded_at.as_deref().map(time::parse).transpose()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LogsQuery {
    /// Only logs of this sensor
    pub sensor_id: Option<i32>,
    /// Inclusive lower bound (RFC 3339 or `YYYY-MM-DD HH:MM:SS`, UTC)
    pub from: Option<String>,
    /// Inclusive upper bound (RFC 3339 or `YYYY-MM-DD HH:MM:SS`, UTC)
    pub to: Option<String>,
    /// Response format: json (default), ndjson, csv
    pub format: Option<String>,
}

impl LogsQuery {
    pub fn window(&self, sensor_type: SensorKind) -> AppResult<SeriesWindow> {
        let from = self.from.as_deref().map(time::parse).transpose()?;
        let to = self.to.as_deref().map(time::parse).transpose()?;

        let window = SeriesWindow::new(sensor_type).between(from, to);
        Ok(match self.sensor_id {
            Some(id) => window.for_sensor(id),
            None => window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn window_parses_bounds() {
        let query = LogsQuery {
            sensor_id: Some(2),
            from: Some("2024-05-01 10:00:00".to_string()),
            to: Some("2024-05-01T12:00:00+02:00".to_string()),
            format: None,
        };

        let window = query.window(SensorKind::Magnetic).unwrap();
        assert_eq!(window.sensor_id, Some(2));
        assert_eq!(window.from, window.to);
    }

    #[test]
    fn window_rejects_bad_timestamp() {
        let query = LogsQuery {
            from: Some("last tuesday".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.window(SensorKind::Ir),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn add_log_timestamp_is_optional() {
        let req: AddLogRequest =
            serde_json::from_value(serde_json::json!({ "sensor_id": 1, "measure": 2.5 })).unwrap();
        assert_eq!(req.timestamp().unwrap(), None);

        let req: AddLogRequest = serde_json::from_value(serde_json::json!({
            "sensor_id": 1,
            "measure": 2.5,
            "date_": "2024-05-01 12:00:00"
        }))
        .unwrap();
        assert_eq!(
            time::format(&req.timestamp().unwrap().unwrap()),
            "2024-05-01T12:00:00.000Z"
        );
    }
}
