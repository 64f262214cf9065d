pub mod houses;
pub mod persons;
pub mod rooms;
pub mod sensor_logs;
pub mod sensors;

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Kind of physical sensor. Stored as its canonical string.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
pub enum SensorKind {
    #[sea_orm(string_value = "ultrasonic")]
    Ultrasonic,
    #[sea_orm(string_value = "magnetic")]
    Magnetic,
    #[sea_orm(string_value = "push-button")]
    PushButton,
    #[sea_orm(string_value = "ir")]
    Ir,
    #[sea_orm(string_value = "sound")]
    Sound,
}

impl SensorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ultrasonic => "ultrasonic",
            Self::Magnetic => "magnetic",
            Self::PushButton => "push-button",
            Self::Ir => "ir",
            Self::Sound => "sound",
        }
    }

    /// Short form used in per-type route paths (`/get-push-logs`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::PushButton => "push",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sensor type '{0}' (expected ultrasonic, magnetic, push-button, ir or sound)")]
pub struct UnknownSensorKind(pub String);

impl FromStr for SensorKind {
    type Err = UnknownSensorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ultrasonic" => Ok(Self::Ultrasonic),
            "magnetic" => Ok(Self::Magnetic),
            "push-button" | "push_button" | "push" | "button" => Ok(Self::PushButton),
            "ir" | "infrared" => Ok(Self::Ir),
            "sound" => Ok(Self::Sound),
            _ => Err(UnknownSensorKind(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SensorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
