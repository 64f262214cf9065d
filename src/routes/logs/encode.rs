//! Incremental encoders for streamed log bodies.
//!
//! Each encoder turns one row at a time into a body chunk, so the full series
//! never has to sit in memory.

use axum::http::header::{self, HeaderMap};

use crate::error::{AppError, AppResult};

use super::types::LogResponse;

const CSV_HEADER: &[u8] = b"id,sensor_id,type_,date_,measure\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Ndjson,
    Csv,
}

impl LogFormat {
    /// Pick the body format. An explicit `format` parameter wins over the
    /// `Accept` header. With neither, the body is a JSON array.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` when `format` names an unsupported format.
    pub fn negotiate(requested: Option<&str>, headers: &HeaderMap) -> AppResult<Self> {
        if let Some(requested) = requested {
            return match requested.trim().to_lowercase().as_str() {
                "json" => Ok(Self::Json),
                "ndjson" => Ok(Self::Ndjson),
                "csv" => Ok(Self::Csv),
                other => Err(AppError::Validation(format!(
                    "unsupported format '{other}' (expected json, ndjson or csv)"
                ))),
            };
        }

        if let Some(accept) = headers.get(header::ACCEPT)
            && let Ok(accept) = accept.to_str()
        {
            if accept.contains("application/x-ndjson") {
                return Ok(Self::Ndjson);
            }
            if accept.contains("text/csv") {
                return Ok(Self::Csv);
            }
        }

        Ok(Self::Json)
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Ndjson => "application/x-ndjson",
            Self::Csv => "text/csv",
        }
    }

    #[must_use]
    pub fn encoder(self) -> LogEncoder {
        LogEncoder {
            format: self,
            rows: 0,
        }
    }
}

#[derive(Debug)]
pub struct LogEncoder {
    format: LogFormat,
    rows: usize,
}

impl LogEncoder {
    /// Bytes that precede the first row.
    #[must_use]
    pub fn open(&self) -> Vec<u8> {
        match self.format {
            LogFormat::Json => b"[".to_vec(),
            LogFormat::Ndjson => Vec::new(),
            LogFormat::Csv => CSV_HEADER.to_vec(),
        }
    }

    /// Encode one row.
    ///
    /// # Errors
    ///
    /// `AppError::Internal` if the row cannot be serialized.
    pub fn row(&mut self, row: &LogResponse) -> AppResult<Vec<u8>> {
        let chunk = match self.format {
            LogFormat::Json => {
                let mut chunk = if self.rows == 0 { Vec::new() } else { b",".to_vec() };
                serde_json::to_writer(&mut chunk, row)
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                chunk
            }
            LogFormat::Ndjson => {
                let mut chunk =
                    serde_json::to_vec(row).map_err(|e| AppError::Internal(e.to_string()))?;
                chunk.push(b'\n');
                chunk
            }
            LogFormat::Csv => csv_row(row).map_err(|e| AppError::Internal(e.to_string()))?,
        };

        self.rows += 1;
        Ok(chunk)
    }

    /// Bytes that follow the last row.
    #[must_use]
    pub fn close(&self) -> Vec<u8> {
        match self.format {
            LogFormat::Json => b"]".to_vec(),
            LogFormat::Ndjson | LogFormat::Csv => Vec::new(),
        }
    }
}

fn csv_row(row: &LogResponse) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.serialize(row)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
