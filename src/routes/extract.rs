use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, QueryRejection},
};

use crate::error::AppError;

/// `Json` extractor whose rejections use the service's error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` extractor whose rejections use the service's error body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Request, StatusCode},
        response::IntoResponse,
    };
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[allow(dead_code)]
        sensor_id: Option<i32>,
    }

    #[tokio::test]
    async fn bad_query_string_is_a_json_400() {
        let (mut parts, ()) = Request::builder()
            .uri("/get-ir-logs?sensor_id=abc")
            .body(())
            .unwrap()
            .into_parts();

        let err = AppQuery::<Params>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::Validation(msg) if msg.contains("sensor_id")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
