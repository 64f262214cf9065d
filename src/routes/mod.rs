mod extract;
pub mod health;
pub mod logs;
mod rate_limit;
pub mod registry;
pub mod stats;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use sea_orm::Iterable;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use extract::AppQuery;
use rate_limit::ClientIpKeyExtractor;

use crate::common::AppState;
use crate::entity::SensorKind;
use crate::error::{AppError, AppResult};

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        stats::count_sensors,
        stats::count_persons,
        stats::count_houses,
        stats::count_rooms,
        stats::count_logs,
        stats::recent_sensor,
        stats::recent_person,
        stats::recent_house,
        stats::recent_room,
        stats::recent_log,
        registry::add_sensor,
        registry::add_house,
        registry::add_room,
        registry::add_person,
        registry::list_sensors,
        registry::list_houses,
        registry::list_rooms,
        registry::list_persons,
        logs::add_log,
        logs::get_logs,
    ),
    components(
        schemas(
            SensorKind,
            stats::CountRow,
            stats::RecordResponse,
            registry::SensorResponse,
            registry::HouseResponse,
            registry::RoomResponse,
            registry::PersonResponse,
            registry::AddSensorRequest,
            registry::AddHouseRequest,
            registry::AddRoomRequest,
            registry::AddPersonRequest,
            logs::LogResponse,
            logs::AddLogRequest,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "stats", description = "Dashboard counts and most recent records"),
        (name = "registry", description = "Houses, rooms, sensors and persons"),
        (name = "logs", description = "Sensor log ingestion and time series"),
    ),
    info(
        title = "Secure Sense API",
        description = "Sensor telemetry ingestion and aggregation for the Secure Sense dashboard",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Assemble the application router.
///
/// # Errors
///
/// Fails when rate limiting is enabled with a zero rate or burst.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let config = Arc::clone(&state.config);

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            read_rate = %format!("{}/s burst {}", config.rate_limit_read_per_second, config.rate_limit_read_burst),
            write_rate = %format!("{}/s burst {}", config.rate_limit_write_per_second, config.rate_limit_write_burst),
            "Rate limiting configured"
        );
    }

    let mut read_routes = Router::new()
        .route("/count-sensors", get(stats::count_sensors))
        .route("/count-persons", get(stats::count_persons))
        .route("/count-houses", get(stats::count_houses))
        .route("/count-rooms", get(stats::count_rooms))
        .route("/count-logs/{sensor_type}", get(stats::count_logs))
        .route("/recent-sensor", get(stats::recent_sensor))
        .route("/recent-person", get(stats::recent_person))
        .route("/recent-house", get(stats::recent_house))
        .route("/recent-room", get(stats::recent_room))
        .route("/recent-log/{sensor_type}", get(stats::recent_log))
        .route("/get-all-sensors", get(registry::list_sensors))
        .route("/get-all-houses", get(registry::list_houses))
        .route("/get-all-rooms", get(registry::list_rooms))
        .route("/get-all-persons", get(registry::list_persons));

    // One generic handler, mounted on each per-type path.
    for kind in SensorKind::iter() {
        read_routes = read_routes.route(
            &format!("/get-{}-logs", kind.slug()),
            get(
                move |state: State<AppState>, query: AppQuery<logs::LogsQuery>, headers: HeaderMap| {
                    logs::get_logs(state, kind, query, headers)
                },
            ),
        );
    }

    let write_routes = Router::new()
        .route("/add-sensor", post(registry::add_sensor))
        .route("/add-house", post(registry::add_house))
        .route("/add-room", post(registry::add_room))
        .route("/add-person", post(registry::add_person))
        .route("/add-log", post(logs::add_log));

    let api_routes = if config.disable_rate_limiting {
        read_routes.merge(write_routes)
    } else {
        let read_routes = rate_limited(
            read_routes,
            config.rate_limit_read_per_second,
            config.rate_limit_read_burst,
        )?;
        let write_routes = rate_limited(
            write_routes,
            config.rate_limit_write_per_second,
            config.rate_limit_write_burst,
        )?;
        read_routes.merge(write_routes)
    }
    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    // Probes are never rate-limited.
    let health_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz));

    let openapi = ApiDoc::openapi();
    let docs_routes = Router::new()
        .merge(Scalar::with_url("/docs", openapi.clone()))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { Json(openapi) }),
        );

    Ok(Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
        .with_state(state))
}

fn rate_limited(
    routes: Router<AppState>,
    per_second: u64,
    burst: u32,
) -> AppResult<Router<AppState>> {
    let interval_ms = replenish_interval_ms(per_second).ok_or_else(|| {
        AppError::Internal("rate limit must allow at least one request per second".to_string())
    })?;

    let limiter = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_millisecond(interval_ms)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| AppError::Internal(format!("invalid rate limit burst size: {burst}")))?;

    Ok(routes.layer(GovernorLayer {
        config: Arc::new(limiter),
    }))
}

/// Milliseconds between quota refills for a budget of `per_second` requests.
fn replenish_interval_ms(per_second: u64) -> Option<u64> {
    (per_second > 0).then(|| (1000 / per_second).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replenish_interval_spreads_budget_over_a_second() {
        assert_eq!(replenish_interval_ms(10), Some(100));
        assert_eq!(replenish_interval_ms(1), Some(1000));
        assert_eq!(replenish_interval_ms(5000), Some(1));
        assert_eq!(replenish_interval_ms(0), None);
    }

    #[test]
    fn openapi_documents_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/count-sensors",
            "/count-logs/{sensor_type}",
            "/recent-log/{sensor_type}",
            "/add-log",
            "/get-all-persons",
            "/get-{kind}-logs",
            "/readyz",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
