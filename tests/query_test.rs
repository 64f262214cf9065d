//! Counts, most-recent lookups and series windows.
//!
//! Run with: cargo test --test query_test

mod common;

use futures::TryStreamExt;
use tokio_test::{assert_err, assert_ok};

use common::{seed_house, seed_sensor, setup_db, ts};
use secure_sense::entity::SensorKind;
use secure_sense::error::AppError;
use secure_sense::ingest;
use secure_sense::query::{self, EntityKind, Record, SeriesWindow};

#[tokio::test]
async fn most_recent_on_empty_table_is_not_found() {
    let db = setup_db().await;

    for kind in [
        EntityKind::Sensor,
        EntityKind::House,
        EntityKind::Room,
        EntityKind::Person,
        EntityKind::Log(SensorKind::Sound),
    ] {
        let err = assert_err!(query::most_recent(&db, kind).await);
        assert!(matches!(err, AppError::NotFound(_)), "{kind:?} gave {err:?}");
    }
}

#[tokio::test]
async fn counts_are_zero_then_stable_without_writes() {
    let db = setup_db().await;
    assert_eq!(assert_ok!(query::count_entities(&db, EntityKind::House).await), 0);

    seed_sensor(&db, "ir").await;

    let first = assert_ok!(query::count_entities(&db, EntityKind::Sensor).await);
    let second = assert_ok!(query::count_entities(&db, EntityKind::Sensor).await);
    assert_eq!(first, 1);
    assert_eq!(first, second);
    assert_eq!(assert_ok!(query::count_entities(&db, EntityKind::House).await), 1);
    assert_eq!(assert_ok!(query::count_entities(&db, EntityKind::Room).await), 1);
    assert_eq!(assert_ok!(query::count_entities(&db, EntityKind::Person).await), 0);
}

#[tokio::test]
async fn log_counts_are_per_type() {
    let db = setup_db().await;
    let sound = seed_sensor(&db, "sound").await;
    let ir = seed_sensor(&db, "ir").await;

    for m in [1.0, 2.0, 3.0] {
        assert_ok!(ingest::append_log(&db, sound.id, m, None).await);
    }
    assert_ok!(ingest::append_log(&db, ir.id, 9.0, None).await);

    let sound_logs = assert_ok!(query::count_entities(&db, EntityKind::Log(SensorKind::Sound)).await);
    let ir_logs = assert_ok!(query::count_entities(&db, EntityKind::Log(SensorKind::Ir)).await);
    let magnetic_logs =
        assert_ok!(query::count_entities(&db, EntityKind::Log(SensorKind::Magnetic)).await);
    assert_eq!((sound_logs, ir_logs, magnetic_logs), (3, 1, 0));
}

#[tokio::test]
async fn most_recent_log_has_max_timestamp_regardless_of_insert_order() {
    let db = setup_db().await;
    let sensor = seed_sensor(&db, "ultrasonic").await;

    let stamps = [
        "2024-05-01T12:00:05Z",
        "2024-05-01T12:00:09Z",
        "2024-05-01T12:00:01Z",
        "2024-05-01T12:00:07Z",
    ];
    for (i, raw) in stamps.iter().enumerate() {
        assert_ok!(ingest::append_log(&db, sensor.id, i as f64, Some(ts(raw))).await);
    }

    let Record::Log(latest) =
        assert_ok!(query::most_recent(&db, EntityKind::Log(SensorKind::Ultrasonic)).await)
    else {
        panic!("expected a log record");
    };
    assert_eq!(latest.recorded_at, ts("2024-05-01T12:00:09Z"));
    assert_eq!(latest.measure, 1.0);
}

#[tokio::test]
async fn most_recent_breaks_timestamp_ties_by_insertion() {
    let db = setup_db().await;
    let sensor = seed_sensor(&db, "magnetic").await;
    let at = ts("2024-05-01T12:00:00Z");

    assert_ok!(ingest::append_log(&db, sensor.id, 1.0, Some(at)).await);
    let second = assert_ok!(ingest::append_log(&db, sensor.id, 2.0, Some(at)).await);

    let record = assert_ok!(query::most_recent(&db, EntityKind::Log(SensorKind::Magnetic)).await);
    assert_eq!(record, Record::Log(second));
}

#[tokio::test]
async fn most_recent_entity_is_last_registered() {
    let db = setup_db().await;
    seed_house(&db).await;
    let newest = assert_ok!(ingest::register_house(&db, "3 Chemin Vert").await);

    let record = assert_ok!(query::most_recent(&db, EntityKind::House).await);
    assert_eq!(record, Record::House(newest));
}

#[tokio::test]
async fn series_without_filter_returns_t1_t2_t3_in_order() {
    let db = setup_db().await;
    let sensor = seed_sensor(&db, "sound").await;
    let (t1, t2, t3) = (
        ts("2024-05-01T12:00:00Z"),
        ts("2024-05-01T12:00:01Z"),
        ts("2024-05-01T12:00:02Z"),
    );

    // Inserted out of order on purpose.
    for t in [t2, t3, t1] {
        assert_ok!(ingest::append_log(&db, sensor.id, 0.0, Some(t)).await);
    }

    let series = assert_ok!(SeriesWindow::new(SensorKind::Sound).collect(&db).await);
    let stamps: Vec<_> = series.iter().map(|log| log.recorded_at).collect();
    assert_eq!(stamps, vec![t1, t2, t3]);
}

#[tokio::test]
async fn series_is_non_decreasing_and_filtered_to_its_type() {
    let db = setup_db().await;
    let a = seed_sensor(&db, "ir").await;
    let b = seed_sensor(&db, "ir").await;
    let other = seed_sensor(&db, "sound").await;

    let raw = [
        (a.id, "2024-05-01T12:00:03Z"),
        (b.id, "2024-05-01T12:00:01Z"),
        (a.id, "2024-05-01T12:00:01Z"),
        (other.id, "2024-05-01T12:00:00Z"),
        (b.id, "2024-05-01T11:59:59Z"),
    ];
    for (sensor_id, at) in raw {
        assert_ok!(ingest::append_log(&db, sensor_id, 1.0, Some(ts(at))).await);
    }

    let series = assert_ok!(SeriesWindow::new(SensorKind::Ir).collect(&db).await);
    assert_eq!(series.len(), 4);
    assert!(series.iter().all(|log| log.sensor_type == SensorKind::Ir));
    for pair in series.windows(2) {
        assert!(pair[0].recorded_at <= pair[1].recorded_at);
        if pair[0].recorded_at == pair[1].recorded_at {
            assert!(pair[0].id < pair[1].id);
        }
    }

    let only_b = assert_ok!(SeriesWindow::new(SensorKind::Ir).for_sensor(b.id).collect(&db).await);
    assert_eq!(only_b.len(), 2);
    assert!(only_b.iter().all(|log| log.sensor_id == b.id));
}

#[tokio::test]
async fn series_bounds_are_inclusive() {
    let db = setup_db().await;
    let sensor = seed_sensor(&db, "ultrasonic").await;
    for sec in 0..5 {
        let at = ts(&format!("2024-05-01T12:00:0{sec}Z"));
        assert_ok!(ingest::append_log(&db, sensor.id, f64::from(sec), Some(at)).await);
    }

    let window = SeriesWindow::new(SensorKind::Ultrasonic).between(
        Some(ts("2024-05-01T12:00:01Z")),
        Some(ts("2024-05-01T12:00:03Z")),
    );
    let series = assert_ok!(window.collect(&db).await);
    let measures: Vec<f64> = series.iter().map(|log| log.measure).collect();
    assert_eq!(measures, vec![1.0, 2.0, 3.0]);

    let open_ended = SeriesWindow::new(SensorKind::Ultrasonic)
        .between(Some(ts("2024-05-01T12:00:04Z")), None);
    assert_eq!(assert_ok!(open_ended.collect(&db).await).len(), 1);
}

#[tokio::test]
async fn reopening_a_window_restarts_from_the_first_row() {
    let db = setup_db().await;
    let sensor = seed_sensor(&db, "magnetic").await;
    for m in [1.0, 2.0, 3.0] {
        assert_ok!(ingest::append_log(&db, sensor.id, m, None).await);
    }

    let window = SeriesWindow::new(SensorKind::Magnetic);
    let first: Vec<_> = assert_ok!(assert_ok!(window.open(&db).await).try_collect::<Vec<_>>().await);
    let second = assert_ok!(window.collect(&db).await);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[tokio::test]
async fn invalid_windows_are_rejected_before_streaming() {
    let db = setup_db().await;
    let sound = seed_sensor(&db, "sound").await;

    let err = assert_err!(
        SeriesWindow::new(SensorKind::Sound)
            .for_sensor(999)
            .collect(&db)
            .await
    );
    assert!(matches!(err, AppError::NotFound(_)));

    let err = assert_err!(
        SeriesWindow::new(SensorKind::Ir)
            .for_sensor(sound.id)
            .collect(&db)
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));

    let err = assert_err!(
        SeriesWindow::new(SensorKind::Sound)
            .between(Some(ts("2024-05-02 00:00:00")), Some(ts("2024-05-01 00:00:00")))
            .collect(&db)
            .await
    );
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn empty_series_is_empty_not_an_error() {
    let db = setup_db().await;
    let series = assert_ok!(SeriesWindow::new(SensorKind::PushButton).collect(&db).await);
    assert!(series.is_empty());
}

#[tokio::test]
async fn closed_pool_surfaces_connection_error_not_zero() {
    let db = setup_db().await;
    seed_sensor(&db, "ir").await;

    assert_ok!(db.clone().close().await);

    let err = assert_err!(query::count_entities(&db, EntityKind::Sensor).await);
    assert!(matches!(err, AppError::Connection(_)), "got {err:?}");

    let err = assert_err!(query::most_recent(&db, EntityKind::Sensor).await);
    assert!(matches!(err, AppError::Connection(_)), "got {err:?}");

    let err = assert_err!(SeriesWindow::new(SensorKind::Ir).collect(&db).await);
    assert!(matches!(err, AppError::Connection(_)), "got {err:?}");
}
