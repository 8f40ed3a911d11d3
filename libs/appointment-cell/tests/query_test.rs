// libs/appointment-cell/tests/query_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use appointment_cell::models::AppointmentError;
use appointment_cell::services::query::AppointmentQueryService;
use shared_database::{AppointmentFilter, MemoryStorage, NewAppointment, Storage};
use shared_models::AppointmentStatus;

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct TestSetup {
    query: AppointmentQueryService,
}

impl TestSetup {
    async fn seeded() -> Self {
        let storage = MemoryStorage::new();

        // Inserted deliberately out of (date, time) order.
        let rows = [
            // (patient, doctor, date, time, status)
            (1, 1, ymd(2030, 3, 12), hm(14, 0), AppointmentStatus::Scheduled),
            (2, 1, ymd(2030, 3, 10), hm(9, 30), AppointmentStatus::Completed),
            (1, 2, ymd(2030, 3, 10), hm(9, 0), AppointmentStatus::Scheduled),
            (2, 2, ymd(2030, 3, 11), hm(11, 0), AppointmentStatus::Cancelled),
            (1, 1, ymd(2030, 3, 14), hm(10, 0), AppointmentStatus::Confirmed),
        ];

        let mut tx = storage.begin().await.unwrap();
        for (i, (patient_id, doctor_id, date, time, status)) in rows.into_iter().enumerate() {
            tx.insert_appointment(NewAppointment {
                appointment_number: format!("APT-2030-{:04}", 1000 + i),
                patient_id,
                doctor_id,
                date,
                time,
                status,
                reason: "checkup".to_string(),
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let query = AppointmentQueryService::new(Arc::new(storage));
        Self { query }
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// ==============================================================================
// TESTS
// ==============================================================================

#[tokio::test]
async fn results_come_back_in_date_then_time_order() -> anyhow::Result<()> {
    let setup = TestSetup::seeded().await;

    let all = setup
        .query
        .search_appointments(&AppointmentFilter::default())
        .await?;

    assert_eq!(all.len(), 5);
    let keys: Vec<(NaiveDate, NaiveTime)> = all.iter().map(|a| (a.date, a.time)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    // Same date, earlier time first.
    assert_eq!(all[0].time, hm(9, 0));
    assert_eq!(all[1].time, hm(9, 30));
    Ok(())
}

#[tokio::test]
async fn patient_doctor_and_status_filters_narrow_the_list() -> anyhow::Result<()> {
    let setup = TestSetup::seeded().await;

    let mine = setup
        .query
        .search_appointments(&AppointmentFilter {
            patient_id: Some(1),
            ..Default::default()
        })
        .await?;
    assert_eq!(mine.len(), 3);
    assert!(mine.iter().all(|a| a.patient_id == 1));

    let with_doctor_two = setup
        .query
        .search_appointments(&AppointmentFilter {
            doctor_id: Some(2),
            ..Default::default()
        })
        .await?;
    assert_eq!(with_doctor_two.len(), 2);

    let cancelled = setup
        .query
        .search_appointments(&AppointmentFilter {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        })
        .await?;
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].patient_id, 2);

    // Filters combine as a conjunction.
    let scheduled_for_one = setup
        .query
        .search_appointments(&AppointmentFilter {
            patient_id: Some(1),
            doctor_id: Some(1),
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        })
        .await?;
    assert_eq!(scheduled_for_one.len(), 1);
    assert_eq!(scheduled_for_one[0].date, ymd(2030, 3, 12));
    Ok(())
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() -> anyhow::Result<()> {
    let setup = TestSetup::seeded().await;

    let window = setup
        .query
        .search_appointments(&AppointmentFilter {
            from_date: Some(ymd(2030, 3, 10)),
            to_date: Some(ymd(2030, 3, 12)),
            ..Default::default()
        })
        .await?;

    assert_eq!(window.len(), 4);
    assert!(window
        .iter()
        .all(|a| a.date >= ymd(2030, 3, 10) && a.date <= ymd(2030, 3, 12)));
    Ok(())
}

#[tokio::test]
async fn lookup_by_id_and_missing_appointment() {
    let setup = TestSetup::seeded().await;

    let first = setup.query.get_appointment(1).await.unwrap();
    assert_eq!(first.appointment_number, "APT-2030-1000");

    let err = setup.query.get_appointment(999).await.unwrap_err();
    assert_matches!(err, AppointmentError::NotFound);
}
