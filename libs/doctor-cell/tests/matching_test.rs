// libs/doctor-cell/tests/matching_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use doctor_cell::models::DoctorError;
use doctor_cell::services::directory::DoctorDirectoryService;
use doctor_cell::services::matching::DoctorMatchingService;
use shared_database::{MemoryStorage, NewAppointment, Storage};
use shared_models::{AgeGroup, AppointmentStatus, Department, Doctor};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

struct TestSetup {
    storage: MemoryStorage,
    matching: DoctorMatchingService,
}

impl TestSetup {
    fn new() -> Self {
        let storage = MemoryStorage::new();
        let matching = DoctorMatchingService::new(Arc::new(storage.clone()));
        Self { storage, matching }
    }

    async fn seed_department(&self, id: i64, name: &str, age_group: AgeGroup, is_active: bool) {
        self.storage
            .upsert_department(Department {
                id,
                name: name.to_string(),
                description: None,
                age_group,
                is_active,
            })
            .await;
    }

    async fn seed_doctor(&self, doctor: Doctor) {
        self.storage.upsert_doctor(doctor).await;
    }
}

fn doctor(id: i64, department_id: i64, rating: f32, experience_years: i32) -> Doctor {
    Doctor {
        id,
        department_id,
        first_name: format!("Doc{}", id),
        last_name: "Test".to_string(),
        specialization: "General Medicine".to_string(),
        bio: None,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        slot_minutes: 30,
        available_days: vec!["monday".to_string(), "tuesday".to_string()],
        min_age: 0,
        max_age: 120,
        preferred_blood_groups: vec!["all".to_string()],
        is_available: true,
        is_active: true,
        consultation_fee: 150.0,
        rating,
        experience_years,
    }
}

// ==============================================================================
// TESTS
// ==============================================================================

#[tokio::test]
async fn geriatric_patient_gets_geriatric_departments_first() -> anyhow::Result<()> {
    let setup = TestSetup::new();
    setup.seed_department(1, "Geriatrics", AgeGroup::Geriatric, true).await;
    setup.seed_department(2, "Family Medicine", AgeGroup::AllAges, true).await;
    setup.seed_department(3, "Pediatrics", AgeGroup::Pediatric, true).await;
    setup.seed_department(4, "Internal Medicine", AgeGroup::Adult, true).await;

    // Geriatric department, lower rating than the all-ages doctors.
    setup.seed_doctor(doctor(1, 1, 4.0, 8)).await;
    setup.seed_doctor(doctor(2, 1, 4.6, 3)).await;
    // All-ages department, highest rating overall.
    setup.seed_doctor(doctor(3, 2, 4.9, 20)).await;
    // Ineligible departments for a 70-year-old.
    setup.seed_doctor(doctor(4, 3, 5.0, 25)).await;
    setup.seed_doctor(doctor(5, 4, 5.0, 25)).await;

    let matches = setup.matching.find_matching_doctors(70, "O+", "").await?;

    let ids: Vec<i64> = matches.iter().map(|m| m.doctor_id).collect();
    // Geriatric matches lead (rating desc within the group), then all-ages.
    assert_eq!(ids, vec![2, 1, 3]);
    assert!(matches[0].band_match);
    assert!(matches[1].band_match);
    assert!(!matches[2].band_match);
    Ok(())
}

#[tokio::test]
async fn rating_then_experience_break_ties() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;

    setup.seed_doctor(doctor(1, 1, 4.5, 5)).await;
    setup.seed_doctor(doctor(2, 1, 4.5, 15)).await;
    setup.seed_doctor(doctor(3, 1, 4.8, 2)).await;

    let matches = setup
        .matching
        .find_matching_doctors(40, "A+", "")
        .await
        .unwrap();

    let ids: Vec<i64> = matches.iter().map(|m| m.doctor_id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn eligibility_filters_blood_group_and_age_bounds() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;

    let mut picky = doctor(1, 1, 4.0, 10);
    picky.preferred_blood_groups = vec!["A+".to_string(), "A-".to_string()];
    setup.seed_doctor(picky).await;

    let mut narrow = doctor(2, 1, 4.0, 10);
    narrow.min_age = 30;
    narrow.max_age = 50;
    setup.seed_doctor(narrow).await;

    let matches = setup
        .matching
        .find_matching_doctors(25, "O+", "")
        .await
        .unwrap();
    assert!(matches.is_empty());

    // Case-insensitive blood group comparison.
    let matches = setup
        .matching
        .find_matching_doctors(25, "a+", "")
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].doctor_id, 1);
}

#[tokio::test]
async fn inactive_department_and_unavailable_doctor_are_excluded() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;
    setup.seed_department(2, "Closed Wing", AgeGroup::Adult, false).await;

    setup.seed_doctor(doctor(1, 2, 5.0, 20)).await;
    let mut off_duty = doctor(2, 1, 5.0, 20);
    off_duty.is_available = false;
    setup.seed_doctor(off_duty).await;
    setup.seed_doctor(doctor(3, 1, 3.5, 4)).await;

    let matches = setup
        .matching
        .find_matching_doctors(40, "O+", "")
        .await
        .unwrap();
    let ids: Vec<i64> = matches.iter().map(|m| m.doctor_id).collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn symptom_text_never_filters_candidates() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;
    setup.seed_doctor(doctor(1, 1, 4.0, 10)).await;
    setup.seed_doctor(doctor(2, 1, 3.9, 9)).await;

    let without = setup
        .matching
        .find_matching_doctors(40, "O+", "")
        .await
        .unwrap();
    let with = setup
        .matching
        .find_matching_doctors(40, "O+", "unrelated gibberish zzz")
        .await
        .unwrap();

    assert_eq!(without.len(), with.len());
    let a: Vec<i64> = without.iter().map(|m| m.doctor_id).collect();
    let b: Vec<i64> = with.iter().map(|m| m.doctor_id).collect();
    assert_eq!(a, b);
}

#[tokio::test]
async fn directory_rejects_missing_and_off_duty_doctors() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;
    let mut off_duty = doctor(1, 1, 4.0, 10);
    off_duty.is_available = false;
    setup.seed_doctor(off_duty).await;

    let directory = DoctorDirectoryService::new(Arc::new(setup.storage.clone()));

    let err = directory.get_bookable_doctor(99).await.unwrap_err();
    assert_matches!(err, DoctorError::NotFound);

    let err = directory.get_bookable_doctor(1).await.unwrap_err();
    assert_matches!(err, DoctorError::NotFound);
}

#[tokio::test]
async fn completed_visits_count_only_completed_appointments() {
    let setup = TestSetup::new();
    setup.seed_department(1, "Internal Medicine", AgeGroup::Adult, true).await;
    setup.seed_doctor(doctor(1, 1, 4.0, 10)).await;

    let mut tx = setup.storage.begin().await.unwrap();
    for (i, status) in [
        AppointmentStatus::Completed,
        AppointmentStatus::Completed,
        AppointmentStatus::Scheduled,
        AppointmentStatus::Cancelled,
    ]
    .into_iter()
    .enumerate()
    {
        tx.insert_appointment(NewAppointment {
            appointment_number: format!("APT-2030-{:04}", 1000 + i),
            patient_id: 1,
            doctor_id: 1,
            date: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            time: NaiveTime::from_hms_opt(9 + i as u32, 0, 0).unwrap(),
            status,
            reason: "visit".to_string(),
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let matches = setup
        .matching
        .find_matching_doctors(40, "O+", "")
        .await
        .unwrap();
    assert_eq!(matches[0].completed_visits, 2);
}
