// libs/doctor-cell/src/services/matching.rs
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

use shared_database::Storage;
use shared_models::{AgeBand, Department, Doctor};

use crate::models::{DoctorError, DoctorSummary};
use crate::services::directory::DoctorDirectoryService;

pub struct DoctorMatchingService {
    storage: Arc<dyn Storage>,
    directory: DoctorDirectoryService,
}

impl DoctorMatchingService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let directory = DoctorDirectoryService::new(Arc::clone(&storage));
        Self { storage, directory }
    }

    /// Rank eligible doctors for a patient profile.
    ///
    /// Eligibility: bookable doctor (available + active department), the
    /// department's age group admits the patient, the doctor's own age bounds
    /// admit the patient, and the doctor's blood-group preference admits the
    /// patient's group. `symptom_text` is a best-effort hint: it decorates
    /// the match notes but never excludes or reorders a candidate.
    ///
    /// Ordering: exact age-band department matches first, then rating
    /// descending, then experience descending. An empty result is a valid
    /// outcome, not an error.
    pub async fn find_matching_doctors(
        &self,
        age: i32,
        blood_group: &str,
        symptom_text: &str,
    ) -> Result<Vec<DoctorSummary>, DoctorError> {
        debug!("matching doctors for age {} and blood group {}", age, blood_group);

        let band = AgeBand::of(age);
        let mut summaries = Vec::new();

        for (doctor, department) in self.directory.list_bookable().await? {
            if !department.age_group.admits(age) {
                continue;
            }
            if !doctor.accepts_age(age) {
                continue;
            }
            if !doctor.accepts_blood_group(blood_group) {
                continue;
            }

            let completed_visits = self
                .storage
                .completed_appointment_count(doctor.id)
                .await?;
            summaries.push(self.summarize(doctor, department, band, symptom_text, completed_visits));
        }

        summaries.sort_by(|a, b| {
            band_rank(a)
                .cmp(&band_rank(b))
                .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
                .then_with(|| b.experience_years.cmp(&a.experience_years))
        });

        info!("matched {} doctors for age band {:?}", summaries.len(), band);
        Ok(summaries)
    }

    fn summarize(
        &self,
        doctor: Doctor,
        department: Department,
        band: AgeBand,
        symptom_text: &str,
        completed_visits: u64,
    ) -> DoctorSummary {
        let band_match = band.matches(department.age_group);
        let mut match_notes = Vec::new();

        if band_match {
            match_notes.push(format!("{} specializes in your age group", department.name));
        }
        if doctor.rating >= 4.0 {
            match_notes.push(format!("Highly rated ({:.1}/5.0)", doctor.rating));
        }
        if doctor.experience_years >= 5 {
            match_notes.push(format!("{} years of experience", doctor.experience_years));
        }
        if symptom_overlap(&doctor, symptom_text) {
            match_notes.push("Specialization relevant to reported symptoms".to_string());
        }

        DoctorSummary {
            doctor_id: doctor.id,
            first_name: doctor.first_name,
            last_name: doctor.last_name,
            specialization: doctor.specialization,
            bio: doctor.bio,
            department_name: department.name,
            department_age_group: department.age_group,
            consultation_fee: doctor.consultation_fee,
            rating: doctor.rating,
            experience_years: doctor.experience_years,
            available_days: doctor.available_days,
            start_time: doctor.start_time,
            end_time: doctor.end_time,
            completed_visits,
            band_match,
            match_notes,
        }
    }
}

fn band_rank(summary: &DoctorSummary) -> u8 {
    if summary.band_match {
        1
    } else {
        2
    }
}

/// Loose text overlap between reported symptoms and the doctor's profile.
/// Advisory only.
fn symptom_overlap(doctor: &Doctor, symptom_text: &str) -> bool {
    let haystack = format!(
        "{} {}",
        doctor.specialization.to_lowercase(),
        doctor.bio.as_deref().unwrap_or("").to_lowercase()
    );
    symptom_text
        .split_whitespace()
        .filter(|token| token.len() >= 4)
        .any(|token| haystack.contains(&token.to_lowercase()))
}
