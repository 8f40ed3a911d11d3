use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// DOCTOR / DEPARTMENT / PATIENT
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub department_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub bio: Option<String>,
    /// Daily working window `[start_time, end_time)`.
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Fixed slot width within the working window.
    pub slot_minutes: i64,
    /// Lowercase weekday names; membership checks are case-insensitive.
    pub available_days: Vec<String>,
    pub min_age: i32,
    pub max_age: i32,
    /// Blood group codes, or the sentinel "all" (any casing).
    pub preferred_blood_groups: Vec<String>,
    pub is_available: bool,
    pub is_active: bool,
    pub consultation_fee: f64,
    pub rating: f32,
    pub experience_years: i32,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether the doctor works on the weekday of `date`.
    pub fn works_on(&self, date: NaiveDate) -> bool {
        let day = weekday_name(date);
        self.available_days
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(&day))
    }

    pub fn accepts_age(&self, age: i32) -> bool {
        self.min_age <= age && age <= self.max_age
    }

    /// "all" in the preference set admits every blood group.
    pub fn accepts_blood_group(&self, blood_group: &str) -> bool {
        self.preferred_blood_groups
            .iter()
            .any(|g| g.trim().eq_ignore_ascii_case("all") || g.trim().eq_ignore_ascii_case(blood_group))
    }
}

/// Full lowercase weekday name of a date, e.g. "monday".
pub fn weekday_name(date: NaiveDate) -> String {
    match date.weekday() {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    }
    .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub age_group: AgeGroup,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Pediatric,
    Adult,
    Geriatric,
    AllAges,
}

impl AgeGroup {
    pub fn admits(&self, age: i32) -> bool {
        match self {
            AgeGroup::Pediatric => age <= 18,
            AgeGroup::Adult => (19..=64).contains(&age),
            AgeGroup::Geriatric => age >= 65,
            AgeGroup::AllAges => true,
        }
    }
}

/// Patient classification used to rank department matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Pediatric,
    Adult,
    Geriatric,
}

impl AgeBand {
    pub fn of(age: i32) -> Self {
        if age <= 18 {
            AgeBand::Pediatric
        } else if age <= 64 {
            AgeBand::Adult
        } else {
            AgeBand::Geriatric
        }
    }

    /// Whether a department age group is the exact specialization for this band.
    pub fn matches(&self, group: AgeGroup) -> bool {
        matches!(
            (self, group),
            (AgeBand::Pediatric, AgeGroup::Pediatric)
                | (AgeBand::Adult, AgeGroup::Adult)
                | (AgeBand::Geriatric, AgeGroup::Geriatric)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Stored fallback used when `date_of_birth` is absent.
    pub age: i32,
    pub blood_group: String,
}

impl Patient {
    /// Effective age: derived from date of birth when present, else stored.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        match self.date_of_birth {
            Some(dob) => {
                let mut years = today.year() - dob.year();
                if (today.month(), today.day()) < (dob.month(), dob.day()) {
                    years -= 1;
                }
                years
            }
            None => self.age,
        }
    }
}

// ==============================================================================
// APPOINTMENT / BILL / MEDICAL RECORD
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub appointment_number: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Active appointments hold their slot; cancelled ones free it.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub bill_number: String,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub consultation_fee: f64,
    pub additional_charges: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: i64,
    pub appointment_id: i64,
    pub patient_id: i64,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub created_at: DateTime<Utc>,
}
