// libs/doctor-cell/src/store.rs
//
// Storage seams for reference data. The engine treats doctors, specialties
// and availability windows as externally maintained reference data; these
// traits are the read contract, and the in-memory implementations exist for
// embedding and tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{AvailabilityWindow, Doctor, Specialty};

#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<Doctor>>;
}

#[async_trait]
pub trait SpecialtyStore: Send + Sync {
    async fn get(&self, specialty_id: Uuid) -> Result<Option<Specialty>>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// All windows configured for a doctor on a weekday, active or not.
    async fn windows_for_day(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityWindow>>;
}

/// Read-side view of the appointment book: just enough to mask booked slots.
/// Implemented by the appointment store, so slot generation can subtract
/// active bookings without this cell depending on the appointment cell.
#[async_trait]
pub trait BookedSlotSource: Send + Sync {
    /// Start times of appointments in an active status for `doctor_id` on
    /// `date`.
    async fn active_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>>;
}

// ==============================================================================
// IN-MEMORY IMPLEMENTATIONS
// ==============================================================================

#[derive(Default)]
pub struct InMemoryDoctorStore {
    doctors: Mutex<HashMap<Uuid, Doctor>>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doctor: Doctor) {
        self.doctors.lock().unwrap().insert(doctor.id, doctor);
    }
}

#[async_trait]
impl DoctorStore for InMemoryDoctorStore {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<Doctor>> {
        Ok(self.doctors.lock().unwrap().get(&doctor_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemorySpecialtyStore {
    specialties: Mutex<HashMap<Uuid, Specialty>>,
}

impl InMemorySpecialtyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, specialty: Specialty) {
        self.specialties
            .lock()
            .unwrap()
            .insert(specialty.id, specialty);
    }
}

#[async_trait]
impl SpecialtyStore for InMemorySpecialtyStore {
    async fn get(&self, specialty_id: Uuid) -> Result<Option<Specialty>> {
        Ok(self
            .specialties
            .lock()
            .unwrap()
            .get(&specialty_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAvailabilityStore {
    windows: Mutex<Vec<AvailabilityWindow>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, window: AvailabilityWindow) {
        self.windows.lock().unwrap().push(window);
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn windows_for_day(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityWindow>> {
        Ok(self
            .windows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.doctor_id == doctor_id && w.day_of_week == day_of_week)
            .cloned()
            .collect())
    }
}
