// libs/appointment-cell/tests/common/mod.rs
//
// Shared fixture: an in-memory clinic wired the same way an embedding
// application would wire the engine.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use uuid::Uuid;

use appointment_cell::events::RecordingEventPort;
use appointment_cell::models::BookAppointmentRequest;
use appointment_cell::services::{AppointmentBookingService, AppointmentLifecycleService};
use appointment_cell::store::InMemoryAppointmentStore;
use doctor_cell::models::{AvailabilityWindow, Doctor, Specialty};
use doctor_cell::services::{AvailabilityService, SlotGenerationService};
use doctor_cell::store::{
    InMemoryAvailabilityStore, InMemoryDoctorStore, InMemorySpecialtyStore,
};
use shared_config::AppConfig;

pub struct TestClinic {
    pub doctor_store: Arc<InMemoryDoctorStore>,
    pub specialty_store: Arc<InMemorySpecialtyStore>,
    pub availability_store: Arc<InMemoryAvailabilityStore>,
    pub appointment_store: Arc<InMemoryAppointmentStore>,
    pub events: Arc<RecordingEventPort>,
    pub booking: Arc<AppointmentBookingService>,
    pub lifecycle: Arc<AppointmentLifecycleService>,
    pub doctor_id: Uuid,
    pub specialty_id: Uuid,
}

impl TestClinic {
    /// Clinic with one specialty (daily limit 3, 30-minute consultations)
    /// and one doctor, no availability configured yet.
    pub fn new() -> Self {
        Self::with_specialty_limits(3, 30)
    }

    pub fn with_specialty_limits(daily_limit: i32, duration_minutes: i32) -> Self {
        let doctor_store = Arc::new(InMemoryDoctorStore::new());
        let specialty_store = Arc::new(InMemorySpecialtyStore::new());
        let availability_store = Arc::new(InMemoryAvailabilityStore::new());
        let appointment_store = Arc::new(InMemoryAppointmentStore::new());
        let events = Arc::new(RecordingEventPort::new());

        let specialty_id = Uuid::new_v4();
        specialty_store.insert(Specialty {
            id: specialty_id,
            name: "Cardiology".to_string(),
            daily_appointment_limit: daily_limit,
            average_consultation_duration_minutes: duration_minutes,
        });

        let doctor_id = Uuid::new_v4();
        doctor_store.insert(Doctor {
            id: doctor_id,
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            specialty_id,
            is_active: true,
        });

        let availability = AvailabilityService::new(availability_store.clone());
        let booking = Arc::new(AppointmentBookingService::new(
            doctor_store.clone(),
            specialty_store.clone(),
            availability.clone(),
            appointment_store.clone(),
            events.clone(),
            AppConfig::default(),
        ));
        let lifecycle = Arc::new(AppointmentLifecycleService::new(
            appointment_store.clone(),
            specialty_store.clone(),
            availability,
            events.clone(),
            AppConfig::default(),
        ));

        Self {
            doctor_store,
            specialty_store,
            availability_store,
            appointment_store,
            events,
            booking,
            lifecycle,
            doctor_id,
            specialty_id,
        }
    }

    pub fn add_window(&self, day_of_week: u8, start: (u32, u32), end: (u32, u32), slot: i32) {
        self.add_window_for(self.doctor_id, day_of_week, start, end, slot);
    }

    pub fn add_window_for(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        start: (u32, u32),
        end: (u32, u32),
        slot: i32,
    ) {
        self.availability_store.insert(AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            slot_duration_minutes: slot,
            is_active: true,
        });
    }

    pub fn add_doctor(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.doctor_store.insert(Doctor {
            id,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            specialty_id: self.specialty_id,
            is_active: true,
        });
        id
    }

    pub fn add_specialty(&self, daily_limit: i32, duration_minutes: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.specialty_store.insert(Specialty {
            id,
            name: "Dermatology".to_string(),
            daily_appointment_limit: daily_limit,
            average_consultation_duration_minutes: duration_minutes,
        });
        id
    }

    pub fn slot_generator(&self) -> SlotGenerationService {
        SlotGenerationService::new(
            AvailabilityService::new(self.availability_store.clone()),
            self.appointment_store.clone(),
        )
    }

    pub fn book_request(&self, patient_id: Uuid, time: NaiveTime) -> BookAppointmentRequest {
        self.book_request_on(patient_id, monday(), time)
    }

    pub fn book_request_on(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> BookAppointmentRequest {
        BookAppointmentRequest {
            patient_id,
            doctor_id: self.doctor_id,
            specialty_id: self.specialty_id,
            appointment_date: date,
            appointment_time: time,
            reason: "Routine check-up".to_string(),
            notes: None,
        }
    }
}

/// 2025-06-02, a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

/// 2025-06-01, a Sunday.
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}
