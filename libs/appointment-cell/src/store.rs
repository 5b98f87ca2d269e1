// libs/appointment-cell/src/store.rs
//
// The appointment store is the single shared mutable resource of the engine.
// `create` and `reslot` are its linearization points: the slot-exclusivity
// and daily-capacity checks commit together with the write, or not at all.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

pub mod memory;

pub use memory::InMemoryAppointmentStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("appointment not found")]
    NotFound,

    #[error("another active appointment already holds the slot")]
    SlotTaken,

    #[error("daily capacity for the specialty is exhausted")]
    CapacityReached,

    /// Transient write contention (e.g. a serializable transaction abort).
    /// The only variant worth retrying.
    #[error("storage contention: {0}")]
    Contention(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppointmentError::NotFound,
            StoreError::SlotTaken => AppointmentError::SlotConflict,
            StoreError::CapacityReached => AppointmentError::CapacityExceeded,
            StoreError::Contention(msg) | StoreError::Backend(msg) => {
                AppointmentError::StorageError(msg)
            }
        }
    }
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError>;

    /// Appointments in an active status for a doctor on a date.
    async fn active_for_doctor_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Count of active appointments for a specialty on a date.
    async fn active_count_for_specialty_date(
        &self,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> Result<usize, StoreError>;

    /// Atomic check-and-insert. Commits `appointment` only if no active
    /// appointment holds its (doctor, date, time) and the specialty's active
    /// count for the date is below `daily_limit`; otherwise fails with
    /// `SlotTaken` / `CapacityReached` and writes nothing.
    async fn create(
        &self,
        appointment: Appointment,
        daily_limit: i32,
    ) -> Result<Appointment, StoreError>;

    /// Replace an existing record. For slot-preserving status transitions
    /// only; date/time moves go through `reslot`.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Atomic move to a new slot: the conflict and capacity checks against
    /// the new (date, time) and the status change commit as one unit. On
    /// failure the stored record is unchanged.
    async fn reslot(
        &self,
        id: Uuid,
        new_date: NaiveDate,
        new_time: NaiveTime,
        new_status: AppointmentStatus,
        daily_limit: i32,
    ) -> Result<Appointment, StoreError>;
}
