// libs/appointment-cell/src/store/memory.rs
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use doctor_cell::store::BookedSlotSource;

use crate::models::{Appointment, AppointmentStatus};
use crate::store::{AppointmentStore, StoreError};

/// Reference store. A single mutex over the appointment map is the
/// serialization boundary: `create` and `reslot` run their checks and the
/// write inside one critical section, never holding the lock across an
/// await, which makes the check-and-insert linearizable by construction.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_taken(
        appointments: &HashMap<Uuid, Appointment>,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<Uuid>,
    ) -> bool {
        appointments.values().any(|a| {
            a.is_active()
                && a.doctor_id == doctor_id
                && a.appointment_date == date
                && a.appointment_time == time
                && Some(a.id) != exclude
        })
    }

    fn active_specialty_count(
        appointments: &HashMap<Uuid, Appointment>,
        specialty_id: Uuid,
        date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> usize {
        appointments
            .values()
            .filter(|a| {
                a.is_active()
                    && a.specialty_id == specialty_id
                    && a.appointment_date == date
                    && Some(a.id) != exclude
            })
            .count()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        self.appointments
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn active_for_doctor_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self.appointments.lock().unwrap();
        let mut active: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.is_active() && a.doctor_id == doctor_id && a.appointment_date == date)
            .cloned()
            .collect();
        active.sort_by_key(|a| a.appointment_time);
        Ok(active)
    }

    async fn active_count_for_specialty_date(
        &self,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> Result<usize, StoreError> {
        let appointments = self.appointments.lock().unwrap();
        Ok(Self::active_specialty_count(
            &appointments,
            specialty_id,
            date,
            None,
        ))
    }

    async fn create(
        &self,
        appointment: Appointment,
        daily_limit: i32,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.lock().unwrap();

        if Self::slot_taken(
            &appointments,
            appointment.doctor_id,
            appointment.appointment_date,
            appointment.appointment_time,
            None,
        ) {
            return Err(StoreError::SlotTaken);
        }

        let active = Self::active_specialty_count(
            &appointments,
            appointment.specialty_id,
            appointment.appointment_date,
            None,
        );
        if active as i32 >= daily_limit {
            return Err(StoreError::CapacityReached);
        }

        debug!("Storing appointment {}", appointment.id);
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.lock().unwrap();
        if !appointments.contains_key(&appointment.id) {
            return Err(StoreError::NotFound);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn reslot(
        &self,
        id: Uuid,
        new_date: NaiveDate,
        new_time: NaiveTime,
        new_status: AppointmentStatus,
        daily_limit: i32,
    ) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.lock().unwrap();

        let current = appointments.get(&id).ok_or(StoreError::NotFound)?.clone();

        if Self::slot_taken(&appointments, current.doctor_id, new_date, new_time, Some(id)) {
            return Err(StoreError::SlotTaken);
        }

        // The moving appointment is excluded so a move within the same
        // specialty/date does not count against itself.
        let active = Self::active_specialty_count(
            &appointments,
            current.specialty_id,
            new_date,
            Some(id),
        );
        if active as i32 >= daily_limit {
            return Err(StoreError::CapacityReached);
        }

        let mut moved = current;
        moved.appointment_date = new_date;
        moved.appointment_time = new_time;
        moved.status = new_status;
        moved.updated_at = Utc::now();
        appointments.insert(id, moved.clone());
        Ok(moved)
    }
}

#[async_trait]
impl BookedSlotSource for InMemoryAppointmentStore {
    async fn active_times(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<NaiveTime>> {
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments
            .values()
            .filter(|a| a.is_active() && a.doctor_id == doctor_id && a.appointment_date == date)
            .map(|a| a.appointment_time)
            .collect())
    }
}
