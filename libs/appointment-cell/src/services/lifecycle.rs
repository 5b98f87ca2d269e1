// libs/appointment-cell/src/services/lifecycle.rs
//
// All status transitions go through this service; nothing else mutates an
// appointment's status. Standing is checked before legality so an
// unauthorized caller learns nothing about the appointment's state.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Actor, ActorRole};

use doctor_cell::models::day_of_week;
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::SpecialtyStore;

use crate::events::{AppointmentEvent, EventPort};
use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CancelAppointmentRequest,
    RescheduleAppointmentRequest,
};
use crate::store::{AppointmentStore, StoreError};

/// Legal target statuses from a given status. Terminal states have none.
pub fn valid_transitions(status: AppointmentStatus) -> &'static [AppointmentStatus] {
    match status {
        AppointmentStatus::Pending => &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled],
        AppointmentStatus::Confirmed => {
            &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
        }
        AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
    }
}

pub struct AppointmentLifecycleService {
    appointments: Arc<dyn AppointmentStore>,
    specialties: Arc<dyn SpecialtyStore>,
    availability: AvailabilityService,
    events: Arc<dyn EventPort>,
    config: AppConfig,
}

impl AppointmentLifecycleService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        specialties: Arc<dyn SpecialtyStore>,
        availability: AvailabilityService,
        events: Arc<dyn EventPort>,
        config: AppConfig,
    ) -> Self {
        Self {
            appointments,
            specialties,
            availability,
            events,
            config,
        }
    }

    /// Confirm a pending appointment. The appointment's doctor or any staff
    /// member may confirm.
    pub async fn confirm(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Confirming appointment {}", appointment_id);
        let mut appointment = self.appointments.get(appointment_id).await?;

        let is_own_doctor =
            actor.role == ActorRole::Doctor && actor.id == appointment.doctor_id;
        if !is_own_doctor && !actor.is_staff() {
            return Err(AppointmentError::Forbidden);
        }

        let previous_status = appointment.status;
        self.ensure_transition(&appointment, AppointmentStatus::Confirmed)?;

        appointment.status = AppointmentStatus::Confirmed;
        appointment.updated_at = Utc::now();
        let confirmed = self.appointments.update(appointment).await?;

        self.events
            .emit(AppointmentEvent::AppointmentConfirmed {
                appointment_id: confirmed.id,
                doctor_id: confirmed.doctor_id,
                patient_id: confirmed.patient_id,
                specialty_id: confirmed.specialty_id,
                date: confirmed.appointment_date,
                time: confirmed.appointment_time,
                previous_status,
                actor_id: actor.id,
            })
            .await;

        info!("Appointment {} confirmed", confirmed.id);
        Ok(confirmed)
    }

    /// Cancel an active appointment. The owning patient, the appointment's
    /// doctor, or any staff member may cancel; the cancellation audit fields
    /// are written here, once.
    pub async fn cancel(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment {}", appointment_id);
        if request.reason.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "cancellation reason must not be empty".to_string(),
            ));
        }

        let mut appointment = self.appointments.get(appointment_id).await?;

        let is_own_patient =
            actor.role == ActorRole::Patient && actor.id == appointment.patient_id;
        let is_own_doctor =
            actor.role == ActorRole::Doctor && actor.id == appointment.doctor_id;
        if !is_own_patient && !is_own_doctor && !actor.is_staff() {
            return Err(AppointmentError::Forbidden);
        }

        let previous_status = appointment.status;
        self.ensure_transition(&appointment, AppointmentStatus::Cancelled)?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = Some(request.reason.clone());
        appointment.cancelled_by = Some(actor.id);
        appointment.cancelled_at = Some(Utc::now());
        appointment.updated_at = Utc::now();
        let cancelled = self.appointments.update(appointment).await?;

        self.events
            .emit(AppointmentEvent::AppointmentCancelled {
                appointment_id: cancelled.id,
                doctor_id: cancelled.doctor_id,
                patient_id: cancelled.patient_id,
                specialty_id: cancelled.specialty_id,
                date: cancelled.appointment_date,
                time: cancelled.appointment_time,
                previous_status,
                actor_id: actor.id,
                reason: request.reason,
            })
            .await;

        info!("Appointment {} cancelled", cancelled.id);
        Ok(cancelled)
    }

    /// Complete a confirmed appointment. Only the doctor who owns the
    /// appointment may complete it.
    pub async fn complete(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Completing appointment {}", appointment_id);
        let mut appointment = self.appointments.get(appointment_id).await?;

        if actor.role != ActorRole::Doctor || actor.id != appointment.doctor_id {
            return Err(AppointmentError::Forbidden);
        }

        let previous_status = appointment.status;
        self.ensure_transition(&appointment, AppointmentStatus::Completed)?;

        appointment.status = AppointmentStatus::Completed;
        appointment.updated_at = Utc::now();
        let completed = self.appointments.update(appointment).await?;

        self.events
            .emit(AppointmentEvent::AppointmentCompleted {
                appointment_id: completed.id,
                doctor_id: completed.doctor_id,
                patient_id: completed.patient_id,
                specialty_id: completed.specialty_id,
                date: completed.appointment_date,
                time: completed.appointment_time,
                previous_status,
                actor_id: actor.id,
            })
            .await;

        info!("Appointment {} completed", completed.id);
        Ok(completed)
    }

    /// Move an active appointment to a new date/time. Rescheduling is
    /// logically "cancel the old slot, book the new one": the new slot goes
    /// through the same alignment, conflict and capacity checks as a fresh
    /// booking, atomically at the store, and the appointment re-enters
    /// `pending` regardless of its prior status. On any failure the
    /// original record is unchanged.
    pub async fn reschedule(
        &self,
        actor: &Actor,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Rescheduling appointment {} to {} {}",
            appointment_id, request.new_date, request.new_time
        );
        let appointment = self.appointments.get(appointment_id).await?;

        let is_own_patient =
            actor.role == ActorRole::Patient && actor.id == appointment.patient_id;
        if !is_own_patient && !actor.is_staff() {
            return Err(AppointmentError::Forbidden);
        }

        if !appointment.status.is_active() {
            warn!(
                "Reschedule of appointment {} rejected in status {}",
                appointment_id, appointment.status
            );
            return Err(AppointmentError::InvalidTransition {
                from: appointment.status,
            });
        }

        let specialty = self
            .specialties
            .get(appointment.specialty_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::SpecialtyNotFound)?;

        let weekday = day_of_week(request.new_date);
        let window = self
            .availability
            .window_covering(appointment.doctor_id, weekday, request.new_time)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?;
        if window.is_none() {
            return Err(AppointmentError::SlotNotOffered);
        }

        let previous_status = appointment.status;
        let previous_date = appointment.appointment_date;
        let previous_time = appointment.appointment_time;

        let moved = self
            .reslot_with_retry(
                appointment_id,
                &request,
                specialty.daily_appointment_limit,
            )
            .await?;

        self.events
            .emit(AppointmentEvent::AppointmentRescheduled {
                appointment_id: moved.id,
                doctor_id: moved.doctor_id,
                patient_id: moved.patient_id,
                specialty_id: moved.specialty_id,
                previous_date,
                previous_time,
                date: moved.appointment_date,
                time: moved.appointment_time,
                previous_status,
                actor_id: actor.id,
            })
            .await;

        info!(
            "Appointment {} rescheduled from {} {} to {} {}",
            moved.id, previous_date, previous_time, moved.appointment_date,
            moved.appointment_time
        );
        Ok(moved)
    }

    fn ensure_transition(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        if valid_transitions(appointment.status).contains(&target) {
            Ok(())
        } else {
            warn!(
                "Invalid transition attempted on appointment {}: {} -> {}",
                appointment.id, appointment.status, target
            );
            Err(AppointmentError::InvalidTransition {
                from: appointment.status,
            })
        }
    }

    async fn reslot_with_retry(
        &self,
        appointment_id: Uuid,
        request: &RescheduleAppointmentRequest,
        daily_limit: i32,
    ) -> Result<Appointment, AppointmentError> {
        let attempts = self.config.max_booking_attempts.max(1);

        for attempt in 1..=attempts {
            match self
                .appointments
                .reslot(
                    appointment_id,
                    request.new_date,
                    request.new_time,
                    AppointmentStatus::Pending,
                    daily_limit,
                )
                .await
            {
                Ok(moved) => return Ok(moved),
                Err(StoreError::Contention(cause)) if attempt < attempts => {
                    warn!(
                        "Reschedule contention for appointment {} (attempt {}/{}): {}",
                        appointment_id, attempt, attempts, cause
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        self.config.booking_retry_backoff_ms * attempt as u64,
                    ))
                    .await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppointmentError::StorageError(
            "reschedule not committed after retries".to_string(),
        ))
    }
}
