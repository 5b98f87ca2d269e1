// libs/appointment-cell/src/services/booking.rs
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{Actor, ActorRole};

use doctor_cell::models::day_of_week;
use doctor_cell::services::AvailabilityService;
use doctor_cell::store::{DoctorStore, SpecialtyStore};

use crate::events::{AppointmentEvent, EventPort};
use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookedBy,
};
use crate::services::capacity::DailyCapacityService;
use crate::store::{AppointmentStore, StoreError};

pub struct AppointmentBookingService {
    doctors: Arc<dyn DoctorStore>,
    specialties: Arc<dyn SpecialtyStore>,
    availability: AvailabilityService,
    appointments: Arc<dyn AppointmentStore>,
    capacity: DailyCapacityService,
    events: Arc<dyn EventPort>,
    config: AppConfig,
}

impl AppointmentBookingService {
    pub fn new(
        doctors: Arc<dyn DoctorStore>,
        specialties: Arc<dyn SpecialtyStore>,
        availability: AvailabilityService,
        appointments: Arc<dyn AppointmentStore>,
        events: Arc<dyn EventPort>,
        config: AppConfig,
    ) -> Self {
        let capacity = DailyCapacityService::new(Arc::clone(&specialties), Arc::clone(&appointments));

        Self {
            doctors,
            specialties,
            availability,
            appointments,
            capacity,
            events,
            config,
        }
    }

    /// Book an appointment for a patient.
    ///
    /// Preconditions are checked in order, each with its own typed failure:
    /// the specialty and doctor must exist, the requested time must sit on
    /// an active availability window's slot grid, the slot must be free and
    /// the specialty must have daily capacity left. The conflict and
    /// capacity checks are re-run atomically by the store at insert time, so
    /// concurrent bookings cannot both pass them.
    pub async fn book(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {} on {} {}",
            request.patient_id, request.doctor_id, request.appointment_date,
            request.appointment_time
        );

        self.validate_request(actor, &request)?;

        let specialty = self
            .specialties
            .get(request.specialty_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::SpecialtyNotFound)?;

        let doctor = self
            .doctors
            .get(request.doctor_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::DoctorNotFound)?;
        if !doctor.is_active {
            return Err(AppointmentError::DoctorNotFound);
        }

        let weekday = day_of_week(request.appointment_date);
        let window = self
            .availability
            .window_covering(request.doctor_id, weekday, request.appointment_time)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?;
        if window.is_none() {
            warn!(
                "Doctor {} does not offer a {} slot on day {}",
                request.doctor_id, request.appointment_time, weekday
            );
            return Err(AppointmentError::SlotNotOffered);
        }

        // Early typed answers; the store repeats both checks atomically.
        let active = self
            .appointments
            .active_for_doctor_date(request.doctor_id, request.appointment_date)
            .await?;
        if active
            .iter()
            .any(|a| a.appointment_time == request.appointment_time)
        {
            return Err(AppointmentError::SlotConflict);
        }
        if !self
            .capacity
            .has_capacity(request.specialty_id, request.appointment_date)
            .await?
        {
            return Err(AppointmentError::CapacityExceeded);
        }

        let now = Utc::now();
        let status = if actor.can_auto_confirm() {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };
        let booked_by = if actor.role == ActorRole::Patient && actor.id == request.patient_id {
            BookedBy::SelfService
        } else {
            BookedBy::Staff { staff_id: actor.id }
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            specialty_id: request.specialty_id,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            duration_minutes: specialty.average_consultation_duration_minutes,
            status,
            reason: request.reason,
            notes: request.notes,
            booked_by,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .create_with_retry(appointment, specialty.daily_appointment_limit)
            .await?;

        self.events
            .emit(AppointmentEvent::AppointmentCreated {
                appointment_id: created.id,
                doctor_id: created.doctor_id,
                patient_id: created.patient_id,
                specialty_id: created.specialty_id,
                date: created.appointment_date,
                time: created.appointment_time,
                status: created.status,
                actor_id: actor.id,
            })
            .await;

        info!(
            "Appointment {} booked with doctor {} ({})",
            created.id, created.doctor_id, created.status
        );
        Ok(created)
    }

    fn validate_request(
        &self,
        actor: &Actor,
        request: &BookAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        if request.reason.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "reason must not be empty".to_string(),
            ));
        }
        // Patients book for themselves only.
        if actor.role == ActorRole::Patient && actor.id != request.patient_id {
            return Err(AppointmentError::Forbidden);
        }
        Ok(())
    }

    /// Commit through the store, retrying only transient contention with
    /// linear backoff. Slot and capacity violations surface immediately as
    /// their typed errors.
    async fn create_with_retry(
        &self,
        appointment: Appointment,
        daily_limit: i32,
    ) -> Result<Appointment, AppointmentError> {
        let attempts = self.config.max_booking_attempts.max(1);

        for attempt in 1..=attempts {
            match self
                .appointments
                .create(appointment.clone(), daily_limit)
                .await
            {
                Ok(created) => return Ok(created),
                Err(StoreError::Contention(cause)) if attempt < attempts => {
                    warn!(
                        "Booking contention for doctor {} (attempt {}/{}): {}",
                        appointment.doctor_id, attempt, attempts, cause
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        self.config.booking_retry_backoff_ms * attempt as u64,
                    ))
                    .await;
                }
                Err(e) => {
                    warn!(
                        "Booking rejected for doctor {} at {} {}: {}",
                        appointment.doctor_id,
                        appointment.appointment_date,
                        appointment.appointment_time,
                        e
                    );
                    return Err(e.into());
                }
            }
        }

        Err(AppointmentError::StorageError(
            "booking not committed after retries".to_string(),
        ))
    }
}
