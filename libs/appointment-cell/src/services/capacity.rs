// libs/appointment-cell/src/services/capacity.rs
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use doctor_cell::store::SpecialtyStore;

use crate::models::AppointmentError;
use crate::store::AppointmentStore;

/// Daily-capacity check for a specialty: one more active appointment may be
/// created on a date while the active count is below the specialty's
/// configured limit.
///
/// This is a point-in-time read. The authoritative enforcement happens
/// inside the store's atomic create/reslot; callers use this service for an
/// early typed answer, never as the final word under concurrency.
pub struct DailyCapacityService {
    specialties: Arc<dyn SpecialtyStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl DailyCapacityService {
    pub fn new(specialties: Arc<dyn SpecialtyStore>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            specialties,
            appointments,
        }
    }

    pub async fn has_capacity(
        &self,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, AppointmentError> {
        Ok(self.remaining_capacity(specialty_id, date).await? > 0)
    }

    /// Remaining active-appointment headroom for the specialty on `date`,
    /// clamped at zero.
    pub async fn remaining_capacity(
        &self,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> Result<i32, AppointmentError> {
        let specialty = self
            .specialties
            .get(specialty_id)
            .await
            .map_err(|e| AppointmentError::StorageError(e.to_string()))?
            .ok_or(AppointmentError::SpecialtyNotFound)?;

        let active = self
            .appointments
            .active_count_for_specialty_date(specialty_id, date)
            .await? as i32;

        debug!(
            "Specialty {} has {}/{} active appointments on {}",
            specialty_id, active, specialty.daily_appointment_limit, date
        );
        Ok((specialty.daily_appointment_limit - active).max(0))
    }
}
