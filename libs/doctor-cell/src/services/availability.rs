// libs/doctor-cell/src/services/availability.rs
use anyhow::Result;
use chrono::NaiveTime;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::AvailabilityWindow;
use crate::store::AvailabilityStore;

/// Read-only view over a doctor's recurring weekly availability windows.
#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self { store }
    }

    /// Active windows for a doctor on a weekday, ordered by start time.
    /// A doctor with nothing configured that day yields an empty set; that
    /// is not an error.
    pub async fn windows_for(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityWindow>> {
        let mut windows: Vec<AvailabilityWindow> = self
            .store
            .windows_for_day(doctor_id, day_of_week)
            .await?
            .into_iter()
            .filter(|w| w.is_active)
            .collect();
        windows.sort_by_key(|w| w.start_time);

        debug!(
            "Found {} active windows for doctor {} on day {}",
            windows.len(),
            doctor_id,
            day_of_week
        );
        Ok(windows)
    }

    /// The window, if any, whose slot grid contains `time`. This is the
    /// alignment predicate behind off-grid booking rejection.
    pub async fn window_covering(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
        time: NaiveTime,
    ) -> Result<Option<AvailabilityWindow>> {
        let windows = self.windows_for(doctor_id, day_of_week).await?;
        Ok(windows.into_iter().find(|w| w.offers_slot(time)))
    }
}
