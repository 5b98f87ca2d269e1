// libs/doctor-cell/src/services/slots.rs
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{day_of_week, DaySlot};
use crate::services::availability::AvailabilityService;
use crate::store::BookedSlotSource;

/// Derives the bookable slots for a doctor on a concrete calendar date from
/// the recurring availability windows, masking slots held by active
/// appointments.
pub struct SlotGenerationService {
    availability: AvailabilityService,
    booked: Arc<dyn BookedSlotSource>,
}

impl SlotGenerationService {
    pub fn new(availability: AvailabilityService, booked: Arc<dyn BookedSlotSource>) -> Self {
        Self {
            availability,
            booked,
        }
    }

    /// Candidate slots for the date, ascending by time, one entry per
    /// distinct time even when overlapping windows repeat it. Pure with
    /// respect to a consistent snapshot of availability and bookings; no
    /// writes.
    pub async fn generate_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<DaySlot>> {
        let weekday = day_of_week(date);
        let windows = self.availability.windows_for(doctor_id, weekday).await?;

        let mut candidates: BTreeSet<NaiveTime> = BTreeSet::new();
        for window in &windows {
            if window.slot_duration_minutes <= 0 {
                warn!(
                    "Availability window {} has non-positive slot duration, skipping",
                    window.id
                );
                continue;
            }
            candidates.extend(window.slot_times());
        }

        if candidates.is_empty() {
            debug!("No candidate slots for doctor {} on {}", doctor_id, date);
            return Ok(Vec::new());
        }

        let taken: HashSet<NaiveTime> = self
            .booked
            .active_times(doctor_id, date)
            .await?
            .into_iter()
            .collect();

        let slots: Vec<DaySlot> = candidates
            .into_iter()
            .map(|time| DaySlot {
                time,
                available: !taken.contains(&time),
            })
            .collect();

        debug!(
            "Generated {} slots ({} taken) for doctor {} on {}",
            slots.len(),
            taken.len(),
            doctor_id,
            date
        );
        Ok(slots)
    }
}
