// libs/doctor-cell/src/models.rs
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty_id: Uuid,
    pub is_active: bool,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Clinic reference data: one row per medical specialty. Maintained outside
/// the engine; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
    /// Active appointments allowed per calendar date, 1-100.
    pub daily_appointment_limit: i32,
    /// Snapshotted onto each appointment at creation, 10-120.
    pub average_consultation_duration_minutes: i32,
}

/// Recurring weekly interval during which a doctor accepts appointments,
/// subdivided into fixed-length slots. A doctor may have several windows on
/// the same day (morning/afternoon).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub is_active: bool,
}

impl AvailabilityWindow {
    /// Whether `time` sits on this window's slot grid: on a slot-duration
    /// boundary from `start_time`, with the full slot fitting before
    /// `end_time`.
    pub fn offers_slot(&self, time: NaiveTime) -> bool {
        if self.slot_duration_minutes <= 0 {
            return false;
        }
        let offset = time.signed_duration_since(self.start_time);
        if offset < chrono::Duration::zero() {
            return false;
        }
        if offset.num_seconds() % (self.slot_duration_minutes as i64 * 60) != 0 {
            return false;
        }
        let remaining = self.end_time.signed_duration_since(time);
        remaining.num_minutes() >= self.slot_duration_minutes as i64
    }

    /// All slot start times in this window, in ascending order. A trailing
    /// interval shorter than one slot is dropped.
    pub fn slot_times(&self) -> Vec<NaiveTime> {
        let mut times = Vec::new();
        if self.slot_duration_minutes <= 0 || self.start_time >= self.end_time {
            return times;
        }
        let step = chrono::Duration::minutes(self.slot_duration_minutes as i64);
        let mut cursor = self.start_time;
        loop {
            let (slot_end, wrapped) = cursor.overflowing_add_signed(step);
            if wrapped != 0 || slot_end > self.end_time {
                break;
            }
            times.push(cursor);
            cursor = slot_end;
        }
        times
    }
}

/// One candidate slot for a doctor on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub time: NaiveTime,
    pub available: bool,
}

/// Map a calendar date onto the 0 = Sunday .. 6 = Saturday scheme used by
/// `AvailabilityWindow::day_of_week`.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}
