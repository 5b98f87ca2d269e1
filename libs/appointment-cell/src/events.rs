// libs/appointment-cell/src/events.rs
//
// Outbound domain events. The engine only emits; deciding who to notify and
// how is the notification subsystem's job.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AppointmentEvent {
    AppointmentCreated {
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        status: AppointmentStatus,
        actor_id: Uuid,
    },
    AppointmentConfirmed {
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        previous_status: AppointmentStatus,
        actor_id: Uuid,
    },
    AppointmentCancelled {
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        previous_status: AppointmentStatus,
        actor_id: Uuid,
        reason: String,
    },
    AppointmentCompleted {
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        previous_status: AppointmentStatus,
        actor_id: Uuid,
    },
    AppointmentRescheduled {
        appointment_id: Uuid,
        doctor_id: Uuid,
        patient_id: Uuid,
        specialty_id: Uuid,
        previous_date: NaiveDate,
        previous_time: NaiveTime,
        date: NaiveDate,
        time: NaiveTime,
        previous_status: AppointmentStatus,
        actor_id: Uuid,
    },
}

impl AppointmentEvent {
    pub fn appointment_id(&self) -> Uuid {
        match self {
            AppointmentEvent::AppointmentCreated { appointment_id, .. }
            | AppointmentEvent::AppointmentConfirmed { appointment_id, .. }
            | AppointmentEvent::AppointmentCancelled { appointment_id, .. }
            | AppointmentEvent::AppointmentCompleted { appointment_id, .. }
            | AppointmentEvent::AppointmentRescheduled { appointment_id, .. } => *appointment_id,
        }
    }
}

/// Outbound port for domain events. Emission is fire-and-forget from the
/// engine's perspective.
#[async_trait]
pub trait EventPort: Send + Sync {
    async fn emit(&self, event: AppointmentEvent);
}

/// Fan-out over a tokio broadcast channel; the notification subsystem
/// subscribes. A send with no live subscribers is dropped.
pub struct BroadcastEventPort {
    sender: broadcast::Sender<AppointmentEvent>,
}

impl BroadcastEventPort {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppointmentEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPort for BroadcastEventPort {
    async fn emit(&self, event: AppointmentEvent) {
        if self.sender.send(event).is_err() {
            debug!("No event subscribers, dropping appointment event");
        }
    }
}

/// Test double that records everything emitted.
#[derive(Default)]
pub struct RecordingEventPort {
    events: Mutex<Vec<AppointmentEvent>>,
}

impl RecordingEventPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<AppointmentEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPort for RecordingEventPort {
    async fn emit(&self, event: AppointmentEvent) {
        self.events.lock().unwrap().push(event);
    }
}
