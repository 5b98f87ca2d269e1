pub mod events;
pub mod models;
pub mod services;
pub mod store;

// Re-export the models and services for external use
pub use events::{AppointmentEvent, BroadcastEventPort, EventPort, RecordingEventPort};
pub use models::*;
pub use services::*;
pub use store::{AppointmentStore, InMemoryAppointmentStore, StoreError};
