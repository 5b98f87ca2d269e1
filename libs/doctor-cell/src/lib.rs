pub mod models;
pub mod services;
pub mod store;

pub use models::*;
pub use services::*;
pub use store::{
    AvailabilityStore, BookedSlotSource, DoctorStore, InMemoryAvailabilityStore,
    InMemoryDoctorStore, InMemorySpecialtyStore, SpecialtyStore,
};
