pub mod booking;
pub mod capacity;
pub mod lifecycle;

pub use booking::AppointmentBookingService;
pub use capacity::DailyCapacityService;
pub use lifecycle::AppointmentLifecycleService;
