use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_booking_attempts: u32,
    pub booking_retry_backoff_ms: u64,
    pub event_channel_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            max_booking_attempts: parse_var("SCHEDULING_MAX_BOOKING_ATTEMPTS", 3),
            booking_retry_backoff_ms: parse_var("SCHEDULING_RETRY_BACKOFF_MS", 100),
            event_channel_capacity: parse_var("SCHEDULING_EVENT_CHANNEL_CAPACITY", 256),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_booking_attempts: 3,
            booking_retry_backoff_ms: 100,
            event_channel_capacity: 256,
        }
    }
}

fn parse_var<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default", name);
            default
        }),
        Err(_) => default,
    }
}
