pub mod availability;
pub mod booking;
pub mod parsing;
pub mod policy;
pub mod slots;
pub mod store;
pub mod validator;

pub use availability::AvailabilityService;
pub use booking::AppointmentBookingService;
pub use slots::SlotCalculator;
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
pub use validator::BookingValidator;
