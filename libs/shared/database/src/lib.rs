pub mod rest;
pub mod store;

pub use rest::RestAppointmentStore;
pub use store::AppointmentStore;
