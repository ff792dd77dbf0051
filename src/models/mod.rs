pub mod booking;
pub mod customer;
pub mod show;
pub mod venue;

pub use booking::{Booking, BookingStatus};
pub use customer::Customer;
pub use show::Show;
pub use venue::Venue;
