//! Repositories for database operations

pub mod category;
pub mod event;
pub mod participant;
pub mod rsvp;
pub mod user;

// Re-export for convenience
pub use category::CategoryRepository;
pub use event::{DashboardStats, EventFilters, EventRecord, EventRepository};
pub use participant::{ParticipantRecord, ParticipantRepository};
pub use rsvp::RsvpRepository;
pub use user::{ProfileChanges, UserRepository};
