//! Domain models for the Evently API service

pub mod category;
pub mod event;
pub mod participant;
pub mod role;
pub mod rsvp;
pub mod session;
pub mod user;

// Re-export for convenience
pub use category::Category;
pub use event::{Event, EventSummary, EventWindow};
pub use participant::Participant;
pub use role::Role;
pub use rsvp::{Rsvp, RsvpStatus};
pub use session::Session;
pub use user::{NewUser, User};
