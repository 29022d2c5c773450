//! Application state shared across handlers

use crate::activation::ActivationTokenService;
use crate::rate_limiter::LoginThrottle;
use crate::repositories::{
    CategoryRepository, EventRepository, ParticipantRepository, RsvpRepository, UserRepository,
};
use crate::session::SessionService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub events: EventRepository,
    pub participants: ParticipantRepository,
    pub rsvps: RsvpRepository,
    pub sessions: SessionService,
    pub activation: ActivationTokenService,
    pub login_throttle: LoginThrottle,
}
