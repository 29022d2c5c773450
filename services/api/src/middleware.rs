//! Authentication middleware and the authorization gate
//!
//! The middleware resolves the bearer session token into an [`AuthUser`] and
//! threads it through request extensions, so every protected handler works
//! against an explicit actor value instead of ambient request state.

use axum::{
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Event, Role},
    state::AppState,
};

/// Authenticated actor resolved from a session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub is_superuser: bool,
}

impl AuthUser {
    /// Admins and superusers bypass ownership checks
    pub fn is_elevated(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Organizer | Role::Participant => self.is_superuser,
        }
    }

    /// Role gate: grants when the actor holds one of the named roles or is
    /// a superuser; otherwise fails with a 403 (never a silent no-op).
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.is_superuser || allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Ownership layer for event mutations, checked on top of the role
    /// gate: the actor must have created the event or be elevated.
    pub fn can_modify_event(&self, event: &Event) -> bool {
        self.is_elevated() || event.created_by == Some(self.id)
    }

    /// Whether creations by this actor should be stamped as owned. Only
    /// plain organizers own their events; admin and superuser creations
    /// carry no owner.
    pub fn stamps_ownership(&self) -> bool {
        match self.role {
            Role::Organizer => !self.is_superuser,
            Role::Admin | Role::Participant => false,
        }
    }
}

/// Extract the bearer session token from the request headers
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthenticated)?;

    // Resolve the session; unknown and expired tokens share the same path.
    let session = state
        .sessions
        .find_valid(token)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let actor = AuthUser {
        id: user.id,
        username: user.username,
        role: user.role,
        is_superuser: user.is_superuser,
    };

    // Insert the actor into the request extensions
    req.extensions_mut().insert(actor);

    let response = next.run(req).await;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn actor(role: Role, is_superuser: bool) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "actor".to_string(),
            role,
            is_superuser,
        }
    }

    fn event_owned_by(creator: Option<Uuid>) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Intro to Rust".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            location: "Main hall".to_string(),
            category_id: Uuid::new_v4(),
            created_by: creator,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn role_gate_grants_and_denies() {
        let organizer = actor(Role::Organizer, false);
        assert!(organizer.require_any(&[Role::Admin, Role::Organizer]).is_ok());
        assert!(matches!(
            organizer.require_any(&[Role::Admin]),
            Err(ApiError::Forbidden)
        ));

        let participant = actor(Role::Participant, false);
        assert!(matches!(
            participant.require_any(&[Role::Admin, Role::Organizer]),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn superuser_bypasses_the_role_gate() {
        let superuser = actor(Role::Participant, true);
        assert!(superuser.require_any(&[Role::Admin]).is_ok());
        assert!(superuser.is_elevated());
    }

    #[test]
    fn ownership_layers_on_top_of_the_role_check() {
        let organizer = actor(Role::Organizer, false);
        let own = event_owned_by(Some(organizer.id));
        let other = event_owned_by(Some(Uuid::new_v4()));
        let unowned = event_owned_by(None);

        assert!(organizer.can_modify_event(&own));
        assert!(!organizer.can_modify_event(&other));
        assert!(!organizer.can_modify_event(&unowned));

        let admin = actor(Role::Admin, false);
        assert!(admin.can_modify_event(&other));
        assert!(admin.can_modify_event(&unowned));
    }

    #[test]
    fn only_plain_organizers_stamp_ownership() {
        assert!(actor(Role::Organizer, false).stamps_ownership());
        assert!(!actor(Role::Organizer, true).stamps_ownership());
        assert!(!actor(Role::Admin, false).stamps_ownership());
        assert!(!actor(Role::Participant, false).stamps_ownership());
    }
}
