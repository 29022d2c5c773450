//! Role model and related functionality

use serde::{Deserialize, Serialize};

/// Closed set of roles an account can hold.
///
/// Role membership is a single column on the user row, not a free-form
/// group-name set; elevated access is the independent `is_superuser` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Participant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Organizer).unwrap(), "\"organizer\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
