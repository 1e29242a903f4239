//! User Entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account status. Transitions one way, ACTIVE to SUSPENDED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

/// Directory user. Credentials live in the identity provider only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique key
    pub username: String,

    /// Assigned role names, without duplicates, in first-assigned order
    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub status: UserStatus,
}

impl User {
    /// New active user; duplicate role names are dropped.
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut user = Self {
            username: username.into(),
            roles: Vec::new(),
            status: UserStatus::Active,
        };
        user.assign_roles(roles);
        user
    }

    /// Append roles not already assigned, keeping order.
    pub fn assign_roles(&mut self, roles: impl IntoIterator<Item = impl Into<String>>) {
        for role in roles {
            let role = role.into();
            if !self.roles.contains(&role) {
                self.roles.push(role);
            }
        }
    }

    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
    }
}
