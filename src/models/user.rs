use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::UserId;

/// Role assigned to a user at construction. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Regular,
    ModelOwner,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Regular => "regular",
            Self::ModelOwner => "model_owner",
        }
    }

    /// Returns whether this role grants `action`.
    #[must_use]
    pub const fn allows(&self, action: Action) -> bool {
        match self {
            Self::Admin => true,
            Self::Regular => matches!(action, Action::MakePrediction | Action::ViewHistory),
            Self::ModelOwner => matches!(
                action,
                Action::MakePrediction
                    | Action::ViewHistory
                    | Action::UploadModel
                    | Action::ManageModel
            ),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations gated by [`User::can_perform_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MakePrediction,
    ViewHistory,
    UploadModel,
    ManageModel,
}

impl Action {
    pub const ALL: [Self; 4] = [
        Self::MakePrediction,
        Self::ViewHistory,
        Self::UploadModel,
        Self::ManageModel,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MakePrediction => "make_prediction",
            Self::ViewHistory => "view_history",
            Self::UploadModel => "upload_model",
            Self::ManageModel => "manage_model",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    #[serde(skip_serializing, default)]
    password: String,
    role: UserRole,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl User {
    #[must_use]
    pub fn new(
        id: impl Into<UserId>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            password: password.into(),
            role,
            created_at: Utc::now(),
            is_active: true,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Opaque credential. Verification belongs to the authentication layer.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Marks the user inactive. There is no way back.
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    #[must_use]
    pub const fn can(&self, action: Action) -> bool {
        self.role.allows(action)
    }

    /// Capability check consumed by the authorization layer.
    ///
    /// Admins are granted every action name, including ones this crate does
    /// not know about. Other roles get `false` for unknown names.
    #[must_use]
    pub fn can_perform_action(&self, action: &str) -> bool {
        match self.role {
            UserRole::Admin => true,
            role => action.parse().is_ok_and(|a| role.allows(a)),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("is_active", &self.is_active)
            .finish()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User {} ({})", self.username, self.role)
    }
}
