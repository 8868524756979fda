//! The authenticated caller, as handed over by the login layer.

/// Immutable identity of the caller.
///
/// Built once when a login succeeds and passed by reference into every
/// operation that acts on behalf of someone. The engine never looks identity
/// up from ambient request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: i32,
    email: String,
    is_admin: bool,
}

impl Principal {
    pub fn student(user_id: i32, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            is_admin: false,
        }
    }

    pub fn administrator(user_id: i32, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            is_admin: true,
        }
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    /// Address used for the booking confirmation notice.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}
