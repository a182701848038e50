//! Session state machine.

use crate::model::user::User;

/// Current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Session restore has not completed yet.
    #[default]
    Loading,
    Anonymous,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Loading | Self::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Anonymous => "anonymous",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

/// Events that move the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Startup restore finished with the persisted user, if any.
    Restored(Option<User>),
    LoggedIn(User),
    Registered(User),
    LoggedOut,
}

/// Pure transition function.
///
/// `Restored` only applies while `Loading`; once restore has completed a
/// late restore result is ignored.
pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match (state, action) {
        (AuthState::Loading, AuthAction::Restored(Some(user))) => AuthState::Authenticated(user),
        (AuthState::Loading, AuthAction::Restored(None)) => AuthState::Anonymous,
        (state, AuthAction::Restored(_)) => state,
        (_, AuthAction::LoggedIn(user) | AuthAction::Registered(user)) => {
            AuthState::Authenticated(user)
        }
        (_, AuthAction::LoggedOut) => AuthState::Anonymous,
    }
}
