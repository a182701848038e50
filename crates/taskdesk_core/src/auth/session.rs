//! Auth session manager over the local store.
//!
//! # Invariants
//! - Every state change goes through `reduce`.
//! - Every error path leaves the state exactly as it was before the call.
//! - Login does not reveal whether the email or the password was wrong.
//! - Emails and passwords are never written to logs.

use crate::auth::state::{reduce, AuthAction, AuthState};
use crate::config::SessionConfig;
use crate::model::user::User;
use crate::repo::credential_repo::CredentialRepository;
use crate::repo::session_repo::SessionRepository;
use crate::repo::user_repo::{LocalUserRepository, UserRepository};
use crate::store::{KeyValueStore, LocalStore, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a session operation.
#[derive(Debug)]
pub enum AuthError {
    /// Unknown email or wrong password.
    InvalidCredentials,
    /// Registration email is already taken.
    UserAlreadyExists(String),
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::UserAlreadyExists(_) => write!(f, "user already exists"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidCredentials | Self::UserAlreadyExists(_) => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Session manager for one process.
pub struct AuthSession<'s, S: KeyValueStore> {
    store: &'s LocalStore<S>,
    config: SessionConfig,
    state: AuthState,
}

impl<'s, S: KeyValueStore> AuthSession<'s, S> {
    /// Creates a manager in the `Loading` state. Call `restore` next.
    pub fn new(store: &'s LocalStore<S>, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            state: AuthState::Loading,
        }
    }

    /// Creates a manager and restores the persisted session.
    pub fn start(store: &'s LocalStore<S>, config: SessionConfig) -> Result<Self, AuthError> {
        let mut session = Self::new(store, config);
        session.restore()?;
        Ok(session)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Restores the persisted session with one synchronous read.
    ///
    /// # Errors
    /// - `AuthError::Store` when the stored session is malformed; the state
    ///   stays `Loading`.
    pub fn restore(&mut self) -> Result<&AuthState, AuthError> {
        let restored = SessionRepository::new(self.store).load()?;
        self.dispatch(AuthAction::Restored(restored));
        info!(
            "event=session_restore module=auth status=ok state={}",
            self.state.label()
        );
        Ok(&self.state)
    }

    /// Authenticates with an exact email and password match.
    ///
    /// # Errors
    /// - `AuthError::InvalidCredentials` for an unknown email or a wrong
    ///   password.
    /// - `AuthError::Store` on storage failures.
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        self.simulate_latency();

        let user = LocalUserRepository::new(self.store).find_user_by_email(email)?;
        let verified = CredentialRepository::new(self.store).verify(email, password)?;
        let user = match user {
            Some(user) if verified => user,
            _ => {
                warn!(
                    "event=auth_login module=auth status=error error_code=invalid_credentials"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        SessionRepository::new(self.store).save(&user)?;
        self.dispatch(AuthAction::LoggedIn(user.clone()));
        info!("event=auth_login module=auth status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Creates an account and signs it in.
    ///
    /// A failed store write never leaves a user record behind, so the email
    /// stays available for a retry.
    ///
    /// # Errors
    /// - `AuthError::UserAlreadyExists` when `email` is already registered.
    /// - `AuthError::Store` on storage failures.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        self.simulate_latency();

        let users = LocalUserRepository::new(self.store);
        if users.find_user_by_email(email)?.is_some() {
            warn!("event=auth_register module=auth status=error error_code=user_already_exists");
            return Err(AuthError::UserAlreadyExists(email.to_string()));
        }

        // Password first: a stray entry is overwritten by the next register,
        // while a stray user record would block the email for good.
        let user = User::new(name, email);
        CredentialRepository::new(self.store).set_password(email, password)?;
        users.add_user(&user)?;
        if let Err(err) = SessionRepository::new(self.store).save(&user) {
            if let Err(rollback_err) = users.remove_user(user.id) {
                error!(
                    "event=auth_register module=auth status=error error_code=rollback_failed user_id={} error={}",
                    user.id, rollback_err
                );
            }
            return Err(err.into());
        }

        self.dispatch(AuthAction::Registered(user.clone()));
        info!("event=auth_register module=auth status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Clears the persisted session and returns to `Anonymous`.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        SessionRepository::new(self.store).clear()?;
        self.dispatch(AuthAction::LoggedOut);
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }

    fn dispatch(&mut self, action: AuthAction) {
        let current = std::mem::take(&mut self.state);
        self.state = reduce(current, action);
    }

    fn simulate_latency(&self) {
        if !self.config.simulated_latency.is_zero() {
            std::thread::sleep(self.config.simulated_latency);
        }
    }
}
