use std::cell::RefCell;
use std::time::{Duration, Instant};
use taskdesk_core::{
    AuthError, AuthSession, AuthState, CredentialRepository, KeyValueStore, LocalStore,
    LocalUserRepository, MemoryStore, SessionConfig, SessionRepository, StoreError, StoreResult,
    User, UserRepository,
};

fn started<S: KeyValueStore>(store: &LocalStore<S>) -> AuthSession<'_, S> {
    AuthSession::start(store, SessionConfig::default()).unwrap()
}

/// Memory backend that rejects writes and removals of selected keys.
#[derive(Default)]
struct FailingStore {
    inner: MemoryStore,
    failing_keys: RefCell<Vec<&'static str>>,
}

impl FailingStore {
    fn fail_writes_to(&self, key: &'static str) {
        self.failing_keys.borrow_mut().push(key);
    }

    fn heal(&self) {
        self.failing_keys.borrow_mut().clear();
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self.failing_keys.borrow().iter().any(|failing| *failing == key) {
            return Err(StoreError::Backend(format!("write to `{key}` rejected")));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check(key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.check(key)?;
        self.inner.remove_item(key)
    }
}

#[test]
fn new_session_starts_loading_and_restores_to_anonymous() {
    let store = LocalStore::new(MemoryStore::new());
    let mut session = AuthSession::new(&store, SessionConfig::default());
    assert!(session.is_loading());

    assert_eq!(session.restore().unwrap(), &AuthState::Anonymous);
    assert!(session.current_user().is_none());
}

#[test]
fn restore_picks_up_persisted_user() {
    let store = LocalStore::new(MemoryStore::new());
    let user = User::new("Ada", "ada@x.com");
    SessionRepository::new(&store).save(&user).unwrap();

    let session = started(&store);
    assert_eq!(session.state(), &AuthState::Authenticated(user));
}

#[test]
fn malformed_session_fails_restore_and_stays_loading() {
    let store = LocalStore::new(MemoryStore::new());
    store.backend().set_item("currentUser", "not-json").unwrap();

    let mut session = AuthSession::new(&store, SessionConfig::default());
    let err = session.restore().unwrap_err();
    assert!(matches!(
        err,
        AuthError::Store(StoreError::MalformedStoredData { .. })
    ));
    assert!(session.is_loading());
}

#[test]
fn register_creates_user_credentials_and_session() {
    let store = LocalStore::new(MemoryStore::new());
    let mut session = started(&store);

    let user = session.register("Ada", "ada@x.com", "pw1").unwrap();
    assert_eq!(user.email, "ada@x.com");
    assert_eq!(user.name, "Ada");
    assert!(!user.id.is_nil());
    assert_eq!(session.state(), &AuthState::Authenticated(user.clone()));

    let users = LocalUserRepository::new(&store);
    assert_eq!(users.find_user_by_email("ada@x.com").unwrap(), Some(user.clone()));
    assert_eq!(
        CredentialRepository::new(&store)
            .password_for("ada@x.com")
            .unwrap()
            .as_deref(),
        Some("pw1")
    );
    assert_eq!(SessionRepository::new(&store).load().unwrap(), Some(user));
}

#[test]
fn duplicate_registration_fails_and_keeps_original() {
    let store = LocalStore::new(MemoryStore::new());
    let mut session = started(&store);
    let original = session.register("Ada", "ada@x.com", "pw1").unwrap();

    let err = session.register("Ada2", "ada@x.com", "pw2").unwrap_err();
    assert!(matches!(err, AuthError::UserAlreadyExists(ref email) if email == "ada@x.com"));
    assert_eq!(session.state(), &AuthState::Authenticated(original.clone()));

    let users = LocalUserRepository::new(&store).list_users().unwrap();
    assert_eq!(users, vec![original]);
    assert!(CredentialRepository::new(&store)
        .verify("ada@x.com", "pw1")
        .unwrap());
}

#[test]
fn login_requires_exact_credentials() {
    let store = LocalStore::new(MemoryStore::new());
    let registered = {
        let mut session = started(&store);
        let user = session.register("Ada", "ada@x.com", "pw1").unwrap();
        session.logout().unwrap();
        user
    };

    let mut session = started(&store);
    assert_eq!(session.state(), &AuthState::Anonymous);

    let err = session.login("ada@x.com", "wrong").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(session.state(), &AuthState::Anonymous);

    let err = session.login("ADA@x.com", "pw1").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let user = session.login("ada@x.com", "pw1").unwrap();
    assert_eq!(user, registered);
    assert_eq!(session.state(), &AuthState::Authenticated(registered.clone()));
    assert_eq!(SessionRepository::new(&store).load().unwrap(), Some(registered));
}

#[test]
fn unknown_email_and_wrong_password_are_indistinguishable() {
    let store = LocalStore::new(MemoryStore::new());
    let mut session = started(&store);
    session.register("Ada", "ada@x.com", "pw1").unwrap();
    session.logout().unwrap();

    let unknown = session.login("nobody@x.com", "pw1").unwrap_err();
    let wrong = session.login("ada@x.com", "nope").unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[test]
fn login_without_credential_entry_is_rejected() {
    let store = LocalStore::new(MemoryStore::new());
    LocalUserRepository::new(&store)
        .add_user(&User::new("Ada", "ada@x.com"))
        .unwrap();

    let mut session = started(&store);
    let err = session.login("ada@x.com", "").unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[test]
fn failed_login_keeps_existing_session() {
    let store = LocalStore::new(MemoryStore::new());
    let mut session = started(&store);
    let user = session.register("Ada", "ada@x.com", "pw1").unwrap();

    session.login("ada@x.com", "wrong").unwrap_err();
    assert_eq!(session.state(), &AuthState::Authenticated(user.clone()));
    assert_eq!(SessionRepository::new(&store).load().unwrap(), Some(user));
}

#[test]
fn logout_clears_persisted_session_for_next_startup() {
    let store = LocalStore::new(MemoryStore::new());
    {
        let mut session = started(&store);
        session.register("Ada", "ada@x.com", "pw1").unwrap();
        assert!(started(&store).is_authenticated());

        session.logout().unwrap();
        assert_eq!(session.state(), &AuthState::Anonymous);
        session.logout().unwrap();
    }

    assert!(SessionRepository::new(&store).load().unwrap().is_none());
    assert_eq!(started(&store).state(), &AuthState::Anonymous);
}

#[test]
fn simulated_latency_delays_login() {
    let store = LocalStore::new(MemoryStore::new());
    started(&store).register("Ada", "ada@x.com", "pw1").unwrap();

    let config = SessionConfig {
        simulated_latency: Duration::from_millis(30),
    };
    let mut session = AuthSession::start(&store, config).unwrap();
    let started_at = Instant::now();
    session.login("ada@x.com", "pw1").unwrap();
    assert!(started_at.elapsed() >= Duration::from_millis(30));
}

#[test]
fn register_with_failing_password_write_leaves_email_available() {
    let backend = FailingStore::default();
    let store = LocalStore::new(&backend);
    let mut session = started(&store);

    backend.fail_writes_to("passwords");
    let err = session.register("Ada", "ada@x.com", "pw1").unwrap_err();
    assert!(matches!(err, AuthError::Store(StoreError::Backend(_))));
    assert_eq!(session.state(), &AuthState::Anonymous);
    assert!(LocalUserRepository::new(&store).list_users().unwrap().is_empty());

    backend.heal();
    let user = session.register("Ada", "ada@x.com", "pw1").unwrap();
    session.logout().unwrap();
    assert_eq!(session.login("ada@x.com", "pw1").unwrap(), user);
}

#[test]
fn register_with_failing_user_write_lets_retry_replace_password() {
    let backend = FailingStore::default();
    let store = LocalStore::new(&backend);
    let mut session = started(&store);

    backend.fail_writes_to("users");
    session.register("Ada", "ada@x.com", "pw1").unwrap_err();
    assert_eq!(session.state(), &AuthState::Anonymous);
    assert!(LocalUserRepository::new(&store).list_users().unwrap().is_empty());

    backend.heal();
    session.register("Ada", "ada@x.com", "pw2").unwrap();
    session.logout().unwrap();
    assert!(matches!(
        session.login("ada@x.com", "pw1").unwrap_err(),
        AuthError::InvalidCredentials
    ));
    session.login("ada@x.com", "pw2").unwrap();
}

#[test]
fn register_with_failing_session_write_removes_new_user() {
    let backend = FailingStore::default();
    let store = LocalStore::new(&backend);
    let mut session = started(&store);

    backend.fail_writes_to("currentUser");
    let err = session.register("Ada", "ada@x.com", "pw1").unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
    assert_eq!(session.state(), &AuthState::Anonymous);
    assert!(LocalUserRepository::new(&store).list_users().unwrap().is_empty());
    assert!(SessionRepository::new(&store).load().unwrap().is_none());

    backend.heal();
    let user = session.register("Ada", "ada@x.com", "pw1").unwrap();
    assert_eq!(session.state(), &AuthState::Authenticated(user));
}

#[test]
fn login_with_failing_session_write_keeps_state() {
    let backend = FailingStore::default();
    let store = LocalStore::new(&backend);
    let mut session = started(&store);
    session.register("Ada", "ada@x.com", "pw1").unwrap();
    session.logout().unwrap();

    backend.fail_writes_to("currentUser");
    let err = session.login("ada@x.com", "pw1").unwrap_err();
    assert!(matches!(err, AuthError::Store(StoreError::Backend(_))));
    assert_eq!(session.state(), &AuthState::Anonymous);
    assert!(SessionRepository::new(&store).load().unwrap().is_none());
}

#[test]
fn logout_with_failing_session_clear_keeps_state() {
    let backend = FailingStore::default();
    let store = LocalStore::new(&backend);
    let mut session = started(&store);
    let user = session.register("Ada", "ada@x.com", "pw1").unwrap();

    backend.fail_writes_to("currentUser");
    let err = session.logout().unwrap_err();
    assert!(matches!(err, AuthError::Store(_)));
    assert_eq!(session.state(), &AuthState::Authenticated(user.clone()));
    assert_eq!(SessionRepository::new(&store).load().unwrap(), Some(user));
}
