//! Login and registration state.

use serde::Serialize;
use tokio::sync::watch;

use shopfront_store::{Store, User};

use crate::repository::{RegisterOutcome, UserRepository};

/// Authentication flow states.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Loading,
    Success,
    Error,
}

pub struct AuthViewModel {
    repository: UserRepository,
    current_user: watch::Sender<Option<User>>,
    auth_state: watch::Sender<AuthState>,
    error_message: watch::Sender<Option<String>>,
}

impl AuthViewModel {
    pub fn new(store: Store) -> Self {
        Self {
            repository: UserRepository::new(store),
            current_user: watch::Sender::new(None),
            auth_state: watch::Sender::new(AuthState::Idle),
            error_message: watch::Sender::new(None),
        }
    }

    pub fn current_user(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.auth_state.subscribe()
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.error_message.subscribe()
    }

    /// Attempt to sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) {
        self.auth_state.send_replace(AuthState::Loading);

        if email.trim().is_empty() || password.is_empty() {
            self.fail("Email and password are required");
            return;
        }

        match self
            .repository
            .login(email.to_string(), password.to_string())
            .await
        {
            Ok(Some(user)) => {
                self.current_user.send_replace(Some(user));
                self.error_message.send_replace(None);
                self.auth_state.send_replace(AuthState::Success);
            }
            Ok(None) => self.fail("Invalid email or password"),
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.fail(&format!("Could not sign in: {e}"));
            }
        }
    }

    /// Register a new account and, on success, sign it in directly.
    pub async fn register(&self, name: &str, email: &str, password: &str) {
        self.auth_state.send_replace(AuthState::Loading);

        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            self.fail("All fields are required");
            return;
        }
        if !is_valid_email(email) {
            self.fail("Invalid email address");
            return;
        }
        if password.len() < 6 {
            self.fail("Password must be at least 6 characters");
            return;
        }

        match self
            .repository
            .register(name.to_string(), email.to_string(), password.to_string())
            .await
        {
            Ok(RegisterOutcome::Created(_)) => self.login(email, password).await,
            Ok(RegisterOutcome::DuplicateEmail) => self.fail("Email is already registered"),
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.fail(&format!("Could not register: {e}"));
            }
        }
    }

    /// Drop the signed-in user and reset the flow.
    pub fn logout(&self) {
        self.current_user.send_replace(None);
        self.auth_state.send_replace(AuthState::Idle);
        self.error_message.send_replace(None);
    }

    /// Clear the error message; an Error state falls back to Idle.
    pub fn clear_error(&self) {
        self.error_message.send_replace(None);
        if *self.auth_state.borrow() == AuthState::Error {
            self.auth_state.send_replace(AuthState::Idle);
        }
    }

    fn fail(&self, message: &str) {
        self.error_message.send_replace(Some(message.to_string()));
        self.auth_state.send_replace(AuthState::Error);
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
