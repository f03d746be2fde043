//! User operations: forwarding plus the registration and login flows.

use shopfront_shared::{auth, UserId};
use shopfront_store::{LiveQuery, Store, StoreError, TableChange, User};

/// Outcome of a registration attempt.
///
/// Duplicate emails and unexpected insert failures collapse into the same
/// signal; callers only ever distinguish success from rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(UserId),
    DuplicateEmail,
}

#[derive(Clone)]
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Live view over all users.
    pub async fn all_users(&self) -> Result<LiveQuery<Vec<User>>, StoreError> {
        LiveQuery::spawn(self.store.clone(), &[TableChange::Users], |db| {
            db.list_users()
        })
        .await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.store.with(move |db| db.get_user(id)).await
    }

    pub async fn get_user_by_email(&self, email: String) -> Result<Option<User>, StoreError> {
        self.store
            .with(move |db| db.get_user_by_email(&email))
            .await
    }

    pub async fn email_exists(&self, email: String) -> Result<bool, StoreError> {
        self.store.with(move |db| db.email_exists(&email)).await
    }

    /// The user matching `email` and `password`, if the credentials are good.
    pub async fn login(&self, email: String, password: String) -> Result<Option<User>, StoreError> {
        let password_hash = auth::hash_password(&password);
        self.store
            .with(move |db| db.check_credentials(&email, &password_hash))
            .await
    }

    /// Register a new account.
    ///
    /// The email is checked first; a taken email reports `DuplicateEmail`
    /// without touching the table.  An insert that fails anyway (e.g. a
    /// concurrent registration winning the race) reports the same outcome.
    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<RegisterOutcome, StoreError> {
        let password_hash = auth::hash_password(&password);
        self.store
            .with(move |db| {
                if db.email_exists(&email)? {
                    return Ok(RegisterOutcome::DuplicateEmail);
                }

                match db.insert_user(&User::new(name, email, password_hash)) {
                    Ok(id) => Ok(RegisterOutcome::Created(id)),
                    Err(e) => {
                        tracing::warn!(error = %e, "user insert failed");
                        Ok(RegisterOutcome::DuplicateEmail)
                    }
                }
            })
            .await
    }

    pub async fn update_user(&self, user: User) -> Result<(), StoreError> {
        self.store.with(move |db| db.update_user(&user)).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.store.with(move |db| db.delete_user(id)).await
    }

    pub async fn set_user_active(&self, id: UserId, is_active: bool) -> Result<(), StoreError> {
        self.store
            .with(move |db| db.set_user_active(id, is_active))
            .await
    }
}
