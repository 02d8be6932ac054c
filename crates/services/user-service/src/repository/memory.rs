//! In-memory user repository.
//!
//! Follows the same contract as [`UserStore`](super::UserStore), including
//! the unique email index of the relational schema, so the service layer can
//! be exercised (and run locally) without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::DbErr;
use tokio::sync::RwLock;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{NewUser, User};

use super::UserRepository;

/// Stored record plus its insertion sequence, used to break ties between
/// users created within the same microsecond.
#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    user: User,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, Entry>,
    next_seq: u64,
}

impl Inner {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|e| e.user.email == email && Some(e.user.id) != except)
    }
}

fn unique_violation(email: &str) -> AppError {
    AppError::Database(DbErr::Custom(format!(
        "duplicate key value violates unique constraint \"idx_users_email\": {}",
        email
    )))
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        if inner.email_taken(&user.email, None) {
            return Err(unique_violation(&user.email));
        }

        let user = user.into_user(Uuid::new_v4());
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.users.insert(
            user.id,
            Entry {
                seq,
                user: user.clone(),
            },
        );

        Ok(user)
    }

    async fn get(&self, id: Uuid) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner.users.get(&id).map(|e| e.user.clone()).ok_or_not_found()
    }

    async fn get_by_email(&self, email: &str) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .find(|e| e.user.email == email)
            .map(|e| e.user.clone())
            .ok_or_not_found()
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&user.id) {
            return Err(AppError::NotFound);
        }
        if inner.email_taken(&user.email, Some(user.id)) {
            return Err(unique_violation(&user.email));
        }

        let entry = inner.users.get_mut(&user.id).ok_or_not_found()?;
        entry.user.name = user.name.clone();
        entry.user.email = user.email.clone();
        entry.user.updated_at = user.updated_at;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.users.remove(&id).map(|_| ()).ok_or_not_found()
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;

        let mut entries: Vec<&Entry> = inner.users.values().collect();
        entries.sort_by(|a, b| {
            b.user
                .created_at
                .cmp(&a.user.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(entries.into_iter().map(|e| e.user.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser::new(name.to_string(), email.to_string(), "password123".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_round_trips() {
        let store = InMemoryUserStore::new();
        let input = new_user("John Doe", "john@example.com");

        let created = store.create(input.clone()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();

        assert!(!created.id.is_nil());
        assert_eq!(fetched, input.into_user(created.id));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryUserStore::new();

        assert!(store.get(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(store
            .get_by_email("nobody@example.com")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_storage_error() {
        let store = InMemoryUserStore::new();
        store.create(new_user("A", "same@example.com")).await.unwrap();

        let err = store
            .create(new_user("B", "same@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_writes_profile_fields_only() {
        let store = InMemoryUserStore::new();
        let mut user = store.create(new_user("A", "a@example.com")).await.unwrap();

        user.update("A2".to_string(), "a2@example.com".to_string())
            .unwrap();
        user.password = "ignored-by-update".to_string();
        store.update(&user).await.unwrap();

        let stored = store.get(user.id).await.unwrap();
        assert_eq!(stored.name, "A2");
        assert_eq!(stored.email, "a2@example.com");
        assert_eq!(stored.updated_at, user.updated_at);
        assert_eq!(stored.password, "password123");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let store = InMemoryUserStore::new();
        let ghost = new_user("Ghost", "ghost@example.com").into_user(Uuid::new_v4());

        assert!(store.update(&ghost).await.unwrap_err().is_not_found());
        assert!(store.delete(ghost.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryUserStore::new();
        assert!(store.list().await.unwrap().is_empty());

        let a = store.create(new_user("A", "a@example.com")).await.unwrap();
        let b = store.create(new_user("B", "b@example.com")).await.unwrap();
        let c = store.create(new_user("C", "c@example.com")).await.unwrap();

        let ids: Vec<Uuid> = store.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }
}
