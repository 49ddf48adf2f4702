use std::sync::Arc;

use async_trait::async_trait;
use models::user::User;

use crate::errors::ServiceError;
use crate::storage::DocStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ServiceError>;
    async fn save(&self, user: User) -> Result<User, ServiceError>;
}

/// Document-store-backed user lookup.
pub struct DocUserRepository {
    store: Arc<DocStore<User>>,
}

impl DocUserRepository {
    pub fn new(store: Arc<DocStore<User>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for DocUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ServiceError> {
        Ok(self.store.get(id).await)
    }

    async fn save(&self, user: User) -> Result<User, ServiceError> {
        self.store.insert(user.id.clone(), user.clone()).await?;
        Ok(user)
    }
}
