use std::sync::Arc;

use models::user::User;

use crate::errors::ServiceError;
use crate::user::repository::UserRepository;

/// User lookup with `href` decoration.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        match self.repo.find_by_id(id).await? {
            Some(mut user) => {
                user.href = Some(format!("/users/{}", user.id));
                Ok(user)
            }
            None => Err(ServiceError::not_found("user")),
        }
    }

    /// Seeding helper used at startup and in tests.
    pub async fn save_user(&self, user: User) -> Result<User, ServiceError> {
        self.repo.save(user).await
    }
}
