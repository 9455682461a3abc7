use crate::{
    error::ApiError,
    models::{NewUser, User, UserChanges},
    repository::UserRepositoryState,
};

pub struct CreateUser {
    users: UserRepositoryState,
}

impl CreateUser {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, user: NewUser) -> Result<User, ApiError> {
        Ok(self.users.create(user).await?)
    }
}

/// Used for the uniqueness check and login, where a missing user is an expected answer.
pub struct FindUserByEmail {
    users: UserRepositoryState,
}

impl FindUserByEmail {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.find_by_email(email).await?)
    }
}

pub struct FindUserById {
    users: UserRepositoryState,
}

impl FindUserById {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, id: i32) -> Result<User, ApiError> {
        self.users
            .find_by_identifier(id)
            .await?
            .ok_or_else(ApiError::not_found)
    }
}

pub struct FindAllUsers {
    users: UserRepositoryState,
}

impl FindAllUsers {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.users.find_all().await?)
    }
}

pub struct FindAllUsersByRole {
    users: UserRepositoryState,
}

impl FindAllUsersByRole {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, role_id: i32) -> Result<Vec<User>, ApiError> {
        Ok(self.users.find_all_by_role(role_id).await?)
    }
}

pub struct UpdateUser {
    users: UserRepositoryState,
}

impl UpdateUser {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, changes: UserChanges) -> Result<User, ApiError> {
        self.users
            .update(changes)
            .await?
            .ok_or_else(ApiError::not_found)
    }
}

/// Stores an already-hashed password.
pub struct UpdateUserPassword {
    users: UserRepositoryState,
}

impl UpdateUserPassword {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, id: i32, password_hash: String) -> Result<User, ApiError> {
        self.users
            .update_password(id, password_hash)
            .await?
            .ok_or_else(ApiError::not_found)
    }
}

pub struct RemoveUser {
    users: UserRepositoryState,
}

impl RemoveUser {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    pub async fn execute(&self, id: i32) -> Result<bool, ApiError> {
        Ok(self.users.remove(id).await?)
    }
}
