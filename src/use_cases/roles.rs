use crate::{error::ApiError, models::Role, repository::RoleRepositoryState};

/// Looks up a role by id. Absence is not an error: the caller decides what a missing
/// role means.
pub struct FindRoleById {
    roles: RoleRepositoryState,
}

impl FindRoleById {
    pub fn new(roles: RoleRepositoryState) -> Self {
        Self { roles }
    }

    pub async fn execute(&self, id: i32) -> Result<Option<Role>, ApiError> {
        Ok(self.roles.find_by_identifier(id).await?)
    }
}
