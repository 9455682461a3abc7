use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::AuthUser,
    error::ApiError,
    repository::{RepositoryState, UserRepository},
    use_cases::roles::FindRoleById,
};

/// RoleGuard
///
/// State for `require_role`: which role description a router demands, and the
/// repositories the caller's current role is read from. One guard instance is layered
/// per protected router.
#[derive(Clone)]
pub struct RoleGuard {
    pub repo: RepositoryState,
    pub required: &'static str,
}

impl RoleGuard {
    pub fn new(repo: RepositoryState, required: &'static str) -> Self {
        Self { repo, required }
    }
}

/// require_role
///
/// Must run after `auth_middleware`. Reloads the caller and their role row and compares
/// the description with the required one. Deleted users, unknown roles and mismatches
/// are all rejected with 401 "Unauthorized".
pub async fn require_role(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(ApiError::Unauthorized(ApiError::TOKEN_MISSING))?;

    if has_role(&guard.repo, &user, guard.required).await? {
        Ok(next.run(request).await)
    } else {
        tracing::info!(user_id = user.id, required = guard.required, "role check failed");
        Err(ApiError::Unauthorized(ApiError::FORBIDDEN_ROLE))
    }
}

/// Whether `user` currently holds the `required` role. The `role_id` carried in the
/// token is ignored; the stored user row decides.
pub async fn has_role(
    repo: &RepositoryState,
    user: &AuthUser,
    required: &str,
) -> Result<bool, ApiError> {
    let Some(current) = repo.users.find_by_identifier(user.id).await? else {
        return Ok(false);
    };
    let Some(role_id) = current.role_id else {
        return Ok(false);
    };
    let role = FindRoleById::new(repo.roles.clone()).execute(role_id).await?;
    Ok(role.is_some_and(|role| role.description == required))
}
