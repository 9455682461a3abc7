use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    auth::{AuthUser, Claims, TEACHER, has_role, jwt, password},
    error::ApiError,
    extract::{IdPath, ValidatedJson},
    models::{
        CreateUserRequest, LoginRequest, LoginResponse, MessageResponse, NewUser, UpdateUserRequest,
        UserChanges, UserResponse,
    },
    use_cases::{
        roles::FindRoleById,
        users::{
            CreateUser, FindAllUsers, FindAllUsersByRole, FindUserByEmail, FindUserById, RemoveUser,
            UpdateUser, UpdateUserPassword,
        },
    },
};

const EMAIL_IN_USE: &str = "This email has already been used";
const USER_HAS_POSTS: &str = "User has authored or edited posts and cannot be removed";

fn is_unique_violation(err: &ApiError) -> bool {
    matches!(err, ApiError::Database(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()))
}

fn is_foreign_key_violation(err: &ApiError) -> bool {
    matches!(err, ApiError::Database(e) if e.as_database_error().is_some_and(|d| d.is_foreign_key_violation()))
}

/// Rejects a `role_id` that does not name a seeded role.
async fn ensure_role_exists(state: &AppState, role_id: i32) -> Result<(), ApiError> {
    match FindRoleById::new(state.repo.roles.clone()).execute(role_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation("role_id", format!("role {role_id} does not exist"))),
    }
}

/// create_user
///
/// [Public Route] Registers a user. The email must not be taken; the password is stored
/// as a bcrypt hash and never echoed back.
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Email already used or invalid payload", body = MessageResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let users = state.repo.users.clone();

    if FindUserByEmail::new(users.clone())
        .execute(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request(EMAIL_IN_USE));
    }
    ensure_role_exists(&state, payload.role_id).await?;

    let hashed = password::hash_password(payload.password).await?;
    let created = CreateUser::new(users)
        .execute(NewUser {
            name: payload.name,
            email: payload.email,
            password: hashed,
            role_id: payload.role_id,
        })
        .await
        // Two registrations racing past the lookup still hit the unique index.
        .map_err(|e| if is_unique_violation(&e) { ApiError::bad_request(EMAIL_IN_USE) } else { e })?;

    tracing::info!(user_id = created.id, "user registered");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// login
///
/// [Public Route] Exchanges email and password for a signed session token.
#[utoipa::path(
    post,
    path = "/user/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Unknown email or wrong password", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = FindUserByEmail::new(state.repo.users.clone())
        .execute(&payload.email)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not exists"))?;

    if !password::verify_password(payload.password, user.password.clone()).await? {
        return Err(ApiError::bad_request("Password incorrect"));
    }

    let claims = Claims::for_user(&user, state.config.jwt_ttl);
    let token = jwt::issue_token(&claims, &state.config.jwt_secret)?;

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// get_user
///
/// [Authenticated Route] Fetches one user without the password hash.
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<UserResponse>, ApiError> {
    let user = FindUserById::new(state.repo.users.clone()).execute(id).await?;
    Ok(Json(user.into()))
}

/// update_user
///
/// [Authenticated Route] Rewrites name, email and role, and the password when one is
/// given. Users may edit themselves; teachers may edit anyone. Only a teacher may
/// change a role.
#[utoipa::path(
    put,
    path = "/user/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Email already used or invalid payload", body = MessageResponse),
        (status = 401, description = "Not allowed", body = MessageResponse),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let users = state.repo.users.clone();

    let is_teacher = has_role(&state.repo, &auth, TEACHER).await?;
    if !is_teacher && auth.id != id {
        return Err(ApiError::Unauthorized(ApiError::FORBIDDEN_ROLE));
    }

    let current = FindUserById::new(users.clone()).execute(id).await?;
    if !is_teacher && current.role_id != Some(payload.role_id) {
        return Err(ApiError::Unauthorized(ApiError::FORBIDDEN_ROLE));
    }

    if let Some(other) = FindUserByEmail::new(users.clone()).execute(&payload.email).await? {
        if other.id != id {
            return Err(ApiError::bad_request(EMAIL_IN_USE));
        }
    }
    ensure_role_exists(&state, payload.role_id).await?;

    let mut updated = UpdateUser::new(users.clone())
        .execute(UserChanges {
            id,
            name: payload.name,
            email: payload.email,
            role_id: payload.role_id,
        })
        .await
        .map_err(|e| if is_unique_violation(&e) { ApiError::bad_request(EMAIL_IN_USE) } else { e })?;

    if let Some(plain) = payload.password.filter(|p| !p.is_empty()) {
        let hashed = password::hash_password(plain).await?;
        updated = UpdateUserPassword::new(users).execute(id, hashed).await?;
    }

    tracing::info!(user_id = id, acting_user = auth.id, "user updated");
    Ok(Json(updated.into()))
}

/// remove_user
///
/// [Teacher Route] Hard-deletes a user. A user still referenced by posts is kept.
#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "User not found or still referenced by posts", body = MessageResponse),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn remove_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let removed = RemoveUser::new(state.repo.users.clone())
        .execute(id)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                tracing::info!(user_id = id, "user removal refused: referenced by posts");
                ApiError::bad_request(USER_HAS_POSTS)
            } else {
                e
            }
        })?;
    if !removed {
        return Err(ApiError::bad_request("User not found"));
    }
    tracing::info!(user_id = id, "user removed");
    Ok(StatusCode::NO_CONTENT)
}

/// list_users
///
/// [Teacher Route] Every registered user.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = FindAllUsers::new(state.repo.users.clone()).execute().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// list_users_by_role
///
/// [Teacher Route] Users holding the given role id.
#[utoipa::path(
    get,
    path = "/users/{role}",
    tag = "users",
    params(("role" = i32, Path, description = "Role id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn list_users_by_role(
    State(state): State<AppState>,
    IdPath(role_id): IdPath,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = FindAllUsersByRole::new(state.repo.users.clone())
        .execute(role_id)
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
