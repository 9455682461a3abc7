use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    extract::{IdPath, ValidatedJson, ValidatedQuery},
    models::{MessageResponse, Post, PostRequest, SearchQuery},
    use_cases::posts::{
        CreatePost, FindAllPosts, FindPostById, FindPostsByAuthor, FindPostsBySearch, RemovePost,
        UpdatePost,
    },
};

const POST_NOT_FOUND: &str = "Post not found";

/// list_posts
///
/// [Public Route] Every post, newest first, with author and editor names.
#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    responses((status = 200, description = "Posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(FindAllPosts::new(state.repo.posts.clone()).execute().await?))
}

/// list_posts_admin
///
/// [Teacher Route] The same listing as `list_posts`, reachable only by teachers.
#[utoipa::path(
    get,
    path = "/posts/admin",
    tag = "posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Posts", body = [Post]),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn list_posts_admin(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(FindAllPosts::new(state.repo.posts.clone()).execute().await?))
}

/// get_post
///
/// [Public Route] One post by id.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    params(("id" = i32, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Not found", body = MessageResponse)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(FindPostById::new(state.repo.posts.clone()).execute(id).await?))
}

/// search_posts
///
/// [Public Route] Posts whose title or content contains `search`, ignoring case.
#[utoipa::path(
    get,
    path = "/posts/search",
    tag = "posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching posts", body = [Post]),
        (status = 400, description = "Missing or empty search term", body = MessageResponse)
    )
)]
pub async fn search_posts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = FindPostsBySearch::new(state.repo.posts.clone())
        .execute(&query.search)
        .await?;
    Ok(Json(posts))
}

/// list_posts_by_author
///
/// [Public Route] Posts written by one user, newest first.
#[utoipa::path(
    get,
    path = "/user/{id}/posts",
    tag = "posts",
    params(("id" = i32, Path, description = "Author user id")),
    responses((status = 200, description = "Posts", body = [Post]))
)]
pub async fn list_posts_by_author(
    State(state): State<AppState>,
    IdPath(user_id): IdPath,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = FindPostsByAuthor::new(state.repo.posts.clone())
        .execute(user_id)
        .await?;
    Ok(Json(posts))
}

/// create_post
///
/// [Teacher Route] Publishes a post authored by the caller.
#[utoipa::path(
    post,
    path = "/posts",
    tag = "posts",
    request_body = PostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid payload", body = MessageResponse),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn create_post(
    AuthUser { id: author_id, .. }: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = CreatePost::new(state.repo.posts.clone())
        .execute(payload.into(), author_id)
        .await?;

    tracing::info!(post_id = post.id, author_id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Teacher Route] Rewrites title and content; the caller becomes `updated_by`.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "posts",
    params(("id" = i32, Path, description = "Post id")),
    request_body = PostRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 401, description = "Not a teacher", body = MessageResponse),
        (status = 404, description = "Post not found", body = MessageResponse)
    )
)]
pub async fn update_post(
    AuthUser { id: editor_id, .. }: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<PostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = UpdatePost::new(state.repo.posts.clone())
        .execute(id, payload.into(), editor_id)
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(POST_NOT_FOUND.to_string()),
            other => other,
        })?;

    tracing::info!(post_id = id, editor_id, "post updated");
    Ok(Json(post))
}

/// remove_post
///
/// [Teacher Route] Hard-deletes a post.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    params(("id" = i32, Path, description = "Post id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Post not found", body = MessageResponse),
        (status = 401, description = "Not a teacher", body = MessageResponse)
    )
)]
pub async fn remove_post(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    if !RemovePost::new(state.repo.posts.clone()).execute(id).await? {
        return Err(ApiError::bad_request(POST_NOT_FOUND));
    }
    tracing::info!(post_id = id, "post removed");
    Ok(StatusCode::NO_CONTENT)
}
