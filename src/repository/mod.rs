use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{NewUser, Post, PostDraft, Role, User, UserChanges};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgPostRepository, PgRoleRepository, PgTable, PgUserRepository};

/// Every repository call either succeeds or surfaces the driver error untouched.
/// "Not found" is never an error at this layer: finders return `Ok(None)`.
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// RoleRepository
///
/// Read-only access to the seeded `role` table.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Role>>;
}

/// UserRepository
///
/// Persistence contract for the `"user"` table. Passwords pass through already hashed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_all(&self) -> RepoResult<Vec<User>>;
    async fn find_all_by_role(&self, role_id: i32) -> RepoResult<Vec<User>>;
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    /// Rewrites name, email and role. `None` when the id does not exist.
    async fn update(&self, changes: UserChanges) -> RepoResult<Option<User>>;
    async fn update_password(&self, id: i32, password: String) -> RepoResult<Option<User>>;
    /// Hard delete. `true` only when exactly one row was removed.
    async fn remove(&self, id: i32) -> RepoResult<bool>;
}

/// PostRepository
///
/// Persistence contract for the `post` table. Every read carries the creator and
/// updater display names.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Post>>;
    /// All posts, newest first.
    async fn find_all(&self) -> RepoResult<Vec<Post>>;
    /// Posts whose title or content contains `search`, ignoring case. The input is
    /// matched literally; `%` and `_` are not wildcards.
    async fn find_by_search(&self, search: &str) -> RepoResult<Vec<Post>>;
    async fn find_by_created_by(&self, user_id: i32) -> RepoResult<Vec<Post>>;
    async fn create(&self, draft: PostDraft, author_id: i32) -> RepoResult<Post>;
    /// Rewrites title and content and stamps `updated_by`/`updated_at`.
    async fn update(&self, id: i32, draft: PostDraft, editor_id: i32) -> RepoResult<Option<Post>>;
    async fn remove(&self, id: i32) -> RepoResult<bool>;
}

pub type RoleRepositoryState = Arc<dyn RoleRepository>;
pub type UserRepositoryState = Arc<dyn UserRepository>;
pub type PostRepositoryState = Arc<dyn PostRepository>;

/// RepositoryState
///
/// The persistence layer as handed to the router: one trait object per entity, so
/// handlers and guards never see a concrete backend.
#[derive(Clone)]
pub struct RepositoryState {
    pub users: UserRepositoryState,
    pub posts: PostRepositoryState,
    pub roles: RoleRepositoryState,
}

impl RepositoryState {
    /// Postgres-backed repositories sharing one connection pool. Each query checks a
    /// connection out of the pool, so concurrent requests do not serialize.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            roles: Arc::new(PgRoleRepository::new(pool)),
        }
    }

    /// All three repositories served by one shared in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            posts: store.clone(),
            roles: store,
        }
    }
}

/// Builds the ILIKE pattern for a literal substring search.
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
