use async_trait::async_trait;
use sqlx::{FromRow, PgPool, postgres::PgRow};

use super::{PostRepository, RepoResult, RoleRepository, UserRepository, like_pattern};
use crate::models::{NewUser, Post, PostDraft, Role, User, UserChanges};

/// PgTable
///
/// A pool handle bound to one table. Holds the lookups every entity shares, keyed by
/// the `id` primary key.
#[derive(Clone)]
pub struct PgTable {
    pool: PgPool,
    table: &'static str,
}

impl PgTable {
    pub fn new(pool: PgPool, table: &'static str) -> Self {
        Self { pool, table }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn name(&self) -> &'static str {
        self.table
    }

    pub async fn find_by_identifier<T>(&self, id: i32) -> RepoResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(r#"SELECT * FROM "{}" WHERE id = $1"#, self.table);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn remove(&self, id: i32) -> RepoResult<bool> {
        let sql = format!(r#"DELETE FROM "{}" WHERE id = $1"#, self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }
}

// --- Roles ---

pub struct PgRoleRepository {
    table: PgTable,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool, "role"),
        }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Role>> {
        self.table.find_by_identifier(id).await
    }
}

// --- Users ---

pub struct PgUserRepository {
    table: PgTable,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool, "user"),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<User>> {
        self.table.find_by_identifier(id).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE email = $1"#)
            .bind(email)
            .fetch_optional(self.table.pool())
            .await
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM "user" ORDER BY id"#)
            .fetch_all(self.table.pool())
            .await
    }

    async fn find_all_by_role(&self, role_id: i32) -> RepoResult<Vec<User>> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE role_id = $1 ORDER BY id"#)
            .bind(role_id)
            .fetch_all(self.table.pool())
            .await
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO "user" (name, email, password, role_id) VALUES ($1, $2, $3, $4) RETURNING *"#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .bind(user.role_id)
        .fetch_one(self.table.pool())
        .await
    }

    async fn update(&self, changes: UserChanges) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"UPDATE "user" SET name = $1, email = $2, role_id = $3 WHERE id = $4 RETURNING *"#,
        )
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role_id)
        .bind(changes.id)
        .fetch_optional(self.table.pool())
        .await
    }

    async fn update_password(&self, id: i32, password: String) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(r#"UPDATE "user" SET password = $1 WHERE id = $2 RETURNING *"#)
            .bind(password)
            .bind(id)
            .fetch_optional(self.table.pool())
            .await
    }

    async fn remove(&self, id: i32) -> RepoResult<bool> {
        self.table.remove(id).await
    }
}

// --- Posts ---

/// Post columns plus the creator/updater names, read from any relation aliased `p`.
const POST_PROJECTION: &str = r#"
    SELECT p.*, uc.name AS created_by_name, uu.name AS updated_by_name
    FROM {source} p
    LEFT JOIN "user" uc ON p.created_by = uc.id
    LEFT JOIN "user" uu ON p.updated_by = uu.id
"#;

fn post_select(source: &str) -> String {
    POST_PROJECTION.replace("{source}", source)
}

pub struct PgPostRepository {
    table: PgTable,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            table: PgTable::new(pool, "post"),
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Post>> {
        let sql = format!("{} WHERE p.id = $1", post_select(self.table.name()));
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(self.table.pool())
            .await
    }

    async fn find_all(&self) -> RepoResult<Vec<Post>> {
        let sql = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC",
            post_select(self.table.name())
        );
        sqlx::query_as::<_, Post>(&sql)
            .fetch_all(self.table.pool())
            .await
    }

    async fn find_by_search(&self, search: &str) -> RepoResult<Vec<Post>> {
        let sql = format!(
            r#"{} WHERE p.title ILIKE $1 ESCAPE '\' OR p.content ILIKE $1 ESCAPE '\'
               ORDER BY p.created_at DESC, p.id DESC"#,
            post_select(self.table.name())
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(like_pattern(search))
            .fetch_all(self.table.pool())
            .await
    }

    async fn find_by_created_by(&self, user_id: i32) -> RepoResult<Vec<Post>> {
        let sql = format!(
            "{} WHERE p.created_by = $1 ORDER BY p.created_at DESC, p.id DESC",
            post_select(self.table.name())
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(user_id)
            .fetch_all(self.table.pool())
            .await
    }

    async fn create(&self, draft: PostDraft, author_id: i32) -> RepoResult<Post> {
        // Insert and join in one round trip so the response carries the author name.
        let sql = format!(
            r#"WITH inserted AS (
                   INSERT INTO post (title, content, created_by) VALUES ($1, $2, $3) RETURNING *
               ) {}"#,
            post_select("inserted")
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(draft.title)
            .bind(draft.content)
            .bind(author_id)
            .fetch_one(self.table.pool())
            .await
    }

    async fn update(&self, id: i32, draft: PostDraft, editor_id: i32) -> RepoResult<Option<Post>> {
        let sql = format!(
            r#"WITH updated AS (
                   UPDATE post SET title = $1, content = $2, updated_by = $3, updated_at = NOW()
                   WHERE id = $4 RETURNING *
               ) {}"#,
            post_select("updated")
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(draft.title)
            .bind(draft.content)
            .bind(editor_id)
            .bind(id)
            .fetch_optional(self.table.pool())
            .await
    }

    async fn remove(&self, id: i32) -> RepoResult<bool> {
        self.table.remove(id).await
    }
}
