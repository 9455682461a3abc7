use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

use super::{PostRepository, RepoResult, RoleRepository, UserRepository};
use crate::models::{NewUser, Post, PostDraft, Role, User, UserChanges};

/// MemoryStore
///
/// An in-process stand-in for the Postgres schema, implementing all three repository
/// traits. It mirrors the observable rules of the real tables: generated ids, the
/// unique email index, the seeded roles, joined author names on post reads and
/// newest-first ordering. Used by the test suite and for running without a database.
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    roles: BTreeMap<i32, Role>,
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    next_user_id: i32,
    next_post_id: i32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A store seeded with the `teacher` (1) and `student` (2) roles.
    pub fn new() -> Self {
        let mut tables = Tables {
            next_user_id: 1,
            next_post_id: 1,
            ..Tables::default()
        };
        for (id, description) in [(1, "teacher"), (2, "student")] {
            tables.roles.insert(
                id,
                Role {
                    id,
                    description: description.to_string(),
                },
            );
        }
        Self {
            inner: Mutex::new(tables),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave the maps half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl Tables {
    fn with_names(&self, post: &Post) -> Post {
        let name_of = |id: Option<i32>| id.and_then(|id| self.users.get(&id)).map(|u| u.name.clone());
        Post {
            created_by_name: name_of(Some(post.created_by)),
            updated_by_name: name_of(post.updated_by),
            ..post.clone()
        }
    }

    fn posts_where<F>(&self, keep: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| keep(p))
            .map(|p| self.with_names(p))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn references_user(&self, id: i32) -> bool {
        self.posts
            .values()
            .any(|p| p.created_by == id || p.updated_by == Some(id))
    }
}

#[derive(Debug, Clone, Copy)]
enum Violation {
    Unique,
    ForeignKey,
}

/// A constraint failure shaped like the one Postgres reports, so callers can use
/// `is_unique_violation` and `is_foreign_key_violation` against either backend.
#[derive(Debug, Error)]
#[error("{message}")]
struct ConstraintError {
    violation: Violation,
    constraint: &'static str,
    message: String,
}

impl DatabaseError for ConstraintError {
    fn message(&self) -> &str {
        &self.message
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        match self.violation {
            Violation::Unique => ErrorKind::UniqueViolation,
            Violation::ForeignKey => ErrorKind::ForeignKeyViolation,
        }
    }
}

fn unique_violation(email: &str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(ConstraintError {
        violation: Violation::Unique,
        constraint: "user_email_key",
        message: format!("duplicate key value violates unique constraint \"user_email_key\": {email}"),
    }))
}

fn foreign_key_violation(constraint: &'static str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(ConstraintError {
        violation: Violation::ForeignKey,
        constraint,
        message: format!("violates foreign key constraint \"{constraint}\""),
    }))
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Role>> {
        Ok(self.tables().roles.get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<User>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn find_all_by_role(&self, role_id: i32) -> RepoResult<Vec<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .filter(|u| u.role_id == Some(role_id))
            .cloned()
            .collect())
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables();
        if tables.email_taken(&user.email, None) {
            return Err(unique_violation(&user.email));
        }
        if !tables.roles.contains_key(&user.role_id) {
            return Err(foreign_key_violation("user_role_id_fkey"));
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;
        let created = User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
            role_id: Some(user.role_id),
            created_at: Some(now()),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&changes.id) {
            return Ok(None);
        }
        if tables.email_taken(&changes.email, Some(changes.id)) {
            return Err(unique_violation(&changes.email));
        }
        if !tables.roles.contains_key(&changes.role_id) {
            return Err(foreign_key_violation("user_role_id_fkey"));
        }

        Ok(tables.users.get_mut(&changes.id).map(|user| {
            user.name = changes.name;
            user.email = changes.email;
            user.role_id = Some(changes.role_id);
            user.clone()
        }))
    }

    async fn update_password(&self, id: i32, password: String) -> RepoResult<Option<User>> {
        Ok(self.tables().users.get_mut(&id).map(|user| {
            user.password = password;
            user.clone()
        }))
    }

    async fn remove(&self, id: i32) -> RepoResult<bool> {
        let mut tables = self.tables();
        if tables.references_user(id) {
            return Err(foreign_key_violation("post_created_by_fkey"));
        }
        Ok(tables.users.remove(&id).is_some())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_identifier(&self, id: i32) -> RepoResult<Option<Post>> {
        let tables = self.tables();
        Ok(tables.posts.get(&id).map(|p| tables.with_names(p)))
    }

    async fn find_all(&self) -> RepoResult<Vec<Post>> {
        Ok(self.tables().posts_where(|_| true))
    }

    async fn find_by_search(&self, search: &str) -> RepoResult<Vec<Post>> {
        let needle = search.to_lowercase();
        Ok(self.tables().posts_where(|p| {
            p.title.to_lowercase().contains(&needle) || p.content.to_lowercase().contains(&needle)
        }))
    }

    async fn find_by_created_by(&self, user_id: i32) -> RepoResult<Vec<Post>> {
        Ok(self.tables().posts_where(|p| p.created_by == user_id))
    }

    async fn create(&self, draft: PostDraft, author_id: i32) -> RepoResult<Post> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&author_id) {
            return Err(foreign_key_violation("post_created_by_fkey"));
        }

        let id = tables.next_post_id;
        tables.next_post_id += 1;
        let post = Post {
            id,
            title: draft.title,
            content: draft.content,
            created_at: Some(now()),
            updated_at: None,
            created_by: author_id,
            updated_by: None,
            created_by_name: None,
            updated_by_name: None,
        };
        tables.posts.insert(id, post.clone());
        Ok(tables.with_names(&post))
    }

    async fn update(&self, id: i32, draft: PostDraft, editor_id: i32) -> RepoResult<Option<Post>> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&editor_id) {
            return Err(foreign_key_violation("post_updated_by_fkey"));
        }

        let updated = tables.posts.get_mut(&id).map(|post| {
            post.title = draft.title;
            post.content = draft.content;
            post.updated_by = Some(editor_id);
            post.updated_at = Some(now());
            post.clone()
        });
        Ok(updated.map(|post| tables.with_names(&post)))
    }

    async fn remove(&self, id: i32) -> RepoResult<bool> {
        Ok(self.tables().posts.remove(&id).is_some())
    }
}
