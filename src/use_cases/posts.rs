use crate::{
    error::ApiError,
    models::{Post, PostDraft},
    repository::PostRepositoryState,
};

pub struct CreatePost {
    posts: PostRepositoryState,
}

impl CreatePost {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, draft: PostDraft, author_id: i32) -> Result<Post, ApiError> {
        Ok(self.posts.create(draft, author_id).await?)
    }
}

pub struct FindPostById {
    posts: PostRepositoryState,
}

impl FindPostById {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, id: i32) -> Result<Post, ApiError> {
        self.posts
            .find_by_identifier(id)
            .await?
            .ok_or_else(ApiError::not_found)
    }
}

pub struct FindAllPosts {
    posts: PostRepositoryState,
}

impl FindAllPosts {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts.find_all().await?)
    }
}

pub struct FindPostsBySearch {
    posts: PostRepositoryState,
}

impl FindPostsBySearch {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, search: &str) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts.find_by_search(search).await?)
    }
}

pub struct FindPostsByAuthor {
    posts: PostRepositoryState,
}

impl FindPostsByAuthor {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, user_id: i32) -> Result<Vec<Post>, ApiError> {
        Ok(self.posts.find_by_created_by(user_id).await?)
    }
}

pub struct UpdatePost {
    posts: PostRepositoryState,
}

impl UpdatePost {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, id: i32, draft: PostDraft, editor_id: i32) -> Result<Post, ApiError> {
        self.posts
            .update(id, draft, editor_id)
            .await?
            .ok_or_else(ApiError::not_found)
    }
}

pub struct RemovePost {
    posts: PostRepositoryState,
}

impl RemovePost {
    pub fn new(posts: PostRepositoryState) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, id: i32) -> Result<bool, ApiError> {
        Ok(self.posts.remove(id).await?)
    }
}
