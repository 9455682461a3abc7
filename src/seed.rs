//! Demo accounts for local development.
//!
//! One teacher and one student, both with the password `123456`. Only `main` calls this,
//! and only in the development environment.

use crate::{
    auth::password,
    error::ApiError,
    models::NewUser,
    repository::UserRepositoryState,
    use_cases::users::{CreateUser, FindUserByEmail},
};

pub const DEMO_PASSWORD: &str = "123456";

/// (name, email, role id)
pub const DEMO_USERS: [(&str, &str, i32); 2] = [
    ("Caroline Fernandes", "estudante_caroline@fiap.com", 2),
    ("Luiza Maria", "professor_luiza@fiap.com", 1),
];

/// seed_demo_users
///
/// Creates each demo account whose email is not registered yet and returns how many
/// were created. Existing accounts are left untouched, so restarts are harmless.
pub async fn seed_demo_users(users: &UserRepositoryState) -> Result<usize, ApiError> {
    let mut created = 0;

    for (name, email, role_id) in DEMO_USERS {
        if FindUserByEmail::new(users.clone()).execute(email).await?.is_some() {
            continue;
        }

        let hashed = password::hash_password(DEMO_PASSWORD.to_string()).await?;
        let user = CreateUser::new(users.clone())
            .execute(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: hashed,
                role_id,
            })
            .await?;
        tracing::info!(user_id = user.id, email, "demo user seeded");
        created += 1;
    }

    Ok(created)
}
