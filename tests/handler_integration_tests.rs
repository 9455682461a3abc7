use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use blog_api::{
    AppState, MemoryStore, create_router,
    auth::{Claims, jwt, password},
    config::AppConfig,
    models::{NewUser, PostDraft, User},
    repository::{PostRepository, RepositoryState, UserRepository},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const TEACHER_ROLE: i32 = 1;
const STUDENT_ROLE: i32 = 2;
const PASSWORD: &str = "correct-horse";

// --- Test Harness ---

struct TestApp {
    router: Router,
    repo: RepositoryState,
    config: AppConfig,
}

fn test_app() -> TestApp {
    let repo = RepositoryState::memory(MemoryStore::new());
    let config = AppConfig::default();
    let router = create_router(AppState::new(repo.clone(), config.clone()));
    TestApp {
        router,
        repo,
        config,
    }
}

impl TestApp {
    async fn seed_user(&self, name: &str, email: &str, role_id: i32) -> User {
        let hashed = password::hash_password(PASSWORD.to_string()).await.unwrap();
        self.repo
            .users
            .create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: hashed,
                role_id,
            })
            .await
            .unwrap()
    }

    async fn seed_post(&self, author_id: i32, title: &str, content: &str) -> i32 {
        self.repo
            .posts
            .create(
                PostDraft {
                    title: title.to_string(),
                    content: content.to_string(),
                },
                author_id,
            )
            .await
            .unwrap()
            .id
    }

    fn token_for(&self, user: &User) -> String {
        jwt::issue_token(&Claims::for_user(user, self.config.jwt_ttl), &self.config.jwt_secret).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}

// --- Health ---

#[tokio::test]
async fn test_health_on_root_and_health_path() {
    let app = test_app();
    for path in ["/", "/health"] {
        let (status, body) = app.send(Method::GET, path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("ok"));
    }
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// --- Registration & Login ---

#[tokio::test]
async fn test_register_returns_created_user_without_password() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/user",
            None,
            Some(json!({
                "name": "Ada", "email": "ada@school.edu", "password": "pw", "role_id": STUDENT_ROLE
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["role_id"], STUDENT_ROLE);
    assert!(body.get("password").is_none());

    let stored = app.repo.users.find_by_email("ada@school.edu").await.unwrap().unwrap();
    assert_ne!(stored.password, "pw");
    assert!(password::verify_password("pw".into(), stored.password).await.unwrap());
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = test_app();
    app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/user",
            None,
            Some(json!({
                "name": "Other", "email": "ada@school.edu", "password": "pw", "role_id": STUDENT_ROLE
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "This email has already been used");
}

#[tokio::test]
async fn test_register_invalid_payload_lists_fields() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/user",
            None,
            Some(json!({ "name": "", "email": "not-an-email", "password": "pw", "role_id": 2 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error");
    assert!(body["errors"].get("email").is_some());
    assert!(body["errors"].get("name").is_some());
    assert!(body.get("stack").is_none());
}

#[tokio::test]
async fn test_register_with_unknown_role_is_rejected() {
    let app = test_app();
    let (status, body) = app
        .send(
            Method::POST,
            "/user",
            None,
            Some(json!({ "name": "Ada", "email": "ada@school.edu", "password": "pw", "role_id": 99 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("role_id").is_some());
}

#[tokio::test]
async fn test_register_malformed_json_is_a_validation_error() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_returns_a_verifiable_token() {
    let app = test_app();
    let user = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "grace@school.edu", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id);
    assert!(body["user"].get("password").is_none());

    let claims = jwt::verify_token(body["token"].as_str().unwrap(), &app.config.jwt_secret).unwrap();
    assert_eq!(claims.id, user.id);
    assert_eq!(claims.name, "Grace");
    assert_eq!(claims.role_id, Some(TEACHER_ROLE));
    assert_eq!(claims.exp - claims.iat, app.config.jwt_ttl.as_secs() as usize);
}

#[tokio::test]
async fn test_login_failures_are_distinguished() {
    let app = test_app();
    app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "nobody@school.edu", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not exists");

    let (status, body) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "grace@school.edu", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password incorrect");
}

// --- Authentication ---

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/user/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token not provided");
}

#[tokio::test]
async fn test_protected_route_with_garbage_token() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/user/1", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token invalid or expired");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = test_app();
    let user = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let claims = Claims {
        id: user.id,
        name: user.name.clone(),
        role_id: user.role_id,
        iat: 1_000,
        exp: 2_000,
    };
    let token = jwt::issue_token(&claims, &app.config.jwt_secret).unwrap();

    let (status, body) = app
        .send(Method::GET, &format!("/user/{}", user.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token invalid or expired");
}

#[tokio::test]
async fn test_get_user_with_token() {
    let app = test_app();
    let user = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&user);

    let (status, body) = app
        .send(Method::GET, &format!("/user/{}", user.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@school.edu");
    assert!(body.get("password").is_none());

    let (status, body) = app.send(Method::GET, "/user/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");

    let (status, _) = app.send(Method::GET, "/user/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- Teacher Guard ---

/// Every route behind the teacher guard, with a body valid for its handler.
fn teacher_routes() -> Vec<(Method, &'static str, Option<Value>)> {
    vec![
        (Method::POST, "/posts", Some(json!({ "title": "t", "content": "c" }))),
        (Method::PUT, "/posts/1", Some(json!({ "title": "t", "content": "c" }))),
        (Method::DELETE, "/posts/1", None),
        (Method::GET, "/posts/admin", None),
        (Method::GET, "/users", None),
        (Method::GET, "/users/2", None),
        (Method::DELETE, "/user/1", None),
    ]
}

#[tokio::test]
async fn test_student_is_refused_on_teacher_routes() {
    let app = test_app();
    let student = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let post_id = app.seed_post(teacher.id, "kept", "kept").await;
    assert_eq!(post_id, 1);
    let token = app.token_for(&student);

    for (method, uri, body) in teacher_routes() {
        let (status, body) = app.send(method.clone(), uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["message"], "Unauthorized", "{method} {uri}");
    }

    // Nothing was changed on the student's behalf.
    let (status, body) = app.send(Method::GET, "/posts/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "kept");
    assert!(app.repo.users.find_by_identifier(student.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_garbage_token_is_rejected_on_teacher_routes() {
    let app = test_app();
    app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;

    for (method, uri, body) in teacher_routes() {
        let (status, body) = app.send(method.clone(), uri, Some("not.a.jwt"), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["message"], "Token invalid or expired", "{method} {uri}");
    }
}

#[tokio::test]
async fn test_teacher_route_without_token_reports_missing_token() {
    let app = test_app();
    let (status, body) = app
        .send(Method::POST, "/posts", None, Some(json!({ "title": "t", "content": "c" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token not provided");
}

#[tokio::test]
async fn test_role_is_checked_against_current_data() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let token = app.token_for(&teacher);

    // Demote after the token was issued; the claim still says teacher.
    app.repo
        .users
        .update(blog_api::models::UserChanges {
            id: teacher.id,
            name: teacher.name.clone(),
            email: teacher.email.clone(),
            role_id: STUDENT_ROLE,
        })
        .await
        .unwrap();

    let (status, _) = app.send(Method::GET, "/posts/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_removed_teacher_token_loses_teacher_access() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let token = app.token_for(&teacher);
    assert!(app.repo.users.remove(teacher.id).await.unwrap());

    let (status, body) = app.send(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

// --- Posts ---

#[tokio::test]
async fn test_teacher_creates_post() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, body) = app
        .send(
            Method::POST,
            "/posts",
            Some(&token),
            Some(json!({ "title": "Compilers", "content": "Lexing first." })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Compilers");
    assert_eq!(body["created_by"], teacher.id);
    assert_eq!(body["created_by_name"], "Grace");
    assert!(body["updated_by"].is_null());
}

#[tokio::test]
async fn test_create_post_validates_body() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, body) = app
        .send(Method::POST, "/posts", Some(&token), Some(json!({ "title": "", "content": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("title").is_some());

    let (status, _) = app
        .send(Method::POST, "/posts", Some(&token), Some(json!({ "title": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_listing_is_newest_first() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let first = app.seed_post(teacher.id, "First", "a").await;
    let second = app.seed_post(teacher.id, "Second", "b").await;

    let (status, body) = app.send(Method::GET, "/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second as i64, first as i64]);
    assert_eq!(body[0]["created_by_name"], "Grace");
}

#[tokio::test]
async fn test_admin_listing_matches_public_listing() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    app.seed_post(teacher.id, "First", "a").await;
    let token = app.token_for(&teacher);

    let (_, public) = app.send(Method::GET, "/posts", None, None).await;
    let (status, admin) = app.send(Method::GET, "/posts/admin", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public, admin);
}

#[tokio::test]
async fn test_get_post_by_id() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let id = app.seed_post(teacher.id, "Title", "Body").await;

    let (status, body) = app.send(Method::GET, &format!("/posts/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Title");

    let (status, body) = app.send(Method::GET, "/posts/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");

    let (status, body) = app.send(Method::GET, "/posts/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].get("id").is_some());
}

#[tokio::test]
async fn test_search_matches_title_or_content_ignoring_case() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    app.seed_post(teacher.id, "Rust Ownership", "borrowing").await;
    app.seed_post(teacher.id, "Databases", "Indexes and RUST").await;
    app.seed_post(teacher.id, "History", "nothing relevant").await;

    let (status, body) = app.send(Method::GET, "/posts/search?search=rust", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    app.seed_post(teacher.id, "Grades", "50% of the mark").await;
    app.seed_post(teacher.id, "Other", "no percent sign here").await;

    let (status, body) = app.send(Method::GET, "/posts/search?search=%25", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_requires_a_term() {
    let app = test_app();
    for uri in ["/posts/search", "/posts/search?search="] {
        let (status, _) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_posts_by_author() {
    let app = test_app();
    let grace = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let alan = app.seed_user("Alan", "alan@school.edu", TEACHER_ROLE).await;
    app.seed_post(grace.id, "Mine", "a").await;
    app.seed_post(alan.id, "His", "b").await;

    let (status, body) = app
        .send(Method::GET, &format!("/user/{}/posts", grace.id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Mine");
}

#[tokio::test]
async fn test_update_post_records_editor() {
    let app = test_app();
    let author = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let editor = app.seed_user("Alan", "alan@school.edu", TEACHER_ROLE).await;
    let id = app.seed_post(author.id, "Draft", "v1").await;
    let token = app.token_for(&editor);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/posts/{id}"),
            Some(&token),
            Some(json!({ "title": "Final", "content": "v2" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["created_by"], author.id);
    assert_eq!(body["updated_by"], editor.id);
    assert_eq!(body["updated_by_name"], "Alan");
    assert!(!body["updated_at"].is_null());
}

#[tokio::test]
async fn test_update_missing_post() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, body) = app
        .send(
            Method::PUT,
            "/posts/999",
            Some(&token),
            Some(json!({ "title": "t", "content": "c" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn test_delete_post_then_delete_again() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let id = app.seed_post(teacher.id, "Gone", "soon").await;
    let token = app.token_for(&teacher);

    let (status, body) = app.send(Method::DELETE, &format!("/posts/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = app.send(Method::DELETE, &format!("/posts/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Post not found");

    let (status, _) = app.send(Method::GET, &format!("/posts/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- User Management ---

#[tokio::test]
async fn test_teacher_lists_users_without_passwords() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, body) = app.send(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let (status, body) = app
        .send(Method::GET, &format!("/users/{STUDENT_ROLE}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let students = body.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["name"], "Ada");
}

#[tokio::test]
async fn test_teacher_deletes_user() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let student = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, _) = app
        .send(Method::DELETE, &format!("/user/{}", student.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(Method::DELETE, &format!("/user/{}", student.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_deleting_an_author_is_refused() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let author = app.seed_user("Linus", "linus@school.edu", TEACHER_ROLE).await;
    let post_id = app.seed_post(author.id, "mine", "mine").await;
    let token = app.token_for(&teacher);

    let (status, body) = app
        .send(Method::DELETE, &format!("/user/{}", author.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User has authored or edited posts and cannot be removed");

    // Once the post is gone the user can be removed.
    let (status, _) = app
        .send(Method::DELETE, &format!("/posts/{post_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .send(Method::DELETE, &format!("/user/{}", author.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_user_updates_own_profile_and_password() {
    let app = test_app();
    let student = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&student);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/user/{}", student.id),
            Some(&token),
            Some(json!({
                "name": "Ada L.", "email": "ada.l@school.edu", "password": "new-secret", "role_id": STUDENT_ROLE
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada L.");
    assert!(body.get("password").is_none());

    let (status, _) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "ada.l@school.edu", "password": "new-secret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_without_password_keeps_it() {
    let app = test_app();
    let student = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&student);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/user/{}", student.id),
            Some(&token),
            Some(json!({ "name": "Ada", "email": "ada@school.edu", "role_id": STUDENT_ROLE })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/user/login",
            None,
            Some(json!({ "email": "ada@school.edu", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_student_cannot_edit_others_or_promote_self() {
    let app = test_app();
    let ada = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let alan = app.seed_user("Alan", "alan@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&ada);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/user/{}", alan.id),
            Some(&token),
            Some(json!({ "name": "x", "email": "alan@school.edu", "role_id": STUDENT_ROLE })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/user/{}", ada.id),
            Some(&token),
            Some(json!({ "name": "Ada", "email": "ada@school.edu", "role_id": TEACHER_ROLE })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_teacher_changes_role_and_email_conflicts_are_rejected() {
    let app = test_app();
    let teacher = app.seed_user("Grace", "grace@school.edu", TEACHER_ROLE).await;
    let student = app.seed_user("Ada", "ada@school.edu", STUDENT_ROLE).await;
    let token = app.token_for(&teacher);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/user/{}", student.id),
            Some(&token),
            Some(json!({ "name": "Ada", "email": "ada@school.edu", "role_id": TEACHER_ROLE })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_id"], TEACHER_ROLE);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/user/{}", student.id),
            Some(&token),
            Some(json!({ "name": "Ada", "email": "grace@school.edu", "role_id": TEACHER_ROLE })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "This email has already been used");
}

// --- Documentation ---

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();
    let (status, body) = app.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/posts/{id}").is_some());
    assert!(body["components"]["securitySchemes"].get("bearer_auth").is_some());
}
