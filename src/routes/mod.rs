/// Router Module Index
///
/// Routes are split by the access they require. Access control is attached per router
/// in `create_router`, so a handler's module alone decides who may reach it. Routers
/// share paths (`/posts/{id}`, `/user/{id}`) and are merged method by method.

/// Routes open to anonymous clients.
pub mod public;

/// Routes that need a valid session token.
pub mod authenticated;

/// Routes that need a valid session token and the `teacher` role.
pub mod teacher;
