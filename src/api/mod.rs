//! HTTP API for the CRM backend.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (public)
//! - `POST /api/auth/register` - Register and receive a token (public)
//! - `POST /api/auth/login` - Exchange credentials for a token (public)
//! - `GET /api/auth/me` - The authenticated user
//! - `GET|POST /api/users`, `GET|PUT|DELETE /api/users/{id}`
//! - `GET|POST /api/projects`, `GET|PUT|DELETE /api/projects/{id}`
//! - `GET|POST /api/tasks`, `GET|PUT|DELETE /api/tasks/{id}`
//! - `GET /api/tasks/project/{id}`, `GET /api/tasks/user/{id}`
//! - `GET|POST /api/roles`, `GET|PUT|DELETE /api/roles/{id}`
//! - `GET|POST /api/project-members`, `GET|PUT|DELETE /api/project-members/{id}`
//! - `GET /api/project-members/project/{id}`, `GET /api/project-members/user/{id}`
//!
//! All routes below `/api` except the auth pair require a bearer token.

mod auth;
mod error;
mod members;
mod projects;
mod rate_limit;
mod roles;
mod routes;
mod tasks;
mod users;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
