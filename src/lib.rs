//! micro-crm - REST backend for a small project-management CRM.
//!
//! Users, projects, tasks, roles, and project memberships over SQLite,
//! with JWT auth and a background scheduler that flags overdue tasks.

pub mod api;
pub mod automation;
pub mod config;
pub mod models;
pub mod scheduler;
pub mod security;
pub mod store;
