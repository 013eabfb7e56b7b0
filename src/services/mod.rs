//! Business logic services.
//!
//! The assignment engine and the team, user and stats services operate on
//! the storage traits in [`directory`]. Services are independent of HTTP;
//! [`api`] and [`server`] adapt them to axum.

pub mod api;
pub mod assignment;
pub mod directory;
pub mod memory;
pub mod server;
pub mod stats_service;
pub mod team_service;
pub mod user_service;

pub use assignment::AssignmentEngine;
pub use stats_service::StatsService;
pub use team_service::TeamService;
pub use user_service::UserService;
