//! `portal-console` — the user-facing edge of the session subsystem.
//!
//! Route guard, request decorator and user management sit on top of one
//! shared `SessionManager`; the `portal` binary drives them from the terminal.

pub mod commands;
pub mod config;
pub mod decorator;
pub mod error;
pub mod guard;
pub mod portal;
pub mod users;

pub use commands::{Output, execute};
pub use config::{Cli, Command, UsersCommand};
pub use decorator::RequestDecorator;
pub use error::{ConsoleError, ConsoleResult};
pub use guard::{GuardDecision, Route, RouteGuard};
pub use portal::{Portal, PortalOptions, PortalSession, PortalVerifier};
pub use users::UserService;
