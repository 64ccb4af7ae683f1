//! Command-line surface of the `portal` binary.
//!
//! Every option has an environment fallback so the console can be scripted
//! without repeating flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use portal_auth::Role;
use portal_core::UserId;
use portal_infra::{DEFAULT_SESSION_KEY, LatencyProfile, SessionConfig};
use portal_observability::LogFormat;

use crate::portal::PortalOptions;

#[derive(Debug, Parser)]
#[command(name = "portal")]
#[command(about = "Admin portal console: sign in, check access, manage users", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Session file (defaults to <data dir>/portal/session.json)
    #[arg(long, env = "PORTAL_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Key the token is stored under inside the session file
    #[arg(long, env = "PORTAL_SESSION_KEY", default_value = DEFAULT_SESSION_KEY, global = true)]
    pub session_key: String,

    /// Lifetime of newly issued tokens, in seconds
    #[arg(
        long,
        env = "PORTAL_TOKEN_LIFETIME_SECS",
        default_value_t = 3600,
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    pub token_lifetime_secs: u32,

    /// Simulate backend round-trip delays
    #[arg(long, env = "PORTAL_LATENCY", value_enum, default_value_t = Toggle::On, global = true)]
    pub latency: Toggle,

    /// Log output format (pretty, json)
    #[arg(long, env = "PORTAL_LOG_FORMAT", default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        handle: String,

        /// Prompted for on stdin when absent
        #[arg(long, env = "PORTAL_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Sign out and clear the stored token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Run the route guard for a path
    Navigate { path: String },

    /// Print the stored token and its remaining lifetime
    Token,

    /// Manage users (admin or manager)
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum UsersCommand {
    List,

    Get { id: UserId },

    Create {
        handle: String,

        #[arg(long)]
        email: String,

        #[arg(long = "name")]
        display_name: String,

        #[arg(long, default_value_t = Role::User)]
        role: Role,

        /// Initial secret; without one the user cannot sign in
        #[arg(long)]
        secret: Option<String>,
    },

    Update {
        id: UserId,

        #[arg(long)]
        handle: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long = "name")]
        display_name: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        secret: Option<String>,
    },

    Delete { id: UserId },
}

impl Cli {
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(default_session_path)
    }

    pub fn options(&self) -> PortalOptions {
        let latency = match self.latency {
            Toggle::On => LatencyProfile::default(),
            Toggle::Off => LatencyProfile::none(),
        };

        PortalOptions {
            latency,
            session: SessionConfig {
                token_lifetime: chrono::Duration::seconds(i64::from(self.token_lifetime_secs)),
            },
        }
    }
}

fn default_session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("portal")
        .join("session.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_user_command() {
        let cli = Cli::try_parse_from([
            "portal", "users", "create", "dana", "--email", "dana@example.com", "--name", "Dana",
            "--role", "manager",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Users {
                command: UsersCommand::Create {
                    handle: "dana".to_string(),
                    email: "dana@example.com".to_string(),
                    display_name: "Dana".to_string(),
                    role: Role::Manager,
                    secret: None,
                }
            }
        );
    }

    #[test]
    fn latency_off_and_custom_lifetime() {
        let cli = Cli::try_parse_from([
            "portal", "whoami", "--latency", "off", "--token-lifetime-secs", "60",
        ])
        .unwrap();

        let options = cli.options();
        assert_eq!(options.latency, LatencyProfile::none());
        assert_eq!(options.session.token_lifetime, chrono::Duration::seconds(60));
    }

    #[test]
    fn explicit_session_file_wins() {
        let cli = Cli::try_parse_from(["portal", "--session-file", "/tmp/s.json", "logout"]).unwrap();
        assert_eq!(cli.session_path(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        assert!(Cli::try_parse_from(["portal", "--token-lifetime-secs", "0", "token"]).is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(Cli::try_parse_from(["portal", "users", "update", "2", "--role", "root"]).is_err());
    }
}
