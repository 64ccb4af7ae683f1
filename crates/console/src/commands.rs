//! Execution of parsed console commands against a [`Portal`].

use std::io::Write;

use chrono::Utc;
use serde_json::json;

use portal_auth::Identity;
use portal_infra::{IdentityPatch, NewIdentity, SessionStore};

use crate::config::{Command, UsersCommand};
use crate::error::ConsoleResult;
use crate::guard::GuardDecision;
use crate::portal::Portal;

/// How results are printed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

pub async fn execute<S, W>(portal: &Portal<S>, command: Command, output: Output, out: &mut W) -> ConsoleResult<()>
where
    S: SessionStore,
    W: Write,
{
    let session = portal.session();

    match command {
        Command::Login { handle, secret } => {
            let identity = session.login(&handle, secret.as_deref().unwrap_or_default()).await?;
            match output {
                Output::Json => print_json(out, &identity)?,
                Output::Text => writeln!(out, "Signed in as {} ({})", identity.display_name, identity.role)?,
            }
        }

        Command::Logout => {
            session.logout()?;
            match output {
                Output::Json => print_json(out, &json!({ "signed_in": false }))?,
                Output::Text => writeln!(out, "Signed out")?,
            }
        }

        Command::Whoami => {
            let identity = session
                .is_authenticated()
                .then(|| session.current_identity())
                .flatten();
            match (output, identity) {
                (Output::Json, identity) => print_json(out, &identity)?,
                (Output::Text, Some(identity)) => write_identity(out, &identity)?,
                (Output::Text, None) => writeln!(out, "Not signed in")?,
            }
        }

        Command::Navigate { path } => {
            let decision = portal.guard().navigate(&path);
            match output {
                Output::Json => print_json(
                    out,
                    &json!({
                        "path": path,
                        "allowed": decision.is_allowed(),
                        "destination": decision.destination().path(),
                    }),
                )?,
                Output::Text => match decision {
                    GuardDecision::Allow(route) => writeln!(out, "{route}")?,
                    GuardDecision::Redirect { from, to } => writeln!(out, "{from} -> {to}")?,
                },
            }
        }

        Command::Token => {
            let now = Utc::now();
            let live = session
                .current_claims_at(now)
                .zip(portal.decorator().bearer_token());
            match (output, live) {
                (Output::Json, Some((claims, token))) => print_json(
                    out,
                    &json!({
                        "token": token,
                        "expires_at": claims.expires_at,
                        "seconds_until_expiry": claims.seconds_until_expiry(now),
                    }),
                )?,
                (Output::Json, None) => print_json(out, &json!({ "token": null }))?,
                (Output::Text, Some((claims, token))) => {
                    writeln!(out, "{token}")?;
                    if let Some(secs) = claims.seconds_until_expiry(now) {
                        writeln!(out, "expires in {secs}s")?;
                    }
                }
                (Output::Text, None) => writeln!(out, "No active session")?,
            }
        }

        Command::Users { command } => run_users(portal, command, output, out).await?,
    }

    Ok(())
}

async fn run_users<S, W>(portal: &Portal<S>, command: UsersCommand, output: Output, out: &mut W) -> ConsoleResult<()>
where
    S: SessionStore,
    W: Write,
{
    let users = portal.users();

    match command {
        UsersCommand::List => {
            let all = users.list().await?;
            match output {
                Output::Json => print_json(out, &all)?,
                Output::Text => {
                    for identity in &all {
                        write_row(out, identity)?;
                    }
                }
            }
        }

        UsersCommand::Get { id } => {
            let identity = users.get(id).await?;
            emit_identity(out, output, &identity)?;
        }

        UsersCommand::Create { handle, email, display_name, role, secret } => {
            let created = users
                .create(NewIdentity { handle, email, display_name, role, secret })
                .await?;
            emit_identity(out, output, &created)?;
        }

        UsersCommand::Update { id, handle, email, display_name, role, secret } => {
            let patch = IdentityPatch { handle, email, display_name, role, secret };
            let updated = users.update(id, patch).await?;
            emit_identity(out, output, &updated)?;
        }

        UsersCommand::Delete { id } => {
            users.delete(id).await?;
            match output {
                Output::Json => print_json(out, &json!({ "deleted": id }))?,
                Output::Text => writeln!(out, "Deleted user {id}")?,
            }
        }
    }

    Ok(())
}

fn emit_identity<W: Write>(out: &mut W, output: Output, identity: &Identity) -> ConsoleResult<()> {
    match output {
        Output::Json => print_json(out, identity),
        Output::Text => write_identity(out, identity),
    }
}

fn write_identity<W: Write>(out: &mut W, identity: &Identity) -> ConsoleResult<()> {
    writeln!(out, "id:     {}", identity.id)?;
    writeln!(out, "handle: {}", identity.handle)?;
    writeln!(out, "name:   {}", identity.display_name)?;
    writeln!(out, "email:  {}", identity.email)?;
    writeln!(out, "role:   {}", identity.role)?;
    Ok(())
}

fn write_row<W: Write>(out: &mut W, identity: &Identity) -> ConsoleResult<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        identity.id, identity.handle, identity.role, identity.email, identity.display_name
    )?;
    Ok(())
}

fn print_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> ConsoleResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
