use std::io::{self, BufRead, Write};

use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::router::{CHANGE_PASSWORD_ROUTE, LOGIN_ROUTE};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information from the server")]
    Whoami,

    #[command(about = "Change password")]
    Password {
        #[arg(long, help = "Current password (read from stdin if not provided)")]
        old: Option<String>,
        #[arg(long, help = "New password (read from stdin if not provided)")]
        new: Option<String>,
    },
}

fn read_secret(label: &str, provided: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }

    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        anyhow::bail!("{} is required", label);
    }
    Ok(value)
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;

    match cmd {
        AuthCommands::Login { username, password } => {
            ctx.enter(LOGIN_ROUTE)?;
            let password = read_secret("Password", password)?;

            let outcome = ctx.client.login(&username, &password).await?;
            let landing = ctx.client.router().current().map(|r| r.path).unwrap_or(LOGIN_ROUTE);

            output_success(
                &output_format,
                &format!("Logged in as {}", outcome.user.username),
                Some(json!({
                    "user": outcome.user,
                    "must_change_password": outcome.must_change_password,
                    "route": landing,
                })),
            )?;
            if outcome.must_change_password && matches!(output_format, OutputFormat::Text) {
                println!("Password change required. Run 'wr auth password' before anything else.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            ctx.client.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = ctx.client.session().snapshot();
            let claims = ctx.client.session().token_claims();
            let expired = claims.as_ref().map(|c| c.is_expired_at(Utc::now()));

            match output_format {
                OutputFormat::Json => output_value(&json!({
                    "logged_in": session.is_logged_in(),
                    "user": session.user,
                    "must_change_password": session.must_change_password,
                    "subject": claims.as_ref().and_then(|c| c.sub.clone()),
                    "expires_at": claims.as_ref().and_then(|c| c.expires_at()),
                    "expired": expired,
                })),
                OutputFormat::Text => {
                    if !session.is_logged_in() {
                        println!("Not logged in");
                        return Ok(());
                    }
                    match &session.user {
                        Some(user) => println!("Logged in as {} ({})", user.username, user.role),
                        None => println!("Logged in (profile not loaded)"),
                    }
                    if session.must_change_password {
                        println!("Password change required");
                    }
                    if let Some(expires_at) = claims.as_ref().and_then(|c| c.expires_at()) {
                        let suffix = if expired == Some(true) { " (expired)" } else { "" };
                        println!("Token expires: {}{}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"), suffix);
                    }
                    Ok(())
                }
            }
        }
        AuthCommands::Whoami => {
            let user = ctx.client.auth().get_me().await?;
            ctx.client.session().set_user(user.clone())?;

            output_text_or_json(&output_format, &user, || {
                let mut lines = vec![
                    format!("ID: {}", user.id),
                    format!("Username: {}", user.username),
                    format!("Role: {}", user.role),
                ];
                if let Some(name) = &user.real_name {
                    lines.push(format!("Name: {}", name));
                }
                if let Some(department) = &user.department {
                    lines.push(format!("Department: {}", department));
                }
                lines.join("\n")
            })
        }
        AuthCommands::Password { old, new } => {
            ctx.enter(CHANGE_PASSWORD_ROUTE)?;
            let old = read_secret("Current password", old)?;
            let new = read_secret("New password", new)?;

            let response = ctx.client.change_password(&old, &new).await?;
            output_success(&output_format, &response.message, None)
        }
    }
}
