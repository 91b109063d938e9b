use clap::Subcommand;
use serde_json::json;

use crate::api::admin_users::{UserCreate, UserUpdate};
use crate::api::AdminUsersApi;
use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::types::Role;

const SCREEN: &str = "/admin/users";

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List accounts")]
    List,

    #[command(about = "Create an account")]
    Create {
        #[arg(help = "Login name")]
        username: String,
        #[arg(help = "Display name")]
        real_name: String,
        #[arg(long, help = "Initial password")]
        password: String,
        #[arg(long, help = "Department")]
        department: Option<String>,
        #[arg(long, help = "Grant the admin role")]
        admin: bool,
    },

    #[command(about = "Change an account's details")]
    Update {
        #[arg(help = "User ID")]
        id: i64,
        #[arg(long, help = "Display name")]
        real_name: Option<String>,
        #[arg(long, help = "Department")]
        department: Option<String>,
        #[arg(long, help = "normal or admin")]
        role: Option<Role>,
    },

    #[command(about = "Disable an account")]
    Disable {
        #[arg(help = "User ID")]
        id: i64,
    },

    #[command(about = "Re-enable an account")]
    Enable {
        #[arg(help = "User ID")]
        id: i64,
    },

    #[command(about = "Delete an account")]
    Delete {
        #[arg(help = "User ID")]
        id: i64,
    },

    #[command(about = "Reset an account to the default password")]
    ResetPassword {
        #[arg(help = "User ID")]
        id: i64,
    },
}

async fn set_active(api: &AdminUsersApi<'_>, id: i64, active: bool, output_format: &OutputFormat) -> anyhow::Result<()> {
    let data = UserUpdate {
        is_active: Some(active),
        ..Default::default()
    };
    let user = api.update(id, &data).await?;
    let verb = if active { "enabled" } else { "disabled" };
    output_success(
        output_format,
        &format!("User '{}' {}", user.username, verb),
        Some(json!({ "user": user })),
    )
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    ctx.enter(SCREEN)?;
    let api = ctx.client.users();

    match cmd {
        UserCommands::List => {
            let users = api.list().await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }
            output_text_or_json(&output_format, &users, || {
                let mut lines = vec![
                    format!("{:<6} {:<16} {:<8} {:<8} {}", "ID", "USERNAME", "ROLE", "ACTIVE", "NAME"),
                    "-".repeat(60),
                ];
                for user in &users {
                    lines.push(format!(
                        "{:<6} {:<16} {:<8} {:<8} {}",
                        user.id,
                        user.username,
                        user.role,
                        if user.is_active.unwrap_or(true) { "yes" } else { "no" },
                        user.real_name.as_deref().unwrap_or("")
                    ));
                }
                lines.join("\n")
            })
        }
        UserCommands::Create {
            username,
            real_name,
            password,
            department,
            admin,
        } => {
            let data = UserCreate {
                username,
                real_name,
                password,
                department,
                role: Some(if admin { Role::Admin } else { Role::Normal }),
            };
            let user = api.create(&data).await?;
            output_success(
                &output_format,
                &format!("User '{}' created (#{})", user.username, user.id),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Update {
            id,
            real_name,
            department,
            role,
        } => {
            let data = UserUpdate {
                real_name,
                department,
                role,
                ..Default::default()
            };
            let user = api.update(id, &data).await?;
            output_success(
                &output_format,
                &format!("User '{}' updated", user.username),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Disable { id } => set_active(&api, id, false, &output_format).await,
        UserCommands::Enable { id } => set_active(&api, id, true, &output_format).await,
        UserCommands::Delete { id } => {
            let response = api.delete(id).await?;
            output_success(&output_format, &response.message, None)
        }
        UserCommands::ResetPassword { id } => {
            let response = api.reset_password(id).await?;
            output_success(&output_format, &response.message, None)
        }
    }
}
