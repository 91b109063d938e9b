use clap::Subcommand;
use serde_json::json;

use crate::api::projects::{ProjectCreate, DEFAULT_CATEGORY};
use crate::cli::context::Context;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

const SCREEN: &str = "/admin/projects";

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects")]
    List {
        #[arg(long, help = "Include sub-items, aliases and descriptions")]
        detail: bool,
    },

    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project name")]
        name: String,
    },

    #[command(about = "Create a project")]
    Create {
        #[arg(help = "Project name")]
        name: String,
        #[arg(long, help = "Category")]
        category: Option<String>,
        #[arg(long, help = "Description")]
        description: Option<String>,
    },

    #[command(about = "Rename a project")]
    Rename {
        #[arg(help = "Current name")]
        name: String,
        #[arg(help = "New name")]
        new_name: String,
    },

    #[command(about = "Delete a project")]
    Delete {
        #[arg(help = "Project name")]
        name: String,
    },

    #[command(about = "Add a sub-item to a project")]
    AddSubItem {
        #[arg(help = "Project name")]
        project: String,
        #[arg(help = "Sub-item name")]
        name: String,
        #[arg(long, default_value = "", help = "Description")]
        description: String,
    },

    #[command(about = "Remove a sub-item from a project")]
    RemoveSubItem {
        #[arg(help = "Project name")]
        project: String,
        #[arg(help = "Sub-item name")]
        name: String,
    },

    #[command(about = "List categories")]
    Categories,

    #[command(about = "Add a category")]
    AddCategory {
        #[arg(help = "Category name")]
        name: String,
    },

    #[command(about = "Remove a category")]
    RemoveCategory {
        #[arg(help = "Category name")]
        name: String,
    },

    #[command(about = "Project names waiting for review")]
    Pending,

    #[command(about = "Rejected project names")]
    Rejected,

    #[command(about = "Accept a pending name as a new project")]
    Approve {
        #[arg(help = "Pending name")]
        name: String,
        #[arg(long, help = "Category")]
        category: Option<String>,
    },

    #[command(about = "Fold a pending name into an existing project as an alias")]
    Merge {
        #[arg(help = "Pending name")]
        pending: String,
        #[arg(help = "Existing project")]
        target: String,
    },

    #[command(about = "Reject a pending name")]
    Reject {
        #[arg(help = "Pending name")]
        name: String,
    },

    #[command(about = "Remove a name from the rejected list")]
    Unreject {
        #[arg(help = "Rejected name")]
        name: String,
    },

    #[command(about = "Add an alias to a project")]
    Alias {
        #[arg(help = "Project name")]
        project: String,
        #[arg(help = "Alias")]
        alias: String,
    },

    #[command(about = "Rebuild the name-matching embeddings")]
    RebuildEmbeddings,
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    ctx.enter(SCREEN)?;
    let api = ctx.client.projects();

    let (message, response) = match cmd {
        ProjectCommands::List { detail } => {
            let projects = if detail {
                api.get_projects_detail().await?
            } else {
                api.get_projects().await?
            };
            return output_value(&projects);
        }
        ProjectCommands::Show { name } => return output_value(&api.get_project(&name).await?),
        ProjectCommands::Categories => return output_value(&api.get_categories().await?),
        ProjectCommands::Pending => return output_value(&api.get_pending().await?),
        ProjectCommands::Rejected => return output_value(&api.get_rejected().await?),
        ProjectCommands::Create {
            name,
            category,
            description,
        } => {
            let mut data = ProjectCreate::new(name.clone());
            data.category = category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            data.description = description.unwrap_or_default();
            (format!("Project '{}' created", name), api.create_project(&data).await?)
        }
        ProjectCommands::Rename { name, new_name } => (
            format!("Project '{}' renamed to '{}'", name, new_name),
            api.rename_project(&name, &new_name).await?,
        ),
        ProjectCommands::Delete { name } => (
            format!("Project '{}' deleted", name),
            api.delete_project(&name).await?,
        ),
        ProjectCommands::AddSubItem {
            project,
            name,
            description,
        } => (
            format!("Sub-item '{}' added to '{}'", name, project),
            api.add_sub_item(&project, &name, &description).await?,
        ),
        ProjectCommands::RemoveSubItem { project, name } => (
            format!("Sub-item '{}' removed from '{}'", name, project),
            api.remove_sub_item(&project, &name).await?,
        ),
        ProjectCommands::AddCategory { name } => (
            format!("Category '{}' added", name),
            api.add_category(&name).await?,
        ),
        ProjectCommands::RemoveCategory { name } => (
            format!("Category '{}' removed", name),
            api.remove_category(&name).await?,
        ),
        ProjectCommands::Approve { name, category } => (
            format!("'{}' approved", name),
            api.approve(&name, category.as_deref()).await?,
        ),
        ProjectCommands::Merge { pending, target } => (
            format!("'{}' merged into '{}'", pending, target),
            api.merge(&pending, &target).await?,
        ),
        ProjectCommands::Reject { name } => (format!("'{}' rejected", name), api.reject(&name).await?),
        ProjectCommands::Unreject { name } => (
            format!("'{}' removed from the rejected list", name),
            api.remove_from_rejected(&name).await?,
        ),
        ProjectCommands::Alias { project, alias } => (
            format!("Alias '{}' added to '{}'", alias, project),
            api.add_alias(&project, &alias).await?,
        ),
        ProjectCommands::RebuildEmbeddings => (
            "Embedding rebuild started".to_string(),
            api.rebuild_embeddings().await?,
        ),
    };

    output_success(&output_format, &message, Some(json!({ "response": response })))
}
