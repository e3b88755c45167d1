use crate::cli::dispatcher::CommandContext;
use crate::cli::main_types::{AccountCommands, ProjectCommands};
use crate::display::table::row;
use crate::display::{print_message, print_rows};
use crate::Result;
use serde_json::json;

/// Account profile management: pure credential-store mutations, no network.
#[derive(Default)]
pub struct AccountHandler;

impl AccountHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, command: AccountCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            AccountCommands::List => {
                let config = ctx.load_config()?;
                let mut names: Vec<&String> = config.accounts.keys().collect();
                names.sort();

                let rows = names
                    .into_iter()
                    .map(|name| {
                        let acc = &config.accounts[name];
                        row(vec![
                            ("name", json!(name)),
                            ("host", json!(acc.host)),
                            (
                                "default_project",
                                acc.default_project.map(|p| json!(p)).unwrap_or(json!("")),
                            ),
                            (
                                "default",
                                if config.default_account.as_deref() == Some(name.as_str()) {
                                    json!("✓")
                                } else {
                                    json!("")
                                },
                            ),
                        ])
                    })
                    .collect();

                print_rows(
                    ctx.output,
                    &["name", "host", "default_project", "default"],
                    rows,
                )
            }
            AccountCommands::Add { name, api_key, host } => {
                let mut config = ctx.load_config()?;
                config.add_account(&name, api_key, host);
                ctx.save_config(&config)?;

                let suffix = if config.default_account.as_deref() == Some(name.as_str()) {
                    " (set as default)"
                } else {
                    ""
                };
                print_message(ctx.output, &format!("Account \"{}\" saved{}.", name, suffix));
                Ok(())
            }
            AccountCommands::Remove { name } => {
                let mut config = ctx.load_config()?;
                config.remove_account(&name)?;
                ctx.save_config(&config)?;
                print_message(ctx.output, &format!("Account \"{}\" removed.", name));
                Ok(())
            }
            AccountCommands::Default { name } => {
                let mut config = ctx.load_config()?;
                config.set_default_account(&name)?;
                ctx.save_config(&config)?;
                print_message(ctx.output, &format!("Default account set to \"{}\".", name));
                Ok(())
            }
        }
    }
}

/// Project listing and default-project selection.
#[derive(Default)]
pub struct ProjectHandler;

impl ProjectHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: ProjectCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            ProjectCommands::List => {
                let client = ctx.client()?;
                let projects = client.list_projects().await?;

                let rows = projects
                    .iter()
                    .map(|p| {
                        row(vec![
                            ("id", json!(p.id)),
                            ("name", json!(p.name)),
                            ("slug", json!(p.slug.clone().unwrap_or_default())),
                            ("timezone", json!(p.timezone.clone().unwrap_or_default())),
                        ])
                    })
                    .collect();

                print_rows(ctx.output, &["id", "name", "slug", "timezone"], rows)
            }
            ProjectCommands::Use { id } => {
                let mut config = ctx.load_config()?;
                let name = config.set_default_project(ctx.account.as_deref(), id)?;
                ctx.save_config(&config)?;
                print_message(
                    ctx.output,
                    &format!("Default project for \"{}\" set to {}.", name, id),
                );
                Ok(())
            }
        }
    }
}
