use crate::api::PostHogClient;
use crate::cli::command_handlers::{AccountHandler, ProjectHandler};
use crate::cli::hogql_reference::HogqlHandler;
use crate::cli::main_types::Commands;
use crate::cli::query_handlers::QueryHandler;
use crate::cli::resource_handlers::{
    DashboardHandler, ErrorTrackingHandler, FlagHandler, InsightHandler, OrgHandler,
    PersonHandler, PropertyHandler,
};
use crate::display::OutputMode;
use crate::storage::config::{self, Config, ResolvedAccount, ResolvedProject};
use crate::Result;
use std::path::PathBuf;

/// Per-invocation context shared by every handler: global CLI overrides,
/// the config file location, and the output mode.
pub struct CommandContext {
    pub account: Option<String>,
    pub project: Option<u64>,
    pub config_path: Option<PathBuf>,
    pub output: OutputMode,
}

impl CommandContext {
    /// The config is loaded lazily so that env-resolved invocations never
    /// touch (or trip over) the store.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path.clone())
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save(self.config_path.clone())
    }

    pub fn resolve_account(&self) -> Result<ResolvedAccount> {
        config::resolve_account(
            self.config_path.clone(),
            self.account.as_deref(),
            self.project,
        )
    }

    pub fn require_project(&self) -> Result<ResolvedProject> {
        config::require_project_id(
            self.config_path.clone(),
            self.account.as_deref(),
            self.project,
        )
    }

    /// Client bound to the resolved identity, for commands that do not need
    /// a project.
    pub fn client(&self) -> Result<PostHogClient> {
        let resolved = self.resolve_account()?;
        PostHogClient::new(resolved.api_key, resolved.host)
    }

    /// Client plus the mandatory project id, for project-scoped commands.
    pub fn project_client(&self) -> Result<(PostHogClient, u64)> {
        let scoped = self.require_project()?;
        let client = PostHogClient::new(scoped.api_key, scoped.host)?;
        Ok((client, scoped.project_id))
    }
}

pub struct Dispatcher {
    context: CommandContext,
}

impl Dispatcher {
    pub fn new(
        account: Option<String>,
        project: Option<u64>,
        config_path: Option<PathBuf>,
        output: OutputMode,
    ) -> Self {
        Self {
            context: CommandContext {
                account,
                project,
                config_path,
                output,
            },
        }
    }

    pub async fn dispatch(&self, command: Commands) -> Result<()> {
        let ctx = &self.context;
        match command {
            Commands::Accounts { command } => AccountHandler::new().handle(command, ctx),
            Commands::Orgs { command } => OrgHandler::new().handle(command, ctx).await,
            Commands::Projects { command } => ProjectHandler::new().handle(command, ctx).await,
            Commands::Flags { command } => FlagHandler::new().handle(command, ctx).await,
            Commands::Insights { command } => InsightHandler::new().handle(command, ctx).await,
            Commands::Dashboards { command } => DashboardHandler::new().handle(command, ctx).await,
            Commands::Query { sql, file, refresh } => {
                QueryHandler::new().handle_query(ctx, sql, file, refresh).await
            }
            Commands::Errors { command } => ErrorTrackingHandler::new().handle(command, ctx).await,
            Commands::Persons { command } => PersonHandler::new().handle(command, ctx).await,
            Commands::Properties { command } => PropertyHandler::new().handle(command, ctx).await,
            Commands::Llm { command } => QueryHandler::new().handle_llm(ctx, command).await,
            Commands::Hogql { command } => HogqlHandler::new().handle(command, ctx),
        }
    }
}
