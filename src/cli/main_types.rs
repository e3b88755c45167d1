use crate::storage::config::DEFAULT_HOST;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hog-cli")]
#[command(about = "Command-line bridge for the PostHog API and HogQL")]
#[command(version)]
pub struct Cli {
    /// Output as JSON (structured, LLM-friendly)
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a specific account profile
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Override the project ID
    #[arg(long, global = true)]
    pub project: Option<u64>,

    /// Read and write configuration under this directory
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage PostHog account profiles
    Accounts {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// List PostHog organizations
    Orgs {
        #[command(subcommand)]
        command: OrgCommands,
    },
    /// Manage PostHog projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Browse feature flags (read-only)
    Flags {
        #[command(subcommand)]
        command: FlagCommands,
    },
    /// Browse insights (read-only)
    Insights {
        #[command(subcommand)]
        command: InsightCommands,
    },
    /// Browse dashboards (read-only)
    Dashboards {
        #[command(subcommand)]
        command: DashboardCommands,
    },
    /// Execute a HogQL query against PostHog
    Query {
        /// Query text; omit when using --file
        sql: Option<String>,
        /// Read the query from a .sql file instead of the argument
        #[arg(long)]
        file: Option<PathBuf>,
        /// Force refresh cached results
        #[arg(long)]
        refresh: bool,
    },
    /// Browse error tracking groups (read-only)
    Errors {
        #[command(subcommand)]
        command: ErrorCommands,
    },
    /// Browse persons (read-only)
    Persons {
        #[command(subcommand)]
        command: PersonCommands,
    },
    /// Browse property definitions (read-only)
    Properties {
        #[command(subcommand)]
        command: PropertyCommands,
    },
    /// LLM observability data from PostHog
    Llm {
        #[command(subcommand)]
        command: LlmCommands,
    },
    /// HogQL reference for writing queries (LLM-friendly)
    #[command(disable_help_subcommand = true)]
    Hogql {
        #[command(subcommand)]
        command: HogqlCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// List configured accounts
    List,
    /// Add or update an account profile
    Add {
        /// Profile name
        name: String,
        /// PostHog personal API key (phx_...)
        #[arg(long)]
        api_key: String,
        /// PostHog host URL
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
    },
    /// Remove an account profile
    Remove {
        /// Profile name
        name: String,
    },
    /// Set the default account
    Default {
        /// Profile name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List all organizations
    List,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List all accessible projects
    List,
    /// Set the default project for the current account
    Use {
        /// Project ID
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum FlagCommands {
    /// List all feature flags
    List,
    /// Get a feature flag by key or numeric ID
    Get {
        /// Flag key, or numeric flag ID
        key_or_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum InsightCommands {
    /// List saved insights
    List {
        /// Show only favorited insights
        #[arg(long)]
        favorited: bool,
    },
    /// Get a specific insight by numeric ID
    Get {
        /// Insight ID
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommands {
    /// List all dashboards
    List,
    /// Get a specific dashboard by numeric ID
    Get {
        /// Dashboard ID
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ErrorCommands {
    /// List error groups
    List {
        /// Filter by status: active | resolved | suppressed
        #[arg(long)]
        status: Option<String>,
    },
    /// Get a specific error group by ID
    Get {
        /// Error group ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonCommands {
    /// List persons
    List {
        /// Search by name, email, or distinct ID
        #[arg(long)]
        search: Option<String>,
        /// Maximum number of results to return
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Get a person by their distinct ID
    Get {
        /// Distinct ID
        distinct_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PropertyCommands {
    /// List property definitions
    List {
        /// Filter by type: event | person | group
        #[arg(long = "type")]
        prop_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LlmCommands {
    /// Show LLM usage costs (default: last 30 days)
    Costs {
        /// Start date (inclusive), YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// End date (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HogqlCommands {
    /// Full HogQL syntax reference and cheat sheet
    Help,
    /// Common HogQL query patterns only
    Patterns,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse_anywhere() {
        let cli = Cli::try_parse_from([
            "hog-cli", "flags", "list", "--json", "--account", "work", "--project", "42",
        ])
        .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.account.as_deref(), Some("work"));
        assert_eq!(cli.project, Some(42));
    }

    #[test]
    fn test_accounts_add_requires_api_key() {
        assert!(Cli::try_parse_from(["hog-cli", "accounts", "add", "work"]).is_err());
        let cli = Cli::try_parse_from([
            "hog-cli", "accounts", "add", "work", "--api-key", "phx_k",
        ])
        .expect("parse");
        match cli.command {
            Commands::Accounts {
                command: AccountCommands::Add { name, api_key, host },
            } => {
                assert_eq!(name, "work");
                assert_eq!(api_key, "phx_k");
                assert_eq!(host, DEFAULT_HOST);
            }
            _ => panic!("expected accounts add"),
        }
    }

    #[test]
    fn test_query_takes_positional_sql_and_flags() {
        let cli = Cli::try_parse_from(["hog-cli", "query", "SELECT 1", "--refresh"]).expect("parse");
        match cli.command {
            Commands::Query { sql, file, refresh } => {
                assert_eq!(sql.as_deref(), Some("SELECT 1"));
                assert!(file.is_none());
                assert!(refresh);
            }
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn test_persons_list_default_limit() {
        let cli = Cli::try_parse_from(["hog-cli", "persons", "list"]).expect("parse");
        match cli.command {
            Commands::Persons {
                command: PersonCommands::List { search, limit },
            } => {
                assert!(search.is_none());
                assert_eq!(limit, 100);
            }
            _ => panic!("expected persons list"),
        }
    }
}
