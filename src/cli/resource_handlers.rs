use crate::api::models::PropertyType;
use crate::cli::dispatcher::CommandContext;
use crate::cli::main_types::{
    DashboardCommands, ErrorCommands, FlagCommands, InsightCommands, OrgCommands, PersonCommands,
    PropertyCommands,
};
use crate::display::table::row;
use crate::display::{print_data, print_rows};
use crate::error::HogError;
use crate::Result;
use serde_json::json;

/// Date portion of a server timestamp, or the fallback when absent.
fn date_part(value: Option<&str>, fallback: &str) -> String {
    match value.and_then(|v| v.split('T').next()) {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => fallback.to_string(),
    }
}

#[derive(Default)]
pub struct OrgHandler;

impl OrgHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: OrgCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            OrgCommands::List => {
                let client = ctx.client()?;
                let orgs = client.list_organizations().await?;

                let rows = orgs
                    .iter()
                    .map(|o| {
                        row(vec![
                            ("id", json!(o.id)),
                            ("name", json!(o.name)),
                            ("slug", json!(o.slug.clone().unwrap_or_default())),
                            ("created_at", json!(date_part(o.created_at.as_deref(), ""))),
                        ])
                    })
                    .collect();

                print_rows(ctx.output, &["id", "name", "slug", "created_at"], rows)
            }
        }
    }
}

#[derive(Default)]
pub struct FlagHandler;

impl FlagHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: FlagCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            FlagCommands::List => {
                let (client, project_id) = ctx.project_client()?;
                let flags = client.list_feature_flags(project_id).await?;

                let rows = flags
                    .iter()
                    .map(|f| {
                        row(vec![
                            ("id", json!(f.id)),
                            ("key", json!(f.key)),
                            ("name", json!(f.name.clone().unwrap_or_default())),
                            ("active", json!(if f.active { "yes" } else { "no" })),
                            (
                                "rollout",
                                match f.rollout_percentage {
                                    Some(pct) => json!(format!("{}%", pct)),
                                    None => json!("custom"),
                                },
                            ),
                        ])
                    })
                    .collect();

                print_rows(ctx.output, &["id", "key", "name", "active", "rollout"], rows)
            }
            FlagCommands::Get { key_or_id } => {
                let (client, project_id) = ctx.project_client()?;
                let flag = match key_or_id.parse::<u64>() {
                    Ok(id) if key_or_id.chars().all(|c| c.is_ascii_digit()) => {
                        client.get_feature_flag_by_id(project_id, id).await?
                    }
                    _ => client.get_feature_flag_by_key(project_id, &key_or_id).await?,
                };
                print_data(&flag)
            }
        }
    }
}

#[derive(Default)]
pub struct InsightHandler;

impl InsightHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: InsightCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            InsightCommands::List { favorited } => {
                let (client, project_id) = ctx.project_client()?;
                let insights = client.list_insights(project_id, favorited).await?;

                let rows = insights
                    .iter()
                    .map(|i| {
                        row(vec![
                            ("id", json!(i.id)),
                            ("short_id", json!(i.short_id)),
                            (
                                "name",
                                json!(i.name.clone().unwrap_or_else(|| "(untitled)".to_string())),
                            ),
                            ("favorited", json!(if i.favorited { "★" } else { "" })),
                            (
                                "last_refresh",
                                json!(date_part(i.last_refresh.as_deref(), "never")),
                            ),
                        ])
                    })
                    .collect();

                print_rows(
                    ctx.output,
                    &["id", "short_id", "name", "favorited", "last_refresh"],
                    rows,
                )
            }
            InsightCommands::Get { id } => {
                let (client, project_id) = ctx.project_client()?;
                let insight = client.get_insight(project_id, id).await?;
                print_data(&insight)
            }
        }
    }
}

#[derive(Default)]
pub struct DashboardHandler;

impl DashboardHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: DashboardCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            DashboardCommands::List => {
                let (client, project_id) = ctx.project_client()?;
                let dashboards = client.list_dashboards(project_id).await?;

                let rows = dashboards
                    .iter()
                    .map(|d| {
                        row(vec![
                            ("id", json!(d.id)),
                            (
                                "name",
                                json!(d.name.clone().unwrap_or_else(|| "(untitled)".to_string())),
                            ),
                            ("pinned", json!(if d.pinned { "📌" } else { "" })),
                            ("tiles", json!(d.tiles.as_ref().map_or(0, |t| t.len()))),
                            ("created_at", json!(date_part(d.created_at.as_deref(), ""))),
                        ])
                    })
                    .collect();

                print_rows(
                    ctx.output,
                    &["id", "name", "pinned", "tiles", "created_at"],
                    rows,
                )
            }
            DashboardCommands::Get { id } => {
                let (client, project_id) = ctx.project_client()?;
                let dashboard = client.get_dashboard(project_id, id).await?;
                print_data(&dashboard)
            }
        }
    }
}

const VALID_ERROR_STATUSES: [&str; 3] = ["active", "resolved", "suppressed"];

#[derive(Default)]
pub struct ErrorTrackingHandler;

impl ErrorTrackingHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: ErrorCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            ErrorCommands::List { status } => {
                if let Some(status) = status.as_deref() {
                    if !VALID_ERROR_STATUSES.contains(&status) {
                        return Err(HogError::api(format!(
                            "Invalid status \"{}\". Use: {}",
                            status,
                            VALID_ERROR_STATUSES.join(" | ")
                        )));
                    }
                }

                let (client, project_id) = ctx.project_client()?;
                let groups = client
                    .list_error_groups(project_id, status.as_deref())
                    .await?;

                let rows = groups
                    .iter()
                    .map(|g| {
                        row(vec![
                            ("id", json!(g.id)),
                            ("title", json!(g.title.clone().unwrap_or_default())),
                            ("status", json!(g.status)),
                            (
                                "occurrences",
                                g.occurrences.map(|n| json!(n)).unwrap_or(json!("")),
                            ),
                            ("last_seen", json!(date_part(g.last_seen.as_deref(), ""))),
                        ])
                    })
                    .collect();

                print_rows(
                    ctx.output,
                    &["id", "title", "status", "occurrences", "last_seen"],
                    rows,
                )
            }
            ErrorCommands::Get { id } => {
                let (client, project_id) = ctx.project_client()?;
                let group = client.get_error_group(project_id, &id).await?;
                print_data(&group)
            }
        }
    }
}

#[derive(Default)]
pub struct PersonHandler;

impl PersonHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: PersonCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            PersonCommands::List { search, limit } => {
                let (client, project_id) = ctx.project_client()?;
                let persons = client
                    .list_persons(project_id, search.as_deref(), Some(limit))
                    .await?;

                let rows = persons
                    .iter()
                    .map(|p| {
                        row(vec![
                            ("id", json!(p.id)),
                            ("name", json!(p.name.clone().unwrap_or_default())),
                            (
                                "distinct_id",
                                json!(p.distinct_ids.first().cloned().unwrap_or_default()),
                            ),
                            ("created_at", json!(date_part(p.created_at.as_deref(), ""))),
                        ])
                    })
                    .collect();

                print_rows(
                    ctx.output,
                    &["id", "name", "distinct_id", "created_at"],
                    rows,
                )
            }
            PersonCommands::Get { distinct_id } => {
                let (client, project_id) = ctx.project_client()?;
                let person = client
                    .get_person_by_distinct_id(project_id, &distinct_id)
                    .await?
                    .ok_or_else(|| {
                        HogError::not_found(format!(
                            "No person found with distinct ID: \"{}\"",
                            distinct_id
                        ))
                    })?;
                print_data(&person)
            }
        }
    }
}

const VALID_PROPERTY_TYPES: [&str; 3] = ["event", "person", "group"];

#[derive(Default)]
pub struct PropertyHandler;

impl PropertyHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(&self, command: PropertyCommands, ctx: &CommandContext) -> Result<()> {
        match command {
            PropertyCommands::List { prop_type } => {
                let parsed = match prop_type.as_deref() {
                    Some(raw) => Some(PropertyType::parse(raw).ok_or_else(|| {
                        HogError::api(format!(
                            "Invalid type \"{}\". Use: {}",
                            raw,
                            VALID_PROPERTY_TYPES.join(" | ")
                        ))
                    })?),
                    None => None,
                };

                let (client, project_id) = ctx.project_client()?;
                let props = client
                    .list_property_definitions(project_id, parsed)
                    .await?;

                let rows = props
                    .iter()
                    .map(|p| {
                        row(vec![
                            ("name", json!(p.name)),
                            (
                                "property_type",
                                json!(p.property_type.clone().unwrap_or_default()),
                            ),
                            ("is_numerical", json!(if p.is_numerical { "yes" } else { "no" })),
                        ])
                    })
                    .collect();

                print_rows(ctx.output, &["name", "property_type", "is_numerical"], rows)
            }
        }
    }
}
