use crate::cli::dispatcher::CommandContext;
use crate::cli::main_types::HogqlCommands;
use crate::display::print_data;
use crate::Result;
use serde::Serialize;

/// Static HogQL cheat sheet served offline, shaped for both JSON and
/// terminal output.
#[derive(Serialize)]
pub struct Reference {
    pub tables: Vec<TableRef>,
    pub events_columns: Vec<ColumnRef>,
    pub property_access: Vec<ExampleRef>,
    pub aggregate_functions: AggregateGuide,
    pub type_conversion: ConversionGuide,
    pub date_functions: Vec<FnNote>,
    pub limits_and_gotchas: Vec<&'static str>,
    pub common_patterns: Vec<PatternRef>,
}

#[derive(Serialize)]
pub struct TableRef {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
pub struct ColumnRef {
    pub column: &'static str,
    pub r#type: &'static str,
    pub note: &'static str,
}

#[derive(Serialize)]
pub struct ExampleRef {
    pub example: &'static str,
    pub note: &'static str,
}

#[derive(Serialize)]
pub struct AggregateGuide {
    pub r#use: Vec<AggregateFn>,
    pub do_not_use: Vec<Replacement>,
}

#[derive(Serialize)]
pub struct AggregateFn {
    pub r#fn: &'static str,
    pub sql_equiv: &'static str,
    pub note: &'static str,
}

#[derive(Serialize)]
pub struct ConversionGuide {
    pub r#use: Vec<FnNote>,
    pub do_not_use: Vec<Replacement>,
}

#[derive(Serialize)]
pub struct FnNote {
    pub r#fn: &'static str,
    pub note: &'static str,
}

#[derive(Serialize)]
pub struct Replacement {
    pub r#fn: &'static str,
    pub use_instead: &'static str,
    pub note: &'static str,
}

#[derive(Serialize)]
pub struct PatternRef {
    pub name: &'static str,
    pub sql: &'static str,
}

pub fn reference() -> Reference {
    Reference {
        tables: vec![
            TableRef {
                name: "events",
                description: "One row per tracked event. Main table for all analytics.",
            },
            TableRef {
                name: "persons",
                description: "One row per person (latest state). Use for person-level aggregations.",
            },
            TableRef {
                name: "sessions",
                description: "One row per session. Includes session duration, entry/exit pages.",
            },
        ],
        events_columns: vec![
            ColumnRef { column: "event", r#type: "String", note: "Event name e.g. '$pageview', 'user_signed_up'" },
            ColumnRef { column: "distinct_id", r#type: "String", note: "User identifier (anonymous or identified)" },
            ColumnRef { column: "timestamp", r#type: "DateTime", note: "Event time — project timezone applied automatically" },
            ColumnRef { column: "properties", r#type: "Object", note: "Event properties — access as properties.key or properties.$posthog_key" },
            ColumnRef { column: "person.properties", r#type: "Object", note: "Person props at event time — triggers join, use sparingly" },
            ColumnRef { column: "uuid", r#type: "String", note: "Unique event ID" },
            ColumnRef { column: "elements_chain", r#type: "String", note: "DOM elements for autocapture events" },
        ],
        property_access: vec![
            ExampleRef { example: "properties.$current_url", note: "Built-in PostHog URL property" },
            ExampleRef { example: "properties.$pathname", note: "URL path without domain" },
            ExampleRef { example: "properties.$browser", note: "Browser name" },
            ExampleRef { example: "properties.$os", note: "Operating system" },
            ExampleRef { example: "properties.$device_type", note: "Device type: 'Desktop', 'Mobile', 'Tablet'" },
            ExampleRef { example: "properties.$referrer", note: "Referrer URL" },
            ExampleRef { example: "properties.my_custom_prop", note: "Any custom event property you track" },
            ExampleRef { example: "person.properties.email", note: "Person property — triggers expensive join, use sparingly" },
            ExampleRef { example: "person.properties.plan", note: "Any person property" },
        ],
        aggregate_functions: AggregateGuide {
            r#use: vec![
                AggregateFn { r#fn: "count()", sql_equiv: "COUNT(*)", note: "Total row count" },
                AggregateFn { r#fn: "uniq(col)", sql_equiv: "COUNT(DISTINCT col)", note: "Approximate distinct count — prefer this" },
                AggregateFn { r#fn: "uniqExact(col)", sql_equiv: "COUNT(DISTINCT col)", note: "Exact distinct count — slower, more memory" },
                AggregateFn { r#fn: "countIf(condition)", sql_equiv: "COUNT(*) FILTER WHERE", note: "Conditional count" },
                AggregateFn { r#fn: "sum(col)", sql_equiv: "SUM(col)", note: "" },
                AggregateFn { r#fn: "avg(col)", sql_equiv: "AVG(col)", note: "" },
                AggregateFn { r#fn: "min(col)", sql_equiv: "MIN(col)", note: "" },
                AggregateFn { r#fn: "max(col)", sql_equiv: "MAX(col)", note: "" },
                AggregateFn { r#fn: "argMax(val, ts)", sql_equiv: "LAST_VALUE(val)", note: "Get val at the latest timestamp — use for \"current\" state" },
                AggregateFn { r#fn: "argMin(val, ts)", sql_equiv: "FIRST_VALUE(val)", note: "Get val at the earliest timestamp" },
            ],
            do_not_use: vec![
                Replacement { r#fn: "countDistinct(col)", use_instead: "uniq(col)", note: "Not supported in HogQL" },
                Replacement { r#fn: "COUNT(DISTINCT col)", use_instead: "uniq(col)", note: "Not supported in HogQL" },
            ],
        },
        type_conversion: ConversionGuide {
            r#use: vec![
                FnNote { r#fn: "toFloat(x)", note: "Convert to float" },
                FnNote { r#fn: "toFloatOrDefault(x, 0)", note: "Convert to float or fallback — use for string→number from properties" },
                FnNote { r#fn: "toInt64(x)", note: "Convert to int" },
                FnNote { r#fn: "toInt64OrDefault(x, 0)", note: "Convert to int or fallback" },
                FnNote { r#fn: "toString(x)", note: "Convert to string" },
                FnNote { r#fn: "toDate(x)", note: "Convert to Date" },
                FnNote { r#fn: "toDateTime(x)", note: "Convert to DateTime" },
            ],
            do_not_use: vec![
                Replacement { r#fn: "toFloat64OrDefault()", use_instead: "toFloatOrDefault()", note: "Not supported" },
                Replacement { r#fn: "toFloat32OrDefault()", use_instead: "toFloatOrDefault()", note: "Not supported" },
                Replacement { r#fn: "toFloat64()", use_instead: "toFloat()", note: "Not supported" },
            ],
        },
        date_functions: vec![
            FnNote { r#fn: "now()", note: "Current datetime" },
            FnNote { r#fn: "today()", note: "Current date" },
            FnNote { r#fn: "toDate(timestamp)", note: "Extract date part from datetime" },
            FnNote { r#fn: "toStartOfDay(timestamp)", note: "Truncate to start of day" },
            FnNote { r#fn: "toStartOfWeek(timestamp)", note: "Truncate to start of week" },
            FnNote { r#fn: "toStartOfMonth(timestamp)", note: "Truncate to start of month" },
            FnNote { r#fn: "dateDiff('day', a, b)", note: "Difference between two dates in given unit" },
            FnNote { r#fn: "timestamp >= now() - interval 7 day", note: "Last 7 days (also: 30 day, 1 hour, 3 month, etc.)" },
            FnNote { r#fn: "timestamp >= '2026-01-01'", note: "Absolute date filter (ISO string)" },
        ],
        limits_and_gotchas: vec![
            "PostHog adds LIMIT 100 automatically if you omit LIMIT — add explicit LIMIT to get more",
            "Max query execution time is 10 seconds — break complex queries into simpler ones",
            "HogQL rate limit: 120 queries/hour per project",
            "team_id is always filtered automatically — do not add it yourself",
            "Properties are stored as JSON — all values come back as strings unless cast",
            "person.properties triggers a JOIN — avoid in high-cardinality GROUP BY queries",
            "Timestamps are auto-converted to project timezone",
            "NULL properties: use ifNull(properties.key, default) to handle missing values",
            "Use equals(event, 'name') or event = 'name' — both work",
        ],
        common_patterns: vec![
            PatternRef {
                name: "Daily active users (last 30 days)",
                sql: "SELECT toDate(timestamp) AS day, uniq(distinct_id) AS dau\nFROM events\nWHERE timestamp >= now() - interval 30 day\nGROUP BY day ORDER BY day",
            },
            PatternRef {
                name: "Top events by volume",
                sql: "SELECT event, count() AS total, uniq(distinct_id) AS users\nFROM events\nWHERE timestamp >= now() - interval 7 day\nGROUP BY event ORDER BY total DESC LIMIT 20",
            },
            PatternRef {
                name: "Funnel: count users who did step A then step B",
                sql: "SELECT\n  uniqIf(distinct_id, event = 'signup_page_viewed') AS step1_users,\n  uniqIf(distinct_id, event = 'user_signed_up') AS step2_users\nFROM events\nWHERE timestamp >= now() - interval 30 day\n  AND event IN ('signup_page_viewed', 'user_signed_up')",
            },
            PatternRef {
                name: "Top pages (pageview URL)",
                sql: "SELECT properties.$pathname AS path, count() AS views\nFROM events\nWHERE event = '$pageview'\n  AND timestamp >= now() - interval 7 day\nGROUP BY path ORDER BY views DESC LIMIT 20",
            },
            PatternRef {
                name: "Events with person email (use sparingly)",
                sql: "SELECT person.properties.email AS email, count() AS events\nFROM events\nWHERE event = 'user_signed_up'\n  AND timestamp >= now() - interval 30 day\nGROUP BY email ORDER BY events DESC",
            },
            PatternRef {
                name: "Property value from string (cast numbers)",
                sql: "SELECT\n  properties.$ai_model AS model,\n  sum(toFloatOrDefault(toString(properties.$ai_total_cost_usd), 0)) AS total_cost\nFROM events\nWHERE event = '$ai_generation'\nGROUP BY model ORDER BY total_cost DESC",
            },
            PatternRef {
                name: "Week-over-week comparison",
                sql: "SELECT\n  toStartOfWeek(timestamp) AS week,\n  uniq(distinct_id) AS wau\nFROM events\nWHERE timestamp >= now() - interval 12 week\nGROUP BY week ORDER BY week",
            },
            PatternRef {
                name: "Error rate by page",
                sql: "SELECT\n  properties.$current_url AS url,\n  countIf(event = '$exception') AS errors,\n  countIf(event = '$pageview') AS pageviews,\n  round(errors / pageviews * 100, 2) AS error_rate_pct\nFROM events\nWHERE timestamp >= now() - interval 7 day\n  AND event IN ('$pageview', '$exception')\nGROUP BY url\nHAVING pageviews > 5\nORDER BY error_rate_pct DESC",
            },
        ],
    }
}

pub fn render_help(reference: &Reference) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("╔═══════════════════════════════╗".to_string());
    lines.push("║      HogQL Quick Reference    ║".to_string());
    lines.push("╚═══════════════════════════════╝".to_string());

    lines.push("\n── TABLES ──".to_string());
    for t in &reference.tables {
        lines.push(format!("  {:<12} {}", t.name, t.description));
    }

    lines.push("\n── EVENTS TABLE COLUMNS ──".to_string());
    for c in &reference.events_columns {
        lines.push(format!("  {:<22} {:<10} {}", c.column, c.r#type, c.note));
    }

    lines.push("\n── PROPERTY ACCESS ──".to_string());
    for p in &reference.property_access {
        lines.push(format!("  {:<36} — {}", p.example, p.note));
    }

    lines.push("\n── AGGREGATE FUNCTIONS ──".to_string());
    lines.push("  ✓ USE:".to_string());
    for f in &reference.aggregate_functions.r#use {
        let equiv = if f.sql_equiv.is_empty() {
            String::new()
        } else {
            format!(" (SQL: {})", f.sql_equiv)
        };
        lines.push(format!("    {:<26}{}", f.r#fn, equiv));
    }
    lines.push("  ✗ DO NOT USE:".to_string());
    for f in &reference.aggregate_functions.do_not_use {
        lines.push(format!("    {:<26} → use {}", f.r#fn, f.use_instead));
    }

    lines.push("\n── TYPE CONVERSION ──".to_string());
    lines.push("  ✓ USE:".to_string());
    for f in &reference.type_conversion.r#use {
        lines.push(format!("    {:<30} — {}", f.r#fn, f.note));
    }
    lines.push("  ✗ DO NOT USE:".to_string());
    for f in &reference.type_conversion.do_not_use {
        lines.push(format!("    {:<30} → use {}", f.r#fn, f.use_instead));
    }

    lines.push("\n── DATE FUNCTIONS ──".to_string());
    for f in &reference.date_functions {
        lines.push(format!("  {:<42} — {}", f.r#fn, f.note));
    }

    lines.push("\n── GOTCHAS ──".to_string());
    for g in &reference.limits_and_gotchas {
        lines.push(format!("  • {}", g));
    }

    lines.push("\n── COMMON PATTERNS ──".to_string());
    for p in &reference.common_patterns {
        lines.push(format!("\n  {}:", p.name));
        for line in p.sql.lines() {
            lines.push(format!("    {}", line));
        }
    }

    lines.join("\n")
}

pub fn render_patterns(reference: &Reference) -> String {
    let mut out = String::new();
    for p in &reference.common_patterns {
        out.push_str(&format!("\n── {} ──\n{}\n", p.name, p.sql));
    }
    out
}

#[derive(Default)]
pub struct HogqlHandler;

impl HogqlHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, command: HogqlCommands, ctx: &CommandContext) -> Result<()> {
        let reference = reference();
        match command {
            HogqlCommands::Help => {
                if ctx.output.is_json() {
                    return print_data(&reference);
                }
                println!("{}", render_help(&reference));
                Ok(())
            }
            HogqlCommands::Patterns => {
                if ctx.output.is_json() {
                    return print_data(&reference.common_patterns);
                }
                print!("{}", render_patterns(&reference));
                Ok(())
            }
        }
    }
}
