use crate::api::models::QueryResult;
use crate::api::PostHogClient;
use crate::cli::dispatcher::CommandContext;
use crate::cli::main_types::LlmCommands;
use crate::display::table::Row;
use crate::display::{print_data, print_rows, OutputMode};
use crate::error::HogError;
use crate::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

/// HogQL execution and the derived LLM-costs report.
#[derive(Default)]
pub struct QueryHandler;

impl QueryHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_query(
        &self,
        ctx: &CommandContext,
        sql: Option<String>,
        file: Option<PathBuf>,
        refresh: bool,
    ) -> Result<()> {
        let scoped = ctx.require_project()?;

        let query = match file {
            Some(path) => fs::read_to_string(&path)
                .map_err(|e| {
                    HogError::config(format!("Could not read file: {} — {}", path.display(), e))
                })?
                .trim()
                .to_string(),
            None => sql.unwrap_or_default(),
        };
        if query.is_empty() {
            return Err(HogError::config(
                "Provide a query string or use --file <path.sql>",
            ));
        }

        let client = PostHogClient::new(scoped.api_key, scoped.host)?;
        let result = client.query(scoped.project_id, &query, refresh).await?;

        if ctx.output.is_json() {
            return print_data(&query_json_payload(&result));
        }

        if result.results.is_empty() {
            println!("(no results)");
            return Ok(());
        }

        let columns = result.columns.clone();
        print_table_from_result(ctx.output, &columns, &result)
    }

    pub async fn handle_llm(&self, ctx: &CommandContext, command: LlmCommands) -> Result<()> {
        match command {
            LlmCommands::Costs { from, to } => {
                let (client, project_id) = ctx.project_client()?;
                let result = client
                    .llm_costs(project_id, from.as_deref(), to.as_deref())
                    .await?;

                if ctx.output.is_json() {
                    return print_data(&query_json_payload(&result));
                }

                if result.results.is_empty() {
                    println!("No LLM cost data found for the specified period.");
                    return Ok(());
                }

                let columns: Vec<String> = if result.columns.is_empty() {
                    ["model", "input_tokens", "output_tokens", "total_cost_usd", "events"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                } else {
                    result.columns.clone()
                };
                print_table_from_result(ctx.output, &columns, &result)
            }
        }
    }
}

/// JSON mode emits exactly the columns/results/types triple.
fn query_json_payload(result: &QueryResult) -> Value {
    json!({
        "columns": result.columns,
        "results": result.results,
        "types": result.types,
    })
}

/// Zip positional rows with column names; renderers consume named rows.
fn rows_from_result(columns: &[String], result: &QueryResult) -> Vec<Row> {
    result
        .results
        .iter()
        .map(|values| {
            let mut row = Row::new();
            for (i, column) in columns.iter().enumerate() {
                row.insert(
                    column.clone(),
                    values.get(i).cloned().unwrap_or(Value::Null),
                );
            }
            row
        })
        .collect()
}

fn print_table_from_result(
    output: OutputMode,
    columns: &[String],
    result: &QueryResult,
) -> Result<()> {
    let rows = rows_from_result(columns, result);
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    print_rows(output, &column_refs, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::{test_support, Account, Config};
    use tempfile::tempdir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx_with_project(dir: &std::path::Path, host: &str) -> CommandContext {
        let config_path = dir.join("config.json");
        let mut config = Config::default();
        config.accounts.insert(
            "test".to_string(),
            Account {
                api_key: "phx_k".to_string(),
                host: host.to_string(),
                default_project: Some(7),
            },
        );
        config.default_account = Some("test".to_string());
        config.save(Some(config_path.clone())).expect("save");

        CommandContext {
            account: None,
            project: None,
            config_path: Some(config_path),
            output: OutputMode::Human,
        }
    }

    #[test]
    fn test_rows_from_result_aligns_positionally() {
        let result = QueryResult {
            results: vec![vec![json!("gpt"), json!(3)], vec![json!("claude")]],
            columns: vec!["model".to_string(), "events".to_string()],
            types: vec![],
            timings: None,
        };
        let rows = rows_from_result(&result.columns, &result);
        assert_eq!(rows[0]["model"], json!("gpt"));
        assert_eq!(rows[0]["events"], json!(3));
        // short rows pad with null
        assert_eq!(rows[1]["events"], Value::Null);
    }

    #[test]
    fn test_query_json_payload_shape() {
        let result = QueryResult {
            results: vec![vec![json!(1)]],
            columns: vec!["n".to_string()],
            types: vec!["UInt8".to_string()],
            timings: None,
        };
        let payload = query_json_payload(&result);
        assert_eq!(payload["columns"], json!(["n"]));
        assert_eq!(payload["results"], json!([[1]]));
        assert_eq!(payload["types"], json!(["UInt8"]));
        assert!(payload.get("timings").is_none());
    }

    #[tokio::test]
    async fn test_query_without_text_or_file_is_config_error() {
        let _guard = test_support::env_guard();
        test_support::clear_env();

        let dir = tempdir().expect("tempdir");
        let ctx = ctx_with_project(dir.path(), "http://unused.test");
        let err = QueryHandler::new()
            .handle_query(&ctx, None, None, false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("--file"));
    }

    #[tokio::test]
    async fn test_query_from_file_posts_trimmed_text() {
        let _guard = test_support::env_guard();
        test_support::clear_env();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/7/query/"))
            .and(body_json(json!({
                "query": { "kind": "HogQLQuery", "query": "SELECT count() FROM events" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [[12]], "columns": ["count()"], "types": ["UInt64"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().expect("tempdir");
        let sql_path = dir.path().join("q.sql");
        fs::write(&sql_path, "SELECT count() FROM events\n").expect("write sql");

        let ctx = ctx_with_project(dir.path(), &server.uri());
        QueryHandler::new()
            .handle_query(&ctx, None, Some(sql_path), false)
            .await
            .expect("query");
    }

    #[tokio::test]
    async fn test_query_unreadable_file_is_config_error() {
        let _guard = test_support::env_guard();
        test_support::clear_env();

        let dir = tempdir().expect("tempdir");
        let ctx = ctx_with_project(dir.path(), "http://unused.test");
        let err = QueryHandler::new()
            .handle_query(
                &ctx,
                None,
                Some(dir.path().join("missing.sql")),
                false,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("missing.sql"));
    }
}
