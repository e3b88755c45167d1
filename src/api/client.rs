use crate::api::models::{
    Dashboard, ErrorGroup, FeatureFlag, Insight, Organization, PaginatedResponse, Person, Project,
    PropertyDefinition, PropertyType, QueryResult,
};
use crate::error::HogError;
use crate::Result;
use chrono::{Duration, Local};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("hog-cli/", env!("CARGO_PKG_VERSION"));

/// Query-string parameters. Map semantics: a key supplied twice keeps the
/// last value.
pub type Params<'a> = [(&'a str, String)];

/// HTTP client bound to one `(api_key, host)` pair for its whole lifetime.
/// One instance is created per CLI invocation; pages are fetched strictly
/// sequentially because each cursor is only known after the previous
/// response.
#[derive(Debug, Clone)]
pub struct PostHogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostHogClient {
    pub fn new(api_key: String, host: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HogError::unknown(format!("Failed to create HTTP client: {}", e)))?;

        Ok(PostHogClient {
            client,
            base_url: host.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // Core request helpers

    fn build_url(&self, path: &str, params: &Params<'_>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| HogError::unknown(format!("Invalid URL {}{}: {}", self.base_url, path, e)))?;

        if !params.is_empty() {
            // Last write wins when a caller repeats a key.
            let mut deduped: Vec<(&str, &str)> = Vec::new();
            for (key, value) in params.iter() {
                match deduped.iter_mut().find(|entry| entry.0 == *key) {
                    Some(entry) => entry.1 = value.as_str(),
                    None => deduped.push((*key, value.as_str())),
                }
            }
            url.query_pairs_mut().extend_pairs(deduped);
        }

        Ok(url)
    }

    async fn request_json<T>(&self, method: Method, url: Url, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HogError::unknown(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }

    async fn handle_response<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let url = response.url().clone();

        if status == StatusCode::UNAUTHORIZED {
            return Err(HogError::Unauthorized);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(HogError::Forbidden);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(HogError::NotFound {
                message: format!("Resource not found: {}", url),
                status: Some(404),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(HogError::RateLimited);
        }
        if status.is_server_error() {
            return Err(HogError::Server {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(HogError::Api {
                message: extract_detail(&body).unwrap_or(fallback),
                status: Some(status.as_u16()),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HogError::unknown(format!("Failed to parse response: {}", e)))
    }

    /// One authenticated GET; classified failure or the parsed body.
    pub async fn get_one<T>(&self, path: &str, params: &Params<'_>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, self.build_url(path, params)?, None)
            .await
    }

    /// Drains a paginated endpoint into one Vec, following each page's
    /// `next` cursor verbatim until it is null. Results keep server order;
    /// duplicates from overlapping pages propagate as-is. All-or-nothing:
    /// a failure on any page discards everything.
    pub async fn get_all_pages<T>(&self, path: &str, params: &Params<'_>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut results = Vec::new();
        let mut url = Some(self.build_url(path, params)?);

        while let Some(current) = url {
            let page: PaginatedResponse<T> =
                self.request_json(Method::GET, current, None).await?;
            results.extend(page.results);
            url = match page.next {
                Some(next) => Some(Url::parse(&next).map_err(|e| {
                    HogError::unknown(format!("Invalid pagination URL {}: {}", next, e))
                })?),
                None => None,
            };
        }

        Ok(results)
    }

    // Organizations

    pub async fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.get_all_pages("/api/organizations/", &[]).await
    }

    // Projects

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_all_pages("/api/projects/", &[]).await
    }

    // Feature flags

    pub async fn list_feature_flags(&self, project_id: u64) -> Result<Vec<FeatureFlag>> {
        self.get_all_pages(&format!("/api/projects/{}/feature_flags/", project_id), &[])
            .await
    }

    pub async fn get_feature_flag_by_id(&self, project_id: u64, id: u64) -> Result<FeatureFlag> {
        self.get_one(
            &format!("/api/projects/{}/feature_flags/{}/", project_id, id),
            &[],
        )
        .await
    }

    pub async fn get_feature_flag_by_key(&self, project_id: u64, key: &str) -> Result<FeatureFlag> {
        let flags = self.list_feature_flags(project_id).await?;
        flags
            .into_iter()
            .find(|f| f.key == key)
            .ok_or_else(|| HogError::not_found(format!("Feature flag not found with key: \"{}\"", key)))
    }

    // Insights

    pub async fn list_insights(&self, project_id: u64, favorited: bool) -> Result<Vec<Insight>> {
        let mut params = vec![("saved", "true".to_string())];
        if favorited {
            params.push(("favorited", "true".to_string()));
        }
        self.get_all_pages(&format!("/api/projects/{}/insights/", project_id), &params)
            .await
    }

    pub async fn get_insight(&self, project_id: u64, id: u64) -> Result<Insight> {
        self.get_one(&format!("/api/projects/{}/insights/{}/", project_id, id), &[])
            .await
    }

    // Dashboards

    pub async fn list_dashboards(&self, project_id: u64) -> Result<Vec<Dashboard>> {
        self.get_all_pages(&format!("/api/projects/{}/dashboards/", project_id), &[])
            .await
    }

    pub async fn get_dashboard(&self, project_id: u64, id: u64) -> Result<Dashboard> {
        self.get_one(
            &format!("/api/projects/{}/dashboards/{}/", project_id, id),
            &[],
        )
        .await
    }

    // HogQL query

    /// Wraps the query text in the provider envelope and POSTs it. The text
    /// is opaque to the client; validation is the remote engine's job.
    pub async fn query(&self, project_id: u64, sql: &str, refresh: bool) -> Result<QueryResult> {
        let mut body = json!({
            "query": { "kind": "HogQLQuery", "query": sql },
        });
        if refresh {
            body["refresh"] = Value::Bool(true);
        }

        self.request_json(
            Method::POST,
            self.build_url(&format!("/api/projects/{}/query/", project_id), &[])?,
            Some(body),
        )
        .await
    }

    // Error tracking

    pub async fn list_error_groups(
        &self,
        project_id: u64,
        status: Option<&str>,
    ) -> Result<Vec<ErrorGroup>> {
        let mut params = Vec::new();
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }
        self.get_all_pages(
            &format!("/api/projects/{}/error_tracking/groups/", project_id),
            &params,
        )
        .await
    }

    pub async fn get_error_group(&self, project_id: u64, id: &str) -> Result<ErrorGroup> {
        self.get_one(
            &format!("/api/projects/{}/error_tracking/groups/{}/", project_id, id),
            &[],
        )
        .await
    }

    // Persons

    /// With a limit: one single-page request honoring it. Without: full
    /// pagination.
    pub async fn list_persons(
        &self,
        project_id: u64,
        search: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<Person>> {
        let path = format!("/api/projects/{}/persons/", project_id);
        let mut params = Vec::new();
        if let Some(search) = search {
            params.push(("search", search.to_string()));
        }

        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
            let page: PaginatedResponse<Person> = self.get_one(&path, &params).await?;
            return Ok(page.results);
        }

        self.get_all_pages(&path, &params).await
    }

    pub async fn get_person_by_distinct_id(
        &self,
        project_id: u64,
        distinct_id: &str,
    ) -> Result<Option<Person>> {
        let page: PaginatedResponse<Person> = self
            .get_one(
                &format!("/api/projects/{}/persons/", project_id),
                &[("distinct_id", distinct_id.to_string())],
            )
            .await?;
        Ok(page.results.into_iter().next())
    }

    // Property definitions

    pub async fn list_property_definitions(
        &self,
        project_id: u64,
        prop_type: Option<PropertyType>,
    ) -> Result<Vec<PropertyDefinition>> {
        let mut params = Vec::new();
        if let Some(prop_type) = prop_type {
            params.push(("type", prop_type.type_id().to_string()));
        }
        self.get_all_pages(
            &format!("/api/projects/{}/property_definitions/", project_id),
            &params,
        )
        .await
    }

    // LLM costs

    /// Aggregated `$ai_generation` costs per model. Defaults to a trailing
    /// 30-day window ending today when no explicit range is given.
    pub async fn llm_costs(
        &self,
        project_id: u64,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<QueryResult> {
        let from_date = match from {
            Some(d) => d.to_string(),
            None => (Local::now() - Duration::days(30)).format("%Y-%m-%d").to_string(),
        };
        let to_date = match to {
            Some(d) => d.to_string(),
            None => Local::now().format("%Y-%m-%d").to_string(),
        };

        let sql = [
            "SELECT".to_string(),
            "  properties.$ai_model AS model,".to_string(),
            "  round(sum(toFloatOrDefault(toString(properties.$ai_input_tokens), 0))) AS input_tokens,".to_string(),
            "  round(sum(toFloatOrDefault(toString(properties.$ai_output_tokens), 0))) AS output_tokens,".to_string(),
            "  round(sum(toFloatOrDefault(toString(properties.$ai_total_cost_usd), 0)), 4) AS total_cost_usd,".to_string(),
            "  count() AS events".to_string(),
            "FROM events".to_string(),
            "WHERE event = '$ai_generation'".to_string(),
            format!("  AND timestamp >= '{}'", from_date),
            format!("  AND timestamp <= '{}'", to_date),
            "GROUP BY model".to_string(),
            "ORDER BY total_cost_usd DESC".to_string(),
        ]
        .join("\n");

        self.query(project_id, &sql, false).await
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    for key in ["detail", "error", "message"] {
        match value.get(key) {
            Some(Value::Null) | None => continue,
            Some(Value::String(s)) => return Some(s.clone()),
            Some(other) => return Some(other.to_string()),
        }
    }
    None
}
