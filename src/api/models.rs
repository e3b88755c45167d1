use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Envelope shape shared by every paginated list endpoint. `next` is an
/// opaque server-supplied URL; the client follows it verbatim.
#[derive(Debug, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub membership_level: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeatureFlag {
    pub id: u64,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub rollout_percentage: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_simple_flag: Option<bool>,
    #[serde(default)]
    pub filters: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Insight {
    pub id: u64,
    pub short_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub last_refresh: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Dashboard {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub tiles: Option<Vec<Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ErrorGroup {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub occurrences: Option<u64>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub distinct_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PropertyDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_numerical: bool,
    #[serde(rename = "type", default)]
    pub type_id: Option<u32>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Tabular result of a HogQL query. Column order aligns positionally with
/// each row's value order; renderers rely on that.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryResult {
    #[serde(default)]
    pub results: Vec<Vec<Value>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timings: Option<BTreeMap<String, Value>>,
}

/// Filter for `properties list`. The API wants a numeric discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Event,
    Person,
    Group,
}

impl PropertyType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event" => Some(PropertyType::Event),
            "person" => Some(PropertyType::Person),
            "group" => Some(PropertyType::Group),
            _ => None,
        }
    }

    pub fn type_id(self) -> u8 {
        match self {
            PropertyType::Event => 1,
            PropertyType::Person => 2,
            PropertyType::Group => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response_deserialization() {
        let json = r#"{
            "count": 3,
            "next": "https://app.example.com/api/projects/?page=2",
            "previous": null,
            "results": [{"id": 1, "name": "Web"}, {"id": 2, "name": "Mobile"}]
        }"#;
        let page: PaginatedResponse<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 3);
        assert!(page.next.is_some());
        assert!(page.previous.is_none());
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].name, "Web");
    }

    #[test]
    fn test_paginated_response_last_page() {
        let json = r#"{"count": 1, "next": null, "previous": null, "results": []}"#;
        let page: PaginatedResponse<Project> = serde_json::from_str(json).unwrap();
        assert!(page.next.is_none());
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_feature_flag_with_null_fields() {
        let json = r#"{
            "id": 42,
            "key": "new-onboarding",
            "name": null,
            "active": true,
            "rollout_percentage": null,
            "filters": {"groups": []}
        }"#;
        let flag: FeatureFlag = serde_json::from_str(json).unwrap();
        assert_eq!(flag.key, "new-onboarding");
        assert!(flag.name.is_none());
        assert!(flag.rollout_percentage.is_none());
        assert!(flag.active);
    }

    #[test]
    fn test_query_result_positional_alignment() {
        let json = r#"{
            "results": [["gpt-4", 120, 0.5], ["claude", 80, 0.3]],
            "columns": ["model", "tokens", "cost"],
            "types": ["String", "UInt64", "Float64"],
            "timings": {"total": 0.12}
        }"#;
        let result: QueryResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.results[0].len(), result.columns.len());
        assert_eq!(result.results[1][0], serde_json::json!("claude"));
        assert!(result.timings.is_some());
    }

    #[test]
    fn test_query_result_missing_sections_default_empty() {
        let result: QueryResult = serde_json::from_str("{}").unwrap();
        assert!(result.results.is_empty());
        assert!(result.columns.is_empty());
        assert!(result.types.is_empty());
        assert!(result.timings.is_none());
    }

    #[test]
    fn test_property_type_mapping() {
        assert_eq!(PropertyType::parse("event"), Some(PropertyType::Event));
        assert_eq!(PropertyType::parse("person"), Some(PropertyType::Person));
        assert_eq!(PropertyType::parse("group"), Some(PropertyType::Group));
        assert_eq!(PropertyType::parse("bogus"), None);
        assert_eq!(PropertyType::Event.type_id(), 1);
        assert_eq!(PropertyType::Person.type_id(), 2);
        assert_eq!(PropertyType::Group.type_id(), 3);
    }

    #[test]
    fn test_property_definition_type_field_rename() {
        let json = r#"{"id": "p1", "name": "$browser", "is_numerical": false, "type": 1, "property_type": "String"}"#;
        let prop: PropertyDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(prop.type_id, Some(1));
        assert_eq!(prop.property_type.as_deref(), Some("String"));
    }
}
