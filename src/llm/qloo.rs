use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::CONFIG;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

const DEFAULT_TAKE: usize = 5;

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    results: Option<InsightsResults>,
}

#[derive(Debug, Deserialize)]
struct InsightsResults {
    entities: Option<Vec<RawEntity>>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    name: Option<String>,
    #[serde(default)]
    properties: RawEntityProperties,
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntityProperties {
    description: Option<String>,
    business_rating: Option<f64>,
    #[serde(default)]
    keywords: Vec<RawTag>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: Option<String>,
}

/// A recommendation-service entity reduced to the fields the pipelines
/// score against.
#[derive(Debug, Clone)]
pub struct InsightEntity {
    pub name: String,
    pub description: String,
    pub rating: f64,
    pub keywords: Vec<String>,
}

fn tag_names(tags: Vec<RawTag>) -> Vec<String> {
    tags.into_iter()
        .filter_map(|tag| tag.name)
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn extract_entities(payload: InsightsResponse) -> Vec<InsightEntity> {
    let mut entities = Vec::new();
    for raw in payload
        .results
        .and_then(|results| results.entities)
        .unwrap_or_default()
    {
        let name = raw.name.unwrap_or_default();
        if name.trim().is_empty() {
            continue;
        }
        let mut keywords = tag_names(raw.properties.keywords);
        keywords.extend(tag_names(raw.tags));
        keywords.dedup();
        entities.push(InsightEntity {
            name,
            description: raw.properties.description.unwrap_or_default(),
            rating: raw.properties.business_rating.unwrap_or(0.0),
            keywords,
        });
    }
    entities
}

/// One-shot insights lookup. Failures surface as errors for the caller's
/// stage fallback; they are never retried here.
pub async fn lookup_entities(
    entity_type: &str,
    query_terms: &[String],
    location: &str,
) -> Result<Vec<InsightEntity>> {
    if !CONFIG.has_qloo_credential() {
        return Err(anyhow!("QLOO_API_KEY is not configured."));
    }
    let query = query_terms.join(" ");
    if query.trim().is_empty() {
        return Err(anyhow!("query terms must not be empty"));
    }

    let url = format!(
        "{}/v2/insights",
        CONFIG.qloo_api_url.trim_end_matches('/')
    );
    debug!(
        "Calling insights endpoint {url} with type={entity_type} query={query} location={location}"
    );

    let operation = format!("lookup:{entity_type}");
    log_llm_timing("qloo", "insights", &operation, || async {
        let client = get_http_client();
        let response = client
            .get(&url)
            .header("X-Api-Key", CONFIG.qloo_api_key.clone())
            .query(&[
                ("filter.type", entity_type),
                ("signal.interests.query", &query),
                ("filter.location.query", location),
                ("take", &DEFAULT_TAKE.to_string()),
            ])
            .send()
            .await
            .map_err(|err| anyhow!("Insights request failed: {err}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Insights request failed with status {}",
                response.status()
            ));
        }

        let data: InsightsResponse = response
            .json()
            .await
            .map_err(|err| anyhow!("Invalid insights response: {err}"))?;

        Ok(extract_entities(data))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_entities_and_normalizes_keywords() {
        let payload: InsightsResponse = serde_json::from_value(serde_json::json!({
            "results": {
                "entities": [
                    {
                        "name": "Dim Alley Listening Bar",
                        "properties": {
                            "description": "Vinyl and low light",
                            "business_rating": 4.5,
                            "keywords": [{ "name": "Vinyl" }, { "name": " neon " }]
                        },
                        "tags": [{ "name": "cocktails" }]
                    },
                    { "name": "   " },
                    { "properties": {} }
                ]
            }
        }))
        .unwrap();

        let entities = extract_entities(payload);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].rating, 4.5);
        assert_eq!(entities[0].keywords, vec!["vinyl", "neon", "cocktails"]);
    }

    #[test]
    fn missing_results_yield_no_entities() {
        let payload: InsightsResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(extract_entities(payload).is_empty());
    }
}
