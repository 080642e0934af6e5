use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use crate::config::{ModelChoice, CONFIG};
use crate::handlers::responses::ApiError;
use crate::llm::media::decode_image_payload;
use crate::llm::qloo::{self, InsightEntity};
use crate::llm::gemini;
use crate::utils::timing::RequestTimer;
use crate::vibes::fallback::{analyze_text, fallback_recommendations, GENERIC_IMAGE_DESCRIPTION};
use crate::vibes::parse::parse_vibe_analysis;
use crate::vibes::prompts::{vibe_analysis_prompt, VIBE_SYSTEM_PROMPT};
use crate::vibes::score::{image_confidence, shared_term_count};
use crate::vibes::{
    AnalyzeResponse, Category, RecommendationCategory, RecommendationItem, VibeAnalysis,
};

const MAX_ITEMS_PER_CATEGORY: usize = 2;
const MAX_QUERY_TERMS: usize = 3;
const MAX_ITEM_TAGS: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image_base64: String,
}

pub async fn analyze(
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut timer = RequestTimer::start("/api/analyze");
    match run_pipeline(body, &timer).await {
        Ok(response) => {
            timer.complete("success", None);
            Ok(Json(response))
        }
        Err(err) => {
            timer.complete("error", Some(err.code().to_string()));
            Err(err)
        }
    }
}

async fn run_pipeline(
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
    timer: &RequestTimer,
) -> Result<AnalyzeResponse, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::MissingInput(rejection.body_text()))?;
    if request.image_base64.trim().is_empty() {
        return Err(ApiError::MissingInput("imageBase64 is required".to_string()));
    }
    if !CONFIG.has_gemini_credential() {
        return Err(ApiError::MissingCredential("GEMINI_API_KEY"));
    }
    let image = decode_image_payload(&request.image_base64)
        .map_err(|err| ApiError::MissingInput(err.to_string()))?;

    // Stage 1: caption. Never fatal past this point.
    let image_description = match gemini::caption_image(&image).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("Vision stage returned an empty caption; substituting the generic description");
            GENERIC_IMAGE_DESCRIPTION.to_string()
        }
        Err(err) => {
            warn!("Vision stage failed, substituting the generic description: {err:#}");
            GENERIC_IMAGE_DESCRIPTION.to_string()
        }
    };

    // Stage 2: structured vibe extraction, keyword analyzer on any miss.
    let prompt = vibe_analysis_prompt(&image_description);
    let vibe_analysis =
        match gemini::generate_text(ModelChoice::Flash, VIBE_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => parse_vibe_analysis(&text).unwrap_or_else(|| {
                warn!("Vibe extraction returned unparseable text; running the keyword analyzer");
                analyze_text(&image_description)
            }),
            Err(err) => {
                warn!("Vibe extraction failed, running the keyword analyzer: {err:#}");
                analyze_text(&image_description)
            }
        };

    // Stage 3: one lookup per category, template items on any miss.
    let mut recommendations = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let items = recommend_for_category(&vibe_analysis, category).await;
        recommendations.push(RecommendationCategory {
            category: category.as_str().to_string(),
            items,
        });
    }

    Ok(AnalyzeResponse {
        image_description,
        vibe_analysis,
        recommendations,
        processing_time: timer.elapsed_ms(),
    })
}

async fn recommend_for_category(
    analysis: &VibeAnalysis,
    category: Category,
) -> Vec<RecommendationItem> {
    let mut query_terms: Vec<String> = analysis
        .aesthetic_keywords
        .iter()
        .take(MAX_QUERY_TERMS)
        .cloned()
        .collect();
    query_terms.push(analysis.primary_vibe.clone());

    match qloo::lookup_entities(category.entity_type(), &query_terms, &CONFIG.qloo_location).await
    {
        Ok(entities) if !entities.is_empty() => entities
            .into_iter()
            .take(MAX_ITEMS_PER_CATEGORY)
            .map(|entity| entity_to_item(analysis, category, entity))
            .collect(),
        Ok(_) => {
            warn!(
                "Insights lookup for {} returned no entities; using the fallback generator",
                category.as_str()
            );
            fallback_recommendations(analysis, category)
        }
        Err(err) => {
            warn!(
                "Insights lookup for {} failed, using the fallback generator: {err:#}",
                category.as_str()
            );
            fallback_recommendations(analysis, category)
        }
    }
}

fn entity_to_item(
    analysis: &VibeAnalysis,
    category: Category,
    entity: InsightEntity,
) -> RecommendationItem {
    let shared = shared_term_count(&entity.keywords, &analysis.aesthetic_keywords);
    let confidence = image_confidence(shared, entity.rating);
    let match_reason = if shared > 0 {
        format!(
            "Shares {shared} aesthetic cue{} with the image's {} vibe.",
            if shared == 1 { "" } else { "s" },
            analysis.primary_vibe
        )
    } else {
        format!(
            "A {} pick in the spirit of {}.",
            category.as_str(),
            analysis.primary_vibe
        )
    };
    let description = if entity.description.trim().is_empty() {
        format!("A {} match surfaced for your image's palette.", category.as_str())
    } else {
        entity.description
    };

    RecommendationItem {
        name: entity.name,
        description,
        match_reason,
        confidence,
        tags: entity.keywords.into_iter().take(MAX_ITEM_TAGS).collect(),
    }
}
