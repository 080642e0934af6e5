use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use crate::config::{ModelChoice, CONFIG};
use crate::handlers::responses::ApiError;
use crate::llm::gemini;
use crate::llm::qloo::{self, InsightEntity};
use crate::utils::timing::RequestTimer;
use crate::vibes::fallback::{
    derive_vibe_parameters, fallback_movie_analysis, fallback_similar_movies,
};
use crate::vibes::parse::{parse_movie_analysis, summary_is_usable};
use crate::vibes::prompts::{
    movie_analysis_prompt, movie_summary_prompt, MOVIE_SUMMARY_SYSTEM_PROMPT, VIBE_SYSTEM_PROMPT,
};
use crate::vibes::score::{movie_match_score, shared_term_count};
use crate::vibes::{AnalyzeMovieResponse, MovieAnalysis, SimilarMovie};

const MOVIE_ENTITY_TYPE: &str = "urn:entity:movie";
const MAX_SIMILAR_MOVIES: usize = 3;
const MAX_MOVIE_TAGS: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMovieRequest {
    #[serde(default)]
    pub movie_name: String,
}

pub async fn analyze_movie(
    body: Result<Json<AnalyzeMovieRequest>, JsonRejection>,
) -> Result<Json<AnalyzeMovieResponse>, ApiError> {
    let mut timer = RequestTimer::start("/api/analyze-movie");
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
    body: Result<Json<AnalyzeMovieRequest>, JsonRejection>,
    timer: &RequestTimer,
) -> Result<AnalyzeMovieResponse, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::MissingInput(rejection.body_text()))?;
    let movie_name = request.movie_name.trim().to_string();
    if movie_name.is_empty() {
        return Err(ApiError::MissingInput("movieName is required".to_string()));
    }
    if !CONFIG.has_gemini_credential() {
        return Err(ApiError::MissingCredential("GEMINI_API_KEY"));
    }

    // Stage 1: summary, first candidate model whose reply is usable.
    let summary = generate_summary(&movie_name).await;

    // Stage 2: structured extraction, built-in table on any miss.
    let prompt = movie_analysis_prompt(&movie_name, &summary);
    let movie_analysis =
        match gemini::generate_text(ModelChoice::Flash, VIBE_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => parse_movie_analysis(&movie_name, &summary, &text).unwrap_or_else(|| {
                warn!("Movie extraction returned unparseable text; using the built-in table");
                fallback_movie_analysis(&movie_name, &summary)
            }),
            Err(err) => {
                warn!("Movie extraction failed, using the built-in table: {err:#}");
                fallback_movie_analysis(&movie_name, &summary)
            }
        };

    let vibe_parameters = derive_vibe_parameters(&movie_analysis);

    // Stage 3: similar-title lookup, genre table on any miss.
    let similar_movies = find_similar_movies(&movie_analysis, &vibe_parameters.keywords).await;

    Ok(AnalyzeMovieResponse {
        movie_analysis,
        vibe_parameters,
        similar_movies,
        processing_time: timer.elapsed_ms(),
    })
}

async fn generate_summary(movie_name: &str) -> String {
    for model in ModelChoice::SUMMARY_CANDIDATES {
        let prompt = movie_summary_prompt(model, movie_name);
        match gemini::generate_text(model, MOVIE_SUMMARY_SYSTEM_PROMPT, &prompt).await {
            Ok(text) if summary_is_usable(&text) => return text.trim().to_string(),
            Ok(_) => warn!(
                "Summary from the {} model was too short; trying the next candidate",
                model.label()
            ),
            Err(err) => warn!(
                "Summary call to the {} model failed, trying the next candidate: {err:#}",
                model.label()
            ),
        }
    }
    warn!("All summary candidates failed for '{movie_name}'; continuing without a summary");
    String::new()
}

fn rating_rng() -> fastrand::Rng {
    match CONFIG.fallback_rating_seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}

async fn find_similar_movies(analysis: &MovieAnalysis, keywords: &[String]) -> Vec<SimilarMovie> {
    match qloo::lookup_entities(MOVIE_ENTITY_TYPE, keywords, &CONFIG.qloo_location).await {
        Ok(entities) if !entities.is_empty() => {
            let excluded = analysis.title.to_lowercase();
            entities
                .into_iter()
                .filter(|entity| entity.name.to_lowercase() != excluded)
                .take(MAX_SIMILAR_MOVIES)
                .map(|entity| entity_to_similar(analysis, entity))
                .collect()
        }
        Ok(_) => {
            warn!("Movie lookup returned no entities; using the genre table");
            fallback_similar_movies(analysis, &mut rating_rng())
        }
        Err(err) => {
            warn!("Movie lookup failed, using the genre table: {err:#}");
            fallback_similar_movies(analysis, &mut rating_rng())
        }
    }
}

fn entity_to_similar(analysis: &MovieAnalysis, entity: InsightEntity) -> SimilarMovie {
    let mut anchors: Vec<String> = analysis.genres.clone();
    anchors.extend(analysis.themes.iter().cloned());
    let shared = shared_term_count(&entity.keywords, &anchors);
    let description = if entity.description.trim().is_empty() {
        format!("A title adjacent to {} in tone and audience.", analysis.title)
    } else {
        entity.description
    };

    SimilarMovie {
        title: entity.name,
        description,
        match_reason: format!(
            "Overlaps with {} on {shared} genre/theme element{}.",
            analysis.title,
            if shared == 1 { "" } else { "s" }
        ),
        match_score: movie_match_score(shared),
        rating: entity.rating.clamp(0.0, 10.0),
        tags: entity.keywords.into_iter().take(MAX_MOVIE_TAGS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parasite_analysis() -> MovieAnalysis {
        fallback_movie_analysis("Parasite", "")
    }

    #[test]
    fn entity_match_score_steps_by_shared_elements() {
        let entity = InsightEntity {
            name: "Burning".to_string(),
            description: String::new(),
            rating: 7.5,
            keywords: vec!["thriller".to_string(), "class divide".to_string()],
        };
        let similar = entity_to_similar(&parasite_analysis(), entity);
        assert!((similar.match_score - 0.76).abs() < 1e-9);
        assert_eq!(similar.rating, 7.5);
        assert!(similar.match_reason.contains("2 genre/theme elements"));
    }

    #[test]
    fn entity_rating_is_clamped_to_a_ten_point_scale() {
        let entity = InsightEntity {
            name: "Overrated".to_string(),
            description: "x".to_string(),
            rating: 37.0,
            keywords: vec![],
        };
        let similar = entity_to_similar(&parasite_analysis(), entity);
        assert_eq!(similar.rating, 10.0);
    }
}
