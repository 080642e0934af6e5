pub mod fallback;
pub mod parse;
pub mod prompts;
pub mod score;

use serde::{Deserialize, Serialize};

/// The fixed recommendation categories of the image pipeline, in response
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Restaurants,
    Music,
    Activities,
    Experiences,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Restaurants,
        Category::Music,
        Category::Activities,
        Category::Experiences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurants => "restaurants",
            Category::Music => "music",
            Category::Activities => "activities",
            Category::Experiences => "experiences",
        }
    }

    /// Entity type filter the recommendation service expects for this
    /// category.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Category::Restaurants => "urn:entity:place",
            Category::Music => "urn:entity:artist",
            Category::Activities => "urn:entity:place",
            Category::Experiences => "urn:entity:place",
        }
    }
}

/// Structured aesthetic read of an image, produced either by parsing model
/// output or by the keyword fallback analyzer. Both producers fill every
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeAnalysis {
    pub primary_vibe: String,
    pub secondary_vibes: Vec<String>,
    pub context: String,
    pub aesthetic_keywords: Vec<String>,
    pub moods: Vec<String>,
}

/// Structured read of a movie, shaped identically whether it came from the
/// model or from the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieAnalysis {
    pub title: String,
    pub summary: String,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub tone: String,
    pub keywords: Vec<String>,
}

/// Lookup parameters derived from a movie analysis for the recommendation
/// stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeParameters {
    pub keywords: Vec<String>,
    pub audiences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub name: String,
    pub description: String,
    pub match_reason: String,
    pub confidence: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCategory {
    pub category: String,
    pub items: Vec<RecommendationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarMovie {
    pub title: String,
    pub description: String,
    pub match_reason: String,
    pub match_score: f64,
    pub rating: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub image_description: String,
    pub vibe_analysis: VibeAnalysis,
    pub recommendations: Vec<RecommendationCategory>,
    pub processing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMovieResponse {
    pub movie_analysis: MovieAnalysis,
    pub vibe_parameters: VibeParameters,
    pub similar_movies: Vec<SimilarMovie>,
    pub processing_time: u64,
}
