use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::vibes::{MovieAnalysis, VibeAnalysis};

/// A movie summary shorter than this (trimmed) is treated as unusable and
/// the next candidate model is tried.
pub const MIN_SUMMARY_CHARS: usize = 20;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?").unwrap());

const MAX_SECONDARY_VIBES: usize = 3;
const MAX_KEYWORDS: usize = 6;
const MAX_MOODS: usize = 4;
const MAX_GENRES: usize = 3;
const MAX_THEMES: usize = 4;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVibeAnalysis {
    #[serde(default)]
    primary_vibe: String,
    #[serde(default)]
    secondary_vibes: Vec<String>,
    #[serde(default)]
    context: String,
    #[serde(default)]
    aesthetic_keywords: Vec<String>,
    #[serde(default)]
    moods: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMovieAnalysis {
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    themes: Vec<String>,
    #[serde(default)]
    tone: String,
    #[serde(default)]
    keywords: Vec<String>,
}

pub fn summary_is_usable(text: &str) -> bool {
    text.trim().chars().count() > MIN_SUMMARY_CHARS
}

/// Locates the brace-delimited substring of free-form model text. Models
/// routinely wrap the object in prose or a markdown fence, so this takes
/// the span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn clean_list(values: Vec<String>, max: usize) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .take(max)
        .collect()
}

/// Strict phase of the two-phase parse for the image pipeline. Returns
/// `None` whenever the text holds no parseable object or the object lacks
/// a primary vibe; the caller then runs the keyword analyzer instead.
pub fn parse_vibe_analysis(model_text: &str) -> Option<VibeAnalysis> {
    let cleaned = CODE_FENCE.replace_all(model_text, "");
    let candidate = extract_json_object(&cleaned)?;
    let raw: RawVibeAnalysis = serde_json::from_str(candidate).ok()?;

    let primary_vibe = raw.primary_vibe.trim().to_lowercase();
    if primary_vibe.is_empty() {
        return None;
    }

    Some(VibeAnalysis {
        primary_vibe,
        secondary_vibes: clean_list(raw.secondary_vibes, MAX_SECONDARY_VIBES),
        context: raw.context.trim().to_string(),
        aesthetic_keywords: clean_list(raw.aesthetic_keywords, MAX_KEYWORDS),
        moods: clean_list(raw.moods, MAX_MOODS),
    })
}

/// Strict phase of the two-phase parse for the movie pipeline. Requires at
/// least one genre; the caller falls back to the built-in movie table
/// otherwise.
pub fn parse_movie_analysis(title: &str, summary: &str, model_text: &str) -> Option<MovieAnalysis> {
    let cleaned = CODE_FENCE.replace_all(model_text, "");
    let candidate = extract_json_object(&cleaned)?;
    let raw: RawMovieAnalysis = serde_json::from_str(candidate).ok()?;

    let genres = clean_list(raw.genres, MAX_GENRES);
    if genres.is_empty() {
        return None;
    }

    let tone = raw.tone.trim().to_lowercase();
    Some(MovieAnalysis {
        title: title.trim().to_string(),
        summary: summary.trim().to_string(),
        genres,
        themes: clean_list(raw.themes, MAX_THEMES),
        tone: if tone.is_empty() {
            "atmospheric".to_string()
        } else {
            tone
        },
        keywords: clean_list(raw.keywords, MAX_KEYWORDS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_embedded_in_prose() {
        let text = "Sure! Here is the analysis:\n{\"primaryVibe\": \"cozy intimate\"}\nHope it helps.";
        assert_eq!(
            extract_json_object(text),
            Some("{\"primaryVibe\": \"cozy intimate\"}")
        );
    }

    #[test]
    fn rejects_text_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parses_fenced_vibe_analysis() {
        let text = "```json\n{\"primaryVibe\": \"Urban Energy\", \"secondaryVibes\": [\"Neon Noir\"], \"context\": \"Night streets\", \"aestheticKeywords\": [\"Neon\", \"Rain\"], \"moods\": [\"electric\"]}\n```";
        let parsed = parse_vibe_analysis(text).unwrap();
        assert_eq!(parsed.primary_vibe, "urban energy");
        assert_eq!(parsed.secondary_vibes, vec!["neon noir"]);
        assert_eq!(parsed.aesthetic_keywords, vec!["neon", "rain"]);
    }

    #[test]
    fn vibe_analysis_requires_primary_vibe() {
        let text = "{\"secondaryVibes\": [\"something\"], \"moods\": [\"calm\"]}";
        assert!(parse_vibe_analysis(text).is_none());
    }

    #[test]
    fn vibe_analysis_rejects_garbage() {
        assert!(parse_vibe_analysis("the model rambled { not json").is_none());
        assert!(parse_vibe_analysis("").is_none());
    }

    #[test]
    fn vibe_lists_are_truncated() {
        let text = r#"{"primaryVibe": "x", "aestheticKeywords": ["a","b","c","d","e","f","g","h"]}"#;
        let parsed = parse_vibe_analysis(text).unwrap();
        assert_eq!(parsed.aesthetic_keywords.len(), 6);
    }

    #[test]
    fn parses_movie_analysis_and_keeps_title() {
        let text = r#"{"genres": ["Thriller", "Drama"], "themes": ["class divide"], "tone": "Tense", "keywords": ["seoul", "basement"]}"#;
        let parsed = parse_movie_analysis("Parasite", "A family schemes.", text).unwrap();
        assert_eq!(parsed.title, "Parasite");
        assert_eq!(parsed.genres, vec!["thriller", "drama"]);
        assert_eq!(parsed.tone, "tense");
    }

    #[test]
    fn movie_analysis_requires_genres() {
        let text = r#"{"themes": ["love"], "tone": "warm"}"#;
        assert!(parse_movie_analysis("Amelie", "", text).is_none());
    }

    #[test]
    fn summary_threshold_is_strictly_greater_than_twenty() {
        assert!(!summary_is_usable("12345678901234567890"));
        assert!(summary_is_usable("123456789012345678901"));
        assert!(!summary_is_usable("   short   "));
    }
}
