//! Deterministic local substitutes for every remote stage. Each producer
//! here returns the same shape as its remote counterpart, so a pipeline
//! stage can swap one in without the downstream stages noticing.

use crate::vibes::score::{movie_match_score, shared_term_count};
use crate::vibes::{
    Category, MovieAnalysis, RecommendationItem, SimilarMovie, VibeAnalysis, VibeParameters,
};

/// Substitute caption used when the vision stage fails outright.
pub const GENERIC_IMAGE_DESCRIPTION: &str = "A thoughtfully composed scene with warm natural light, layered textures and a calm, curated atmosphere.";

/// Extra words the fallback item generator may tag items with, beyond the
/// analysis's own keyword and mood lists.
pub const FIXED_TAG_VOCABULARY: [&str; 6] =
    ["local", "curated", "independent", "seasonal", "intimate", "guided"];

const MAX_LIST_LEN: usize = 6;

struct VibeProfile {
    label: &'static str,
    triggers: &'static [&'static str],
    secondary: &'static [&'static str],
    context: &'static str,
    keywords: &'static [&'static str],
    moods: &'static [&'static str],
}

/// Trigger table for the keyword analyzer. Order matters: earlier entries
/// win score ties, and the first entry is also the default when nothing
/// matches.
static VIBE_PROFILES: [VibeProfile; 8] = [
    VibeProfile {
        label: "eclectic contemporary",
        triggers: &["collage", "mixed", "gallery", "eclectic", "curated", "design"],
        secondary: &["artful modern", "gallery casual"],
        context: "A blended, current look that borrows from several aesthetics at once.",
        keywords: &["gallery", "design", "texture", "contrast", "detail", "palette"],
        moods: &["curious", "open", "expressive"],
    },
    VibeProfile {
        label: "cozy intimate",
        triggers: &["cozy", "warm", "candle", "soft", "blanket", "fireplace", "intimate", "lamp"],
        secondary: &["hygge calm", "slow evening"],
        context: "Warm light and soft textures that invite staying in and slowing down.",
        keywords: &["candlelight", "wood", "soft textiles", "warmth", "books", "tea"],
        moods: &["relaxed", "nostalgic", "gentle"],
    },
    VibeProfile {
        label: "urban energy",
        triggers: &["city", "street", "neon", "night", "traffic", "skyline", "crowd", "subway"],
        secondary: &["neon noir", "metropolitan pulse"],
        context: "Dense city signals: movement, lights and a late-night pulse.",
        keywords: &["neon", "concrete", "streetlight", "motion", "glass", "signage"],
        moods: &["electric", "restless", "bold"],
    },
    VibeProfile {
        label: "natural serenity",
        triggers: &["forest", "mountain", "ocean", "beach", "tree", "lake", "sky", "garden", "field"],
        secondary: &["quiet outdoors", "slow landscape"],
        context: "Open air and organic forms, read as stillness and breathing room.",
        keywords: &["greenery", "water", "horizon", "stone", "light", "air"],
        moods: &["calm", "grounded", "restorative"],
    },
    VibeProfile {
        label: "vintage nostalgia",
        triggers: &["vintage", "retro", "old", "film", "antique", "classic", "faded", "analog"],
        secondary: &["analog warmth", "heritage charm"],
        context: "Worn surfaces and period details that point backwards in time.",
        keywords: &["film grain", "patina", "typewriter", "vinyl", "sepia", "brass"],
        moods: &["wistful", "romantic", "sentimental"],
    },
    VibeProfile {
        label: "minimalist modern",
        triggers: &["minimal", "clean", "white", "simple", "geometric", "modern", "sparse"],
        secondary: &["quiet luxury", "scandinavian calm"],
        context: "Reduced forms and negative space doing the talking.",
        keywords: &["white space", "line", "concrete", "monochrome", "glass", "order"],
        moods: &["composed", "focused", "serene"],
    },
    VibeProfile {
        label: "industrial chic",
        triggers: &["concrete", "metal", "warehouse", "exposed", "brick", "loft", "steel", "pipe"],
        secondary: &["raw luxe", "warehouse cool"],
        context: "Raw structural materials dressed up just enough.",
        keywords: &["exposed brick", "steel", "edison bulb", "loft", "leather", "matte black"],
        moods: &["moody", "confident", "understated"],
    },
    VibeProfile {
        label: "vibrant playful",
        triggers: &["color", "colorful", "bright", "playful", "festival", "mural", "balloon", "pattern"],
        secondary: &["pop maximalism", "carnival spirit"],
        context: "Saturated color and pattern stacked for joy over restraint.",
        keywords: &["color block", "mural", "confetti", "pattern", "sunlight", "paint"],
        moods: &["joyful", "energetic", "spontaneous"],
    },
];

fn trigger_score(text: &str, triggers: &[&str]) -> usize {
    triggers
        .iter()
        .map(|trigger| text.matches(trigger).count())
        .sum()
}

fn to_strings(values: &[&str], max: usize) -> Vec<String> {
    values.iter().take(max).map(|value| value.to_string()).collect()
}

/// Keyword-matching substitute for the vibe extraction stage. Pure: the
/// same text always yields the same analysis. Labels are scored by
/// counting case-insensitive trigger occurrences; ties keep the earlier
/// table entry, and a zero score everywhere lands on the first (default)
/// profile.
pub fn analyze_text(text: &str) -> VibeAnalysis {
    let lowered = text.to_lowercase();
    let mut best_index = 0usize;
    let mut best_score = 0usize;
    for (index, profile) in VIBE_PROFILES.iter().enumerate() {
        let score = trigger_score(&lowered, profile.triggers);
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    let profile = &VIBE_PROFILES[best_index];
    VibeAnalysis {
        primary_vibe: profile.label.to_string(),
        secondary_vibes: to_strings(profile.secondary, MAX_LIST_LEN),
        context: profile.context.to_string(),
        aesthetic_keywords: to_strings(profile.keywords, MAX_LIST_LEN),
        moods: to_strings(profile.moods, MAX_LIST_LEN),
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn item_tags(analysis: &VibeAnalysis, fixed: &str) -> Vec<String> {
    let mut tags: Vec<String> = analysis.aesthetic_keywords.iter().take(2).cloned().collect();
    if let Some(mood) = analysis.moods.first() {
        tags.push(mood.clone());
    }
    tags.push(fixed.to_string());
    tags
}

/// Template substitute for one recommendation category. Deterministic:
/// every field is interpolated from the analysis and fixed text, and the
/// confidences are fixed per template.
pub fn fallback_recommendations(analysis: &VibeAnalysis, category: Category) -> Vec<RecommendationItem> {
    let vibe = &analysis.primary_vibe;
    let vibe_title = title_case(vibe);
    let mood = analysis
        .moods
        .first()
        .cloned()
        .unwrap_or_else(|| "easygoing".to_string());

    match category {
        Category::Restaurants => vec![
            RecommendationItem {
                name: format!("The {vibe_title} Table"),
                description: format!(
                    "A neighborhood dining room with a {vibe} sensibility and a short seasonal menu."
                ),
                match_reason: format!("Echoes the {vibe} mood of your image."),
                confidence: 0.72,
                tags: item_tags(analysis, "local"),
            },
            RecommendationItem {
                name: format!("{vibe_title} Supper Club"),
                description: format!("A {mood} evening spot built around shared plates and low light."),
                match_reason: format!("Its {mood} register matches the scene's atmosphere."),
                confidence: 0.68,
                tags: item_tags(analysis, "intimate"),
            },
        ],
        Category::Music => vec![
            RecommendationItem {
                name: format!("{vibe_title} Frequencies"),
                description: format!("A listening session of artists who score a {vibe} world."),
                match_reason: format!("Soundtracks the {mood} feel the image carries."),
                confidence: 0.7,
                tags: item_tags(analysis, "curated"),
            },
            RecommendationItem {
                name: format!("After Hours: {vibe_title}"),
                description: "A small-venue live set leaning atmospheric over anthemic.".to_string(),
                match_reason: format!("Live sound in the same {vibe} lane."),
                confidence: 0.65,
                tags: item_tags(analysis, "independent"),
            },
        ],
        Category::Activities => vec![
            RecommendationItem {
                name: format!("{vibe_title} Neighborhood Walk"),
                description: format!(
                    "A self-guided route through blocks that share the image's {vibe} texture."
                ),
                match_reason: "Puts you physically inside the same aesthetic.".to_string(),
                confidence: 0.69,
                tags: item_tags(analysis, "guided"),
            },
            RecommendationItem {
                name: "Golden Hour Photo Stroll".to_string(),
                description: format!("Chase the {mood} light that defines this palette."),
                match_reason: format!("Built around the {mood} mood of the scene."),
                confidence: 0.64,
                tags: item_tags(analysis, "local"),
            },
        ],
        Category::Experiences => vec![RecommendationItem {
            name: format!("A {vibe_title} Evening"),
            description: format!(
                "Gallery opening, slow dinner, then a nightcap somewhere {mood} and small."
            ),
            match_reason: format!("A full itinerary tuned to {vibe}."),
            confidence: 0.66,
            tags: item_tags(analysis, "seasonal"),
        }],
    }
}

struct MovieProfile {
    title: &'static str,
    summary: &'static str,
    genres: &'static [&'static str],
    themes: &'static [&'static str],
    tone: &'static str,
    keywords: &'static [&'static str],
}

/// Built-in analyses for titles the service should get right even with
/// every dependency down.
static KNOWN_MOVIES: [MovieProfile; 10] = [
    MovieProfile {
        title: "parasite",
        summary: "A poor family cons its way into service jobs for a wealthy household, until the arrangement collapses violently.",
        genres: &["thriller", "drama", "dark comedy"],
        themes: &["class divide", "family", "deception", "social ladder"],
        tone: "tense",
        keywords: &["seoul", "basement", "wealth gap", "con", "architecture"],
    },
    MovieProfile {
        title: "inception",
        summary: "A thief who steals secrets from dreams takes one last job: planting an idea instead.",
        genres: &["sci-fi", "thriller", "action"],
        themes: &["dreams", "guilt", "memory", "heist"],
        tone: "cerebral",
        keywords: &["dream", "heist", "subconscious", "layers", "totem"],
    },
    MovieProfile {
        title: "amelie",
        summary: "A shy Parisian waitress secretly engineers small joys for the people around her.",
        genres: &["romance", "comedy"],
        themes: &["whimsy", "loneliness", "small kindnesses"],
        tone: "whimsical",
        keywords: &["paris", "montmartre", "whimsy", "cafe", "color"],
    },
    MovieProfile {
        title: "the grand budapest hotel",
        summary: "A legendary concierge and his lobby boy are swept into a caper over a priceless painting between the wars.",
        genres: &["comedy", "drama"],
        themes: &["friendship", "nostalgia", "fading elegance"],
        tone: "whimsical",
        keywords: &["hotel", "pastel", "caper", "symmetry", "europe"],
    },
    MovieProfile {
        title: "blade runner",
        summary: "A burnt-out detective hunts rogue replicants through a rain-soaked neon megacity.",
        genres: &["sci-fi", "noir"],
        themes: &["identity", "humanity", "memory"],
        tone: "brooding",
        keywords: &["neon", "rain", "replicant", "dystopia", "noir"],
    },
    MovieProfile {
        title: "spirited away",
        summary: "A girl must work in a bathhouse for spirits to free her parents from a curse.",
        genres: &["animation", "fantasy"],
        themes: &["coming of age", "greed", "spirit world"],
        tone: "dreamlike",
        keywords: &["bathhouse", "spirits", "ghibli", "river", "transformation"],
    },
    MovieProfile {
        title: "la la land",
        summary: "An actress and a jazz pianist chase their dreams in Los Angeles, and the dreams charge admission.",
        genres: &["musical", "romance", "drama"],
        themes: &["ambition", "love", "compromise"],
        tone: "bittersweet",
        keywords: &["jazz", "los angeles", "technicolor", "audition", "duet"],
    },
    MovieProfile {
        title: "the godfather",
        summary: "The reluctant youngest son of a mafia dynasty is pulled into inheriting it.",
        genres: &["crime", "drama"],
        themes: &["family", "power", "corruption"],
        tone: "somber",
        keywords: &["mafia", "family", "succession", "new york", "loyalty"],
    },
    MovieProfile {
        title: "get out",
        summary: "A Black man's weekend meeting his girlfriend's family curdles into something engineered.",
        genres: &["horror", "thriller"],
        themes: &["race", "control", "appropriation"],
        tone: "unnerving",
        keywords: &["suburbia", "hypnosis", "sunken place", "satire"],
    },
    MovieProfile {
        title: "her",
        summary: "A lonely writer falls in love with an operating system that keeps growing past him.",
        genres: &["sci-fi", "romance", "drama"],
        themes: &["loneliness", "intimacy", "technology"],
        tone: "melancholy",
        keywords: &["ai", "future", "letters", "pastel", "voice"],
    },
];

struct GenreTriggers {
    genre: &'static str,
    triggers: &'static [&'static str],
}

static GENRE_TRIGGERS: [GenreTriggers; 8] = [
    GenreTriggers { genre: "drama", triggers: &["life", "family", "story", "loss", "struggle"] },
    GenreTriggers { genre: "thriller", triggers: &["murder", "chase", "killer", "conspiracy", "danger", "hunt"] },
    GenreTriggers { genre: "comedy", triggers: &["funny", "comedy", "laugh", "awkward", "hilarious"] },
    GenreTriggers { genre: "romance", triggers: &["love", "romance", "heart", "wedding", "affair"] },
    GenreTriggers { genre: "sci-fi", triggers: &["space", "future", "robot", "alien", "time travel", "dystopia"] },
    GenreTriggers { genre: "horror", triggers: &["haunted", "ghost", "demon", "terror", "nightmare"] },
    GenreTriggers { genre: "fantasy", triggers: &["magic", "kingdom", "dragon", "quest", "myth"] },
    GenreTriggers { genre: "action", triggers: &["fight", "war", "mission", "explosion", "revenge"] },
];

fn known_movie(title: &str) -> Option<&'static MovieProfile> {
    let lowered = title.trim().to_lowercase();
    let stripped = lowered.strip_prefix("the ").unwrap_or(&lowered);
    KNOWN_MOVIES.iter().find(|profile| {
        profile.title == lowered || profile.title.strip_prefix("the ").unwrap_or(profile.title) == stripped
    })
}

fn genres_from_text(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut scored: Vec<(usize, &str)> = GENRE_TRIGGERS
        .iter()
        .map(|entry| (trigger_score(&lowered, entry.triggers), entry.genre))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let genres: Vec<String> = scored
        .into_iter()
        .take(3)
        .map(|(_, genre)| genre.to_string())
        .collect();
    if genres.is_empty() {
        vec!["drama".to_string()]
    } else {
        genres
    }
}

/// Table substitute for the movie extraction stage. Known titles get their
/// curated profile; unknown ones get genres matched out of whatever text
/// we have, with `drama` as the floor.
pub fn fallback_movie_analysis(title: &str, summary: &str) -> MovieAnalysis {
    if let Some(profile) = known_movie(title) {
        let summary = if summary.trim().is_empty() {
            profile.summary.to_string()
        } else {
            summary.trim().to_string()
        };
        return MovieAnalysis {
            title: title.trim().to_string(),
            summary,
            genres: to_strings(profile.genres, 3),
            themes: to_strings(profile.themes, 4),
            tone: profile.tone.to_string(),
            keywords: to_strings(profile.keywords, MAX_LIST_LEN),
        };
    }

    let haystack = format!("{title} {summary}");
    let genres = genres_from_text(&haystack);
    let summary = if summary.trim().is_empty() {
        format!("{} is remembered for its distinctive mood and committed craft.", title.trim())
    } else {
        summary.trim().to_string()
    };
    MovieAnalysis {
        title: title.trim().to_string(),
        summary,
        themes: vec!["atmosphere".to_string(), "character".to_string()],
        tone: "atmospheric".to_string(),
        keywords: genres.clone(),
        genres,
    }
}

struct AudienceMapping {
    genre: &'static str,
    audience: &'static str,
}

static AUDIENCES_BY_GENRE: [AudienceMapping; 10] = [
    AudienceMapping { genre: "thriller", audience: "suspense seekers" },
    AudienceMapping { genre: "drama", audience: "character-study devotees" },
    AudienceMapping { genre: "comedy", audience: "comfort-watch crowds" },
    AudienceMapping { genre: "dark comedy", audience: "gallows-humor fans" },
    AudienceMapping { genre: "romance", audience: "hopeless romantics" },
    AudienceMapping { genre: "sci-fi", audience: "big-idea futurists" },
    AudienceMapping { genre: "horror", audience: "midnight-screening regulars" },
    AudienceMapping { genre: "animation", audience: "animation aficionados" },
    AudienceMapping { genre: "musical", audience: "showtune loyalists" },
    AudienceMapping { genre: "crime", audience: "slow-burn crime fans" },
];

/// Lookup parameters the recommendation stage derives from a movie
/// analysis. Deterministic in the analysis.
pub fn derive_vibe_parameters(analysis: &MovieAnalysis) -> VibeParameters {
    let mut keywords: Vec<String> = analysis.keywords.clone();
    for term in analysis.genres.iter().chain(analysis.themes.iter()) {
        if !keywords.contains(term) {
            keywords.push(term.clone());
        }
    }
    keywords.truncate(MAX_LIST_LEN);

    let mut audiences: Vec<String> = Vec::new();
    for genre in &analysis.genres {
        if let Some(mapping) = AUDIENCES_BY_GENRE
            .iter()
            .find(|mapping| mapping.genre == genre.as_str())
        {
            let audience = mapping.audience.to_string();
            if !audiences.contains(&audience) {
                audiences.push(audience);
            }
        }
    }
    if audiences.is_empty() {
        audiences.push("film enthusiasts".to_string());
    }

    VibeParameters { keywords, audiences }
}

struct SimilarCandidate {
    title: &'static str,
    description: &'static str,
    base_rating: f64,
    tags: &'static [&'static str],
}

struct GenreCandidates {
    genre: &'static str,
    candidates: &'static [SimilarCandidate],
}

static SIMILAR_BY_GENRE: [GenreCandidates; 8] = [
    GenreCandidates {
        genre: "thriller",
        candidates: &[
            SimilarCandidate {
                title: "Memories of Murder",
                description: "Detectives flail at a serial case in a rain-beaten province.",
                base_rating: 8.1,
                tags: &["thriller", "crime", "class divide"],
            },
            SimilarCandidate {
                title: "Oldboy",
                description: "A man imprisoned for fifteen years is released into a revenge maze.",
                base_rating: 8.3,
                tags: &["thriller", "revenge", "deception"],
            },
            SimilarCandidate {
                title: "Prisoners",
                description: "A father takes the search for his missing daughter into his own hands.",
                base_rating: 8.1,
                tags: &["thriller", "drama", "family"],
            },
        ],
    },
    GenreCandidates {
        genre: "drama",
        candidates: &[
            SimilarCandidate {
                title: "Shoplifters",
                description: "A makeshift family survives Tokyo on petty theft and real tenderness.",
                base_rating: 7.9,
                tags: &["drama", "family", "class divide"],
            },
            SimilarCandidate {
                title: "Moonlight",
                description: "A Miami kid grows up in three acts of silence and salt air.",
                base_rating: 7.4,
                tags: &["drama", "coming of age", "identity"],
            },
            SimilarCandidate {
                title: "Manchester by the Sea",
                description: "A janitor is handed guardianship he cannot carry.",
                base_rating: 7.8,
                tags: &["drama", "loss", "family"],
            },
        ],
    },
    GenreCandidates {
        genre: "sci-fi",
        candidates: &[
            SimilarCandidate {
                title: "Arrival",
                description: "A linguist learns a language that rewrites her sense of time.",
                base_rating: 7.9,
                tags: &["sci-fi", "memory", "language"],
            },
            SimilarCandidate {
                title: "Ex Machina",
                description: "A coder administers a Turing test that was never about the machine.",
                base_rating: 7.7,
                tags: &["sci-fi", "ai", "control"],
            },
        ],
    },
    GenreCandidates {
        genre: "comedy",
        candidates: &[
            SimilarCandidate {
                title: "The Grand Budapest Hotel",
                description: "A pastel caper about a concierge, a painting and a vanishing Europe.",
                base_rating: 8.1,
                tags: &["comedy", "nostalgia", "caper"],
            },
            SimilarCandidate {
                title: "Booksmart",
                description: "Two overachievers cram four years of fun into one night.",
                base_rating: 7.1,
                tags: &["comedy", "friendship", "coming of age"],
            },
        ],
    },
    GenreCandidates {
        genre: "romance",
        candidates: &[
            SimilarCandidate {
                title: "In the Mood for Love",
                description: "Two neighbors circle an affair they refuse to have.",
                base_rating: 8.1,
                tags: &["romance", "longing", "restraint"],
            },
            SimilarCandidate {
                title: "Before Sunrise",
                description: "Two strangers talk through one night in Vienna.",
                base_rating: 8.1,
                tags: &["romance", "conversation", "chance"],
            },
        ],
    },
    GenreCandidates {
        genre: "horror",
        candidates: &[
            SimilarCandidate {
                title: "Hereditary",
                description: "A family inheritance turns out to be the family itself.",
                base_rating: 7.3,
                tags: &["horror", "family", "grief"],
            },
            SimilarCandidate {
                title: "The Witch",
                description: "A Puritan homestead unravels at the forest's edge.",
                base_rating: 7.0,
                tags: &["horror", "isolation", "faith"],
            },
        ],
    },
    GenreCandidates {
        genre: "animation",
        candidates: &[
            SimilarCandidate {
                title: "Your Name",
                description: "Two teenagers swap bodies across a comet's arc.",
                base_rating: 8.4,
                tags: &["animation", "romance", "time"],
            },
            SimilarCandidate {
                title: "Princess Mononoke",
                description: "A cursed prince walks into a war between iron and forest.",
                base_rating: 8.3,
                tags: &["animation", "fantasy", "nature"],
            },
        ],
    },
    GenreCandidates {
        genre: "action",
        candidates: &[
            SimilarCandidate {
                title: "Mad Max: Fury Road",
                description: "One long chase across a desert that keeps score in chrome.",
                base_rating: 8.1,
                tags: &["action", "survival", "spectacle"],
            },
            SimilarCandidate {
                title: "John Wick",
                description: "A retired hitman un-retires over a dog and a car.",
                base_rating: 7.4,
                tags: &["action", "revenge", "style"],
            },
        ],
    },
];

const DEFAULT_SIMILAR_GENRE: &str = "drama";
const MAX_SIMILAR_MOVIES: usize = 3;
const RATING_JITTER_SPAN: f64 = 0.8;

fn candidates_for_genre(genre: &str) -> Option<&'static [SimilarCandidate]> {
    SIMILAR_BY_GENRE
        .iter()
        .find(|entry| entry.genre == genre)
        .map(|entry| entry.candidates)
}

/// Substitute for the similar-movie lookup. Title selection, ordering and
/// match scores are deterministic in the analysis; only the simulated
/// `rating` takes jitter from the caller's RNG (seed it for reproducible
/// output).
pub fn fallback_similar_movies(analysis: &MovieAnalysis, rng: &mut fastrand::Rng) -> Vec<SimilarMovie> {
    let excluded = analysis.title.trim().to_lowercase();
    let mut anchors: Vec<String> = analysis.genres.clone();
    anchors.extend(analysis.themes.iter().cloned());

    let mut picked: Vec<(&'static SimilarCandidate, String)> = Vec::new();
    let genre_order = analysis
        .genres
        .iter()
        .map(|genre| genre.as_str())
        .chain(std::iter::once(DEFAULT_SIMILAR_GENRE));
    for genre in genre_order {
        let Some(candidates) = candidates_for_genre(genre) else {
            continue;
        };
        for candidate in candidates {
            if candidate.title.to_lowercase() == excluded {
                continue;
            }
            if picked.iter().any(|(existing, _)| existing.title == candidate.title) {
                continue;
            }
            picked.push((candidate, genre.to_string()));
            if picked.len() == MAX_SIMILAR_MOVIES {
                break;
            }
        }
        if picked.len() == MAX_SIMILAR_MOVIES {
            break;
        }
    }

    picked
        .into_iter()
        .map(|(candidate, genre)| {
            let tags: Vec<String> = candidate.tags.iter().map(|tag| tag.to_string()).collect();
            let shared = shared_term_count(&tags, &anchors);
            let jitter = (rng.f64() - 0.5) * RATING_JITTER_SPAN;
            SimilarMovie {
                title: candidate.title.to_string(),
                description: candidate.description.to_string(),
                match_reason: format!(
                    "Shares the {genre} register of {}.",
                    analysis.title.trim()
                ),
                match_score: movie_match_score(shared),
                rating: (candidate.base_rating + jitter).clamp(1.0, 10.0),
                tags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vibes::score::MAX_CONFIDENCE;

    #[test]
    fn analyzer_is_pure() {
        let text = "A cozy reading nook with a candle and soft blankets near the fireplace.";
        assert_eq!(analyze_text(text), analyze_text(text));
    }

    #[test]
    fn analyzer_picks_highest_scoring_label() {
        let analysis = analyze_text("Neon signs over a crowded city street at night.");
        assert_eq!(analysis.primary_vibe, "urban energy");
        assert!(!analysis.aesthetic_keywords.is_empty());
        assert!(!analysis.moods.is_empty());
    }

    #[test]
    fn analyzer_counts_repeated_triggers() {
        // "cozy" twice should outscore a single "city".
        let analysis = analyze_text("cozy city cozy");
        assert_eq!(analysis.primary_vibe, "cozy intimate");
    }

    #[test]
    fn analyzer_defaults_when_nothing_matches() {
        let analysis = analyze_text("zzz qqq 12345");
        assert_eq!(analysis.primary_vibe, "eclectic contemporary");
    }

    #[test]
    fn analyzer_is_case_insensitive() {
        let analysis = analyze_text("EXPOSED BRICK and STEEL in a WAREHOUSE loft");
        assert_eq!(analysis.primary_vibe, "industrial chic");
    }

    #[test]
    fn generic_description_yields_a_usable_analysis() {
        let analysis = analyze_text(GENERIC_IMAGE_DESCRIPTION);
        assert!(!analysis.primary_vibe.is_empty());
    }

    fn allowed_tags(analysis: &VibeAnalysis) -> Vec<String> {
        let mut allowed: Vec<String> = analysis.aesthetic_keywords.clone();
        allowed.extend(analysis.moods.iter().cloned());
        allowed.extend(FIXED_TAG_VOCABULARY.iter().map(|tag| tag.to_string()));
        allowed
    }

    #[test]
    fn fallback_items_keep_tags_within_allowed_vocabulary() {
        let analysis = analyze_text("Neon rain over the city skyline at night.");
        let allowed = allowed_tags(&analysis);
        for category in Category::ALL {
            let items = fallback_recommendations(&analysis, category);
            assert!(!items.is_empty() && items.len() <= 2);
            for item in items {
                assert!(item.confidence > 0.0 && item.confidence <= 1.0);
                assert!(item.confidence <= MAX_CONFIDENCE);
                for tag in &item.tags {
                    assert!(allowed.contains(tag), "unexpected tag {tag}");
                }
            }
        }
    }

    #[test]
    fn fallback_items_are_deterministic() {
        let analysis = analyze_text("A minimal white room with clean geometric lines.");
        let first = fallback_recommendations(&analysis, Category::Restaurants);
        let second = fallback_recommendations(&analysis, Category::Restaurants);
        assert_eq!(first, second);
    }

    #[test]
    fn parasite_hits_the_built_in_table() {
        let analysis = fallback_movie_analysis("Parasite", "");
        assert!(analysis.genres.iter().any(|g| g == "thriller" || g == "drama"));
        assert_eq!(analysis.tone, "tense");
        assert!(!analysis.summary.is_empty());
    }

    #[test]
    fn known_movie_lookup_ignores_case_and_leading_article() {
        assert!(known_movie("THE GODFATHER").is_some());
        assert!(known_movie("grand budapest hotel").is_some());
    }

    #[test]
    fn unknown_movie_matches_genres_from_summary() {
        let analysis = fallback_movie_analysis(
            "Some Obscure Film",
            "A detective hunts a killer through a web of conspiracy and danger.",
        );
        assert_eq!(analysis.genres[0], "thriller");
    }

    #[test]
    fn unknown_movie_without_signal_defaults_to_drama() {
        let analysis = fallback_movie_analysis("Xyzzy", "");
        assert_eq!(analysis.genres, vec!["drama".to_string()]);
        assert!(!analysis.summary.is_empty());
    }

    #[test]
    fn vibe_parameters_map_genres_to_audiences() {
        let analysis = fallback_movie_analysis("Parasite", "");
        let params = derive_vibe_parameters(&analysis);
        assert!(params.audiences.contains(&"suspense seekers".to_string()));
        assert!(!params.keywords.is_empty());
        assert!(params.keywords.len() <= 6);
    }

    #[test]
    fn vibe_parameters_default_audience() {
        let analysis = MovieAnalysis {
            title: "X".to_string(),
            summary: String::new(),
            genres: vec!["western".to_string()],
            themes: vec![],
            tone: "dusty".to_string(),
            keywords: vec![],
        };
        let params = derive_vibe_parameters(&analysis);
        assert_eq!(params.audiences, vec!["film enthusiasts".to_string()]);
    }

    #[test]
    fn similar_movies_exclude_the_input_title() {
        let analysis = fallback_movie_analysis("Parasite", "");
        let mut rng = fastrand::Rng::with_seed(7);
        let similar = fallback_similar_movies(&analysis, &mut rng);
        assert!(!similar.is_empty());
        for movie in &similar {
            assert!(!movie.title.is_empty());
            assert!(!movie.title.eq_ignore_ascii_case("Parasite"));
            assert!(movie.match_score >= 0.6 && movie.match_score <= MAX_CONFIDENCE);
            assert!(movie.rating >= 1.0 && movie.rating <= 10.0);
        }
    }

    #[test]
    fn similar_movie_selection_ignores_the_rng() {
        let analysis = fallback_movie_analysis("Parasite", "");
        let mut rng_a = fastrand::Rng::with_seed(1);
        let mut rng_b = fastrand::Rng::with_seed(99);
        let titles_a: Vec<String> = fallback_similar_movies(&analysis, &mut rng_a)
            .into_iter()
            .map(|movie| movie.title)
            .collect();
        let titles_b: Vec<String> = fallback_similar_movies(&analysis, &mut rng_b)
            .into_iter()
            .map(|movie| movie.title)
            .collect();
        assert_eq!(titles_a, titles_b);
    }

    #[test]
    fn seeded_rng_gives_reproducible_ratings() {
        let analysis = fallback_movie_analysis("Parasite", "");
        let first = fallback_similar_movies(&analysis, &mut fastrand::Rng::with_seed(42));
        let second = fallback_similar_movies(&analysis, &mut fastrand::Rng::with_seed(42));
        assert_eq!(first, second);
    }

    #[test]
    fn candidate_lookup_excludes_a_listed_title() {
        // "Oldboy" must never recommend itself even via its own genre list.
        let analysis = MovieAnalysis {
            title: "Oldboy".to_string(),
            summary: String::new(),
            genres: vec!["thriller".to_string()],
            themes: vec!["revenge".to_string()],
            tone: "brutal".to_string(),
            keywords: vec![],
        };
        let similar = fallback_similar_movies(&analysis, &mut fastrand::Rng::with_seed(3));
        assert!(similar.iter().all(|movie| movie.title != "Oldboy"));
    }
}
