use crate::config::ModelChoice;

pub const CAPTION_SYSTEM_PROMPT: &str = "You are a visual culture critic. Describe the scene, setting, lighting, textures, colors and overall atmosphere of the image in two or three sentences. Mention concrete objects and materials. Do not speculate about people's identities.";

pub const CAPTION_USER_PROMPT: &str =
    "Describe this image with attention to its aesthetic and cultural atmosphere.";

pub const VIBE_SYSTEM_PROMPT: &str = "You are a cultural taste analyst. You answer with a single JSON object and nothing else.";

pub const MOVIE_SUMMARY_SYSTEM_PROMPT: &str = "You are a film critic with broad knowledge of world cinema. Answer in plain prose with no markdown.";

/// Stage-2 prompt for the image pipeline. Embeds the stage-1 caption.
pub fn vibe_analysis_prompt(description: &str) -> String {
    format!(
        "Based on this image description, identify the cultural vibe it projects.\n\n\
         Description: {description}\n\n\
         Reply with exactly one JSON object with these keys:\n\
         {{\n\
           \"primaryVibe\": \"a short aesthetic label like 'industrial chic'\",\n\
           \"secondaryVibes\": [\"up to three related labels\"],\n\
           \"context\": \"one sentence on why\",\n\
           \"aestheticKeywords\": [\"five or six concrete keywords\"],\n\
           \"moods\": [\"three or four mood words\"]\n\
         }}"
    )
}

/// Stage-1 prompt for the movie pipeline, phrased per model tag. The pro
/// model gets a longer brief; the lite model a terse one.
pub fn movie_summary_prompt(model: ModelChoice, movie_name: &str) -> String {
    match model {
        ModelChoice::Flash => format!(
            "Summarize the film \"{movie_name}\" in three or four sentences covering its premise, tone and what makes it distinctive. Plain text only."
        ),
        ModelChoice::Pro => format!(
            "Write a concise critical summary of the film \"{movie_name}\": its premise, genre placement, tonal register and cultural footprint, in four sentences or fewer. Plain text only."
        ),
        ModelChoice::FlashLite => {
            format!("In two sentences, what is the film \"{movie_name}\" about and what is its tone?")
        }
    }
}

/// Stage-2 prompt for the movie pipeline. Embeds the stage-1 summary.
pub fn movie_analysis_prompt(movie_name: &str, summary: &str) -> String {
    format!(
        "Extract structured information about the film \"{movie_name}\".\n\n\
         Summary: {summary}\n\n\
         Reply with exactly one JSON object with these keys:\n\
         {{\n\
           \"genres\": [\"two or three lowercase genres\"],\n\
           \"themes\": [\"three or four short themes\"],\n\
           \"tone\": \"one or two words\",\n\
           \"keywords\": [\"five or six search keywords\"]\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vibe_prompt_embeds_the_description() {
        let prompt = vibe_analysis_prompt("a foggy pier at dawn");
        assert!(prompt.contains("a foggy pier at dawn"));
        assert!(prompt.contains("primaryVibe"));
    }

    #[test]
    fn summary_prompts_differ_per_model() {
        let flash = movie_summary_prompt(ModelChoice::Flash, "Parasite");
        let pro = movie_summary_prompt(ModelChoice::Pro, "Parasite");
        let lite = movie_summary_prompt(ModelChoice::FlashLite, "Parasite");
        assert!(flash.contains("Parasite"));
        assert_ne!(flash, pro);
        assert_ne!(pro, lite);
    }
}
