//! Prompt text sent to live models

/// Prompt asking for a structured quote for one mood
pub fn build_mood_prompt(mood: &str) -> String {
    format!(
        "Provide a motivational quote for mood: '{}'. Respond in JSON with fields mood, quote, author, suggested_action.",
        mood.trim()
    )
}
