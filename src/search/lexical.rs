//! Lexical keyword-frequency scoring

/// Score item text against an extracted token set, in [0,1]
///
/// Per-token contribution is `min(1.0, occurrences * 0.1) * (len / 10)`:
/// frequency saturates at ten occurrences, and longer tokens count for
/// more than short ones. The total is normalized by the token count and
/// clamped to 1.0. Zero tokens score zero everywhere.
pub fn keyword_score(text: &str, tokens: &[String]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }

    let haystack = text.to_lowercase();
    let mut total = 0.0f32;

    for token in tokens {
        let occurrences = haystack.matches(token.as_str()).count();
        if occurrences > 0 {
            let frequency = (occurrences as f32 * 0.1).min(1.0);
            let weight = token.chars().count() as f32 / 10.0;
            total += frequency * weight;
        }
    }

    (total / tokens.len() as f32).min(1.0)
}
