//! Keyword pre-filter: cheap lexical scoring per profile, used to prune
//! obviously off-topic sites before any model call. The downstream
//! extractor is the authority on relevance; ambiguity falls through to it.

use crate::profiles::{PrefilterRule, ProfileDefinition};

/// Shared negative lexicon. A page dominated by these is off-topic for
/// every software/fintech-shaped vertical.
const EXCLUSION_KEYWORDS: &[&str] = &[
    "hospital", "clinic", "doctor", "medical", "health", "pharmacy",
    "restaurant", "food", "travel", "hotel",
];

/// Confidence assigned to a hard rejection.
const REJECT_CONFIDENCE: u32 = 90;

/// Confidence when the signal is ambiguous and we pass through anyway.
const AMBIGUOUS_CONFIDENCE: u32 = 30;

#[derive(Debug, Clone)]
pub struct PrefilterVerdict {
    pub potential_match: bool,
    pub confidence: u32,
    pub profile_score: usize,
    pub exclusion_score: usize,
}

/// Score content against the profile's positive lexicon and the shared
/// exclusion lexicon, then apply the profile's decision rule.
pub fn evaluate(content: &str, profile: &ProfileDefinition) -> PrefilterVerdict {
    let text = content.to_lowercase();

    let profile_score = profile
        .positive_keywords
        .iter()
        .filter(|k| text.contains(*k))
        .count();
    let exclusion_score = EXCLUSION_KEYWORDS
        .iter()
        .filter(|k| text.contains(*k))
        .count();

    let (potential_match, confidence) = match profile.prefilter_rule {
        // Domain verticals with no cheap lexicon: always defer to the
        // extractor, with modest confidence.
        PrefilterRule::PassThrough => (!text.is_empty(), 40),

        // EdTech pays for a lot of dead-end extractions without this:
        // require a positive hit and tolerate at most one exclusion hit,
        // otherwise reject outright and skip extraction entirely.
        PrefilterRule::StrictTwoSided => {
            if profile_score >= 1 && exclusion_score <= 1 {
                (
                    true,
                    (profile_score as u32 * profile.keyword_weight).min(85),
                )
            } else {
                (false, REJECT_CONFIDENCE)
            }
        }

        PrefilterRule::Standard => {
            if profile_score >= 1 && exclusion_score <= profile_score {
                (
                    true,
                    (profile_score as u32 * profile.keyword_weight)
                        .max(40)
                        .min(85),
                )
            } else if profile_score == 0 && exclusion_score >= 1 {
                // Zero positive signal plus an explicit off-topic signal:
                // not ambiguity, a clear negative.
                (false, REJECT_CONFIDENCE)
            } else {
                (true, AMBIGUOUS_CONFIDENCE)
            }
        }
    };

    PrefilterVerdict {
        potential_match,
        confidence,
        profile_score,
        exclusion_score,
    }
}
