//! Prompts for the visibility analysis.

use crate::domain::visibility::{
    CLEAR_THRESHOLD, MAX_OVERALL_SCORE, MAX_PILLAR_SCORE, PARTIAL_THRESHOLD, PILLAR_NAMES,
};

/// System prompt enforcing JSON-only output.
pub const ANALYSIS_SYSTEM: &str = "You are an AI visibility analyst. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Builds the fixed evaluation rubric for `website`.
#[must_use]
pub fn analysis_prompt(website: &str) -> String {
    let [business, audience, location, trust] = PILLAR_NAMES;
    let pillar_max = MAX_PILLAR_SCORE;
    let overall_max = MAX_OVERALL_SCORE;
    let clear = CLEAR_THRESHOLD;
    let partial = PARTIAL_THRESHOLD;
    let partial_top = CLEAR_THRESHOLD.saturating_sub(1);
    let not_clear_top = PARTIAL_THRESHOLD.saturating_sub(1);

    format!(
        r#"You are evaluating how clearly AI assistants can understand the business behind "{website}", based on publicly available information.

Score exactly four pillars, each an integer from 0 to {pillar_max}:
1. "{business}": can you tell specifically what the business does?
2. "{audience}": can you tell who the business is for?
3. "{location}": can you tell where the business operates?
4. "{trust}": is there enough consistent, structured, authoritative information to recommend it?

The overall score is the sum of the four pillars (0 to {overall_max}). Classify it as:
- "CLEAR" for {clear} to {overall_max}
- "PARTIAL" for {partial} to {partial_top}
- "NOT CLEAR" for 0 to {not_clear_top}

Respond with this JSON object:
{{
  "status": "CLEAR" | "PARTIAL" | "NOT CLEAR",
  "overallScore": <integer>,
  "pillars": [
    {{ "name": "{business}", "score": <integer>, "description": "<one sentence>" }},
    {{ "name": "{audience}", "score": <integer>, "description": "<one sentence>" }},
    {{ "name": "{location}", "score": <integer>, "description": "<one sentence>" }},
    {{ "name": "{trust}", "score": <integer>, "description": "<one sentence>" }}
  ],
  "businessDescription": "<brief description>",
  "targetAudience": "<brief description>",
  "location": "<city/region, or 'Not clear'>",
  "gaps": ["<gap>", "..."],
  "opportunities": ["<opportunity>", "..."]
}}

Keep gaps and opportunities to 2-3 short items each."#
    )
}
