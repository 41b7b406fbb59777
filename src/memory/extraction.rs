// src/memory/extraction.rs
// Post-exchange fact extraction. Runs after the reply has been delivered;
// every failure here is logged and swallowed so chat is never blocked.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::store::MemoryStore;
use super::types::{ExtractedFact, ExtractionOutcome};
use crate::config::CONFIG;
use crate::llm::{GenerateRequest, TextGenerator};
use crate::profile::{ProfileKey, ProfileStore};

const EXTRACTION_PROMPT: &str = r#"You are the memory module of a personal coaching assistant. Given one completed exchange, decide whether it contains durable facts about the user worth remembering.

Rules:
- Only record what the USER stated about themselves. Patterns across several turns count (e.g. repeated mentions of a fear). Never record the assistant's own speculation about the user. The single exception: information the assistant sourced from a web search may be recorded, since it is externally verified.
- Be conservative. Most exchanges contain nothing worth keeping. When in doubt, record nothing.
- Each fact must be a single, atomic statement about one topic (a trait, goal, fear, preference, or piece of life context). Never combine unrelated facts in one string.
- Skip anything already covered by the known facts listed below.

Special fields use an exact prefix and route to the user's profile:
- "FIRST_NAME: <name>"
- "LAST_NAME: <name>"
- "BIRTH_DATE: <YYYY-MM-DD>" (always convert to this calendar form, whatever phrasing the user used)

Output: a JSON array of strings, e.g. ["FIRST_NAME: Sarah", "Is afraid of public speaking"].
If there is nothing to record, output exactly: NONE

Known facts about the user:
{known_facts}

Exchange:
User: {user_message}
Assistant: {assistant_response}"#;

/// Parse the model's reply into raw fact strings. The payload is
/// untrusted: anything unparseable collapses to "nothing extracted".
pub fn parse_extraction_response(content: &str) -> Vec<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    let (Some(first), Some(last)) = (trimmed.find('['), trimmed.rfind(']')) else {
        return Vec::new();
    };
    if first >= last {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<String>>(&trimmed[first..=last]) {
        Ok(items) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(e) => {
            debug!(error = %e, "Extraction output was not a JSON string array");
            Vec::new()
        }
    }
}

/// Accepted user-facing date phrasings, normalized to YYYY-MM-DD.
pub fn normalize_birth_date(raw: &str) -> Option<String> {
    let cleaned = raw.trim();
    const FORMATS: [&str; 6] = [
        "%Y-%m-%d",
        "%B %d, %Y",
        "%b %d, %Y",
        "%d %B %Y",
        "%m/%d/%Y",
        "%d.%m.%Y",
    ];

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Convert one raw string into the typed fact. Prefixed strings become
/// profile-field updates; a BIRTH_DATE that refuses to normalize is
/// dropped rather than stored malformed.
pub fn classify_fact(raw: &str) -> Option<ExtractedFact> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for (prefix, key) in [
        ("FIRST_NAME:", ProfileKey::FirstName),
        ("LAST_NAME:", ProfileKey::LastName),
    ] {
        if let Some(value) = trimmed.strip_prefix(prefix) {
            let value = value.trim();
            if value.is_empty() {
                return None;
            }
            return Some(ExtractedFact::ProfileField {
                key,
                value: value.to_string(),
            });
        }
    }

    if let Some(value) = trimmed.strip_prefix("BIRTH_DATE:") {
        let normalized = normalize_birth_date(value)?;
        return Some(ExtractedFact::ProfileField {
            key: ProfileKey::BirthDate,
            value: normalized,
        });
    }

    Some(ExtractedFact::Memory {
        content: trimmed.to_string(),
    })
}

pub struct MemoryExtractor {
    llm: Arc<dyn TextGenerator>,
    memories: Arc<MemoryStore>,
    profiles: Arc<ProfileStore>,
}

impl MemoryExtractor {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        memories: Arc<MemoryStore>,
        profiles: Arc<ProfileStore>,
    ) -> Self {
        Self {
            llm,
            memories,
            profiles,
        }
    }

    /// One extraction pass over a completed exchange.
    pub async fn extract(
        &self,
        user_id: &str,
        user_message: &str,
        assistant_response: &str,
    ) -> anyhow::Result<ExtractionOutcome> {
        let known = self
            .memories
            .recent_contents(user_id, CONFIG.extraction_memory_context)
            .await?;
        let known_facts = if known.is_empty() {
            "(none yet)".to_string()
        } else {
            known
                .iter()
                .map(|m| format!("- {m}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let prompt = EXTRACTION_PROMPT
            .replace("{known_facts}", &known_facts)
            .replace("{user_message}", user_message)
            .replace("{assistant_response}", assistant_response);

        let req = GenerateRequest::new(prompt)
            .with_temperature(0.2)
            .with_max_output_tokens(256);
        let content = self.llm.generate(req).await?;

        let facts: Vec<ExtractedFact> = parse_extraction_response(&content)
            .iter()
            .filter_map(|raw| classify_fact(raw))
            .collect();

        if facts.is_empty() {
            Ok(ExtractionOutcome::Nothing)
        } else {
            Ok(ExtractionOutcome::Facts(facts))
        }
    }

    /// Route facts: profile fields upsert a single column each, generic
    /// facts insert as memories unless deduplicated away.
    pub async fn apply(&self, user_id: &str, outcome: ExtractionOutcome) -> anyhow::Result<()> {
        let ExtractionOutcome::Facts(facts) = outcome else {
            return Ok(());
        };

        for fact in facts {
            match fact {
                ExtractedFact::ProfileField { key, value } => {
                    self.profiles.set_field(user_id, key, &value).await?;
                    debug!(user_id, ?key, "Updated profile field from extraction");
                }
                ExtractedFact::Memory { content } => {
                    if let Some(memory) = self
                        .memories
                        .save_if_new(user_id, &content, CONFIG.memory_dedup_threshold)
                        .await?
                    {
                        debug!(user_id, memory_id = %memory.id, "Stored new memory");
                    }
                }
            }
        }

        Ok(())
    }

    pub async fn run(
        &self,
        user_id: &str,
        user_message: &str,
        assistant_response: &str,
    ) -> anyhow::Result<()> {
        let outcome = self
            .extract(user_id, user_message, assistant_response)
            .await?;

        if outcome.is_nothing() {
            debug!(user_id, "No facts extracted from exchange");
            return Ok(());
        }

        info!(user_id, "Extraction produced new facts");
        self.apply(user_id, outcome).await
    }
}

/// Fire-and-forget entry point used by the chat gateway once a reply has
/// been fully delivered and persisted.
pub fn spawn_extraction(
    extractor: Arc<MemoryExtractor>,
    user_id: String,
    user_message: String,
    assistant_response: String,
) {
    tokio::spawn(async move {
        if let Err(e) = extractor
            .run(&user_id, &user_message, &assistant_response)
            .await
        {
            warn!(user_id, error = %e, "Memory extraction failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_yields_empty() {
        assert!(parse_extraction_response("NONE").is_empty());
        assert!(parse_extraction_response("none").is_empty());
        assert!(parse_extraction_response("").is_empty());
    }

    #[test]
    fn test_garbage_yields_empty() {
        assert!(parse_extraction_response("I could not find anything.").is_empty());
        assert!(parse_extraction_response("[not json").is_empty());
        assert!(parse_extraction_response("[1, 2, 3]").is_empty());
    }

    #[test]
    fn test_array_with_surrounding_prose() {
        let facts = parse_extraction_response(
            "Here you go:\n[\"FIRST_NAME: Sarah\", \"Is afraid of public speaking\"]\nDone.",
        );
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0], "FIRST_NAME: Sarah");
    }

    #[test]
    fn test_classify_profile_prefixes() {
        assert_eq!(
            classify_fact("FIRST_NAME: Sarah"),
            Some(ExtractedFact::ProfileField {
                key: ProfileKey::FirstName,
                value: "Sarah".to_string()
            })
        );
        assert_eq!(
            classify_fact("LAST_NAME: Connor"),
            Some(ExtractedFact::ProfileField {
                key: ProfileKey::LastName,
                value: "Connor".to_string()
            })
        );
    }

    #[test]
    fn test_classify_birth_date_normalizes() {
        assert_eq!(
            classify_fact("BIRTH_DATE: March 15, 1990"),
            Some(ExtractedFact::ProfileField {
                key: ProfileKey::BirthDate,
                value: "1990-03-15".to_string()
            })
        );
        assert_eq!(
            classify_fact("BIRTH_DATE: 1990-03-15"),
            Some(ExtractedFact::ProfileField {
                key: ProfileKey::BirthDate,
                value: "1990-03-15".to_string()
            })
        );
    }

    #[test]
    fn test_unparseable_birth_date_dropped() {
        assert_eq!(classify_fact("BIRTH_DATE: sometime in spring"), None);
    }

    #[test]
    fn test_plain_fact_becomes_memory() {
        assert_eq!(
            classify_fact("Wants to start their own tech company"),
            Some(ExtractedFact::Memory {
                content: "Wants to start their own tech company".to_string()
            })
        );
    }

    #[test]
    fn test_normalize_birth_date_formats() {
        assert_eq!(
            normalize_birth_date("Mar 15, 1990").as_deref(),
            Some("1990-03-15")
        );
        assert_eq!(
            normalize_birth_date("15 March 1990").as_deref(),
            Some("1990-03-15")
        );
        assert_eq!(
            normalize_birth_date("03/15/1990").as_deref(),
            Some("1990-03-15")
        );
        assert!(normalize_birth_date("the nineties").is_none());
    }
}
