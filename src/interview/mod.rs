// src/interview/mod.rs
// First-contact interview: a bounded conversation that must surface a
// fixed checklist before the user is let into general chat. Completion is
// detected on the fully-assembled reply and surfaced as a structured
// event; the detection phrase never reaches rendered output.

use serde::Serialize;

use crate::config::CONFIG;

/// The checklist lives in the prompt; the machine only tracks phase.
pub const INTERVIEW_PROMPT: &str = r#"You are a personal coach holding a first get-to-know-you conversation with a new client. Your job is to learn, through natural conversation, all of the following before wrapping up:

- full name
- birth date
- where they live
- occupation
- goals
- ambitions
- planned next steps
- strengths
- areas they want to grow in
- notable achievements

Open with a warm greeting that expects no prior context. Ask one question at a time and react to what they share. Do not interrogate; weave the checklist into conversation. Once every item above has been covered, say a brief closing line thanking them, and end your reply with the exact text {completion_phrase} on its own line."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    NotStarted,
    InProgress,
    Completing,
    Completed,
}

impl InterviewPhase {
    /// Derive the resting phase for a user from persisted state.
    pub fn for_user(initial_call_completed: bool, has_exchanges: bool) -> Self {
        match (initial_call_completed, has_exchanges) {
            (true, _) => InterviewPhase::Completed,
            (false, true) => InterviewPhase::InProgress,
            (false, false) => InterviewPhase::NotStarted,
        }
    }

    pub fn on_user_message(self) -> Self {
        match self {
            InterviewPhase::NotStarted => InterviewPhase::InProgress,
            other => other,
        }
    }

    /// Inspect a completed reply. The transition into `Completing` happens
    /// at most once; later phases never fall back.
    pub fn on_reply(self, policy: &CompletionPolicy, reply: &str) -> Self {
        match self {
            InterviewPhase::NotStarted | InterviewPhase::InProgress => {
                if policy.detect(reply) {
                    InterviewPhase::Completing
                } else {
                    InterviewPhase::InProgress
                }
            }
            terminal => terminal,
        }
    }

    pub fn on_initialized(self) -> Self {
        match self {
            InterviewPhase::Completing => InterviewPhase::Completed,
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewPhase::Completed)
    }
}

/// How the end of the interview is recognized. Which variant applies is a
/// deployment choice, not a hardcoded literal.
#[derive(Debug, Clone)]
pub enum CompletionPolicy {
    /// Exact sentinel token, e.g. "[INTERVIEW_COMPLETE]".
    Sentinel { phrase: String },
    /// A richer closing phrase spoken as part of the farewell.
    Closing { phrase: String },
}

impl CompletionPolicy {
    pub fn from_config() -> Self {
        match CONFIG.interview_completion_mode.as_str() {
            "closing" => CompletionPolicy::Closing {
                phrase: CONFIG.interview_closing.clone(),
            },
            _ => CompletionPolicy::Sentinel {
                phrase: CONFIG.interview_sentinel.clone(),
            },
        }
    }

    pub fn phrase(&self) -> &str {
        match self {
            CompletionPolicy::Sentinel { phrase } | CompletionPolicy::Closing { phrase } => phrase,
        }
    }

    /// Best-effort substring check on the assembled reply.
    pub fn detect(&self, reply: &str) -> bool {
        reply.contains(self.phrase())
    }

    /// Remove the detection phrase from the user-visible text.
    pub fn strip(&self, reply: &str) -> String {
        match self {
            CompletionPolicy::Sentinel { phrase } => reply.replace(phrase, "").trim().to_string(),
            // A closing phrase is real prose; leave it in place.
            CompletionPolicy::Closing { .. } => reply.trim().to_string(),
        }
    }
}

/// System prompt for the interview, with the completion phrase baked in.
pub fn interview_system_prompt(policy: &CompletionPolicy) -> String {
    INTERVIEW_PROMPT.replace("{completion_phrase}", policy.phrase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinel() -> CompletionPolicy {
        CompletionPolicy::Sentinel {
            phrase: "[INTERVIEW_COMPLETE]".to_string(),
        }
    }

    #[test]
    fn test_phase_transitions_forward_only() {
        let policy = sentinel();

        let phase = InterviewPhase::NotStarted.on_user_message();
        assert_eq!(phase, InterviewPhase::InProgress);

        let phase = phase.on_reply(&policy, "Tell me about your goals.");
        assert_eq!(phase, InterviewPhase::InProgress);

        let phase = phase.on_reply(&policy, "Thanks! [INTERVIEW_COMPLETE]");
        assert_eq!(phase, InterviewPhase::Completing);

        // A later reply can never re-enter InProgress
        let phase = phase.on_reply(&policy, "Anything else?");
        assert_eq!(phase, InterviewPhase::Completing);

        let phase = phase.on_initialized();
        assert_eq!(phase, InterviewPhase::Completed);
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_completed_is_sticky() {
        let policy = sentinel();
        let phase = InterviewPhase::Completed;
        assert_eq!(phase.on_user_message(), InterviewPhase::Completed);
        assert_eq!(
            phase.on_reply(&policy, "[INTERVIEW_COMPLETE]"),
            InterviewPhase::Completed
        );
    }

    #[test]
    fn test_sentinel_stripped_from_rendered_text() {
        let policy = sentinel();
        let reply = "It was lovely meeting you!\n[INTERVIEW_COMPLETE]";
        assert!(policy.detect(reply));
        assert_eq!(policy.strip(reply), "It was lovely meeting you!");
    }

    #[test]
    fn test_closing_phrase_left_in_place() {
        let policy = CompletionPolicy::Closing {
            phrase: "I have everything I need".to_string(),
        };
        let reply = "I have everything I need. Talk soon!";
        assert!(policy.detect(reply));
        assert_eq!(policy.strip(reply), reply);
    }

    #[test]
    fn test_for_user_derivation() {
        assert_eq!(
            InterviewPhase::for_user(true, true),
            InterviewPhase::Completed
        );
        assert_eq!(
            InterviewPhase::for_user(false, false),
            InterviewPhase::NotStarted
        );
        assert_eq!(
            InterviewPhase::for_user(false, true),
            InterviewPhase::InProgress
        );
    }
}
