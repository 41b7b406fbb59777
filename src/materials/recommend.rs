// src/materials/recommend.rs
// Recommendation engine: one generative call over the interview
// transcript (feedback-aware on re-runs), grounded against the content
// lookup services so every suggestion is a real, findable item.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::lookup::{BookLookupClient, VideoLookupClient};
use super::store::{Book, MaterialFeedback, MaterialStore, NewBook, NewVideo, Video};
use crate::config::CONFIG;
use crate::llm::{GenerateRequest, TextGenerator};

const RECOMMENDATION_PROMPT: &str = r#"You are selecting growth materials for a coaching client based on their intake conversation below. Recommend {candidates} real, well-known books and {candidates} real YouTube videos that fit their goals and situation.

Hard requirements:
- Every book must actually exist: exact published title and author.
- Every video must actually exist on YouTube: exact title, channel name, and the full watch URL. Use search to confirm; never invent a URL.
- Descriptions are one or two sentences on why this fits the client.

{feedback_section}Respond with ONLY a JSON object in this exact shape:
{"books": [{"title": "...", "author": "...", "description": "..."}], "videos": [{"title": "...", "channel": "...", "url": "...", "description": "..."}]}

Intake conversation:
{transcript}"#;

#[derive(Debug, Clone, Deserialize)]
pub struct BookCandidate {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoCandidate {
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationPayload {
    #[serde(default)]
    pub books: Vec<BookCandidate>,
    #[serde(default)]
    pub videos: Vec<VideoCandidate>,
}

/// Model output is untrusted: locate the outermost JSON object and parse
/// it; anything else is "no candidates", never a panic or a 500.
pub fn parse_recommendations(content: &str) -> Option<RecommendationPayload> {
    let trimmed = content.trim();
    let first = trimmed.find('{')?;
    let last = trimmed.rfind('}')?;
    if first >= last {
        return None;
    }

    let mut payload: RecommendationPayload =
        serde_json::from_str(&trimmed[first..=last]).ok()?;
    payload.books.retain(|b| !b.title.trim().is_empty());
    payload.videos.retain(|v| !v.title.trim().is_empty());
    Some(payload)
}

pub struct RecommendationEngine {
    llm: Arc<dyn TextGenerator>,
    book_lookup: BookLookupClient,
    video_lookup: VideoLookupClient,
    store: Arc<MaterialStore>,
}

impl RecommendationEngine {
    pub fn new(llm: Arc<dyn TextGenerator>, store: Arc<MaterialStore>) -> Self {
        Self {
            llm,
            book_lookup: BookLookupClient::new(),
            video_lookup: VideoLookupClient::new(),
            store,
        }
    }

    /// Produce and persist exactly `recommend_books` + `recommend_videos`
    /// suggestions for this user.
    pub async fn generate_and_store(
        &self,
        user_id: &str,
        transcript: &str,
    ) -> anyhow::Result<(Vec<Book>, Vec<Video>)> {
        let feedback = self.store.list_feedback(user_id).await.unwrap_or_default();
        let feedback_section = self.feedback_section(user_id, &feedback).await;

        let payload = self.request_candidates(transcript, &feedback_section).await;

        let books = self
            .ground_books(payload.books, CONFIG.recommend_books)
            .await;
        let videos = self
            .ground_videos(payload.videos, CONFIG.recommend_videos)
            .await;

        let mut stored_books = Vec::with_capacity(books.len());
        for book in books {
            stored_books.push(self.store.insert_book(user_id, book).await?);
        }
        let mut stored_videos = Vec::with_capacity(videos.len());
        for video in videos {
            stored_videos.push(self.store.insert_video(user_id, video).await?);
        }

        info!(
            user_id,
            books = stored_books.len(),
            videos = stored_videos.len(),
            "Stored recommendations"
        );

        Ok((stored_books, stored_videos))
    }

    /// One generation plus a single retry on unparseable output; after
    /// that, empty candidates (the caller surfaces empty lists, not 500s).
    async fn request_candidates(
        &self,
        transcript: &str,
        feedback_section: &str,
    ) -> RecommendationPayload {
        let prompt = RECOMMENDATION_PROMPT
            .replace("{candidates}", &CONFIG.recommend_candidates_per_kind.to_string())
            .replace("{feedback_section}", feedback_section)
            .replace("{transcript}", transcript);

        for attempt in 0..2 {
            let req = GenerateRequest::new(prompt.clone())
                .with_search(true)
                .with_temperature(0.7)
                .with_max_output_tokens(2048);

            match self.llm.generate(req).await {
                Ok(content) => {
                    if let Some(payload) = parse_recommendations(&content) {
                        return payload;
                    }
                    warn!(attempt, "Recommendation output was not valid JSON");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Recommendation generation failed");
                }
            }
        }

        RecommendationPayload::default()
    }

    /// Steering text built from prior ratings: toward 4-5s, away from 1-2s.
    async fn feedback_section(&self, user_id: &str, feedback: &[MaterialFeedback]) -> String {
        if feedback.is_empty() {
            return String::new();
        }

        let book_titles: HashMap<String, String> = self
            .store
            .list_books(user_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|b| (b.id, b.title))
            .collect();
        let video_titles: HashMap<String, String> = self
            .store
            .list_videos(user_id)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|v| (v.id, v.title))
            .collect();

        let mut lines = vec!["The client has rated earlier materials:".to_string()];
        for item in feedback {
            let title = match item.material_type.as_str() {
                "book" => book_titles.get(&item.material_id),
                _ => video_titles.get(&item.material_id),
            };
            let Some(title) = title else { continue };

            let verdict = match item.rating {
                4 | 5 => "liked",
                1 | 2 => "disliked",
                _ => "was neutral on",
            };
            let mut line = format!(
                "- {} the {} \"{}\" ({}/5)",
                verdict, item.material_type, title, item.rating
            );
            if let Some(review) = &item.review {
                if !review.trim().is_empty() {
                    line.push_str(&format!(" - \"{}\"", review.trim()));
                }
            }
            lines.push(line);
        }
        lines.push(
            "Lean toward what they liked, away from what they disliked, and honor any \
             format preferences in their reviews."
                .to_string(),
        );
        lines.push(String::new());

        lines.join("\n")
    }

    /// Verify candidates against Google Books; verified items first, then
    /// unverified backfill so the output shape stays fixed even when the
    /// lookup service degrades.
    async fn ground_books(&self, candidates: Vec<BookCandidate>, target: usize) -> Vec<NewBook> {
        let mut verified = Vec::new();
        let mut backfill = Vec::new();

        for candidate in candidates {
            if verified.len() >= target {
                break;
            }

            let author = if candidate.author.trim().is_empty() {
                None
            } else {
                Some(candidate.author.as_str())
            };

            match self.book_lookup.find(&candidate.title, author).await {
                Ok(Some(found)) => verified.push(NewBook {
                    title: found.title,
                    author: found.author.or_else(|| author.map(String::from)),
                    description: if candidate.description.trim().is_empty() {
                        found.description
                    } else {
                        Some(candidate.description.clone())
                    },
                }),
                Ok(None) => {
                    warn!(title = %candidate.title, "Book not found in lookup, keeping as backfill");
                    backfill.push(candidate);
                }
                Err(e) => {
                    warn!(title = %candidate.title, error = %e, "Book lookup unavailable");
                    backfill.push(candidate);
                }
            }
        }

        for candidate in backfill {
            if verified.len() >= target {
                break;
            }
            verified.push(NewBook {
                title: candidate.title,
                author: if candidate.author.trim().is_empty() {
                    None
                } else {
                    Some(candidate.author)
                },
                description: if candidate.description.trim().is_empty() {
                    None
                } else {
                    Some(candidate.description)
                },
            });
        }

        verified
    }

    /// Verify candidates through YouTube oEmbed; a candidate whose URL does
    /// not resolve is only used as last-resort backfill.
    async fn ground_videos(&self, candidates: Vec<VideoCandidate>, target: usize) -> Vec<NewVideo> {
        let mut verified = Vec::new();
        let mut backfill = Vec::new();

        for candidate in candidates {
            if verified.len() >= target {
                break;
            }

            match self.video_lookup.resolve(&candidate.url).await {
                Ok(Some(found)) => verified.push(NewVideo {
                    title: found.title,
                    url: candidate.url.clone(),
                    channel: Some(found.channel),
                    description: if candidate.description.trim().is_empty() {
                        None
                    } else {
                        Some(candidate.description.clone())
                    },
                    thumbnail: found.thumbnail,
                }),
                Ok(None) => {
                    warn!(title = %candidate.title, url = %candidate.url, "Video did not resolve");
                    backfill.push(candidate);
                }
                Err(e) => {
                    warn!(title = %candidate.title, error = %e, "Video lookup unavailable");
                    backfill.push(candidate);
                }
            }
        }

        for candidate in backfill {
            if verified.len() >= target {
                break;
            }
            verified.push(NewVideo {
                title: candidate.title,
                url: candidate.url,
                channel: if candidate.channel.trim().is_empty() {
                    None
                } else {
                    Some(candidate.channel)
                },
                description: if candidate.description.trim().is_empty() {
                    None
                } else {
                    Some(candidate.description)
                },
                thumbnail: None,
            });
        }

        verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_payload() {
        let content = r#"{"books": [{"title": "Deep Work", "author": "Cal Newport", "description": "Focus."}], "videos": [{"title": "Inside the mind of a master procrastinator", "channel": "TED", "url": "https://www.youtube.com/watch?v=arj7oStGLkU", "description": "On starting."}]}"#;
        let payload = parse_recommendations(content).unwrap();
        assert_eq!(payload.books.len(), 1);
        assert_eq!(payload.videos.len(), 1);
        assert_eq!(payload.books[0].author, "Cal Newport");
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let content = "Here are my picks:\n{\"books\": [], \"videos\": []}\nEnjoy!";
        assert!(parse_recommendations(content).is_some());
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_recommendations("I recommend reading more.").is_none());
        assert!(parse_recommendations("{broken json").is_none());
    }

    #[test]
    fn test_parse_drops_untitled_entries() {
        let content = r#"{"books": [{"title": "", "author": "Nobody"}], "videos": []}"#;
        let payload = parse_recommendations(content).unwrap();
        assert!(payload.books.is_empty());
    }
}
