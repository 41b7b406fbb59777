// src/materials/lookup.rs
// Content lookup clients used to ground recommendations in items that
// actually exist. Both return None for "not found" and reserve Err for
// transport-level failures.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing::{debug, warn};

const BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const YOUTUBE_OEMBED_URL: &str = "https://www.youtube.com/oembed";

#[derive(Debug, Clone)]
pub struct BookMatch {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VideoMatch {
    pub title: String,
    pub channel: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo")]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
struct VolumeInfo {
    title: String,
    authors: Option<Vec<String>>,
    description: Option<String>,
}

pub struct BookLookupClient {
    client: reqwest::Client,
}

impl BookLookupClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Search the Google Books volumes API by title and author.
    pub async fn find(&self, title: &str, author: Option<&str>) -> Result<Option<BookMatch>> {
        let mut query = format!("intitle:{title}");
        if let Some(author) = author {
            if !author.trim().is_empty() {
                query.push_str(&format!(" inauthor:{author}"));
            }
        }

        let url = format!(
            "{}?q={}&maxResults=1",
            BOOKS_API_URL,
            urlencoding::encode(&query)
        );

        debug!(title, "Looking up book");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Book lookup request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Book lookup failed");
            return Err(anyhow!("Book lookup failed with status {}", status));
        }

        let data: VolumesResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse book lookup response: {}", e))?;

        let found = data.items.and_then(|items| items.into_iter().next()).map(|v| BookMatch {
            title: v.volume_info.title,
            author: v
                .volume_info
                .authors
                .and_then(|authors| authors.into_iter().next()),
            description: v.volume_info.description,
        });

        Ok(found)
    }
}

impl Default for BookLookupClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
    thumbnail_url: Option<String>,
}

pub struct VideoLookupClient {
    client: reqwest::Client,
}

impl VideoLookupClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Resolve a video URL through the YouTube oEmbed endpoint. A 404 (or
    /// 401, which YouTube returns for unembeddable ids) means the video
    /// does not independently exist.
    pub async fn resolve(&self, video_url: &str) -> Result<Option<VideoMatch>> {
        if video_url.trim().is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}?url={}&format=json",
            YOUTUBE_OEMBED_URL,
            urlencoding::encode(video_url)
        );

        debug!(video_url, "Resolving video");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Video lookup request failed: {}", e))?;

        let status = response.status();
        if status.as_u16() == 404 || status.as_u16() == 401 || status.as_u16() == 400 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(anyhow!("Video lookup failed with status {}", status));
        }

        let data: OembedResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse video lookup response: {}", e))?;

        Ok(Some(VideoMatch {
            title: data.title,
            channel: data.author_name,
            thumbnail: data.thumbnail_url,
        }))
    }
}

impl Default for VideoLookupClient {
    fn default() -> Self {
        Self::new()
    }
}
