use serde::{Deserialize, Serialize};
use url::Url;

use crate::format::format_selection_document;

/// The host player's metadata for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub video_id: String,
    pub title: String,
    pub author: Option<String>,
    pub duration_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub caption_tracks: Vec<CaptionTrack>,
}

impl PlayerState {
    pub fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            title: self.title.clone(),
            author: self.author.clone(),
            duration_seconds: self.duration_seconds,
            view_count: self.view_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language_code: String,
    /// `Some("asr")` for auto-generated tracks, usually absent for manual ones.
    pub kind: Option<String>,
    pub base_url: String,
}

impl CaptionTrack {
    pub const AUTO_GENERATED_KIND: &'static str = "asr";

    pub fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some(Self::AUTO_GENERATED_KIND)
    }
}

/// Timed-text payload in the `json3` caption format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimedCaptionPayload {
    #[serde(default)]
    pub events: Vec<CaptionEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionEvent {
    /// Absent on positioning-only events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segs: Option<Vec<CaptionSegment>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionSegment {
    #[serde(rename = "utf8", default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(rename = "views", skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

/// A titled, metadata-annotated transcript ready for scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    /// Heading, source line, metadata lines and the transcript section.
    pub text: String,
    /// The normalized transcript body alone.
    pub transcript: String,
    pub url: String,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Youtube,
    Webpage,
    Text,
    File,
}

impl ContentType {
    /// Classify free-form user input: YouTube watch links, any other
    /// absolute URL, or plain text.
    pub fn of_input(input: &str) -> Self {
        let input = input.trim();
        if Url::parse(input).is_err() {
            return ContentType::Text;
        }
        if input.contains("youtube.com/watch") || input.contains("youtu.be/") {
            ContentType::Youtube
        } else {
            ContentType::Webpage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Youtube => "youtube",
            ContentType::Webpage => "webpage",
            ContentType::Text => "text",
            ContentType::File => "file",
        }
    }
}

/// Any content headed for scoring, whatever it was acquired from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub text: String,
    pub url: Option<String>,
    pub title: String,
    pub content_type: ContentType,
}

impl ContentDocument {
    pub const DIRECT_INPUT_TITLE: &'static str = "User submitted content";

    pub fn from_transcript(document: &TranscriptDocument) -> Self {
        Self {
            text: document.text.clone(),
            url: Some(document.url.clone()),
            title: document.metadata.title.clone(),
            content_type: ContentType::Youtube,
        }
    }

    /// Text the user selected on a page, wrapped in a titled document that
    /// names the page it came from.
    pub fn selection(page_title: &str, page_url: &str, selected: &str) -> Self {
        Self {
            text: format_selection_document(page_title, page_url, selected.trim()),
            url: Some(page_url.to_string()),
            title: format!("Selected text from: {page_title}"),
            content_type: ContentType::Text,
        }
    }

    /// A URL or a piece of text typed in directly. URLs are submitted as-is
    /// for the service to fetch; text carries no URL.
    pub fn direct_input(input: &str) -> Self {
        let content_type = ContentType::of_input(input);
        Self {
            text: input.to_string(),
            url: (content_type != ContentType::Text).then(|| input.trim().to_string()),
            title: Self::DIRECT_INPUT_TITLE.to_string(),
            content_type,
        }
    }

    pub fn file(file_name: &str, contents: String) -> Self {
        Self {
            text: contents,
            url: None,
            title: file_name.to_string(),
            content_type: ContentType::File,
        }
    }

    /// Cache key: the URL when there is one, otherwise the content itself.
    pub fn cache_key(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{}:{}\n{}", self.content_type.as_str(), self.title, self.text),
        }
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub content: String,
    pub url: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl AnalysisRequest {
    pub fn for_content(document: &ContentDocument) -> Self {
        Self {
            content: document.text.clone(),
            url: document.url.clone(),
            title: document.title.clone(),
            content_type: document.content_type,
            filename: (document.content_type == ContentType::File).then(|| document.title.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub misinformation_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misinformation_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub source_objects: Vec<SourceObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceObject {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn inputs_are_classified_like_direct_submissions() {
        assert_eq!(
            ContentType::of_input("https://www.youtube.com/watch?v=abc"),
            ContentType::Youtube
        );
        assert_eq!(ContentType::of_input("https://youtu.be/abc"), ContentType::Youtube);
        assert_eq!(
            ContentType::of_input("https://example.com/article"),
            ContentType::Webpage
        );
        assert_eq!(
            ContentType::of_input("the moon landing was staged"),
            ContentType::Text
        );
    }

    #[test]
    fn direct_text_has_no_url() {
        let request = AnalysisRequest::for_content(&ContentDocument::direct_input("vaccines cause x"));

        assert_eq!(
            serde_json::to_value(&request).expect("serializable"),
            json!({
                "content": "vaccines cause x",
                "url": null,
                "title": "User submitted content",
                "type": "text"
            })
        );
    }

    #[test]
    fn direct_url_is_submitted_as_webpage() {
        let document = ContentDocument::direct_input("https://example.com/post");

        assert_eq!(document.content_type, ContentType::Webpage);
        assert_eq!(document.url.as_deref(), Some("https://example.com/post"));
        assert_eq!(document.cache_key(), "https://example.com/post");
    }

    #[test]
    fn selection_names_its_page() {
        let document =
            ContentDocument::selection("News", "https://example.com/n", "  a quoted claim \n");

        assert_eq!(
            document.text,
            "# Selected Text from News\n\nSource: https://example.com/n\n\n## Content\n\na quoted claim"
        );
        assert_eq!(document.title, "Selected text from: News");
        assert_eq!(document.content_type, ContentType::Text);
    }

    #[test]
    fn file_requests_carry_the_file_name() {
        let document = ContentDocument::file("notes.txt", "claims".to_string());
        let value = serde_json::to_value(AnalysisRequest::for_content(&document)).expect("serializable");

        assert_eq!(value["type"], "file");
        assert_eq!(value["title"], "notes.txt");
        assert_eq!(value["filename"], "notes.txt");
        assert!(value["url"].is_null());
    }

    #[test]
    fn url_less_documents_key_on_their_content() {
        let a = ContentDocument::file("a.txt", "same".to_string());
        let b = ContentDocument::file("b.txt", "same".to_string());

        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), ContentDocument::file("a.txt", "same".to_string()).cache_key());
    }
}
