use crate::types::{AnalysisResult, VideoMetadata};

/// Format seconds as M:SS (minutes unpadded)
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Group digits in threes with commas, as en-US locales do
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Build the titled transcript document sent for scoring
pub fn format_transcript_document(metadata: &VideoMetadata, url: &str, transcript: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", metadata.title));
    output.push_str(&format!("Source: {}\n\n", url));

    if let Some(author) = metadata.author.as_deref().filter(|a| !a.is_empty()) {
        output.push_str(&format!("Author: {}\n", author));
    }
    if let Some(duration) = metadata.duration_seconds.filter(|d| *d > 0) {
        output.push_str(&format!("Duration: {}\n", format_duration(duration)));
    }
    if let Some(views) = metadata.view_count {
        output.push_str(&format!("Views: {}\n", format_count(views)));
    }
    output.push('\n');

    output.push_str("## Transcript\n\n");
    output.push_str(transcript);

    output
}

/// Build the document sent for a selection of page text
pub fn format_selection_document(page_title: &str, page_url: &str, selected: &str) -> String {
    format!("# Selected Text from {page_title}\n\nSource: {page_url}\n\n## Content\n\n{selected}")
}

pub fn format_analysis_readable(result: &AnalysisResult) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "**Misinformation score:** {}/10\n\n",
        result.misinformation_score
    ));

    if let Some(summary) = &result.summary {
        output.push_str("## Summary\n\n");
        output.push_str(summary);
        output.push_str("\n\n");
    }

    if let Some(report) = &result.report {
        output.push_str("## Report\n\n");
        output.push_str(report);
        output.push_str("\n\n");
    }

    if let Some(context) = &result.additional_context {
        output.push_str("## Additional context\n\n");
        output.push_str(context);
        output.push_str("\n\n");
    }

    if !result.sources.is_empty() {
        output.push_str("## Sources\n\n");
        for source in &result.sources {
            output.push_str(&format!("• {}\n", source));
        }
        output.push('\n');
    }

    output
}
