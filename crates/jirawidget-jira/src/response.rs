//! Response inspection: JSON sniffing, log snippets, error extraction

use crate::transport::HttpResponse;
use crate::types::JiraErrorResponse;

/// Longest body excerpt written to the log
pub const SNIPPET_MAX_CHARS: usize = 220;

/// Trust a body as JSON if the server says so or it starts like JSON.
pub fn looks_like_json(response: &HttpResponse) -> bool {
    let declared = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

    if declared {
        return true;
    }

    let trimmed = response.body.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Single-line excerpt of a body for diagnostics
pub fn snippet(body: &str) -> String {
    if body.trim().is_empty() {
        return "<empty>".to_string();
    }

    let normalized = body.replace(['\r', '\n'], " ");
    let normalized = normalized.trim();

    match normalized.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &normalized[..cut]),
        None => normalized.to_string(),
    }
}

/// Human-readable message for a non-success response. Never fails.
pub fn extract_error(response: &HttpResponse) -> String {
    let status = response.status;
    let fallback = || format!("{}: {}", status, response.reason());

    if response.body.trim().is_empty() {
        return fallback();
    }

    if !looks_like_json(response) {
        tracing::error!(
            status,
            content_type = response.content_type.as_deref().unwrap_or("unknown"),
            snippet = %snippet(&response.body),
            "Non-JSON error response"
        );
        return format!("{}: non-JSON response (possible SSO redirect)", status);
    }

    match serde_json::from_str::<JiraErrorResponse>(&response.body) {
        Ok(payload) => match payload.first_message() {
            Some(message) => format!("{}: {}", status, message),
            None => fallback(),
        },
        Err(e) => {
            tracing::error!(
                error = %e,
                snippet = %snippet(&response.body),
                "Failed to parse Jira error response"
            );
            fallback()
        }
    }
}
