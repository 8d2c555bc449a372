use regex::Regex;
use std::sync::LazyLock;

const MAX_FRAGMENT_CHARS: usize = 50;
const UNKNOWN_PART: &str = "Unknown";
const SIGN_FALLBACK_PART: &str = "Schild";
const DEFAULT_EXTENSION: &str = "jpg";

// Underscores survive so that sanitizing an already sanitized fragment is a no-op.
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9äöüßÄÖÜ_\s-]").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Turns arbitrary text into a filename fragment of at most 50 characters.
///
/// Order matters: strip, collapse whitespace, truncate, then trim trailing
/// underscores, since truncation can expose a new trailing underscore.
pub fn sanitize_for_filename(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, "_");
    let truncated: String = collapsed.chars().take(MAX_FRAGMENT_CHARS).collect();
    truncated.trim_end_matches('_').to_string()
}

/// Inputs of [`generate_filename`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameRequest<'a> {
    pub location: Option<&'a str>,
    pub location_is_trusted: bool,
    pub main_object: Option<&'a str>,
    pub detected_text: Option<&'a str>,
    pub is_sign: bool,
    pub sequence_index: u64,
    pub extension: &'a str,
}

/// Builds `{location}_{main}_{ordinal}.{ext}` or `{main}_{ordinal}.{ext}`.
///
/// The location prefix is only used when the location is trusted.
pub fn generate_filename(request: &FilenameRequest<'_>) -> String {
    let main_part = main_part(request);
    let ordinal = format!("{:03}", request.sequence_index);

    match non_blank(request.location) {
        Some(location) if request.location_is_trusted => format!(
            "{}_{}_{}.{}",
            sanitize_for_filename(location),
            main_part,
            ordinal,
            request.extension
        ),
        _ => format!("{}_{}.{}", main_part, ordinal, request.extension),
    }
}

/// Extension of the original upload name, `jpg` when it has none.
pub fn extract_extension(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or(DEFAULT_EXTENSION)
}

fn main_part(request: &FilenameRequest<'_>) -> String {
    let detected_text = non_blank(request.detected_text);
    let main_object = non_blank(request.main_object);

    if request.is_sign {
        if let Some(text) = detected_text {
            let fragment = first_line(text)
                .or(main_object)
                .unwrap_or(SIGN_FALLBACK_PART);
            return sanitize_for_filename(fragment);
        }
    }

    if let Some(object) = main_object {
        return sanitize_for_filename(object);
    }

    if let Some(text) = detected_text {
        return sanitize_for_filename(first_line(text).unwrap_or(UNKNOWN_PART));
    }

    UNKNOWN_PART.to_string()
}

fn first_line(text: &str) -> Option<&str> {
    text.split('\n')
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
