//! Human-readable titles guessed from game URLs.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const DEFAULT_TITLE: &str = "CrazyGames";

static EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot derive a title from an invalid URL: {0}")]
pub struct TitleError(pub String);

/// Derive a title from the last path segment of `url`.
///
/// `https://games.crazygames.com/en_US/slope-run/index.html` becomes `"Index"`,
/// `https://host/games/moto-x3m.embed` becomes `"Moto x3m"`. An empty last segment
/// yields [`DEFAULT_TITLE`].
///
/// # Errors
///
/// Returns an error if `url` is not an absolute URL.
pub fn title_from_url(url: &str) -> Result<String, TitleError> {
    let parsed = Url::parse(url).map_err(|e| TitleError(format!("{url}: {e}")))?;
    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    if last.is_empty() {
        return Ok(DEFAULT_TITLE.to_string());
    }
    Ok(title_from_segment(last))
}

fn title_from_segment(segment: &str) -> String {
    let stem = EXTENSION.replace(segment, "").replace('-', " ");
    let stem = stem.rsplit('/').next().unwrap_or_default();
    let stem = stem.split('?').next().unwrap_or_default();
    capitalize_first(stem)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_extension_and_dashes() {
        assert_eq!(
            title_from_url("https://games.crazygames.com/en_US/moto-x3m/index.html").unwrap(),
            "Index"
        );
        assert_eq!(
            title_from_url("https://games.crazygames.com/games/moto-x3m.embed").unwrap(),
            "Moto x3m"
        );
        assert_eq!(
            title_from_url("https://example.com/play/slope-run?ref=home").unwrap(),
            "Slope run"
        );
    }

    #[test]
    fn only_the_last_extension_is_removed() {
        assert_eq!(
            title_from_url("https://example.com/archive.tar.gz").unwrap(),
            "Archive.tar"
        );
    }

    #[test]
    fn empty_last_segment_uses_default() {
        assert_eq!(title_from_url("https://example.com/").unwrap(), DEFAULT_TITLE);
        assert_eq!(title_from_url("https://example.com").unwrap(), DEFAULT_TITLE);
        assert_eq!(
            title_from_url("https://example.com/games/").unwrap(),
            DEFAULT_TITLE
        );
    }

    #[test]
    fn non_ascii_first_letter_is_uppercased() {
        assert_eq!(title_from_url("https://example.com/élan").unwrap(), "%C3%A9lan");
        assert_eq!(capitalize_first("élan"), "Élan");
    }

    #[test]
    fn relative_urls_are_rejected() {
        assert!(title_from_url("/games/slope").is_err());
        assert!(title_from_url("not a url").is_err());
    }
}
