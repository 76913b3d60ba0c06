use std::fmt;

use url::Url;

/// Placeholder for a missing title, genre or year.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for a missing rating.
pub const NO_RATING: &str = "N/A";

const PROFILE_HOST: &str = "https://www.imdb.com";

/// One scraped movie. Every field is always populated; absent values carry
/// [`UNKNOWN`] or [`NO_RATING`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovieRecord {
    title: String,
    year: String,
    genre: String,
    rating: String,
}

impl MovieRecord {
    /// Builds a record from raw field text. Empty text counts as missing.
    pub fn new(title: &str, year: &str, genre: &str, rating: &str) -> Self {
        Self::from_optional(Some(title), Some(year), Some(genre), Some(rating))
    }

    /// Builds a record from optional raw field text, applying the placeholder
    /// policy: trimmed title/genre or `Unknown`, first 4-digit run of the year
    /// or `Unknown`, trimmed rating or `N/A`.
    pub fn from_optional(
        title: Option<&str>,
        year: Option<&str>,
        genre: Option<&str>,
        rating: Option<&str>,
    ) -> Self {
        Self {
            title: non_empty(title).unwrap_or(UNKNOWN).to_string(),
            year: year.map(normalize_year).unwrap_or_else(|| UNKNOWN.to_string()),
            genre: non_empty(genre).unwrap_or(UNKNOWN).to_string(),
            rating: non_empty(rating).unwrap_or(NO_RATING).to_string(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn rating(&self) -> &str {
        &self.rating
    }

    /// Constituent genres of the comma-separated genre field.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genre.split(", ")
    }

    pub fn has_known_year(&self) -> bool {
        self.year != UNKNOWN
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Returns the first run of four ASCII digits in `raw`, or `Unknown`.
pub fn normalize_year(raw: &str) -> String {
    raw.as_bytes()
        .windows(4)
        .position(|window| window.iter().all(u8::is_ascii_digit))
        .map(|start| raw[start..start + 4].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Opaque name of one list of movies, usually its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListReference(String);

impl ListReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last non-empty path segment, e.g. `ls012345` for
    /// `https://www.imdb.com/list/ls012345/`.
    pub fn list_id(&self) -> Option<String> {
        if let Ok(url) = Url::parse(&self.0) {
            return url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(ToOwned::to_owned);
        }
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(ToOwned::to_owned)
    }
}

impl fmt::Display for ListReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    #[error("profile locator is empty")]
    Empty,
    #[error("profile locator {0:?} is neither a URL nor an identifier")]
    Malformed(String),
    #[error("profile url {0} does not name a user")]
    NoUserId(String),
}

/// Names a user profile either by absolute URL or by bare identifier
/// (for example `ur14323971`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileLocator {
    Url(Url),
    Id(String),
}

impl ProfileLocator {
    pub fn parse(raw: &str) -> Result<Self, LocatorError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::Empty);
        }
        if let Ok(url) = Url::parse(trimmed) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(Self::Url(url));
            }
            return Err(LocatorError::Malformed(trimmed.to_string()));
        }
        let is_identifier = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if is_identifier {
            Ok(Self::Id(trimmed.to_string()))
        } else {
            Err(LocatorError::Malformed(trimmed.to_string()))
        }
    }

    /// Page listing the user's lists.
    pub fn profile_page_url(&self) -> Result<Url, LocatorError> {
        match self {
            Self::Url(url) => Ok(url.clone()),
            Self::Id(id) => Url::parse(&format!("{PROFILE_HOST}/user/{id}/lists/"))
                .map_err(|_| LocatorError::Malformed(id.clone())),
        }
    }

    /// User identifier: the identifier itself, or the path segment after `user/`.
    pub fn user_id(&self) -> Result<String, LocatorError> {
        match self {
            Self::Id(id) => Ok(id.clone()),
            Self::Url(url) => url
                .path_segments()
                .and_then(|mut segments| {
                    segments.find(|s| *s == "user")?;
                    segments.next().filter(|s| !s.is_empty())
                })
                .map(ToOwned::to_owned)
                .ok_or_else(|| LocatorError::NoUserId(url.to_string())),
        }
    }
}

impl fmt::Display for ProfileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_takes_first_four_digit_run() {
        assert_eq!(normalize_year("(2010)"), "2010");
        assert_eq!(normalize_year("(I) (1999– )"), "1999");
        assert_eq!(normalize_year("12345"), "1234");
        assert_eq!(normalize_year("(TV Series)"), UNKNOWN);
        assert_eq!(normalize_year(""), UNKNOWN);
    }

    #[test]
    fn blank_fields_fall_back_to_placeholders() {
        let record = MovieRecord::from_optional(Some("  "), None, Some(""), None);
        assert_eq!(record.title(), UNKNOWN);
        assert_eq!(record.year(), UNKNOWN);
        assert_eq!(record.genre(), UNKNOWN);
        assert_eq!(record.rating(), NO_RATING);
    }
}
