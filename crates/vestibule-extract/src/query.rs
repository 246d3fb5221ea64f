//! Parsed query strings.

use crate::error::ExtractionError;

/// Decoded `key=value` pairs of a query string, in order of appearance.
///
/// # Example
///
/// ```rust
/// use vestibule_extract::QueryArgs;
///
/// let args = QueryArgs::parse("id=1&name=J%C3%BCrgen&id=2").unwrap();
/// assert_eq!(args.get("id"), Some("1"));
/// assert_eq!(args.get("name"), Some("Jürgen"));
/// assert_eq!(args.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pairs: Vec<(String, String)>,
}

impl QueryArgs {
    /// Parses a raw query string without the leading `?`.
    pub fn parse(query: &str) -> Result<Self, ExtractionError> {
        if query.is_empty() {
            return Ok(Self::default());
        }
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query).map_err(ExtractionError::malformed_query)?;
        Ok(Self { pairs })
    }

    /// First value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values of `key`.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for `1`, `y`, `yes` and `true`; false otherwise,
    /// including when the key is absent.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1" | "y" | "yes" | "true"))
    }

    /// Returns true if `key` appears at least once.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for QueryArgs {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        let args = QueryArgs::parse("").unwrap();
        assert!(args.is_empty());
        assert!(!args.get_bool("description"));
    }

    #[test]
    fn test_get_bool() {
        let args = QueryArgs::parse("description=true&a=1&b=yes&c=no&d=").unwrap();
        assert!(args.get_bool("description"));
        assert!(args.get_bool("a"));
        assert!(args.get_bool("b"));
        assert!(!args.get_bool("c"));
        assert!(!args.get_bool("d"));
    }

    #[test]
    fn test_repeated_keys() {
        let args = QueryArgs::parse("tag=a&tag=b&x=1").unwrap();
        assert_eq!(args.get_all("tag").collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(args.get("tag"), Some("a"));
    }

    #[test]
    fn test_plus_is_space() {
        let args = QueryArgs::parse("q=hello+world").unwrap();
        assert_eq!(args.get("q"), Some("hello world"));
    }
}
