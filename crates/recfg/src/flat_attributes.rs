//! flat attribute store for one resource instance
//!
//! [FlatAttributes] holds the dot-delimited key/value pairs a state provider
//! reports for a single resource. Insertion order is preserved as loaded, but
//! the reconstruction pass consumes the attributes through [FlatAttributes::sorted],
//! which applies the numeric-aware total order of [compare_keys].
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::path::Path;

#[derive(Default, Debug)]
pub struct FlatAttributes {
    attributes: IndexMap<String, String>,
}

impl FlatAttributes {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// All attributes in the order the parser has to visit them
    ///
    /// Sibling attributes of one structural frame come out contiguously and
    /// numeric path segments compare by integer value, so `foo.9` sorts
    /// before `foo.10`.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut attributes: Vec<(&str, &str)> = self
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        attributes.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        attributes
    }
}

/// Compare two flat keys segment by segment
///
/// The first differing segment decides: when both sides parse as integers
/// they compare numerically, otherwise lexicographically. A key that is a
/// segment-prefix of another sorts first.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x == y {
                    continue;
                }

                return match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(m), Ok(n)) => m.cmp(&n),
                    _ => x.cmp(y),
                };
            }
        }
    }
}

impl FlatAttributes {
    /// Load one attribute file
    ///
    /// The format is picked by extension: `.json`, `.yaml` or `.yml`. The
    /// file must hold a flat string-to-string map.
    pub fn load_file(file_path: &Path) -> Result<Self, LoadError> {
        let format = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => return Err(LoadError::UnknownFormat),
        };

        tracing::info!(path = %file_path.display(), "loading attribute file");
        let contents = std::fs::read_to_string(file_path)?;

        match format {
            Format::Json => Self::from_json(&contents),
            Format::Yaml => Ok(serde_yaml::from_str::<IndexMap<String, String>>(&contents)?.into()),
        }
    }

    pub fn from_json(data: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str::<IndexMap<String, String>>(data)?.into())
    }
}

enum Format {
    Json,
    Yaml,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Unrecognized attribute file extension (expected .json, .yaml or .yml)")]
    UnknownFormat,
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse attribute file as JSON")]
    JsonParseFailed(#[from] serde_json::Error),
    #[error("Unable to parse attribute file as YAML")]
    YamlParseFailed(#[from] serde_yaml::Error),
}

impl From<IndexMap<String, String>> for FlatAttributes {
    fn from(attributes: IndexMap<String, String>) -> Self {
        Self { attributes }
    }
}

/// Utility macro to create [FlatAttributes]
///
/// ```
/// # use recfg::flat_attributes;
/// let attributes = flat_attributes! {
///     "name" => "web",
///     "tags.%" => "1",
///     "tags.env" => "prod",
/// };
/// assert_eq!(attributes.len(), 3);
/// ```
#[macro_export]
macro_rules! flat_attributes {
    { $($key:expr => $value:expr),* $(,)? } => {{
        let mut attributes = $crate::flat_attributes::FlatAttributes::default();
        $(
            attributes.insert($key, $value);
        )*

        attributes
    }};
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_segments_compare_by_value() {
        let attributes = crate::flat_attributes! {
            "foo.10" => "c",
            "foo.2" => "b",
            "foo.#" => "2",
        };

        let keys: Vec<&str> = attributes.sorted().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["foo.#", "foo.2", "foo.10"]);
    }

    #[test]
    fn segment_prefix_sorts_first() {
        assert_eq!(compare_keys("a", "a.b"), Ordering::Less);
        assert_eq!(compare_keys("a.b.c", "a.b"), Ordering::Greater);
        assert_eq!(compare_keys("a.b", "a.b"), Ordering::Equal);
    }

    #[test]
    fn markers_sort_before_item_names() {
        // '#' and '%' precede every alphanumeric segment, so a declaration
        // is always visited before the keys it declares
        assert_eq!(compare_keys("tags.%", "tags.env"), Ordering::Less);
        assert_eq!(compare_keys("ports.#", "ports.0"), Ordering::Less);
    }

    #[test]
    fn siblings_stay_contiguous() {
        let attributes = crate::flat_attributes! {
            "lkz" => "after",
            "lk.B" => "2",
            "lk.#" => "2",
            "lk.A" => "1",
        };

        let keys: Vec<&str> = attributes.sorted().into_iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["lk.#", "lk.A", "lk.B", "lkz"]);
    }

    #[test]
    fn from_json() {
        let attributes = FlatAttributes::from_json(r#"{"id": "i-1234", "name": "web"}"#).unwrap();
        assert_eq!(attributes.get("id"), Some("i-1234"));
        assert_eq!(attributes.get("name"), Some("web"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let error = FlatAttributes::load_file(Path::new("attributes.txt")).unwrap_err();
        assert!(matches!(error, LoadError::UnknownFormat));
    }
}
