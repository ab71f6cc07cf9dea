/// Externally supplied `key=value` overrides for `/*extern*/` declarations.
///
/// Keys keep insertion order and the first value given for a key wins.
///
/// # Example
///
/// ```rust
/// use openscad_annotate::PropertyOverrides;
///
/// let mut overrides = PropertyOverrides::new();
/// assert!(overrides.insert("label", "A"));
/// assert!(!overrides.insert("label", "B"));
/// assert_eq!(overrides.get("label"), Some("A"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOverrides {
    entries: Vec<(String, String)>,
}

impl PropertyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override unless the key is already set.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.get(&key).is_some() {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (key, value) in iter {
            overrides.insert(key, value);
        }
        overrides
    }
}
