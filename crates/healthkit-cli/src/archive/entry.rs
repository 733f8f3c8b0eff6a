//! Raw attribute mappings as they come out of the export

/// Prefix marking an XML attribute, as opposed to a nested child element
pub const ATTRIBUTE_MARKER: char = '@';

/// One `<Record>`, `<Workout>` or `<ActivitySummary>` element.
///
/// Attributes are stored under marker-prefixed keys (`@type`, `@value`).
/// Direct child elements are stored under their bare element name with an
/// empty value, so their presence survives without their contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    fields: Vec<(String, String)>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, prefixing the marker
    pub fn push_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .push((format!("{}{}", ATTRIBUTE_MARKER, name), value.into()));
    }

    /// Record a direct child element once
    pub fn push_child(&mut self, name: &str) {
        if !self.fields.iter().any(|(k, _)| k == name) {
            self.fields.push((name.to_string(), String::new()));
        }
    }

    /// Look up a raw key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
