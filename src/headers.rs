//! Free-text header blocks ("key: value" per line) to and from a multimap.

use std::collections::BTreeMap;

/// Ordered header multimap. Duplicate keys are kept as separate entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn new() -> Self {
        HeaderList::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every value recorded under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapses duplicate keys into one entry, values joined with ", ".
    ///
    /// This is the storage representation; multiplicity does not survive it.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        let mut flat: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in &self.entries {
            flat.entry(key.clone())
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        flat
    }

    /// Renders the block grouped by key, one line per key.
    pub fn to_text(&self) -> String {
        headers_to_text(&self.flatten())
    }
}

impl FromIterator<(String, String)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        HeaderList {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Parses a header block. Lines without a colon are dropped.
pub fn parse_headers(text: &str) -> HeaderList {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Renders a stored header map as an editable block.
pub fn headers_to_text(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}
