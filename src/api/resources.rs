use serde::Serialize;
use std::collections::BTreeMap;

/// One row of the documentation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub title: String,
    pub url: String,
}

/// Routes grouped by resource.
///
/// Resources are kept in alphabetical order; routes within a resource keep their
/// registration order. Serializes as a plain `{resource: [entry, ...]}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceTable(BTreeMap<String, Vec<RouteEntry>>);

impl ResourceTable {
    pub fn push(&mut self, resource: &str, entry: RouteEntry) {
        self.0.entry(resource.to_string()).or_default().push(entry);
    }

    pub fn get(&self, resource: &str) -> Option<&[RouteEntry]> {
        self.0.get(resource).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RouteEntry])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
