//! Stanza include/exclude selection.
//!
//! Filtering runs before any process invocation: a name on both lists is a
//! configuration conflict that drops the stanza for the cycle, and an empty
//! include list selects every stanza the tool reports.

use std::collections::BTreeSet;

/// One unit of collection work after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StanzaRequest {
    /// Single invocation covering every stanza pgBackRest knows about.
    All,
    /// One invocation scoped to a named stanza.
    Named(String),
}

/// Effective stanza set for one cycle.
#[derive(Debug, Clone)]
pub struct StanzaSelection {
    requests: Vec<StanzaRequest>,
    exclude: BTreeSet<String>,
}

impl StanzaSelection {
    /// Apply include/exclude filtering. Empty-string entries are treated as
    /// absent (the tool is invoked without `--stanza`).
    ///
    /// For every name present on both lists one warning line naming the
    /// stanza is logged and that stanza is dropped before the tool runs for
    /// it, regardless of the other list's contents.
    pub fn resolve(include: &[String], exclude: &[String]) -> Self {
        let exclude: BTreeSet<String> = exclude
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();
        let include: Vec<&String> = include.iter().filter(|name| !name.is_empty()).collect();

        if include.is_empty() {
            return Self {
                requests: vec![StanzaRequest::All],
                exclude,
            };
        }

        let mut requests = Vec::new();
        for name in include {
            if exclude.contains(name.as_str()) {
                tracing::warn!(stanza = %name, "stanza specified in include and exclude lists");
                continue;
            }
            requests.push(StanzaRequest::Named(name.clone()));
        }

        Self { requests, exclude }
    }

    /// True when conflict filtering eliminated every requested stanza.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Tool invocations to perform this cycle.
    pub fn requests(&self) -> &[StanzaRequest] {
        &self.requests
    }

    /// Whether a payload stanza participates in metric publication.
    pub fn includes(&self, name: &str) -> bool {
        !self.exclude.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_include_selects_all() {
        let selection = StanzaSelection::resolve(&[], &[]);
        assert_eq!(selection.requests(), &[StanzaRequest::All]);
        assert!(selection.includes("demo"));
    }

    #[test]
    fn test_blank_entries_are_absent() {
        let selection = StanzaSelection::resolve(&names(&[""]), &names(&[""]));
        assert_eq!(selection.requests(), &[StanzaRequest::All]);
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_named_includes() {
        let selection = StanzaSelection::resolve(&names(&["demo", "main"]), &[]);
        assert_eq!(
            selection.requests(),
            &[
                StanzaRequest::Named("demo".to_string()),
                StanzaRequest::Named("main".to_string()),
            ]
        );
    }

    #[test]
    fn test_conflicting_name_is_dropped() {
        let selection = StanzaSelection::resolve(&names(&["demo", "main"]), &names(&["demo"]));
        assert_eq!(
            selection.requests(),
            &[StanzaRequest::Named("main".to_string())]
        );
    }

    #[test]
    fn test_all_conflicting_names_empties_selection() {
        let selection = StanzaSelection::resolve(&names(&["demo"]), &names(&["demo"]));
        assert!(selection.is_empty());
        assert!(selection.requests().is_empty());
    }

    #[test]
    fn test_exclude_applies_to_full_sweep() {
        let selection = StanzaSelection::resolve(&[], &names(&["noisy"]));
        assert_eq!(selection.requests(), &[StanzaRequest::All]);
        assert!(!selection.includes("noisy"));
        assert!(selection.includes("demo"));
    }
}
