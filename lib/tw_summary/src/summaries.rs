//! Collections of flow summaries, per method and per class.

use crate::flow::MethodFlow;
use std::collections::{BTreeMap, BTreeSet};

/// Flow summaries of the methods of one class, indexed by sub-signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSummaries {
    flows: BTreeMap<String, BTreeSet<MethodFlow>>,
}

impl MethodSummaries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_flow(&mut self, flow: MethodFlow) {
        self.flows
            .entry(flow.method().to_string())
            .or_default()
            .insert(flow);
    }

    pub fn merge(&mut self, other: &Self) {
        for (method, flows) in &other.flows {
            self.flows
                .entry(method.clone())
                .or_default()
                .extend(flows.iter().cloned());
        }
    }

    pub fn flows_for_method(&self, sub_signature: &str) -> Option<&BTreeSet<MethodFlow>> {
        self.flows.get(sub_signature)
    }

    pub fn all_flows(&self) -> impl Iterator<Item = &MethodFlow> {
        self.flows.values().flatten()
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.values().all(BTreeSet::is_empty)
    }

    /// Keeps only the flows of the given method.
    #[must_use]
    pub fn filter_method(&self, sub_signature: &str) -> Self {
        let mut res = Self::new();
        if let Some(flows) = self.flows.get(sub_signature) {
            res.flows.insert(sub_signature.to_string(), flows.clone());
        }
        res
    }
}

impl FromIterator<MethodFlow> for MethodSummaries {
    fn from_iter<I: IntoIterator<Item = MethodFlow>>(iter: I) -> Self {
        let mut res = Self::new();
        for flow in iter {
            res.add_flow(flow);
        }
        res
    }
}

/// Result of a summary query: the summaries of a method for each
/// candidate declaring class that has some.
///
/// Built once per query and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSummaries {
    summaries: BTreeMap<String, MethodSummaries>,
}

impl ClassSummaries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, class_name: &str, summaries: &MethodSummaries) {
        self.summaries
            .entry(class_name.to_string())
            .or_default()
            .merge(summaries);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.summaries.keys().map(String::as_str)
    }

    pub fn class_summaries(&self, class_name: &str) -> Option<&MethodSummaries> {
        self.summaries.get(class_name)
    }

    /// All flows of all classes.
    pub fn all_flows(&self) -> BTreeSet<MethodFlow> {
        self.summaries
            .values()
            .flat_map(MethodSummaries::all_flows)
            .cloned()
            .collect()
    }

    /// All flows of the given method, in all classes.
    pub fn all_flows_for_method(&self, sub_signature: &str) -> BTreeSet<MethodFlow> {
        self.summaries
            .values()
            .filter_map(|s| s.flows_for_method(sub_signature))
            .flatten()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.values().all(MethodSummaries::is_empty)
    }
}
