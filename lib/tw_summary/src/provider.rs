//! Read-only access to flow summaries.

use crate::errors::{SummaryError, SummaryResult};
use crate::flow::MethodFlow;
use crate::signature::MethodSignature;
use crate::summaries::{ClassSummaries, MethodSummaries};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Source of flow summaries consumed by the analysis.
///
/// Implementations must be safe to query from several analysis threads.
pub trait SummaryProvider: Send + Sync {
    /// Returns the summaries of the method with the given sub-signature,
    /// for each class of `classes` that has some.
    fn method_flows(&self, classes: &BTreeSet<String>, sub_signature: &str) -> ClassSummaries;

    /// Returns the summaries of one method of one class.
    fn class_method_flows(&self, class_name: &str, sub_signature: &str) -> BTreeSet<MethodFlow>;

    /// Checks whether summaries exist for the given class.
    fn supports_class(&self, class_name: &str) -> bool;

    /// Classes whose summaries can be loaded on demand.
    fn loadable_classes(&self) -> Vec<String>;

    /// Classes whose summaries are already available.
    fn supported_classes(&self) -> Vec<String>;

    /// Returns the summaries of the method designated by a full signature,
    /// such as the signature of a gap.
    fn flows_for_signature(&self, signature: &str) -> SummaryResult<BTreeSet<MethodFlow>> {
        let sig = MethodSignature::parse(signature)?;
        Ok(self.class_method_flows(sig.class_name(), &sig.sub_signature()))
    }
}

/// Serialized form of the summaries of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub class_name: String,
    #[serde(default)]
    pub flows: Vec<MethodFlow>,
}

/// In-memory summary provider.
#[derive(Debug, Clone, Default)]
pub struct MemorySummaries {
    classes: BTreeMap<String, MethodSummaries>,
    loadable: BTreeSet<String>,
}

impl MemorySummaries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> SummaryResult<Self>
    where
        I: IntoIterator<Item = ClassRecord>,
    {
        let mut res = Self::new();
        for record in records {
            log::debug!(
                "loading {} flows for class {}",
                record.flows.len(),
                record.class_name
            );
            for flow in record.flows {
                if flow.method().trim().is_empty() {
                    return Err(SummaryError::MissingMethod {
                        class: record.class_name.clone(),
                        method: flow.to_string(),
                    });
                }
                res.add_flow(&record.class_name, flow);
            }
            res.loadable.insert(record.class_name);
        }
        Ok(res)
    }

    pub fn add_flow(&mut self, class_name: &str, flow: MethodFlow) {
        self.classes
            .entry(class_name.to_string())
            .or_default()
            .add_flow(flow);
    }

    pub fn add_class(&mut self, class_name: &str, summaries: &MethodSummaries) {
        self.classes
            .entry(class_name.to_string())
            .or_default()
            .merge(summaries);
    }

    /// Declares a class as known to the summary database without
    /// providing flows for it.
    pub fn add_loadable_class(&mut self, class_name: &str) {
        self.loadable.insert(class_name.to_string());
    }

    pub fn merge(&mut self, other: &Self) {
        for (class_name, summaries) in &other.classes {
            self.add_class(class_name, summaries);
        }
        self.loadable.extend(other.loadable.iter().cloned());
    }
}

impl SummaryProvider for MemorySummaries {
    fn method_flows(&self, classes: &BTreeSet<String>, sub_signature: &str) -> ClassSummaries {
        let mut res = ClassSummaries::new();
        for class_name in classes {
            if let Some(summaries) = self.classes.get(class_name) {
                let method_summaries = summaries.filter_method(sub_signature);
                if !method_summaries.is_empty() {
                    res.merge(class_name, &method_summaries);
                }
            }
        }
        res
    }

    fn class_method_flows(&self, class_name: &str, sub_signature: &str) -> BTreeSet<MethodFlow> {
        self.classes
            .get(class_name)
            .and_then(|s| s.flows_for_method(sub_signature))
            .cloned()
            .unwrap_or_default()
    }

    fn supports_class(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    fn loadable_classes(&self) -> Vec<String> {
        self.loadable
            .iter()
            .filter(|c| !self.classes.contains_key(*c))
            .cloned()
            .collect()
    }

    fn supported_classes(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}
