use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cable::CableOverrideResolver;
use super::capacity::{CapacityPackagingResolver, PackagingDecision};
use crate::pipeline::processing::annotation::{compose, parse};

/// Result of labeling one shipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelOutcome {
    /// Composed `[platform]/[size] items` label
    pub annotation: String,
    pub decision: PackagingDecision,
}

/// Turns a shipment's concatenated annotations into its final label
pub trait LabelResolver {
    fn resolve_label(&self, raw: &str) -> LabelOutcome;
}

/// Parser -> capacity ladder -> cable override -> composer
pub struct PackagingEngine {
    capacity: CapacityPackagingResolver,
    cables: CableOverrideResolver,
}

impl PackagingEngine {
    pub fn new(capacity: CapacityPackagingResolver, cables: CableOverrideResolver) -> Self {
        Self { capacity, cables }
    }
}

impl LabelResolver for PackagingEngine {
    fn resolve_label(&self, raw: &str) -> LabelOutcome {
        let parsed = parse(raw);
        let counts = parsed.counts();

        let by_capacity = self.capacity.resolve(&counts);
        let decision = self.cables.apply(by_capacity.clone(), &parsed.items);
        if decision != by_capacity {
            debug!("Cable override {} -> {} for '{}'", by_capacity, decision, parsed.items);
        }

        LabelOutcome {
            annotation: compose(&parsed.platform, &decision.to_string(), &parsed.items),
            decision,
        }
    }
}
