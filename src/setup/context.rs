//! Mutable state for one pipeline run.

use crate::setup::plan::{ExternalRegistry, SetupPlan};
use crate::setup::DEFAULT_REGISTRY_SECRET;

/// Created once per invocation and mutated in place by steps in strict
/// sequence; there is exactly one writer at any time. Discarded when the
/// pipeline returns.
#[derive(Debug)]
pub struct SetupContext {
    pub plan: SetupPlan,
    pub external_registry: Option<ExternalRegistry>,
    pub using_external_registry: bool,
    pub registry_secret_name: String,
    /// Filled by the image-preparation step.
    pub operator_image: String,
}

impl SetupContext {
    pub fn new(plan: SetupPlan) -> Self {
        let external_registry = plan.external_registry.clone();
        Self {
            plan,
            external_registry,
            using_external_registry: false,
            registry_secret_name: DEFAULT_REGISTRY_SECRET.to_string(),
            operator_image: String::new(),
        }
    }
}
