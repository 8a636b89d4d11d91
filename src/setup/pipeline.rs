//! Build-time assembly and strictly sequential execution of setup steps.

use thiserror::Error;

use crate::setup::context::SetupContext;
use crate::setup::deps::Deps;
use crate::setup::plan::SetupPlan;
use crate::setup::steps::{self, Step};

/// A setup step failed; no step after it ran. There is no rollback of the
/// steps that already completed.
#[derive(Debug, Error)]
#[error("setup step `{step}` failed")]
pub struct StepFailure {
    pub step: &'static str,
    #[source]
    pub source: anyhow::Error,
}

pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Assemble the step list once from the immutable plan. Conditional
    /// steps are decided here, never re-evaluated mid-run.
    pub fn build(plan: &SetupPlan) -> Self {
        let mut steps = vec![Step {
            name: "bootstrap-cluster",
            run: steps::bootstrap_cluster,
        }];
        if plan.tls_enabled {
            steps.push(Step {
                name: "configure-tls",
                run: steps::configure_tls,
            });
        }
        steps.push(Step {
            name: "configure-registry",
            run: steps::configure_registry,
        });
        steps.push(Step {
            name: "prepare-operator-image",
            run: steps::prepare_operator_image,
        });
        steps.push(Step {
            name: "deploy-operator",
            run: steps::deploy_operator,
        });
        steps.push(Step {
            name: "verify-install",
            run: steps::verify_install,
        });
        Self { steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name).collect()
    }

    /// Run steps strictly in order on the calling thread, halting on the
    /// first failure.
    pub fn run(&self, deps: &Deps, ctx: &mut SetupContext) -> Result<(), StepFailure> {
        for step in &self.steps {
            tracing::info!(step = step.name, "running setup step");
            (step.run)(deps, ctx).map_err(|source| StepFailure {
                step: step.name,
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
