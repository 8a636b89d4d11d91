//! Guarded provisioning pipeline for local platform clusters.
//!
//! The crate has two halves. The execution layer ([`exec`], [`tools`])
//! validates every external-process invocation against a chain of security
//! predicates before anything is spawned. The orchestration layer ([`setup`])
//! resolves CLI flags into an immutable plan, assembles an ordered step
//! pipeline from it, and drives the external tools through an injected
//! dependency bag so every collaborator can be substituted in tests.

pub mod cli;
pub mod exec;
pub mod setup;
pub mod tools;
