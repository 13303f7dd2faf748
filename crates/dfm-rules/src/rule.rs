//! The rule interface.

use crate::config::ProcessKind;
use crate::context::RuleContext;
use crate::error::RuleError;
use crate::finding::Finding;

/// Preconditions a rule needs before it can run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requirements {
    /// Needs a closed, 2-manifold mesh.
    pub manifold: bool,
    /// Only applies to this process.
    pub process: Option<ProcessKind>,
}

impl Requirements {
    /// No preconditions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Require a closed manifold mesh.
    pub fn manifold(mut self) -> Self {
        self.manifold = true;
        self
    }

    /// Restrict to one process.
    pub fn process(mut self, process: ProcessKind) -> Self {
        self.process = Some(process);
        self
    }

    /// Why the rule cannot run in `ctx`, or `None` if it can.
    pub fn unmet(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if let Some(process) = self.process {
            if process != ctx.process() {
                return Some(format!(
                    "applies to {process} only (analysing for {})",
                    ctx.process()
                ));
            }
        }
        if self.manifold && !ctx.mesh().is_closed_manifold() {
            return Some("requires a closed manifold mesh".to_string());
        }
        None
    }
}

/// Output of one rule evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Findings in face or edge index order.
    pub findings: Vec<Finding>,
    /// Faces the rule could not measure.
    pub unmeasurable_faces: usize,
}

impl Evaluation {
    /// Evaluation with findings and nothing unmeasurable.
    pub fn from_findings(findings: Vec<Finding>) -> Self {
        Self {
            findings,
            unmeasurable_faces: 0,
        }
    }
}

/// A manufacturability check.
///
/// Rules are pure functions of the mesh and context: the same input always
/// yields the same findings in the same order. Implementations must be
/// `Send + Sync` so the engine can evaluate them on a thread pool.
pub trait Rule: Send + Sync {
    /// Stable identifier, used as `ruleId` in findings.
    fn id(&self) -> &str;

    /// Preconditions checked by the engine before evaluation.
    fn requirements(&self) -> Requirements {
        Requirements::none()
    }

    /// Run the check.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Evaluation, RuleError>;
}
