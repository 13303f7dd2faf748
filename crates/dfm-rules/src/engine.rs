//! Rule orchestration.
//!
//! The engine owns an ordered list of rules and turns one
//! [`RuleContext`] into a [`Report`]:
//!
//! 1. the built-in [`TopologyRule`] runs first, always;
//! 2. each registered rule runs in registration order, or is replaced by a
//!    `rule_skipped` note when its [`Requirements`](crate::Requirements)
//!    are not met;
//! 3. a rule that errors or panics becomes a `rule_failure` finding and the
//!    run continues;
//! 4. with a deadline, rules not started before it passes and rules that
//!    were still running when it passed are left out of the report and
//!    listed in a closing `timeout` finding.
//!
//! Parallel runs evaluate rules on the rayon pool and reassemble results in
//! registration order, so the report does not depend on scheduling.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::context::RuleContext;
use crate::finding::{Finding, FindingCode, Severity};
use crate::report::Report;
use crate::rule::{Evaluation, Rule};
use crate::rules::{
    DraftAngleRule, RibBossRule, SharpCornerRule, ThicknessRule, ThinPartRule, TopologyRule,
    UndercutRule,
};

/// Rule id used for findings emitted by the engine itself.
pub const ENGINE_ID: &str = "engine";

/// Ordered collection of rules evaluated against a context.
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
    parallel: bool,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_ids())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl RuleEngine {
    /// Empty engine. Only the built-in topology check will run.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            parallel: true,
        }
    }

    /// Engine with every standard rule registered.
    ///
    /// Rules that do not apply to the configured process are skipped at run
    /// time, so the same engine serves molding and machining.
    pub fn with_standard_rules() -> Self {
        let mut engine = Self::new();
        engine
            .register(DraftAngleRule)
            .register(UndercutRule)
            .register(ThicknessRule)
            .register(RibBossRule)
            .register(SharpCornerRule)
            .register(ThinPartRule);
        engine
    }

    /// Append a rule.
    pub fn register<R: Rule + 'static>(&mut self, rule: R) -> &mut Self {
        self.register_shared(Arc::new(rule))
    }

    /// Append a shared rule. The same instance may be registered more than
    /// once and is then evaluated once per registration.
    pub fn register_shared(&mut self, rule: Arc<dyn Rule>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Evaluate rules concurrently (default) or one after another.
    pub fn parallel(&mut self, enabled: bool) -> &mut Self {
        self.parallel = enabled;
        self
    }

    /// Ids of the registered rules, in order.
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule.
    pub fn run(&self, ctx: &RuleContext<'_>) -> Report {
        self.execute(ctx, None)
    }

    /// Evaluate rules until `timeout` has elapsed.
    ///
    /// Rules are never interrupted. A rule that has not started by the
    /// deadline is not started at all; a rule that finishes after it has its
    /// findings discarded. Both are named in the `timeout` finding.
    pub fn run_with_timeout(&self, ctx: &RuleContext<'_>, timeout: Duration) -> Report {
        // A timeout too large to represent means no deadline.
        self.execute(ctx, Instant::now().checked_add(timeout))
    }

    fn execute(&self, ctx: &RuleContext<'_>, deadline: Option<Instant>) -> Report {
        let started = Instant::now();
        let face_count = ctx.mesh().face_count();
        info!(
            rules = self.rules.len(),
            faces = face_count,
            process = %ctx.process(),
            parallel = self.parallel,
            "starting analysis"
        );

        let topology = evaluate(&TopologyRule, ctx);

        // Indexed collect keeps registration order in both modes.
        let outcomes: Vec<Slot> = if self.parallel {
            self.rules
                .par_iter()
                .map(|rule| run_slot(rule.as_ref(), ctx, deadline))
                .collect()
        } else {
            self.rules
                .iter()
                .map(|rule| run_slot(rule.as_ref(), ctx, deadline))
                .collect()
        };

        let mut findings = topology.findings;
        let mut unmeasurable = topology.unmeasurable_faces;
        let mut not_started = Vec::new();
        let mut not_completed = Vec::new();
        for (rule, outcome) in self.rules.iter().zip(outcomes) {
            match outcome {
                Slot::Done(eval) => {
                    findings.extend(eval.findings);
                    unmeasurable += eval.unmeasurable_faces;
                }
                Slot::Late => not_completed.push(rule.id()),
                Slot::NotStarted => not_started.push(rule.id()),
            }
        }

        let timed_out = !(not_started.is_empty() && not_completed.is_empty());
        if timed_out {
            warn!(
                not_started = ?not_started,
                not_completed = ?not_completed,
                "analysis deadline passed"
            );
            findings.push(timeout_finding(&not_started, &not_completed));
        }

        let report = Report::new(findings, face_count, unmeasurable, timed_out);
        let summary = report.summary();
        info!(
            info = summary.info,
            warning = summary.warning,
            error = summary.error,
            score = summary.score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        report
    }
}

/// Result of one registration slot under an optional deadline.
enum Slot {
    Done(Evaluation),
    /// Finished after the deadline; its findings are dropped.
    Late,
    NotStarted,
}

/// Evaluate one registered rule unless the deadline has passed.
fn run_slot(rule: &dyn Rule, ctx: &RuleContext<'_>, deadline: Option<Instant>) -> Slot {
    let Some(deadline) = deadline else {
        return Slot::Done(evaluate(rule, ctx));
    };
    if Instant::now() >= deadline {
        return Slot::NotStarted;
    }
    let eval = evaluate(rule, ctx);
    if Instant::now() > deadline {
        debug!(rule = rule.id(), "rule finished after the deadline");
        return Slot::Late;
    }
    Slot::Done(eval)
}

/// Closing marker naming every rule whose findings are missing.
fn timeout_finding(not_started: &[&str], not_completed: &[&str]) -> Finding {
    let mut parts = Vec::new();
    if !not_started.is_empty() {
        parts.push(format!("rules not started: {}", not_started.join(", ")));
    }
    if !not_completed.is_empty() {
        parts.push(format!(
            "rules not completed by deadline: {}",
            not_completed.join(", ")
        ));
    }
    Finding::new(
        ENGINE_ID,
        FindingCode::Timeout,
        Severity::Warning,
        format!("deadline passed; {}", parts.join("; ")),
    )
    .with_value((not_started.len() + not_completed.len()) as f64)
}

/// Evaluate a rule, turning unmet requirements into a skip note and errors
/// or panics into a failure finding.
fn evaluate(rule: &dyn Rule, ctx: &RuleContext<'_>) -> Evaluation {
    let id = rule.id();

    if let Some(reason) = rule.requirements().unmet(ctx) {
        warn!(rule = id, %reason, "skipping rule");
        return Evaluation::from_findings(vec![Finding::new(
            id,
            FindingCode::RuleSkipped,
            Severity::Info,
            format!("skipped: {reason}"),
        )]);
    }

    let started = Instant::now();
    let message = match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(ctx))) {
        Ok(Ok(eval)) => {
            debug!(
                rule = id,
                findings = eval.findings.len(),
                unmeasurable = eval.unmeasurable_faces,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "rule finished"
            );
            return eval;
        }
        Ok(Err(err)) => format!("rule failed: {err}"),
        Err(payload) => format!("rule panicked: {}", panic_message(payload.as_ref())),
    };

    warn!(rule = id, %message, "rule failure");
    Evaluation::from_findings(vec![Finding::new(
        id,
        FindingCode::RuleFailure,
        Severity::Error,
        message,
    )])
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
