//! Scenario trait
//!
//! A scenario covers one feature area. It receives the session context by
//! value, performs its HTTP calls in order, and returns the possibly
//! updated context together with one outcome per assertion. Scenarios
//! never fail as a whole: every problem is an outcome.

use async_trait::async_trait;

use super::context::SessionContext;
use super::outcome::TestOutcome;
use crate::api::ApiClient;
use crate::common::Failure;

/// What a scenario hands back to the runner
#[derive(Debug, Clone, Default)]
pub struct ScenarioOutput {
    pub context: SessionContext,
    pub outcomes: Vec<TestOutcome>,
}

impl ScenarioOutput {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context,
            outcomes: Vec::new(),
        }
    }

    /// Thread the context through a functional update
    pub fn update(&mut self, f: impl FnOnce(SessionContext) -> SessionContext) {
        let context = std::mem::take(&mut self.context);
        self.context = f(context);
    }

    pub fn pass(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.outcomes.push(TestOutcome::pass(name, message));
    }

    pub fn fail(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.outcomes.push(TestOutcome::fail(name, message, None));
    }

    pub fn failure(&mut self, name: impl Into<String>, failure: &Failure) {
        self.outcomes.push(TestOutcome::from_failure(name, failure));
    }

    /// First outcome recorded under a name
    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    /// Section header printed before the scenario runs
    fn title(&self) -> String;

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput;
}
