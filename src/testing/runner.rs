//! Test runner implementation
//!
//! Runs an ordered list of scenarios one after another, threading the
//! session context from each scenario into the next and printing the
//! progress log as outcomes arrive.

use colored::Colorize;

use crate::api::types::{SchoolClass, Student, Subject, Teacher, TeacherAssignment};
use crate::api::ApiClient;
use crate::common::{Config, Result};

use super::context::SessionContext;
use super::fixtures;
use super::outcome::TestOutcome;
use super::scenario::Scenario;
use super::scenarios::{
    AccessControl, Attendance, Crud, Dashboard, Identity, Login, Notifications, ParentPortal,
    Registration,
};
use super::summary::RunSummary;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub context: SessionContext,
    pub outcomes: Vec<TestOutcome>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    /// First outcome recorded under a name
    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

pub struct Runner {
    client: ApiClient,
    scenarios: Vec<Box<dyn Scenario>>,
}

impl Runner {
    /// Runner with no scenarios
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            scenarios: Vec::new(),
        }
    }

    /// The full fixed sequence against the configured API
    pub fn standard(config: &Config) -> Result<Self> {
        let client = ApiClient::from_config(config)?;

        Ok(Self::new(client)
            .with_scenario(Registration::new(config.users.clone()))
            .with_scenario(Login::new(config.users.clone()))
            .with_scenario(Identity)
            .with_scenario(Crud::<Student>::new(fixtures::student_plan))
            .with_scenario(Crud::<Teacher>::new(fixtures::teacher_plan))
            .with_scenario(Crud::<SchoolClass>::new(fixtures::class_plan))
            .with_scenario(Crud::<Subject>::new(fixtures::subject_plan))
            .with_scenario(Crud::<TeacherAssignment>::new(fixtures::assignment_plan))
            .with_scenario(Attendance::new())
            .with_scenario(Notifications)
            .with_scenario(Dashboard)
            .with_scenario(AccessControl::new(config.accept_forbidden))
            .with_scenario(ParentPortal))
    }

    pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
        self.scenarios.push(Box::new(scenario));
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn titles(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.title()).collect()
    }

    /// Run every scenario in order, starting from `context`
    pub async fn run(&self, context: SessionContext) -> RunReport {
        let mut context = context;
        let mut outcomes = Vec::new();

        for scenario in &self.scenarios {
            let title = scenario.title();
            println!("\n{}", format!("=== Testing {} ===", title).cyan().bold());
            tracing::info!(scenario = %title, "running scenario");

            let output = scenario.run(&self.client, context).await;
            for outcome in &output.outcomes {
                outcome.print();
            }

            tracing::debug!(
                scenario = %title,
                outcomes = output.outcomes.len(),
                tokens = output.context.token_count(),
                "scenario finished"
            );
            context = output.context;
            outcomes.extend(output.outcomes);
        }

        RunReport { context, outcomes }
    }
}
