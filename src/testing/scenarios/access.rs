//! Role-based access control probes
//!
//! The server answers unauthorized and forbidden requests alike with 401.
//! A 403 is reported separately and only counts as a denial when
//! `accept_forbidden` is configured.

use async_trait::async_trait;

use crate::api::types::Teacher;
use crate::api::{expect_status, ApiClient, CallResult, Rejection, Role};
use crate::common::Failure;
use crate::testing::context::SessionContext;
use crate::testing::outcome::TestOutcome;
use crate::testing::scenario::{Scenario, ScenarioOutput};

const STUDENT_PROBE: &str = "RBAC - Student Access Control";
const TEACHER_PROBE: &str = "RBAC - Teacher Student Access";

pub struct AccessControl {
    accept_forbidden: bool,
}

impl AccessControl {
    pub fn new(accept_forbidden: bool) -> Self {
        Self { accept_forbidden }
    }

    /// Judge the answer to a create attempt that must be refused
    fn judge_denial(&self, result: CallResult) -> TestOutcome {
        let response = match result {
            Ok(response) => response,
            Err(e) => return TestOutcome::from_failure(STUDENT_PROBE, &Failure::Transport(e)),
        };

        match response.rejection() {
            Some(Rejection::Unauthorized) => TestOutcome::pass(
                STUDENT_PROBE,
                "Student correctly denied access to create teachers (401 Unauthorized)",
            ),
            Some(Rejection::Forbidden) if self.accept_forbidden => TestOutcome::pass(
                STUDENT_PROBE,
                "Student correctly denied access to create teachers (403 Forbidden)",
            ),
            Some(rejection) => TestOutcome::fail(
                STUDENT_PROBE,
                format!(
                    "Student was rejected with {}, expected 401 Unauthorized",
                    rejection.describe()
                ),
                Some(response.body),
            ),
            None if response.is_ok() => TestOutcome::fail(
                STUDENT_PROBE,
                "Student should be denied access but was allowed to create a teacher",
                Some(response.body),
            ),
            None => TestOutcome::from_failure(
                STUDENT_PROBE,
                &Failure::unexpected_status(401, response.status, &response.body),
            ),
        }
    }
}

#[async_trait]
impl Scenario for AccessControl {
    fn title(&self) -> String {
        "Role-Based Access Control".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        // Students must not create teachers
        match out.context.require_token(Role::Student).map(str::to_string) {
            Ok(token) => {
                let probe = Teacher {
                    first_name: Some("Test".to_string()),
                    last_name: Some("Teacher".to_string()),
                    email: Some("test@test.com".to_string()),
                    ..Default::default()
                };
                let result = client.post("teachers", &probe, Some(&token)).await;
                let outcome = self.judge_denial(result);
                out.outcomes.push(outcome);
            }
            Err(failure) => out.failure(STUDENT_PROBE, &failure),
        }

        // Teachers may list students
        match out.context.require_token(Role::Teacher).map(str::to_string) {
            Ok(token) => {
                let result = client.get("students", Some(&token)).await;
                match expect_status(result, 200) {
                    Ok(_) => out.pass(TEACHER_PROBE, "Teacher correctly allowed to view students"),
                    Err(failure) => out.failure(TEACHER_PROBE, &failure),
                }
            }
            Err(failure) => out.failure(TEACHER_PROBE, &failure),
        }

        out
    }
}
