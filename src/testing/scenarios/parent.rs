//! Parent portal

use async_trait::async_trait;

use crate::api::{expect_list, ApiClient, Role};
use crate::testing::context::SessionContext;
use crate::testing::scenario::{Scenario, ScenarioOutput};

pub struct ParentPortal;

#[async_trait]
impl Scenario for ParentPortal {
    fn title(&self) -> String {
        "Parent Portal".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        let token = match out.context.require_token(Role::Parent) {
            Ok(token) => token.to_string(),
            Err(failure) => {
                out.failure(self.title(), &failure);
                return out;
            }
        };

        let result = client.get("parent/students", Some(&token)).await;
        match expect_list(result) {
            Ok(students) => out.pass(
                "Parent Students",
                format!("Retrieved {} students for parent", students.len()),
            ),
            Err(failure) => out.failure("Parent Students", &failure),
        }

        out
    }
}
