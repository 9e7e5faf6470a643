//! Notification listing and mark-as-read

use async_trait::async_trait;

use crate::api::types::{MarkRead, MarkReadResponse, Notification};
use crate::api::{expect_json, expect_status, ApiClient, Role};
use crate::common::Failure;
use crate::testing::context::SessionContext;
use crate::testing::scenario::{Scenario, ScenarioOutput};

pub struct Notifications;

#[async_trait]
impl Scenario for Notifications {
    fn title(&self) -> String {
        "Notification System".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        let token = match out.context.require_token(Role::Teacher) {
            Ok(token) => token.to_string(),
            Err(failure) => {
                out.failure(self.title(), &failure);
                return out;
            }
        };

        let result = client.get("notifications", Some(&token)).await;
        let notifications = match expect_json::<Vec<Notification>>(result, "Response is not a list") {
            Ok(notifications) => {
                out.pass(
                    "Get Notifications",
                    format!("Retrieved {} notifications", notifications.len()),
                );
                notifications
            }
            Err(failure) => {
                out.failure("Get Notifications", &failure);
                return out;
            }
        };

        let name = "Mark Notification Read";
        let Some(first) = notifications.first() else {
            out.pass(name, "No notifications to mark as read (expected)");
            return out;
        };
        let Some(id) = first.id.clone().filter(|id| !id.is_empty()) else {
            out.fail(name, "No notification ID found in first notification");
            return out;
        };

        let result = client
            .post("notifications/mark-read", &MarkRead { notification_id: id }, Some(&token))
            .await;
        match check_marked(result) {
            Ok(()) => out.pass(name, "Successfully marked notification as read"),
            Err(failure) => out.failure(name, &failure),
        }

        out
    }
}

fn check_marked(result: crate::api::CallResult) -> Result<(), Failure> {
    let response = expect_status(result, 200)?;
    let marked: MarkReadResponse = response.decode("Response missing success flag")?;
    if marked.success {
        Ok(())
    } else {
        Err(Failure::malformed("Response missing success flag", &response.body))
    }
}
