//! Dashboard statistics for every role

use async_trait::async_trait;

use crate::api::types::DashboardStats;
use crate::api::{expect_status, ApiClient, Role};
use crate::common::Failure;
use crate::testing::context::SessionContext;
use crate::testing::scenario::{Scenario, ScenarioOutput};

pub struct Dashboard;

#[async_trait]
impl Scenario for Dashboard {
    fn title(&self) -> String {
        "Dashboard Statistics".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        let tokens: Vec<(Role, String)> = out
            .context
            .tokens()
            .map(|(role, token)| (role, token.to_string()))
            .collect();
        if tokens.is_empty() {
            out.failure("Dashboard Stats", &Failure::missing("Bearer token"));
            return out;
        }

        for (role, token) in tokens {
            let name = format!("Dashboard Stats {}", role);
            let result = client.get("dashboard/stats", Some(&token)).await;
            match check_stats(result) {
                Ok(keys) => out.pass(
                    name,
                    format!("Retrieved dashboard statistics for {} ({} keys)", role, keys),
                ),
                Err(failure) => out.failure(name, &failure),
            }
        }

        out
    }
}

/// Non-empty JSON object, returns the number of keys
fn check_stats(result: crate::api::CallResult) -> Result<usize, Failure> {
    let response = expect_status(result, 200)?;
    let stats: DashboardStats = response.decode("Empty or invalid stats response")?;
    if stats.is_empty() {
        return Err(Failure::malformed(
            "Empty or invalid stats response",
            &response.body,
        ));
    }
    Ok(stats.len())
}
