//! Attendance marking scenario

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::api::types::{AttendanceRecord, AttendanceStatus, BulkAttendance, BulkAttendanceResponse};
use crate::api::{expect_list, expect_status, ApiClient, ResourceKind, Role};
use crate::common::Failure;
use crate::testing::context::{EntityKey, SessionContext};
use crate::testing::scenario::{Scenario, ScenarioOutput};

/// Statuses used for the bulk entries, one entry per status
const BULK_STATUSES: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Absent];

/// Mark one student, list records, then bulk-mark a batch
pub struct Attendance {
    date: Option<NaiveDate>,
}

impl Attendance {
    pub fn new() -> Self {
        Self { date: None }
    }

    /// Pin the attendance date instead of using today
    pub fn on(date: NaiveDate) -> Self {
        Self { date: Some(date) }
    }

    fn date(&self) -> String {
        self.date
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl Default for Attendance {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scenario for Attendance {
    fn title(&self) -> String {
        "Attendance Management".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);
        let date = self.date();

        let token = match out.context.require_token(Role::Admin) {
            Ok(token) => token.to_string(),
            Err(failure) => {
                out.failure(self.title(), &failure);
                return out;
            }
        };

        let class_id = out
            .context
            .require_entity_id(EntityKey::Created(ResourceKind::Class))
            .map(str::to_string);
        let subject_id = out
            .context
            .require_entity_id(EntityKey::Created(ResourceKind::Subject))
            .map(str::to_string);
        let student_id = out
            .context
            .require_entity_id(EntityKey::Created(ResourceKind::Student))
            .map(str::to_string);

        // Individual mark
        let name = "Mark Individual Attendance";
        match (&student_id, &class_id, &subject_id) {
            (Ok(student_id), Ok(class_id), Ok(subject_id)) => {
                let record = AttendanceRecord {
                    student_id: Some(student_id.clone()),
                    class_id: Some(class_id.clone()),
                    subject_id: Some(subject_id.clone()),
                    date: Some(date.clone()),
                    status: Some(AttendanceStatus::Present),
                    remarks: Some("On time".to_string()),
                    ..Default::default()
                };
                let result = client.post("attendance", &record, Some(&token)).await;
                match expect_status(result, 200) {
                    Ok(_) => out.pass(name, "Successfully marked individual attendance"),
                    Err(failure) => out.failure(name, &failure),
                }
            }
            (Err(failure), _, _) | (_, Err(failure), _) | (_, _, Err(failure)) => {
                out.failure(name, failure)
            }
        }

        // List
        let name = "Get Attendance";
        let result = client.get("attendance", Some(&token)).await;
        match expect_list(result) {
            Ok(records) => out.pass(
                name,
                format!("Retrieved {} attendance records", records.len()),
            ),
            Err(failure) => out.failure(name, &failure),
        }

        // Bulk mark
        let name = "Bulk Attendance Marking";
        match (&class_id, &subject_id) {
            (Ok(class_id), Ok(subject_id)) => {
                let bulk = BulkAttendance {
                    attendance_list: BULK_STATUSES
                        .iter()
                        .map(|status| AttendanceRecord {
                            student_id: Some(Uuid::new_v4().to_string()),
                            class_id: Some(class_id.clone()),
                            subject_id: Some(subject_id.clone()),
                            date: Some(date.clone()),
                            status: Some(*status),
                            ..Default::default()
                        })
                        .collect(),
                };
                let result = client.post("attendance/bulk", &bulk, Some(&token)).await;
                match check_bulk(result, bulk.attendance_list.len()) {
                    Ok(count) => out.pass(
                        name,
                        format!("Successfully marked bulk attendance for {} students", count),
                    ),
                    Err(failure) => out.failure(name, &failure),
                }
            }
            (Err(failure), _) | (_, Err(failure)) => out.failure(name, failure),
        }

        out
    }
}

/// Success flag set and count equal to the number of entries sent
fn check_bulk(result: crate::api::CallResult, sent: usize) -> Result<u64, Failure> {
    let response = expect_status(result, 200)?;
    let bulk: BulkAttendanceResponse =
        response.decode("Bulk attendance response missing success flag")?;

    if !bulk.success {
        return Err(Failure::malformed(
            "Bulk attendance reported success=false",
            &response.body,
        ));
    }
    match bulk.count {
        Some(count) if count == sent as u64 => Ok(count),
        Some(count) => Err(Failure::malformed(
            format!("Bulk attendance counted {} of {} entries", count, sent),
            &response.body,
        )),
        None => Err(Failure::malformed(
            "Bulk attendance response missing count",
            &response.body,
        )),
    }
}
