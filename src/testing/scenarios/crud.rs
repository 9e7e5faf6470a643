//! Create/list/update/delete scenario shared by every resource collection
//!
//! Besides checking status codes, the scenario verifies what the calls did:
//! the listing grows by exactly one after create, an update leaves the
//! fields it did not touch alone, and delete restores the original count.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{expect_list, expect_status, ApiClient, Resource, Role};
use crate::common::Failure;
use crate::testing::context::{EntityKey, SessionContext};
use crate::testing::fixtures::PlanFn;
use crate::testing::scenario::{Scenario, ScenarioOutput};

pub struct Crud<R: Resource> {
    plan: PlanFn<R>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Crud<R> {
    pub fn new(plan: PlanFn<R>) -> Self {
        Self {
            plan,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> Scenario for Crud<R> {
    fn title(&self) -> String {
        format!("{} Management", R::KIND.singular())
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let kind = R::KIND;
        let singular = kind.singular();
        let plural = kind.plural();
        let noun = plural.to_lowercase();
        let mut out = ScenarioOutput::new(context);

        let token = match out.context.require_token(Role::Admin) {
            Ok(token) => token.to_string(),
            Err(failure) => {
                out.failure(self.title(), &failure);
                return out;
            }
        };

        let baseline = match list::<R>(client, &token).await {
            Ok(records) => Some(records.len()),
            Err(failure) => {
                tracing::warn!(%failure, "baseline listing of {} failed", noun);
                None
            }
        };

        // Create
        let name = format!("Create {}", singular);
        let created = match (self.plan)(&out.context) {
            Ok(plan) => {
                let result = client.post(kind.endpoint(), &plan.payload, Some(&token)).await;
                match decode_created::<R>(result) {
                    Ok((record, id)) => {
                        out.update(|ctx| ctx.with_record(EntityKey::Created(kind), &record));
                        out.pass(
                            name,
                            format!("Successfully created {}", singular.to_lowercase()),
                        );
                        Some((plan, record, id))
                    }
                    Err(failure) => {
                        out.failure(name, &failure);
                        None
                    }
                }
            }
            Err(failure) => {
                out.failure(name, &failure);
                None
            }
        };

        // List
        match list::<R>(client, &token).await {
            Ok(records) => {
                out.pass(
                    format!("Get {}", plural),
                    format!("Retrieved {} {}", records.len(), noun),
                );
                if let Some((_, _, id)) = &created {
                    let verify = format!("Verify Create {}", singular);
                    match check_created(&records, id, baseline) {
                        Ok(message) => out.pass(verify, message),
                        Err(message) => out.fail(verify, message),
                    }
                }
            }
            Err(failure) => out.failure(format!("Get {}", plural), &failure),
        }

        let Some((plan, created, id)) = created else {
            let missing = Failure::missing(format!("{} id", EntityKey::Created(kind)));
            out.failure(format!("Update {}", singular), &missing);
            out.failure(format!("Delete {}", singular), &missing);
            return out;
        };

        // Update
        let result = client.put(kind.endpoint(), &id, &plan.patch, &token).await;
        match expect_status(result, 200) {
            Ok(_) => {
                out.pass(
                    format!("Update {}", singular),
                    format!("Successfully updated {}", singular.to_lowercase()),
                );
                let verify = format!("Verify Update {}", singular);
                match list::<R>(client, &token).await.and_then(|records| fetch::<R>(&records, &id)) {
                    Ok(Some(fetched)) => match check_partial_update(&created, &plan.patch, &fetched) {
                        Ok(()) => {
                            out.update(|ctx| ctx.with_record(EntityKey::Created(kind), &fetched));
                            out.pass(verify, "Patched fields applied, other fields unchanged");
                        }
                        Err(message) => out.fail(verify, message),
                    },
                    Ok(None) => out.fail(verify, format!("{} {} missing after update", singular, id)),
                    Err(failure) => out.failure(verify, &failure),
                }
            }
            Err(failure) => out.failure(format!("Update {}", singular), &failure),
        }

        // Delete
        let result = client.delete(kind.endpoint(), &id, &token).await;
        match expect_status(result, 200) {
            Ok(_) => {
                out.pass(
                    format!("Delete {}", singular),
                    format!("Successfully deleted {}", singular.to_lowercase()),
                );
                let verify = format!("Verify Delete {}", singular);
                match list::<R>(client, &token).await {
                    Ok(records) => match check_deleted(&records, &id, baseline) {
                        Ok(message) => out.pass(verify, message),
                        Err(message) => out.fail(verify, message),
                    },
                    Err(failure) => out.failure(verify, &failure),
                }
            }
            Err(failure) => out.failure(format!("Delete {}", singular), &failure),
        }

        out
    }
}

/// Entries of the collection, untyped
///
/// Other clients may store records whose fields differ from the harness
/// schema; only the record under test is decoded strictly.
async fn list<R: Resource>(client: &ApiClient, token: &str) -> Result<Vec<Value>, Failure> {
    expect_list(client.get(R::KIND.endpoint(), Some(token)).await)
}

fn decode_created<R: Resource>(result: crate::api::CallResult) -> Result<(R, String), Failure> {
    let response = expect_status(result, 200)?;
    let record: R = response.decode(&format!(
        "Response is not a {} record",
        R::KIND.singular().to_lowercase()
    ))?;
    let id = record
        .id()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Failure::malformed("Created record has no id", &response.body))?;
    Ok((record, id))
}

fn find<'a>(records: &'a [Value], id: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
}

/// Decode the listed record `id` into its schema
fn fetch<R: Resource>(records: &[Value], id: &str) -> Result<Option<R>, Failure> {
    let Some(record) = find(records, id) else {
        return Ok(None);
    };
    serde_json::from_value(record.clone()).map(Some).map_err(|e| {
        Failure::malformed(
            format!(
                "Listed {} {} does not match its schema ({})",
                R::KIND.singular().to_lowercase(),
                id,
                e
            ),
            &record.to_string(),
        )
    })
}

/// The new id is listed and the count grew by one
pub(crate) fn check_created(
    records: &[Value],
    id: &str,
    baseline: Option<usize>,
) -> Result<String, String> {
    if find(records, id).is_none() {
        return Err(format!("Created id {} missing from listing", id));
    }
    match baseline {
        Some(before) if records.len() != before + 1 => Err(format!(
            "Expected {} records after create, found {}",
            before + 1,
            records.len()
        )),
        _ => Ok(format!("Id {} listed among {} records", id, records.len())),
    }
}

/// The id is gone and the count is back to the baseline
pub(crate) fn check_deleted(
    records: &[Value],
    id: &str,
    baseline: Option<usize>,
) -> Result<String, String> {
    if find(records, id).is_some() {
        return Err(format!("Deleted id {} still listed", id));
    }
    match baseline {
        Some(before) if records.len() != before => Err(format!(
            "Expected {} records after delete, found {}",
            before,
            records.len()
        )),
        _ => Ok(format!("Id {} no longer listed", id)),
    }
}

/// Patched fields carry the new values and every other field of the
/// created record survived
pub(crate) fn check_partial_update<R: Resource>(
    created: &R,
    patch: &R,
    fetched: &R,
) -> Result<(), String> {
    let created = fields(created)?;
    let patch = fields(patch)?;
    let fetched = fields(fetched)?;

    for (key, expected) in &patch {
        let actual = fetched.get(key);
        if actual != Some(expected) {
            return Err(format!(
                "Field '{}' is {}, expected {}",
                key,
                render(actual),
                expected
            ));
        }
    }

    for (key, before) in created.iter().filter(|(key, _)| !patch.contains_key(*key)) {
        let actual = fetched.get(key);
        if actual != Some(before) {
            return Err(format!(
                "Field '{}' changed from {} to {}",
                key,
                before,
                render(actual)
            ));
        }
    }

    Ok(())
}

fn fields<R: Resource>(record: &R) -> Result<serde_json::Map<String, Value>, String> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("Record did not serialize to an object: {}", other)),
        Err(e) => Err(format!("Record could not be serialized: {}", e)),
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "missing".to_string(), Value::to_string)
}
