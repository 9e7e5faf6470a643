//! Payloads sent by the resource scenarios
//!
//! Each plan pairs a create payload with the partial patch applied by the
//! update step. Plans that reference other records read their ids from the
//! session context and fail with a missing prerequisite when absent.

use crate::api::types::{SchoolClass, Student, Subject, Teacher, TeacherAssignment};
use crate::api::{ResourceKind, Role};
use crate::common::Failure;

use super::context::{EntityKey, SessionContext};

pub const ACADEMIC_YEAR: &str = "2024/2025";

/// Create payload and update patch for one resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePlan<R> {
    pub payload: R,
    pub patch: R,
}

/// Builds a plan from the session context
pub type PlanFn<R> = fn(&SessionContext) -> Result<ResourcePlan<R>, Failure>;

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub fn student_plan(ctx: &SessionContext) -> Result<ResourcePlan<Student>, Failure> {
    let parent_id = ctx.require_entity_id(EntityKey::User(Role::Parent))?;

    Ok(ResourcePlan {
        payload: Student {
            first_name: s("John"),
            last_name: s("Doe"),
            email: s("john.doe@student.edu.ng"),
            date_of_birth: s("2010-05-15"),
            gender: s("Male"),
            address: s("123 Lagos Street, Lagos"),
            phone_number: s("+2348012345682"),
            class_id: ctx
                .entity_id(EntityKey::Created(ResourceKind::Class))
                .map(str::to_string),
            parent_id: s(parent_id),
            admission_number: s("STU001"),
            admission_date: s("2024-01-15"),
            ..Default::default()
        },
        patch: Student {
            first_name: s("Jane"),
            last_name: s("Smith"),
            ..Default::default()
        },
    })
}

pub fn teacher_plan(_ctx: &SessionContext) -> Result<ResourcePlan<Teacher>, Failure> {
    Ok(ResourcePlan {
        payload: Teacher {
            first_name: s("Sarah"),
            last_name: s("Johnson"),
            email: s("sarah.johnson@school.edu.ng"),
            phone_number: s("+2348012345683"),
            address: s("456 Abuja Street, Abuja"),
            qualification: s("B.Ed Mathematics"),
            experience: s("5 years"),
            specialization: s("Mathematics"),
            employee_id: s("TCH001"),
            date_of_joining: s("2024-01-01"),
            ..Default::default()
        },
        patch: Teacher {
            specialization: s("Physics"),
            experience: s("6 years"),
            ..Default::default()
        },
    })
}

pub fn class_plan(ctx: &SessionContext) -> Result<ResourcePlan<SchoolClass>, Failure> {
    let teacher_id = ctx.require_entity_id(EntityKey::Created(ResourceKind::Teacher))?;

    Ok(ResourcePlan {
        payload: SchoolClass {
            name: s("JSS 1A"),
            level: s("Junior Secondary 1"),
            section: s("A"),
            capacity: Some(30),
            academic_year: s(ACADEMIC_YEAR),
            class_teacher_id: s(teacher_id),
            ..Default::default()
        },
        patch: SchoolClass {
            capacity: Some(35),
            section: s("B"),
            ..Default::default()
        },
    })
}

pub fn subject_plan(_ctx: &SessionContext) -> Result<ResourcePlan<Subject>, Failure> {
    Ok(ResourcePlan {
        payload: Subject {
            name: s("Mathematics"),
            code: s("MATH101"),
            description: s("Basic Mathematics for Junior Secondary"),
            credits: Some(3),
            level: s("Junior Secondary"),
            ..Default::default()
        },
        patch: Subject {
            description: s("Core Mathematics for Junior Secondary"),
            credits: Some(4),
            ..Default::default()
        },
    })
}

pub fn assignment_plan(ctx: &SessionContext) -> Result<ResourcePlan<TeacherAssignment>, Failure> {
    let teacher_id = ctx.require_entity_id(EntityKey::Created(ResourceKind::Teacher))?;
    let subject_id = ctx.require_entity_id(EntityKey::Created(ResourceKind::Subject))?;
    let class_id = ctx.require_entity_id(EntityKey::Created(ResourceKind::Class))?;

    let subject_name = ctx
        .entity_as::<Subject>(EntityKey::Created(ResourceKind::Subject))
        .and_then(|subject| subject.name)
        .unwrap_or_else(|| "Mathematics".to_string());
    let class_name = ctx
        .entity_as::<SchoolClass>(EntityKey::Created(ResourceKind::Class))
        .and_then(|class| class.name)
        .unwrap_or_else(|| "JSS 1A".to_string());

    Ok(ResourcePlan {
        payload: TeacherAssignment {
            teacher_id: s(teacher_id),
            subject_id: s(subject_id),
            class_id: s(class_id),
            subject_name: Some(subject_name),
            class_name: Some(class_name),
            academic_year: s(ACADEMIC_YEAR),
            ..Default::default()
        },
        patch: TeacherAssignment {
            academic_year: s("2025/2026"),
            ..Default::default()
        },
    })
}
