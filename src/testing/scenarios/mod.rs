//! Scenario executors, one module per feature area

mod access;
mod attendance;
mod auth;
mod crud;
mod dashboard;
mod notifications;
mod parent;

pub use access::AccessControl;
pub use attendance::Attendance;
pub use auth::{Identity, Login, Registration};
pub use crud::Crud;
pub use dashboard::Dashboard;
pub use notifications::Notifications;
pub use parent::ParentPortal;
