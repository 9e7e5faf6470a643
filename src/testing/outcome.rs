//! Test outcomes

use colored::Colorize;

use crate::common::Failure;

/// Result of one logical assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub detail: Option<String>,
}

impl TestOutcome {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            detail: None,
        }
    }

    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            detail,
        }
    }

    pub fn from_failure(name: impl Into<String>, failure: &Failure) -> Self {
        Self::fail(name, failure.to_string(), failure.detail())
    }

    /// Entry for the detailed error list
    pub fn error_line(&self) -> String {
        format!(
            "{}: {} - {}",
            self.name,
            self.message,
            self.detail.as_deref().unwrap_or("")
        )
    }

    /// One line of the progress log
    pub fn print(&self) {
        if self.passed {
            println!("  {} {}: {}", "✓".green(), self.name.bold(), self.message);
        } else {
            match &self.detail {
                Some(detail) => println!(
                    "  {} {}: {} | Details: {}",
                    "✗".red(),
                    self.name.bold(),
                    self.message.red(),
                    detail.dimmed()
                ),
                None => println!("  {} {}: {}", "✗".red(), self.name.bold(), self.message.red()),
            }
        }
    }
}
