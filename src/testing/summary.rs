//! Result aggregation and the final report

use colored::Colorize;

use super::outcome::TestOutcome;

/// Counts and failure messages folded from the outcome log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[TestOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            if outcome.passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
                summary.errors.push(outcome.error_line());
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// Percentage of passed outcomes, `None` when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        if self.total() == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total() as f64 * 100.0)
        }
    }

    /// 0 only when every outcome passed
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }

    pub fn print(&self) {
        let rule = "=".repeat(80);
        println!("\n{}", rule);
        println!("{}", "FINAL TEST RESULTS".bold());
        println!("{}", rule);
        println!("{} Passed: {}", "✓".green(), self.passed);
        println!("{} Failed: {}", "✗".red(), self.failed);
        match self.success_rate() {
            Some(rate) => println!("Success Rate: {:.1}%", rate),
            None => println!("Success Rate: n/a"),
        }

        if !self.errors.is_empty() {
            println!("\n{}", "DETAILED ERROR SUMMARY:".red().bold());
            for (i, error) in self.errors.iter().enumerate() {
                println!("{}. {}", i + 1, error);
            }
        }
    }
}
