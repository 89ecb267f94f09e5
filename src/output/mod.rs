//! Output file writing and run reporting

use std::path::PathBuf;

use serde::Serialize;

pub mod writer;

pub use writer::{render_csv, TimelineWriter, CSV_HEADER};

/// Outcome of one `analyze` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Timings files written, in video order
    pub written: Vec<PathBuf>,
    /// Videos skipped under the lenient policy, with the reason
    pub skipped: Vec<SkippedVideo>,
}

/// A video that produced no output
#[derive(Debug, Clone, Serialize)]
pub struct SkippedVideo {
    pub path: PathBuf,
    pub reason: String,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.skipped.is_empty() {
            format!("{} timings files written", self.written.len())
        } else {
            format!(
                "{} timings files written, {} videos skipped",
                self.written.len(),
                self.skipped.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut report = RunReport {
            written: vec![PathBuf::from("timings-a.csv")],
            skipped: Vec::new(),
        };
        assert!(report.is_complete());
        assert_eq!(report.summary(), "1 timings files written");

        report.skipped.push(SkippedVideo {
            path: PathBuf::from("b.mp4"),
            reason: "Unreadable media".to_string(),
        });
        assert!(!report.is_complete());
        assert_eq!(report.summary(), "1 timings files written, 1 videos skipped");
    }
}
