//! # lectsave
//!
//! Resumable capture of learning-portal lectures into per-course PDFs.
//!
//! The library logs into a portal, walks the enrolled courses and their
//! lecture pages, renders each lecture to a PDF file and merges every
//! course into a single document.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "chrome")]
//! # fn main() -> lectsave::Result<()> {
//! use lectsave::browser::{ChromeDriver, ChromeOptions};
//! use lectsave::{Credentials, HarvestOptions, Harvester, Portal, PortalConfig, ResumeSpec};
//!
//! let driver = ChromeDriver::launch(&ChromeOptions::default().with_headless(false))?;
//! let mut harvester = Harvester::new(driver, Portal::new(PortalConfig::default()), HarvestOptions::new());
//!
//! harvester.login(&Credentials::new("student@example.com", "secret"))?;
//! let report = harvester.run(&ResumeSpec::new("Информатика", 6)?)?;
//! println!("{:?}", report.outcome());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "chrome"))]
//! # fn main() {}
//! ```
//!
//! ## Features
//!
//! - **Resume point**: start at a course-name fragment and lecture number
//! - **Idempotent capture**: files that already exist are never re-rendered
//! - **Bounded retries**: fixed attempts and backoff per lecture
//! - **Deterministic merge**: one `{course}_ALL.pdf` per course, in lecture order
//! - **Pluggable browser**: any [`browser::PageDriver`]; Chrome via the `chrome` feature

pub mod browser;
pub mod capture;
pub mod detect;
pub mod error;
pub mod layout;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod portal;
pub mod resume;
pub mod traverse;

// Re-export commonly used types
pub use browser::{Extract, PageDriver, PaperFormat, PdfOptions};
pub use capture::{capture, CaptureOptions, CaptureOutcome};
pub use error::{Error, Result};
pub use layout::OutputLayout;
pub use merge::{merge, MergeOutcome};
pub use model::{CourseRef, LectureRef, ResumeSpec, RunState};
pub use normalize::{normalize, sanitize_file_stem, TitleNormalizer};
pub use portal::{Credentials, Portal, PortalConfig, Selectors, Timeouts};
pub use resume::{CourseDecision, LectureDecision, ResumeMatcher, ScanState};
pub use traverse::{
    CourseStatus, CourseSummary, EventLog, HarvestOptions, Harvester, NoopObserver, RunOutcome,
    RunReport, RunTotals, TraversalEvent, TraversalObserver,
};

use std::path::Path;

/// Merge lecture files of a course that are already on disk.
///
/// Looks up `{course}_lecture1.pdf`, `{course}_lecture2.pdf`, ... up to
/// `lecture_count` in `layout`, keeps those that exist and merges them
/// into `{course}_ALL.pdf`.
///
/// # Example
///
/// ```no_run
/// use lectsave::{remerge_course, OutputLayout};
///
/// let outcome = remerge_course(&OutputLayout::new("pdf"), "Информатика", 12);
/// println!("{:?}", outcome);
/// ```
pub fn remerge_course(layout: &OutputLayout, course_title: &str, lecture_count: usize) -> MergeOutcome {
    let candidates: Vec<_> = (1..=lecture_count)
        .map(|position| layout.lecture_path(course_title, position))
        .collect();
    let inputs = merge::existing_inputs(&candidates);
    merge(&inputs, &layout.merged_path(course_title))
}

/// Merge arbitrary PDF files into `output`, in the given order.
pub fn merge_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> MergeOutcome {
    merge(inputs, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_options_builder() {
        let options = HarvestOptions::new()
            .with_output_dir("out")
            .with_capture(CaptureOptions::new().with_max_attempts(5))
            .with_normalizer(TitleNormalizer::without_prefixes());

        assert_eq!(options.layout.dir(), Path::new("out"));
        assert_eq!(options.capture.max_attempts, 5);
        assert!(options.normalizer.prefixes().is_empty());
    }

    #[test]
    fn test_harvest_options_defaults() {
        let options = HarvestOptions::default();
        assert_eq!(options.layout.dir(), Path::new(layout::DEFAULT_OUTPUT_DIR));
        assert_eq!(options.capture.max_attempts, 3);
    }

    #[test]
    fn test_remerge_course_without_files() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(tmp.path());
        let outcome = remerge_course(&layout, "Информатика", 5);
        assert_eq!(outcome, MergeOutcome::Empty);
        assert!(!layout.merged_path("Информатика").exists());
    }

    #[test]
    fn test_fatal_errors_reexported() {
        assert!(Error::NoCourses("x".into()).is_fatal());
    }
}
