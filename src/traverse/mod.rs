//! Course traversal: resume matching, capture and merge for every course.

mod harvester;
mod observer;
mod report;

pub use harvester::{HarvestOptions, Harvester};
pub use observer::{EventLog, NoopObserver, TraversalEvent, TraversalObserver};
pub use report::{CourseStatus, CourseSummary, RunOutcome, RunReport, RunTotals};
