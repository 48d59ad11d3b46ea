//! Data model of a harvesting run.
//!
//! Nothing here is persisted. A later run recovers its position only from
//! the files already present in the output directory.

mod course;
mod resume;

pub use course::{CourseRef, LectureRef};
pub use resume::{ResumeSpec, RunState};
