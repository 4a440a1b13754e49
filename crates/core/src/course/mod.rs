//! Courses with a cover image and a downloadable resource.

mod error;
mod service;
mod types;

pub use error::CourseError;
pub use service::{CourseRepository, CourseService};
pub use types::{Course, CourseDetails, CreateCourseInput, NewCourse, ResourceDownload};
