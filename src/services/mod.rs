pub mod course_service;
pub mod record_service;

pub use course_service::{CourseError, CourseService};
pub use record_service::RecordService;
