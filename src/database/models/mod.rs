pub mod content;
pub mod course;
pub mod lesson;
pub mod user;

pub use content::Content;
pub use course::Course;
pub use lesson::Lesson;
pub use user::{Bio, Enrollment, Role, User};
