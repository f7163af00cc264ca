use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::document::Document;
use crate::database::namespace::RecordKind;

/// A course; its id doubles as the name of the database holding its lessons
/// and contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub instructors: Vec<String>,
    pub moderators: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Duration in weeks
    pub duration: u32,
    pub enrollment_students: Vec<String>,
    /// Lesson ids, maintained by lesson create/delete
    pub lessons: Vec<String>,
    pub price: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Field holding the lesson membership list
    pub const LESSONS_FIELD: &'static str = "lessons";

    /// Template addressing a stored course by id
    pub fn with_id(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            ..Default::default()
        }
    }
}

impl Document for Course {
    const KIND: RecordKind = RecordKind::Course;
    const ID_FIELD: &'static str = "courseId";

    fn id(&self) -> &str {
        &self.course_id
    }
}

crate::merge_fields!(Course {
    title,
    description,
    instructors,
    moderators,
    start_date,
    end_date,
    duration,
    enrollment_students,
    price,
});
