use serde::{Deserialize, Serialize};

use crate::database::document::Document;
use crate::database::namespace::RecordKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lesson {
    pub lesson_id: String,
    /// Owning course; selects the database
    pub course_ref: String,
    pub title: String,
    pub description: String,
    /// Content ids, maintained by content create/delete
    pub contents: Vec<String>,
}

impl Lesson {
    pub const CONTENTS_FIELD: &'static str = "contents";

    pub fn with_id(course_ref: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            course_ref: course_ref.into(),
            ..Default::default()
        }
    }
}

impl Document for Lesson {
    const KIND: RecordKind = RecordKind::Lesson;
    const ID_FIELD: &'static str = "lessonId";

    fn id(&self) -> &str {
        &self.lesson_id
    }

    fn context_key(&self) -> Option<&str> {
        Some(&self.course_ref)
    }
}

crate::merge_fields!(Lesson { title, description });
