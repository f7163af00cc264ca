use serde::{Deserialize, Serialize};

use crate::database::document::Document;
use crate::database::namespace::RecordKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Content {
    pub content_id: String,
    pub course_ref: String,
    /// Lesson whose `contents` list references this item
    pub lesson_ref: String,
    pub name: String,
    /// video, resource, quiz, lab
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    /// Minutes
    pub duration: u32,
}

impl Content {
    pub fn with_id(course_ref: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            course_ref: course_ref.into(),
            ..Default::default()
        }
    }
}

impl Document for Content {
    const KIND: RecordKind = RecordKind::Content;
    const ID_FIELD: &'static str = "contentId";

    fn id(&self) -> &str {
        &self.content_id
    }

    fn context_key(&self) -> Option<&str> {
        Some(&self.course_ref)
    }
}

crate::merge_fields!(Content {
    name,
    kind,
    url,
    duration,
});
