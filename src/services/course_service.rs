use chrono::Utc;
use tracing::{error, info};

use crate::database::document::Document;
use crate::database::error::StoreError;
use crate::database::models::{Content, Course, Lesson};
use crate::database::namespace::{validate_database_name, RecordKind};
use crate::database::store::SyncOp;
use crate::services::record_service::RecordService;

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The child write landed but the parent's membership list did not follow
    #[error("{child} was written but {action} on {parent} failed: {source}")]
    PartialSync {
        action: &'static str,
        child: String,
        parent: String,
        #[source]
        source: StoreError,
    },

    #[error("{kind} '{id}' still has {remaining} {field}")]
    NotEmpty {
        kind: RecordKind,
        id: String,
        field: &'static str,
        remaining: usize,
    },
}

/// Course, lesson and content workflows that keep parent membership lists in
/// step with their children.
#[derive(Clone)]
pub struct CourseService {
    records: RecordService,
}

impl CourseService {
    pub fn new(records: RecordService) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &RecordService {
        &self.records
    }

    /// Create a course; its id must also work as a database name
    pub async fn create_course(&self, mut course: Course) -> Result<Course, CourseError> {
        validate_database_name(&course.course_id)?;
        course.lessons.clear();
        course.created_at = Some(Utc::now());

        self.records.validate_name_uniqueness(&course).await?;
        self.records.create(&course).await?;
        Ok(course)
    }

    pub async fn update_course(&self, update: Course) -> Result<Course, CourseError> {
        Ok(self.records.update(update).await?)
    }

    pub async fn delete_course(&self, course_id: &str) -> Result<(), CourseError> {
        let course = self.records.get(&Course::with_id(course_id)).await?;
        if !course.lessons.is_empty() {
            return Err(CourseError::NotEmpty {
                kind: RecordKind::Course,
                id: course.course_id,
                field: Course::LESSONS_FIELD,
                remaining: course.lessons.len(),
            });
        }
        self.records.delete(&course).await?;
        Ok(())
    }

    pub async fn create_lesson(&self, mut lesson: Lesson) -> Result<Lesson, CourseError> {
        let course = self.records.get(&Course::with_id(&lesson.course_ref)).await?;
        lesson.contents.clear();

        self.records.validate_name_uniqueness(&lesson).await?;
        self.records.create(&lesson).await?;

        self.sync_parent(&course, SyncOp::Push, Course::LESSONS_FIELD, &lesson.lesson_id)
            .await?;
        Ok(lesson)
    }

    pub async fn update_lesson(&self, update: Lesson) -> Result<Lesson, CourseError> {
        Ok(self.records.update(update).await?)
    }

    pub async fn delete_lesson(&self, course_ref: &str, lesson_id: &str) -> Result<(), CourseError> {
        let lesson = self.records.get(&Lesson::with_id(course_ref, lesson_id)).await?;
        if !lesson.contents.is_empty() {
            return Err(CourseError::NotEmpty {
                kind: RecordKind::Lesson,
                id: lesson.lesson_id,
                field: Lesson::CONTENTS_FIELD,
                remaining: lesson.contents.len(),
            });
        }
        self.records.delete(&lesson).await?;

        self.sync_parent(
            &Course::with_id(course_ref),
            SyncOp::Pull,
            Course::LESSONS_FIELD,
            lesson_id,
        )
        .await
    }

    pub async fn create_content(&self, content: Content) -> Result<Content, CourseError> {
        let lesson = self
            .records
            .get(&Lesson::with_id(&content.course_ref, &content.lesson_ref))
            .await?;

        self.records.validate_name_uniqueness(&content).await?;
        self.records.create(&content).await?;

        self.sync_parent(&lesson, SyncOp::Push, Lesson::CONTENTS_FIELD, &content.content_id)
            .await?;
        Ok(content)
    }

    pub async fn update_content(&self, update: Content) -> Result<Content, CourseError> {
        Ok(self.records.update(update).await?)
    }

    pub async fn delete_content(&self, course_ref: &str, content_id: &str) -> Result<(), CourseError> {
        let content = self.records.get(&Content::with_id(course_ref, content_id)).await?;
        self.records.delete(&content).await?;

        self.sync_parent(
            &Lesson::with_id(course_ref, &content.lesson_ref),
            SyncOp::Pull,
            Lesson::CONTENTS_FIELD,
            content_id,
        )
        .await
    }

    async fn sync_parent<P: Document>(
        &self,
        parent: &P,
        op: SyncOp,
        field: &'static str,
        child_id: &str,
    ) -> Result<(), CourseError> {
        let action = match op {
            SyncOp::Push => "push",
            SyncOp::Pull => "pull",
        };

        match self.records.sync(parent, op, field, child_id).await {
            Ok(()) => {
                info!("Synced {} '{}': {} '{}' on {}", P::KIND, parent.id(), action, child_id, field);
                Ok(())
            }
            Err(source) => {
                // Child write already committed; leave a trail for reconciliation
                error!(
                    "Partial sync: {} of '{}' on {} '{}' field {} failed: {}",
                    action,
                    child_id,
                    P::KIND,
                    parent.id(),
                    field,
                    source
                );
                Err(CourseError::PartialSync {
                    action,
                    child: child_id.to_string(),
                    parent: format!("{} '{}'", P::KIND, parent.id()),
                    source,
                })
            }
        }
    }
}
