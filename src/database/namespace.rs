use std::fmt;

use crate::database::error::StoreError;

/// Database holding every record that is not scoped to a course.
pub const SYSTEM_DATABASE: &str = "praromvik";

/// Longest database name MongoDB accepts.
const MAX_DATABASE_NAME_LEN: usize = 63;

/// A (database, collection) pair identifying a storage partition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Every kind of record the service knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Course,
    Lesson,
    Content,
    User,
}

impl RecordKind {
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Course => "courses",
            RecordKind::Lesson => "lessons",
            RecordKind::Content => "contents",
            RecordKind::User => "users",
        }
    }

    /// Course-scoped kinds live in a database named after the owning course
    pub fn requires_context(&self) -> bool {
        matches!(self, RecordKind::Lesson | RecordKind::Content)
    }

    /// Resolve the namespace for this kind.
    ///
    /// Context-free kinds ignore `context` and always land in [`SYSTEM_DATABASE`].
    /// Context-bound kinds need a non-empty course reference that is usable as a
    /// database name.
    pub fn resolve(&self, context: Option<&str>) -> Result<Namespace, StoreError> {
        if !self.requires_context() {
            return Ok(Namespace::new(SYSTEM_DATABASE, self.collection()));
        }

        match context {
            Some(key) if !key.is_empty() => {
                validate_database_name(key)?;
                Ok(Namespace::new(key, self.collection()))
            }
            _ => Err(StoreError::MissingContext(*self)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Course => "course",
            RecordKind::Lesson => "lesson",
            RecordKind::Content => "content",
            RecordKind::User => "user",
        };
        f.write_str(name)
    }
}

/// Databases the server or this service already own
const RESERVED_DATABASES: [&str; 4] = ["admin", "local", "config", SYSTEM_DATABASE];

/// Reject keys MongoDB would refuse (or silently mangle) as a database name.
///
/// Names are lowercase only: the server treats databases differing only in
/// case as the same name and refuses to create the second one.
pub fn validate_database_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name.len() > MAX_DATABASE_NAME_LEN {
        return Err(StoreError::InvalidNamespace(name.to_string()));
    }
    let forbidden = ['/', '\\', '.', '"', '$', ' ', '\0'];
    if name
        .chars()
        .any(|c| forbidden.contains(&c) || c.is_ascii_uppercase())
    {
        return Err(StoreError::InvalidNamespace(name.to_string()));
    }
    if RESERVED_DATABASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
    {
        return Err(StoreError::InvalidNamespace(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_kinds_use_system_database() {
        let ns = RecordKind::Course.resolve(None).unwrap();
        assert_eq!(ns, Namespace::new("praromvik", "courses"));

        // Context is irrelevant for global kinds
        let ns = RecordKind::User.resolve(Some("cs101")).unwrap();
        assert_eq!(ns, Namespace::new("praromvik", "users"));
    }

    #[test]
    fn course_scoped_kinds_use_course_database() {
        let ns = RecordKind::Lesson.resolve(Some("cs101")).unwrap();
        assert_eq!(ns, Namespace::new("cs101", "lessons"));

        let ns = RecordKind::Content.resolve(Some("cs101")).unwrap();
        assert_eq!(ns, Namespace::new("cs101", "contents"));
    }

    #[test]
    fn missing_context_is_rejected() {
        assert!(matches!(
            RecordKind::Lesson.resolve(None),
            Err(StoreError::MissingContext(RecordKind::Lesson))
        ));
        assert!(matches!(
            RecordKind::Content.resolve(Some("")),
            Err(StoreError::MissingContext(RecordKind::Content))
        ));
    }

    #[test]
    fn validates_database_names() {
        assert!(validate_database_name("cs101").is_ok());
        assert!(validate_database_name("intro-to_rust").is_ok());
        assert!(validate_database_name("bad.name").is_err());
        assert!(validate_database_name("bad name").is_err());
        assert!(validate_database_name("$admin").is_err());
        assert!(validate_database_name(&"x".repeat(64)).is_err());
        assert!(validate_database_name("Rust101").is_err());
        for reserved in ["admin", "local", "config", "praromvik"] {
            assert!(matches!(
                validate_database_name(reserved),
                Err(StoreError::InvalidNamespace(_))
            ));
        }
        assert!(matches!(
            RecordKind::Lesson.resolve(Some("admin")),
            Err(StoreError::InvalidNamespace(_))
        ));
        assert!(matches!(
            RecordKind::Lesson.resolve(Some("a/b")),
            Err(StoreError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn displays_as_dotted_pair() {
        assert_eq!(Namespace::new("cs101", "lessons").to_string(), "cs101.lessons");
    }
}
