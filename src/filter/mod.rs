//! Store-agnostic selection predicates.
//!
//! A [`Filter`] is an ordered list of field clauses joined by AND. It renders
//! to a bson filter document for MongoDB and can evaluate itself against a
//! document for the in-memory backend, with the same semantics in both places.

use bson::{Bson, Document};

use crate::database::document::ID_KEY;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `$eq` - a null value also matches a missing field
    Eq(Bson),
    /// `$ne` - also matches a missing field
    Ne(Bson),
    /// `$in` - any of the listed values
    In(Vec<Bson>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single document by its store key
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_KEY, Bson::String(id.into()))
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.clauses.push((field.into(), Condition::Ne(value.into())));
        self
    }

    pub fn any_of<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.into(), Condition::In(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    /// Render as a MongoDB filter document
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, condition) in &self.clauses {
            let rendered = match condition {
                Condition::Eq(value) => value.clone(),
                Condition::Ne(value) => {
                    let mut op = Document::new();
                    op.insert("$ne", value.clone());
                    Bson::Document(op)
                }
                Condition::In(values) => {
                    let mut op = Document::new();
                    op.insert("$in", Bson::Array(values.clone()));
                    Bson::Document(op)
                }
            };
            doc.insert(field.clone(), rendered);
        }
        doc
    }

    /// Evaluate against a document using MongoDB equality rules
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, condition)| {
            let actual = doc.get(field);
            match condition {
                Condition::Eq(expected) => value_matches(actual, expected),
                Condition::Ne(excluded) => !value_matches(actual, excluded),
                Condition::In(values) => values.iter().any(|v| value_matches(actual, v)),
            }
        })
    }
}

fn value_matches(actual: Option<&Bson>, expected: &Bson) -> bool {
    match (actual, expected) {
        (None, Bson::Null) | (Some(Bson::Null), Bson::Null) => true,
        (None, _) => false,
        (Some(actual), expected) if actual == expected => true,
        // Scalar against an array field matches any element
        (Some(Bson::Array(items)), expected) => items.iter().any(|item| item == expected),
        _ => false,
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.to_document()
    }
}
