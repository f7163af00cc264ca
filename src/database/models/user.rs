use serde::{Deserialize, Serialize};

use crate::database::document::Document;
use crate::database::merge::Merge;
use crate::database::namespace::RecordKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    Student,
}

impl Merge for Role {
    fn merge(&mut self, update: Self) {
        *self = update;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Enrollment {
    pub course_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bio {
    pub address: String,
    pub phone: String,
    pub postal_code: u32,
}

crate::merge_fields!(Bio {
    address,
    phone,
    postal_code,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<Role>,
    pub certificates: Vec<String>,
    pub enrolled_courses: Vec<Enrollment>,
    pub participated_exams: Vec<Enrollment>,
    pub bio: Option<Bio>,
}

impl User {
    pub fn with_id(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Default::default()
        }
    }
}

impl Document for User {
    const KIND: RecordKind = RecordKind::User;
    const ID_FIELD: &'static str = "userName";

    fn id(&self) -> &str {
        &self.user_name
    }

    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone()), ("phone", self.phone.clone())]
    }
}

crate::merge_fields!(User {
    email,
    phone,
    role,
    certificates,
    enrolled_courses,
    participated_exams,
    bio,
});
