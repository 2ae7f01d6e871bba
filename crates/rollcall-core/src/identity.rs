//! Identity: a person known to the directory.
//!
//! Identities are created by self-registration or admin enrollment and are
//! never updated or deleted afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier assigned at creation. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// A fresh identifier: `u` followed by a random UUID in simple form.
  pub fn generate() -> Self { Self(format!("u{}", Uuid::new_v4().simple())) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for IdentityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for IdentityId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Student,
}

/// A registered admin or student.
///
/// `student_id` and `department` are only ever set on students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub id:         IdentityId,
  pub name:       String,
  pub email:      String,
  pub role:       Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub student_id: Option<String>,
}

impl Identity {
  pub fn is_student(&self) -> bool { self.role == Role::Student }
}

/// Input to [`crate::directory::AttendanceDirectory::register`].
#[derive(Debug, Clone)]
pub struct Registration {
  pub name:        String,
  pub email:       String,
  pub role:        Role,
  /// Required, and checked, only when `role` is [`Role::Admin`].
  pub secret_code: Option<String>,
}

/// Input to [`crate::directory::AttendanceDirectory::add_student`].
#[derive(Debug, Clone)]
pub struct Enrollment {
  pub name:       String,
  pub email:      String,
  pub student_id: String,
  pub department: String,
  pub face_image: crate::face::FaceImage,
}

/// Generated avatar for identities that registered without a photo.
pub(crate) fn placeholder_avatar(name: &str) -> String {
  format!(
    "https://ui-avatars.com/api/?name={}&background=random",
    encode_component(name)
  )
}

/// Percent-encode everything outside the URI "unreserved" set.
fn encode_component(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for b in s.bytes() {
    match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
        out.push(b as char)
      }
      _ => out.push_str(&format!("%{b:02X}")),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn avatar_name_is_percent_encoded() {
    assert_eq!(
      placeholder_avatar("Zoë O'Neil"),
      "https://ui-avatars.com/api/?name=Zo%C3%AB%20O%27Neil&background=random"
    );
  }

  #[test]
  fn student_fields_are_omitted_for_admins() {
    let admin = Identity {
      id:         IdentityId::new("u1"),
      name:       "Admin User".into(),
      email:      "admin@faceauth.com".into(),
      role:       Role::Admin,
      avatar_url: None,
      department: None,
      student_id: None,
    };
    let json = serde_json::to_value(&admin).unwrap();
    assert_eq!(json["role"], "ADMIN");
    assert!(json.get("studentId").is_none());
    assert!(json.get("avatarUrl").is_none());
  }

  #[test]
  fn generated_ids_are_distinct() {
    assert_ne!(IdentityId::generate(), IdentityId::generate());
  }
}
