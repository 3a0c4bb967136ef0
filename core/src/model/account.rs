// bazaar/src/model/account.rs

use super::{field_matches, Entity, OwnerRef, Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
  pub id: Option<Uuid>,
  pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub email: Option<String>,
  pub password_hash: Option<String>,
}

impl User {
  pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email: email.into(),
      password_hash: password_hash.into(),
      created_at: now,
      updated_at: now,
    }
  }
}

impl Entity for User {
  const KIND: ResourceKind = ResourceKind::User;
  type Filter = UserFilter;
  type Patch = UserPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> UserFilter {
    UserFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &UserFilter) -> bool {
    field_matches(&filter.id, &self.id) && field_matches(&filter.email, &self.email)
  }

  fn apply(&mut self, patch: UserPatch) {
    if let Some(email) = patch.email {
      self.email = email;
    }
    if let Some(hash) = patch.password_hash {
      self.password_hash = hash;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::User(self.id)
  }

  fn into_resource(self) -> Resource {
    Resource::User(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::User(e) => Some(e),
      _ => None,
    }
  }
}

// --- Notification ---

/// A message addressed to one user. Delivery is someone else's job; this is
/// only the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
  pub id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub message: String,
  pub read: bool,
  pub metadata: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
  pub id: Option<Uuid>,
  pub user_id: Option<Uuid>,
  pub read: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationPatch {
  pub read: Option<bool>,
}

impl Notification {
  pub fn new(user_id: Uuid, title: impl Into<String>, message: impl Into<String>, metadata: serde_json::Value) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      title: title.into(),
      message: message.into(),
      read: false,
      metadata,
      created_at: now,
      updated_at: now,
    }
  }
}

impl Entity for Notification {
  const KIND: ResourceKind = ResourceKind::Notification;
  type Filter = NotificationFilter;
  type Patch = NotificationPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> NotificationFilter {
    NotificationFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &NotificationFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.user_id, &self.user_id)
      && field_matches(&filter.read, &self.read)
  }

  fn apply(&mut self, patch: NotificationPatch) {
    if let Some(read) = patch.read {
      self.read = read;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::User(self.user_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Notification(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Notification(e) => Some(e),
      _ => None,
    }
  }
}
