use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Serialize, Serializer};

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub mobile_number: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = grievances)]
#[diesel(belongs_to(User))]
pub struct Grievance {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub status: String,
    pub is_read_by_authority: bool,
    pub date_raised: NaiveDate,
    pub rejection_reason: Option<String>,
    pub resolution_note: Option<String>,
    pub admin_images: Vec<String>,
    pub user_images: Vec<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = grievances)]
pub struct NewGrievance {
    pub category: String,
    pub description: String,
    pub status: String,
    pub is_read_by_authority: bool,
    pub date_raised: NaiveDate,
    pub admin_images: Vec<String>,
    pub user_images: Vec<String>,
    pub user_id: Option<i64>,
}

/// Grievance lifecycle status. Stored rows may carry values written by
/// older deployments; those round-trip through `Legacy` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrievanceStatus {
    Pending,
    InProgress,
    Resolved,
    Legacy(String),
}

impl GrievanceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => GrievanceStatus::Pending,
            "In Progress" => GrievanceStatus::InProgress,
            "Resolved" => GrievanceStatus::Resolved,
            other => GrievanceStatus::Legacy(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GrievanceStatus::Pending => "Pending",
            GrievanceStatus::InProgress => "In Progress",
            GrievanceStatus::Resolved => "Resolved",
            GrievanceStatus::Legacy(raw) => raw,
        }
    }
}

impl Serialize for GrievanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Account role. `USER` is the implicit default for self-registered
/// accounts; anything else already in storage surfaces as `Legacy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    Legacy(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ADMIN" => Role::Admin,
            "USER" => Role::User,
            other => Role::Legacy(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Legacy(raw) => raw,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
