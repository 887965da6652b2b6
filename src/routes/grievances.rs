use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{Grievance, GrievanceStatus, NewGrievance, Role, User};
use crate::schema::{grievances, users};
use crate::state::AppState;
use crate::utils::json::{classify_nullable, classify_string_list, ListValue, NullableValue};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub mobile_number: String,
    pub role: Role,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            mobile_number: user.mobile_number,
            role: Role::parse(&user.role),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrievanceResponse {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub status: GrievanceStatus,
    pub is_read_by_authority: bool,
    pub date_raised: NaiveDate,
    pub rejection_reason: Option<String>,
    pub resolution_note: Option<String>,
    pub admin_images: Vec<String>,
    pub user_images: Vec<String>,
    pub user: Option<UserSummary>,
}

impl GrievanceResponse {
    fn from_parts(grievance: Grievance, owner: Option<User>) -> Self {
        Self {
            id: grievance.id,
            category: grievance.category,
            description: grievance.description,
            status: GrievanceStatus::parse(&grievance.status),
            is_read_by_authority: grievance.is_read_by_authority,
            date_raised: grievance.date_raised,
            rejection_reason: grievance.rejection_reason,
            resolution_note: grievance.resolution_note,
            admin_images: grievance.admin_images,
            user_images: grievance.user_images,
            user: owner.map(UserSummary::from),
        }
    }
}

pub async fn list_grievances(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<GrievanceResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(Grievance, Option<User>)> = grievances::table
        .left_join(users::table)
        .order(grievances::id.asc())
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(|(grievance, owner)| GrievanceResponse::from_parts(grievance, owner))
        .collect();

    Ok(Json(response))
}

pub async fn list_user_grievances(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<GrievanceResponse>>> {
    let mut conn = state.db()?;

    // Unknown user ids yield an empty list rather than an error.
    let rows: Vec<(Grievance, Option<User>)> = grievances::table
        .left_join(users::table)
        .filter(grievances::user_id.eq(user_id))
        .order(grievances::id.asc())
        .load(&mut conn)?;

    let response = rows
        .into_iter()
        .map(|(grievance, owner)| GrievanceResponse::from_parts(grievance, owner))
        .collect();

    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGrievanceRequest {
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub admin_images: Vec<String>,
    #[serde(default)]
    pub user_images: Vec<String>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

pub async fn add_grievance(
    State(state): State<AppState>,
    Json(payload): Json<CreateGrievanceRequest>,
) -> AppResult<Json<GrievanceResponse>> {
    let mut conn = state.db()?;

    let owner: Option<User> = match payload.user.as_ref().and_then(|user| user.id) {
        Some(user_id) => {
            let found = users::table.find(user_id).first(&mut conn).optional()?;
            if found.is_none() {
                tracing::warn!(user_id, "grievance references unknown user, storing without owner");
            }
            found
        }
        None => None,
    };

    let status = match payload.status.as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => GrievanceStatus::Pending.as_str().to_string(),
    };

    let new_grievance = NewGrievance {
        category: payload.category,
        description: payload.description,
        status,
        is_read_by_authority: false,
        date_raised: Utc::now().date_naive(),
        admin_images: payload.admin_images,
        user_images: payload.user_images,
        user_id: owner.as_ref().map(|user| user.id),
    };

    let created: Grievance = diesel::insert_into(grievances::table)
        .values(&new_grievance)
        .get_result(&mut conn)?;

    Ok(Json(GrievanceResponse::from_parts(created, owner)))
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = grievances)]
struct GrievanceChangeset {
    category: Option<String>,
    description: Option<String>,
    status: Option<String>,
    rejection_reason: Option<Option<String>>,
    resolution_note: Option<Option<String>>,
    admin_images: Option<Vec<String>>,
    user_images: Option<Vec<String>>,
}

pub async fn update_grievance(
    State(state): State<AppState>,
    Path(grievance_id): Path<i64>,
    Json(body): Json<Value>,
) -> AppResult<Json<GrievanceResponse>> {
    let mut conn = state.db()?;

    // NotFound maps straight to a 404; no partial state is written.
    let existing: Grievance = grievances::table.find(grievance_id).first(&mut conn)?;

    let mut changeset = GrievanceChangeset::default();
    let mut changed = false;

    if let Some(value) = required_text(&body, "category")? {
        changeset.category = Some(value);
        changed = true;
    }
    if let Some(value) = required_text(&body, "description")? {
        changeset.description = Some(value);
        changed = true;
    }
    if let Some(value) = required_text(&body, "status")? {
        changeset.status = Some(value);
        changed = true;
    }
    if let Some(change) = optional_text(&body, "rejectionReason")? {
        changeset.rejection_reason = Some(change);
        changed = true;
    }
    if let Some(change) = optional_text(&body, "resolutionNote")? {
        changeset.resolution_note = Some(change);
        changed = true;
    }
    if let Some(appended) = appended_images(&body, "adminImages", &existing.admin_images)? {
        changeset.admin_images = Some(appended);
        changed = true;
    }
    if let Some(appended) = appended_images(&body, "userImages", &existing.user_images)? {
        changeset.user_images = Some(appended);
        changed = true;
    }

    if !changed {
        let owner = load_owner(&mut conn, existing.user_id)?;
        return Ok(Json(GrievanceResponse::from_parts(existing, owner)));
    }

    diesel::update(grievances::table.find(grievance_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let updated: Grievance = grievances::table.find(grievance_id).first(&mut conn)?;
    let owner = load_owner(&mut conn, updated.user_id)?;

    Ok(Json(GrievanceResponse::from_parts(updated, owner)))
}

/// Field that may be overwritten but never cleared: omitted keeps the
/// stored value, null and empty strings are rejected.
fn required_text(body: &Value, key: &str) -> AppResult<Option<String>> {
    match classify_nullable(body.get(key)).map_err(AppError::bad_request)? {
        NullableValue::Omitted => Ok(None),
        NullableValue::Null => Err(AppError::bad_request(format!("{key} cannot be null"))),
        NullableValue::String(value) => {
            if value.trim().is_empty() {
                return Err(AppError::bad_request(format!("{key} must not be empty")));
            }
            Ok(Some(value))
        }
    }
}

/// Field that may be overwritten or explicitly cleared with null.
fn optional_text(body: &Value, key: &str) -> AppResult<Option<Option<String>>> {
    match classify_nullable(body.get(key)).map_err(AppError::bad_request)? {
        NullableValue::Omitted => Ok(None),
        NullableValue::Null => Ok(Some(None)),
        NullableValue::String(value) => Ok(Some(Some(value))),
    }
}

/// Image lists are append-only: supplied elements are added after the
/// stored ones in request order. An empty array is a no-op.
fn appended_images(
    body: &Value,
    key: &str,
    existing: &[String],
) -> AppResult<Option<Vec<String>>> {
    match classify_string_list(body.get(key)).map_err(AppError::bad_request)? {
        ListValue::Omitted => Ok(None),
        ListValue::Null => Err(AppError::bad_request(format!("{key} cannot be null"))),
        ListValue::Items(items) if items.is_empty() => Ok(None),
        ListValue::Items(items) => {
            let mut merged = existing.to_vec();
            merged.extend(items);
            Ok(Some(merged))
        }
    }
}

fn load_owner(
    conn: &mut PgConnection,
    user_id: Option<i64>,
) -> Result<Option<User>, diesel::result::Error> {
    match user_id {
        Some(id) => users::table.find(id).first(conn).optional(),
        None => Ok(None),
    }
}
