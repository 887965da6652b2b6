use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    auth::password,
    error::{AppError, AppResult},
    models::{NewUser, Role, User},
    routes::grievances::UserSummary,
    schema::users::dsl,
    state::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserSummary>)> {
    let mut conn = state.db()?;

    let duplicate: Option<User> = dsl::users
        .filter(dsl::email.eq(&payload.email))
        .first(&mut conn)
        .optional()?;
    if duplicate.is_some() {
        return Err(AppError::bad_request("email already registered"));
    }

    let new_user = NewUser {
        email: payload.email,
        password_hash: password::hash_password(&payload.password)?,
        role: Role::User.as_str().to_string(),
        full_name: payload.full_name,
        mobile_number: payload.mobile_number,
    };

    let user: User = diesel::insert_into(dsl::users)
        .values(&new_user)
        .get_result(&mut conn)?;

    Ok((StatusCode::CREATED, Json(UserSummary::from(user))))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i64,
    pub role: Role,
    pub full_name: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut conn = state.db()?;

    let user: User = dsl::users
        .filter(dsl::email.eq(&payload.email))
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::unauthorized)?;

    let valid = password::verify_password(&payload.password, &user.password_hash)
        .map_err(|_| AppError::unauthorized())?;
    if !valid {
        return Err(AppError::unauthorized());
    }

    Ok(Json(LoginResponse {
        user_id: user.id,
        role: Role::parse(&user.role),
        full_name: user.full_name,
    }))
}
