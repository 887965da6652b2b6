use anyhow::Result;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::auth::password;
use crate::models::{NewUser, Role, User};
use crate::schema::users::dsl;

pub const ADMIN_EMAIL: &str = "sachinadmin@civil.gov";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_FULL_NAME: &str = "System Administrator";
const ADMIN_MOBILE_NUMBER: &str = "0000000000";

/// Guarantees the fixed administrator account exists. Safe to run on every
/// process start; the existence check makes repeated runs a no-op.
pub fn ensure_admin(conn: &mut PgConnection) -> Result<()> {
    let existing: Option<User> = dsl::users
        .filter(dsl::email.eq(ADMIN_EMAIL))
        .first(conn)
        .optional()?;

    if existing.is_some() {
        return Ok(());
    }

    let admin = NewUser {
        email: ADMIN_EMAIL.to_string(),
        password_hash: password::hash_password(ADMIN_PASSWORD)?,
        role: Role::Admin.as_str().to_string(),
        full_name: ADMIN_FULL_NAME.to_string(),
        mobile_number: ADMIN_MOBILE_NUMBER.to_string(),
    };

    diesel::insert_into(dsl::users).values(&admin).execute(conn)?;
    tracing::info!(email = ADMIN_EMAIL, "admin account created");

    Ok(())
}
