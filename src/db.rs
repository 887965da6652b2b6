use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Sized for a request-serving process; override with
/// DATABASE_MAX_POOL_SIZE when the database allows more connections.
pub const DEFAULT_MAX_POOL_SIZE: u32 = 10;

pub fn init_pool(database_url: &str, max_size: u32) -> anyhow::Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(clamp_pool_size(max_size))
        .connection_timeout(Duration::from_secs(10))
        .build(manager)?;
    Ok(pool)
}

fn clamp_pool_size(requested: u32) -> u32 {
    requested.max(1)
}
