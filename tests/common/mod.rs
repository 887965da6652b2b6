use std::env;

use anyhow::{anyhow, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use grievance_backend::auth::password;
use grievance_backend::config::AppConfig;
use grievance_backend::db::{self, PgPool};
use grievance_backend::models::{Grievance, NewGrievance, NewUser};
use grievance_backend::routes;
use grievance_backend::state::AppState;
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let database_url = env::var("TEST_DATABASE_URL")
            .context("TEST_DATABASE_URL must be set for integration tests")?;

        let config = AppConfig {
            database_url: database_url.clone(),
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
        };

        let pool = db::init_pool(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let state = AppState::new(pool, config);
        let router = routes::create_router(state.clone());

        Ok(Self { state, router })
    }

    #[allow(dead_code)]
    pub async fn insert_user(&self, email: &str, plain_password: &str, role: &str) -> Result<i64> {
        let email = email.to_string();
        let plain_password = plain_password.to_string();
        let role = role.to_string();
        self.with_conn(move |conn| {
            let user = NewUser {
                email,
                password_hash: password::hash_password(&plain_password)?,
                role,
                full_name: "Test User".to_string(),
                mobile_number: "1234567890".to_string(),
            };
            let id = diesel::insert_into(grievance_backend::schema::users::table)
                .values(&user)
                .returning(grievance_backend::schema::users::id)
                .get_result::<i64>(conn)
                .context("failed to insert user")?;
            Ok(id)
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn insert_grievance(
        &self,
        category: &str,
        description: &str,
        status: &str,
        user_id: Option<i64>,
    ) -> Result<i64> {
        let new_grievance = NewGrievance {
            category: category.to_string(),
            description: description.to_string(),
            status: status.to_string(),
            is_read_by_authority: false,
            date_raised: chrono::Utc::now().date_naive(),
            admin_images: Vec::new(),
            user_images: Vec::new(),
            user_id,
        };
        self.with_conn(move |conn| {
            let id = diesel::insert_into(grievance_backend::schema::grievances::table)
                .values(&new_grievance)
                .returning(grievance_backend::schema::grievances::id)
                .get_result::<i64>(conn)
                .context("failed to insert grievance")?;
            Ok(id)
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn load_grievance(&self, grievance_id: i64) -> Result<Grievance> {
        self.with_conn(move |conn| {
            grievance_backend::schema::grievances::table
                .find(grievance_id)
                .first(conn)
                .context("failed to load grievance")
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn count_users_with_email(&self, email: &str) -> Result<i64> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            use grievance_backend::schema::users::dsl;
            dsl::users
                .filter(dsl::email.eq(&email))
                .count()
                .get_result(conn)
                .context("failed to count users")
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.request_json(Method::POST, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.request_json(Method::PUT, path, payload).await
    }

    #[allow(dead_code)]
    async fn request_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
            f(&mut conn)
        })
        .await
        .context("connection task panicked")?
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

#[allow(dead_code)]
pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow!("failed to run migrations: {err}"))?;
        truncate_all(&mut conn)?;
        Ok(())
    })
    .await
    .context("migration task panicked")?
}

fn truncate_all(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute("TRUNCATE TABLE grievances, users RESTART IDENTITY CASCADE;")
        .context("failed to truncate tables")?;
    Ok(())
}
