//! PostgreSQL 사용자 저장소 구현.
//!
//! 사용자 레코드와 내장 세션 레코드(`refresh_token`, `refresh_expires_at`)를
//! `users` 테이블 하나에 저장합니다.

use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::time::Duration;
use todo_core::{DatabaseConfig, NewUser, Session, StoreError, User, UserId, UserStore};
use tracing::{debug, error, info, instrument};

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 Database 인스턴스를 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DataError::MigrationError(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::QueryError(e.to_string()))?;
        Ok(true)
    }

    /// 이 풀을 공유하는 사용자 저장소를 생성합니다.
    pub fn user_store(&self) -> PgUserStore {
        PgUserStore::new(self.pool.clone())
    }
}

/// DB에서 조회한 사용자 row.
#[derive(Debug, FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    refresh_token: Option<String>,
    refresh_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let session = match (row.refresh_token, row.refresh_expires_at) {
            (Some(token), Some(expires_at)) => Some(Session::new(token, expires_at)),
            _ => None,
        };

        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            session,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, refresh_token, refresh_expires_at, created_at";

/// PostgreSQL 기반 [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_user(&self, query: &str, bind: &str) -> std::result::Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "user lookup failed");
                StoreError::from(DataError::from(e))
            })?;

        row.map(User::from).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: NewUser) -> std::result::Result<User, StoreError> {
        let id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = DataError::from(e);
            if !matches!(err, DataError::DuplicateError(_)) {
                error!(error = %err, "user insert failed");
            }
            StoreError::from(err)
        })?;

        debug!(user_id = %id, "user created");
        Ok(user.into_user(id))
    }

    async fn find_by_email(&self, email: &str) -> std::result::Result<User, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        self.fetch_one_user(&query, email).await
    }

    async fn find_by_id(&self, id: UserId) -> std::result::Result<User, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from(DataError::from(e)))?;

        row.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn find_by_valid_refresh_token(
        &self,
        token: &str,
    ) -> std::result::Result<User, StoreError> {
        // 만료 검사는 DB 시각 기준으로 쿼리 안에서 수행
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE refresh_token = $1 AND refresh_expires_at > NOW()"
        );
        self.fetch_one_user(&query, token).await
    }

    #[instrument(skip(self, session), fields(user_id = %user_id))]
    async fn set_session(
        &self,
        user_id: UserId,
        session: Session,
    ) -> std::result::Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token = $2, refresh_expires_at = $3, last_visit_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "session update failed");
            StoreError::from(DataError::from(e))
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
