//! PostgreSQL implementation of SessionGateway.
//!
//! Each session is one row in `workshop_sessions`; the aggregate lives in a
//! JSONB column so the document shape can grow without schema changes.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;
use crate::domain::foundation::{SessionId, Timestamp, WorkshopStep};
use crate::domain::workshop::WorkshopData;
use crate::ports::{GatewayError, SessionGateway, WorkshopRecord};

/// PostgreSQL implementation of SessionGateway.
#[derive(Clone)]
pub struct PostgresSessionGateway {
    pool: PgPool,
}

impl PostgresSessionGateway {
    /// Creates a new PostgresSessionGateway.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration and optionally runs migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .max_lifetime(Some(config.max_lifetime()))
            .connect(&config.url)
            .await
            .map_err(|e| GatewayError::transient(format!("Failed to connect to database: {}", e)))?;

        let gateway = Self::new(pool);
        if config.run_migrations {
            gateway.migrate().await?;
        }
        Ok(gateway)
    }

    /// Applies the bundled migrations.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::transient(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl SessionGateway for PostgresSessionGateway {
    async fn load(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, workshop_data, current_step, updated_at
            FROM workshop_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch session", e))?;

        match row {
            Some(row) => row_to_record(row),
            None => Err(GatewayError::NotFound(session_id.clone())),
        }
    }

    async fn create(&self, record: &WorkshopRecord) -> Result<(), GatewayError> {
        sqlx::query(
            r#"
            INSERT INTO workshop_sessions (session_id, workshop_data, current_step, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                workshop_data = EXCLUDED.workshop_data,
                current_step = EXCLUDED.current_step,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(record.session_id.as_str())
        .bind(Json(&record.workshop_data))
        .bind(step_to_i16(record.current_step))
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert session", e))?;

        Ok(())
    }

    async fn save(
        &self,
        session_id: &SessionId,
        data: &WorkshopData,
        step: WorkshopStep,
    ) -> Result<(), GatewayError> {
        let result = sqlx::query(
            r#"
            UPDATE workshop_sessions SET
                workshop_data = $2,
                current_step = $3,
                updated_at = $4
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .bind(Json(data))
        .bind(step_to_i16(step))
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(session_id.clone()));
        }

        Ok(())
    }

    async fn update_step(&self, session_id: &SessionId, step: WorkshopStep) -> Result<(), GatewayError> {
        let result = sqlx::query(
            r#"
            UPDATE workshop_sessions SET
                current_step = $2,
                updated_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_str())
        .bind(step_to_i16(step))
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update session step", e))?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound(session_id.clone()));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn step_to_i16(step: WorkshopStep) -> i16 {
    i16::from(step.number())
}

fn i16_to_step(value: i16) -> Result<WorkshopStep, GatewayError> {
    u8::try_from(value)
        .ok()
        .and_then(|n| WorkshopStep::from_number(n).ok())
        .ok_or_else(|| GatewayError::serialization(format!("Invalid current_step: {}", value)))
}

fn map_sqlx_error(action: &str, error: sqlx::Error) -> GatewayError {
    match error {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            GatewayError::serialization(format!("Failed to {}: {}", action, error))
        }
        other => GatewayError::transient(format!("Failed to {}: {}", action, other)),
    }
}

fn row_to_record(row: PgRow) -> Result<WorkshopRecord, GatewayError> {
    let session_id: String = row
        .try_get("session_id")
        .map_err(|e| map_sqlx_error("get session_id", e))?;

    let Json(workshop_data): Json<WorkshopData> = row
        .try_get("workshop_data")
        .map_err(|e| map_sqlx_error("get workshop_data", e))?;

    let current_step: i16 = row
        .try_get("current_step")
        .map_err(|e| map_sqlx_error("get current_step", e))?;

    let updated_at: chrono::DateTime<chrono::Utc> = row
        .try_get("updated_at")
        .map_err(|e| map_sqlx_error("get updated_at", e))?;

    Ok(WorkshopRecord {
        session_id: SessionId::new(session_id).map_err(GatewayError::serialization)?,
        workshop_data,
        current_step: i16_to_step(current_step)?,
        updated_at: Timestamp::from_datetime(updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_conversion_roundtrips() {
        for step in WorkshopStep::all() {
            assert_eq!(i16_to_step(step_to_i16(*step)).unwrap(), *step);
        }
    }

    #[test]
    fn i16_to_step_rejects_out_of_range() {
        assert!(i16_to_step(0).is_err());
        assert!(i16_to_step(11).is_err());
        assert!(i16_to_step(-3).is_err());
    }

    #[test]
    fn pool_errors_are_transient() {
        let err = map_sqlx_error("fetch session", sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
        assert!(err.to_string().contains("fetch session"));
    }

    #[test]
    fn decode_errors_are_serialization_failures() {
        let err = map_sqlx_error("get workshop_data", sqlx::Error::Decode("bad json".into()));
        assert!(matches!(err, GatewayError::Serialization(_)));
    }
}
