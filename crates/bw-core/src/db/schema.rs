//! Schema bootstrap.
//!
//! Tables are created idempotently at startup. Statements run one at a time
//! so a failure reports which piece of the schema broke.

use tracing::info;

use super::error::DbError;
use super::pool::DbPool;

pub mod sql {
    pub const CREATE_STAFF_USERS: &str = "
        CREATE TABLE IF NOT EXISTS staff_users (
            id BIGSERIAL PRIMARY KEY,
            email TEXT,
            name TEXT,
            role TEXT NOT NULL DEFAULT 'staff',
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )";

    pub const CREATE_SECURITY_TEAM_MEMBERS: &str = "
        CREATE TABLE IF NOT EXISTS security_team_members (
            id BIGSERIAL PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT,
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )";

    pub const CREATE_DPO_CONTACTS: &str = "
        CREATE TABLE IF NOT EXISTS dpo_contacts (
            id BIGSERIAL PRIMARY KEY,
            name TEXT,
            email TEXT NOT NULL,
            phone TEXT,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )";

    pub const CREATE_BREACH_INCIDENTS: &str = "
        CREATE TABLE IF NOT EXISTS breach_incidents (
            id BIGSERIAL PRIMARY KEY,
            incident_type TEXT NOT NULL,
            severity TEXT NOT NULL,
            description TEXT NOT NULL,
            affected_users TEXT[] NOT NULL DEFAULT '{}',
            affected_data_types TEXT[] NOT NULL DEFAULT '{}',
            detected_at TIMESTAMPTZ NOT NULL,
            reported_by BIGINT,
            status TEXT NOT NULL DEFAULT 'draft',
            anomaly_id BIGINT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )";

    pub const CREATE_BREACH_NOTIFICATIONS: &str = "
        CREATE TABLE IF NOT EXISTS breach_notifications (
            id BIGSERIAL PRIMARY KEY,
            incident_id BIGINT NOT NULL REFERENCES breach_incidents(id),
            notification_type TEXT NOT NULL,
            recipient_type TEXT NOT NULL,
            recipient_email TEXT NOT NULL,
            recipient_name TEXT,
            sent_by BIGINT,
            status TEXT NOT NULL DEFAULT 'pending',
            sent_at TIMESTAMPTZ,
            template_used TEXT,
            error_message TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )";

    pub const CREATE_BREACH_REMEDIATIONS: &str = "
        CREATE TABLE IF NOT EXISTS breach_remediations (
            id BIGSERIAL PRIMARY KEY,
            incident_id BIGINT NOT NULL REFERENCES breach_incidents(id),
            action_taken TEXT NOT NULL,
            taken_by BIGINT,
            taken_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            effectiveness TEXT,
            notes TEXT
        )";

    pub const IDX_INCIDENTS_DETECTED_AT: &str = "
        CREATE INDEX IF NOT EXISTS idx_breach_incidents_detected_at
        ON breach_incidents (detected_at DESC)";

    pub const IDX_NOTIFICATIONS_INCIDENT: &str = "
        CREATE INDEX IF NOT EXISTS idx_breach_notifications_incident
        ON breach_notifications (incident_id, created_at DESC)";

    pub const IDX_REMEDIATIONS_INCIDENT: &str = "
        CREATE INDEX IF NOT EXISTS idx_breach_remediations_incident
        ON breach_remediations (incident_id, taken_at DESC)";
}

/// Creates all tables and indexes if they do not already exist.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let statements = [
        ("staff_users", sql::CREATE_STAFF_USERS),
        ("security_team_members", sql::CREATE_SECURITY_TEAM_MEMBERS),
        ("dpo_contacts", sql::CREATE_DPO_CONTACTS),
        ("breach_incidents", sql::CREATE_BREACH_INCIDENTS),
        ("breach_notifications", sql::CREATE_BREACH_NOTIFICATIONS),
        ("breach_remediations", sql::CREATE_BREACH_REMEDIATIONS),
        ("idx_breach_incidents_detected_at", sql::IDX_INCIDENTS_DETECTED_AT),
        ("idx_breach_notifications_incident", sql::IDX_NOTIFICATIONS_INCIDENT),
        ("idx_breach_remediations_incident", sql::IDX_REMEDIATIONS_INCIDENT),
    ];

    for (name, statement) in statements {
        sqlx::query(statement)
            .execute(pool.pg())
            .await
            .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
    }

    info!("database schema ready");
    Ok(())
}
