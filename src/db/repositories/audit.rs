use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::entities::{activity_log, audit_log};

/// Viewer cap; the audit page never pages past this.
const AUDIT_QUERY_LIMIT: u64 = 500;

/// Filters for the audit viewer; all optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub admin_id: Option<i32>,
    pub action: Option<String>,
    pub target: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record_admin_action(
        &self,
        admin_id: i32,
        action: &str,
        target: Option<&str>,
        details: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        let entry = audit_log::ActiveModel {
            admin_id: Set(admin_id),
            action: Set(action.to_string()),
            target: Set(target.map(ToString::to_string)),
            details: Set(details),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        audit_log::Entity::insert(entry)
            .exec(&self.conn)
            .await
            .context("Failed to insert audit log entry")?;

        Ok(())
    }

    pub async fn record_voter_activity(
        &self,
        voter_id: i32,
        action: &str,
        details: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        let entry = activity_log::ActiveModel {
            voter_id: Set(voter_id),
            action: Set(action.to_string()),
            details: Set(details),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        activity_log::Entity::insert(entry)
            .exec(&self.conn)
            .await
            .context("Failed to insert activity log entry")?;

        Ok(())
    }

    pub async fn query(&self, filter: AuditFilter) -> Result<Vec<audit_log::Model>> {
        let mut query = audit_log::Entity::find().order_by_desc(audit_log::Column::CreatedAt);

        if let Some(admin_id) = filter.admin_id {
            query = query.filter(audit_log::Column::AdminId.eq(admin_id));
        }

        if let Some(action) = filter.action {
            query = query.filter(audit_log::Column::Action.contains(action));
        }

        if let Some(target) = filter.target {
            query = query.filter(audit_log::Column::Target.eq(target));
        }

        if let Some(from) = filter.from {
            query = query.filter(audit_log::Column::CreatedAt.gte(from));
        }

        if let Some(to) = filter.to {
            query = query.filter(audit_log::Column::CreatedAt.lte(to));
        }

        query
            .limit(AUDIT_QUERY_LIMIT)
            .all(&self.conn)
            .await
            .context("Failed to query audit log")
    }
}
