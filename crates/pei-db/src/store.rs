//! [`PermissionStore`] over the platform's Postgres tables.
//!
//! - `profiles` / `schools`: a user's school, and the tenant either set on
//!   the profile or inherited from the school. Inactive profiles count as
//!   absent.
//! - `user_roles`: one row per held role tag.
//! - `student_family`: guardian links.
//! - `field_visibility_rules`: the field visibility table.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use pei_authz::{FieldRule, PermissionStore, RoleScopeRecord, StoreError};
use pei_models::{SchoolId, StudentId, TenantId, UserId};

#[derive(Clone, Debug)]
pub struct PgPermissionStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct ScopeRow {
    tenant_id: Option<TenantId>,
    school_id: Option<SchoolId>,
    roles: Vec<String>,
}

#[derive(Debug, FromRow)]
struct FieldRuleRow {
    role: String,
    field_name: String,
    visible: bool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn roles_and_scope(
        &self,
        user_id: UserId,
    ) -> Result<Option<RoleScopeRecord>, StoreError> {
        let row = sqlx::query_as::<_, ScopeRow>(
            r#"
            SELECT
                COALESCE(p.tenant_id, s.tenant_id) AS tenant_id,
                p.school_id,
                COALESCE(
                    ARRAY_AGG(ur.role::TEXT) FILTER (WHERE ur.role IS NOT NULL),
                    '{}'::TEXT[]
                ) AS roles
            FROM profiles p
            LEFT JOIN schools s ON s.id = p.school_id
            LEFT JOIN user_roles ur ON ur.user_id = p.id
            WHERE p.id = $1 AND COALESCE(p.is_active, TRUE)
            GROUP BY p.id, s.tenant_id
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|row| RoleScopeRecord {
            roles: row.roles,
            tenant_id: row.tenant_id,
            school_id: row.school_id,
        }))
    }

    #[instrument(skip(self), fields(user_id = %user_id, student_id = %student_id))]
    async fn has_guardian_link(
        &self,
        user_id: UserId,
        student_id: StudentId,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM student_family
                WHERE family_user_id = $1 AND student_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)
    }

    #[instrument(skip(self))]
    async fn field_visibility_rules(&self) -> Result<Vec<FieldRule>, StoreError> {
        let rows = sqlx::query_as::<_, FieldRuleRow>(
            "SELECT role, field_name, visible FROM field_visibility_rules",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(rows
            .into_iter()
            .map(|row| FieldRule::new(row.role, row.field_name, row.visible))
            .collect())
    }
}
