use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::instrument;

use gameshop_associations::{AssociationRecord, AssociationStore, RelationKind};
use gameshop_core::{AssociationId, EntityId, StoreError};

use super::PostgresDatabase;
use super::error::{map_reference_write_error, map_sqlx_error};

fn record_from_row(relation: RelationKind, row: &PgRow) -> Result<AssociationRecord, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode association", e);
    Ok(AssociationRecord {
        id: AssociationId::new(row.try_get("id").map_err(decode)?),
        relation,
        left: EntityId::new(row.try_get("left_id").map_err(decode)?),
        right: EntityId::new(row.try_get("right_id").map_err(decode)?),
    })
}

#[async_trait]
impl AssociationStore for PostgresDatabase {
    #[instrument(skip(self), err)]
    async fn find(
        &self,
        relation: RelationKind,
        id: AssociationId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, left_id, right_id FROM associations WHERE relation = $1 AND id = $2",
        )
        .bind(relation.as_str())
        .bind(id.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_association", e))?;

        row.as_ref().map(|r| record_from_row(relation, r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_pair(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<Option<AssociationRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, left_id, right_id
            FROM associations
            WHERE relation = $1 AND left_id = $2 AND right_id = $3
            "#,
        )
        .bind(relation.as_str())
        .bind(left.get())
        .bind(right.get())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_association_pair", e))?;

        row.as_ref().map(|r| record_from_row(relation, r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_left(
        &self,
        relation: RelationKind,
        left: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, left_id, right_id
            FROM associations
            WHERE relation = $1 AND left_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(relation.as_str())
        .bind(left.get())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_associations_by_left", e))?;

        rows.iter().map(|r| record_from_row(relation, r)).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_right(
        &self,
        relation: RelationKind,
        right: EntityId,
    ) -> Result<Vec<AssociationRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, left_id, right_id
            FROM associations
            WHERE relation = $1 AND right_id = $2
            ORDER BY id ASC
            "#,
        )
        .bind(relation.as_str())
        .bind(right.get())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_associations_by_right", e))?;

        rows.iter().map(|r| record_from_row(relation, r)).collect()
    }

    #[instrument(skip(self), err)]
    async fn insert(
        &self,
        relation: RelationKind,
        left: EntityId,
        right: EntityId,
    ) -> Result<AssociationRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO associations (relation, left_kind, left_id, right_kind, right_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, left_id, right_id
            "#,
        )
        .bind(relation.as_str())
        .bind(relation.left().as_str())
        .bind(left.get())
        .bind(relation.right().as_str())
        .bind(right.get())
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_reference_write_error("insert_association", e))?;

        record_from_row(relation, &row)
    }

    #[instrument(skip(self), err)]
    async fn update(&self, record: &AssociationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE associations
            SET left_id = $1, right_id = $2
            WHERE relation = $3 AND id = $4
            "#,
        )
        .bind(record.left.get())
        .bind(record.right.get())
        .bind(record.relation.as_str())
        .bind(record.id.get())
        .execute(self.pool())
        .await
        .map_err(|e| map_reference_write_error("update_association", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, relation: RelationKind, id: AssociationId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM associations WHERE relation = $1 AND id = $2")
            .bind(relation.as_str())
            .bind(id.get())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_association", e))?;
        Ok(result.rows_affected() > 0)
    }
}
