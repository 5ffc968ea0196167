use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use crate::domain::dataset::{ColumnDescriptor, ColumnType, Dataset, DatasetMeta, Row};
use crate::domain::error::{AppError, Result};

/// Storage boundary for datasets, columns and rows.
///
/// Row batches are written one transaction per call; the ingestion use
/// case drives the batching and reports the failing batch's start index.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    async fn insert_dataset(&self, meta: &DatasetMeta, columns: &[ColumnDescriptor]) -> Result<()>;
    async fn insert_rows(&self, dataset_id: &str, start_index: usize, rows: &[Row]) -> Result<()>;
    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset>;
    async fn list_datasets(&self) -> Result<Vec<DatasetMeta>>;
    async fn delete_dataset(&self, dataset_id: &str) -> Result<u64>;
}

pub struct SqliteDatasetStore {
    pool: SqlitePool,
}

impl SqliteDatasetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatasetStore for SqliteDatasetStore {
    async fn insert_dataset(&self, meta: &DatasetMeta, columns: &[ColumnDescriptor]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            "INSERT INTO datasets (id, name, description, source, source_url, category, row_count, column_count) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&meta.id)
        .bind(&meta.name)
        .bind(&meta.description)
        .bind(&meta.source)
        .bind(&meta.source_url)
        .bind(&meta.category)
        .bind(meta.row_count as i64)
        .bind(meta.column_count as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert dataset: {e}")))?;

        for (ordinal, col) in columns.iter().enumerate() {
            sqlx::query(
                "INSERT INTO dataset_columns (dataset_id, ordinal, column_name, column_type, is_metric, is_dimension) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&meta.id)
            .bind(ordinal as i64)
            .bind(&col.name)
            .bind(col.column_type.as_str())
            .bind(col.is_metric)
            .bind(col.is_dimension)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert column: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit dataset insert: {e}")))?;

        Ok(())
    }

    async fn insert_rows(&self, dataset_id: &str, start_index: usize, rows: &[Row]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        for (offset, row) in rows.iter().enumerate() {
            let data = serde_json::to_string(row)
                .map_err(|e| AppError::Internal(format!("Failed to serialize row: {e}")))?;

            sqlx::query("INSERT INTO dataset_rows (dataset_id, row_index, data) VALUES (?, ?, ?)")
                .bind(dataset_id)
                .bind((start_index + offset) as i64)
                .bind(data)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to insert row: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit row batch: {e}")))?;

        Ok(())
    }

    async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let meta = sqlx::query_as::<_, DatasetEntity>(
            "SELECT id, name, description, source, source_url, category, row_count, column_count, created_at \
             FROM datasets WHERE id = ?",
        )
        .bind(dataset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch dataset: {e}")))?;

        let meta = match meta {
            Some(entity) => DatasetMeta::from(entity),
            None => return Err(AppError::NotFound(format!("Dataset not found: {dataset_id}"))),
        };

        let columns = sqlx::query_as::<_, ColumnEntity>(
            "SELECT column_name, column_type, is_metric, is_dimension \
             FROM dataset_columns WHERE dataset_id = ? ORDER BY ordinal",
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch columns: {e}")))?
        .into_iter()
        .map(ColumnDescriptor::try_from)
        .collect::<Result<Vec<_>>>()?;

        let raw_rows: Vec<String> = sqlx::query_scalar(
            "SELECT data FROM dataset_rows WHERE dataset_id = ? ORDER BY row_index",
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch rows: {e}")))?;

        let rows = raw_rows
            .iter()
            .map(|data| {
                serde_json::from_str::<Row>(data).map_err(|e| {
                    AppError::DatabaseError(format!("Corrupt row payload in {dataset_id}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Dataset {
            dataset: meta,
            columns,
            rows,
        })
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetMeta>> {
        let rows = sqlx::query_as::<_, DatasetEntity>(
            "SELECT id, name, description, source, source_url, category, row_count, column_count, created_at \
             FROM datasets ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list datasets: {e}")))?;

        Ok(rows.into_iter().map(DatasetMeta::from).collect())
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = ?")
            .bind(dataset_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete dataset: {e}")))?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct DatasetEntity {
    id: String,
    name: String,
    description: Option<String>,
    source: Option<String>,
    source_url: Option<String>,
    category: String,
    row_count: i64,
    column_count: i64,
    created_at: String,
}

impl From<DatasetEntity> for DatasetMeta {
    fn from(entity: DatasetEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            source: entity.source,
            source_url: entity.source_url,
            category: entity.category,
            row_count: entity.row_count as usize,
            column_count: entity.column_count as usize,
            created_at: Some(entity.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ColumnEntity {
    column_name: String,
    column_type: String,
    is_metric: bool,
    is_dimension: bool,
}

impl TryFrom<ColumnEntity> for ColumnDescriptor {
    type Error = AppError;

    fn try_from(entity: ColumnEntity) -> Result<ColumnDescriptor> {
        let column_type = ColumnType::parse(&entity.column_type).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown column type: {}", entity.column_type))
        })?;
        Ok(ColumnDescriptor {
            name: entity.column_name,
            column_type,
            is_metric: entity.is_metric,
            is_dimension: entity.is_dimension,
        })
    }
}
