// ============================================================
// DATASET INGESTION USE CASE
// ============================================================
// Validate an upload, derive column metadata from the first row,
// and persist rows in fixed-size batches.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::dataset::{DatasetMeta, Row};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::db::datasets::DatasetStore;

use super::schema_classifier::classify_columns;

/// Everything a caller supplies when uploading a dataset.
#[derive(Debug, Clone)]
pub struct IngestDatasetInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub rows: Vec<Row>,
}

pub struct DatasetIngestionUseCase {
    store: Arc<dyn DatasetStore>,
    batch_size: usize,
}

impl DatasetIngestionUseCase {
    pub fn new(store: Arc<dyn DatasetStore>, batch_size: usize) -> Self {
        // A zero batch size would loop forever; clamp to one.
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Ingests a dataset: validation, column derivation from the first
    /// row, metadata insert, then batched row writes.
    ///
    /// Validation failures surface before anything is written. A failing
    /// batch surfaces `AppError::BatchWrite` with that batch's starting
    /// row index; earlier batches stay committed (documented limitation).
    pub async fn ingest(&self, input: IngestDatasetInput) -> Result<DatasetMeta> {
        if input.name.trim().is_empty() || input.category.trim().is_empty() || input.rows.is_empty()
        {
            return Err(AppError::ValidationError(
                "Missing required fields: name, category and rows are required".to_string(),
            ));
        }

        let columns = classify_columns(&input.rows);

        let meta = DatasetMeta {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            source: input.source,
            source_url: input.source_url,
            category: input.category,
            row_count: input.rows.len(),
            column_count: columns.len(),
            created_at: None,
        };

        self.store.insert_dataset(&meta, &columns).await?;
        info!(
            dataset_id = %meta.id,
            rows = meta.row_count,
            columns = meta.column_count,
            "Dataset metadata created"
        );

        for (batch_idx, batch) in input.rows.chunks(self.batch_size).enumerate() {
            let start_row = batch_idx * self.batch_size;
            self.store
                .insert_rows(&meta.id, start_row, batch)
                .await
                .map_err(|e| AppError::BatchWrite {
                    start_row,
                    message: e.to_string(),
                })?;
            debug!(
                dataset_id = %meta.id,
                start_row,
                batch_len = batch.len(),
                "Row batch inserted"
            );
        }

        info!(dataset_id = %meta.id, "All rows inserted");
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{CellValue, ColumnDescriptor, Dataset};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records calls; optionally fails row batches from a given start index.
    #[derive(Default)]
    struct RecordingStore {
        datasets: Mutex<Vec<(DatasetMeta, Vec<ColumnDescriptor>)>>,
        batches: Mutex<Vec<(usize, usize)>>,
        fail_batches_from: Option<usize>,
    }

    #[async_trait]
    impl DatasetStore for RecordingStore {
        async fn insert_dataset(
            &self,
            meta: &DatasetMeta,
            columns: &[ColumnDescriptor],
        ) -> Result<()> {
            self.datasets
                .lock()
                .unwrap()
                .push((meta.clone(), columns.to_vec()));
            Ok(())
        }

        async fn insert_rows(
            &self,
            _dataset_id: &str,
            start_index: usize,
            rows: &[Row],
        ) -> Result<()> {
            if let Some(from) = self.fail_batches_from {
                if start_index >= from {
                    return Err(AppError::DatabaseError("disk full".to_string()));
                }
            }
            self.batches.lock().unwrap().push((start_index, rows.len()));
            Ok(())
        }

        async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
            Err(AppError::NotFound(dataset_id.to_string()))
        }

        async fn list_datasets(&self) -> Result<Vec<DatasetMeta>> {
            Ok(Vec::new())
        }

        async fn delete_dataset(&self, _dataset_id: &str) -> Result<u64> {
            Ok(0)
        }
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| {
                vec![
                    ("region".to_string(), CellValue::Text("North".into())),
                    ("revenue".to_string(), CellValue::Number(i as f64)),
                ]
                .into_iter()
                .collect()
            })
            .collect()
    }

    fn input(row_count: usize) -> IngestDatasetInput {
        IngestDatasetInput {
            name: "Sales".to_string(),
            description: None,
            category: "Sales".to_string(),
            source: Some("CSV Upload".to_string()),
            source_url: None,
            rows: rows(row_count),
        }
    }

    #[tokio::test]
    async fn test_validation_rejects_before_any_write() {
        let store = Arc::new(RecordingStore::default());
        let use_case = DatasetIngestionUseCase::new(store.clone(), 100);

        for bad in [
            IngestDatasetInput {
                name: "  ".to_string(),
                ..input(3)
            },
            IngestDatasetInput {
                category: String::new(),
                ..input(3)
            },
            IngestDatasetInput {
                rows: Vec::new(),
                ..input(3)
            },
        ] {
            let err = use_case.ingest(bad).await.unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }

        assert!(store.datasets.lock().unwrap().is_empty());
        assert!(store.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_columns_derived_from_first_row() {
        let store = Arc::new(RecordingStore::default());
        let use_case = DatasetIngestionUseCase::new(store.clone(), 100);

        let meta = use_case.ingest(input(3)).await.unwrap();
        assert_eq!(meta.row_count, 3);
        assert_eq!(meta.column_count, 2);

        let datasets = store.datasets.lock().unwrap();
        let (_, columns) = &datasets[0];
        assert_eq!(columns[0].name, "region");
        assert!(columns[0].is_dimension);
        assert_eq!(columns[1].name, "revenue");
        assert!(columns[1].is_metric);
    }

    #[tokio::test]
    async fn test_rows_written_in_fixed_batches() {
        let store = Arc::new(RecordingStore::default());
        let use_case = DatasetIngestionUseCase::new(store.clone(), 100);

        use_case.ingest(input(340)).await.unwrap();

        let batches = store.batches.lock().unwrap();
        assert_eq!(*batches, vec![(0, 100), (100, 100), (200, 100), (300, 40)]);
    }

    #[tokio::test]
    async fn test_failing_batch_reports_start_row() {
        let store = Arc::new(RecordingStore {
            fail_batches_from: Some(200),
            ..Default::default()
        });
        let use_case = DatasetIngestionUseCase::new(store.clone(), 100);

        let err = use_case.ingest(input(340)).await.unwrap_err();
        match err {
            AppError::BatchWrite { start_row, .. } => assert_eq!(start_row, 200),
            other => panic!("expected BatchWrite, got {other:?}"),
        }

        // Earlier batches are committed, not rolled back.
        let batches = store.batches.lock().unwrap();
        assert_eq!(*batches, vec![(0, 100), (100, 100)]);
    }
}
