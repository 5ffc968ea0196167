// ============================================================
// CSV IMPORT USE CASE
// ============================================================
// Raw CSV text (uploaded or fetched from a URL) through the parser
// into dataset ingestion.

use std::sync::Arc;

use tracing::info;

use crate::domain::dataset::DatasetMeta;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::fetch::fetch_csv;

use super::dataset_ingestion::{DatasetIngestionUseCase, IngestDatasetInput};

/// Dataset metadata accompanying a CSV import.
#[derive(Debug, Clone)]
pub struct CsvImportInput {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
}

pub struct CsvImportUseCase {
    ingestion: Arc<DatasetIngestionUseCase>,
    max_fetch_bytes: usize,
}

impl CsvImportUseCase {
    pub fn new(ingestion: Arc<DatasetIngestionUseCase>, max_fetch_bytes: usize) -> Self {
        Self {
            ingestion,
            max_fetch_bytes,
        }
    }

    /// Parses uploaded CSV text and ingests it.
    pub async fn import_text(&self, input: CsvImportInput, csv_text: &str) -> Result<DatasetMeta> {
        let rows = CsvParser::new().parse(csv_text)?;
        info!(name = %input.name, rows = rows.len(), "Parsed uploaded CSV");

        self.ingestion
            .ingest(IngestDatasetInput {
                name: input.name,
                description: input.description,
                category: input.category,
                source: input.source.or_else(|| Some("CSV Upload".to_string())),
                source_url: input.source_url,
                rows,
            })
            .await
    }

    /// Fetches the CSV behind `source_url`, parses and ingests it.
    pub async fn import_url(&self, input: CsvImportInput) -> Result<DatasetMeta> {
        let source_url = input
            .source_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                AppError::ValidationError("A dataset URL is required for imports".to_string())
            })?;

        let body = fetch_csv(&source_url, self.max_fetch_bytes).await?;
        let rows = CsvParser::new().parse(&body)?;
        info!(name = %input.name, url = %source_url, rows = rows.len(), "Parsed CSV from URL");

        self.ingestion
            .ingest(IngestDatasetInput {
                name: input.name,
                description: input.description,
                category: input.category,
                source: input.source.or_else(|| Some("URL Import".to_string())),
                source_url: Some(source_url),
                rows,
            })
            .await
    }
}
