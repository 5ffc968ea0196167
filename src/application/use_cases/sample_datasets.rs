// ============================================================
// SAMPLE DATASET SEEDER
// ============================================================
// Built-in demo datasets, ingested through the normal pipeline so
// they get the same column classification as any upload.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::dataset::{CellValue, Row};
use crate::domain::error::Result;
use crate::infrastructure::db::datasets::DatasetStore;

use super::dataset_ingestion::{DatasetIngestionUseCase, IngestDatasetInput};

const SAMPLE_SOURCE: &str = "Sample Data";

struct SampleDataset {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    rows: Vec<Row>,
}

pub struct SampleSeeder {
    store: Arc<dyn DatasetStore>,
    ingestion: Arc<DatasetIngestionUseCase>,
}

impl SampleSeeder {
    pub fn new(store: Arc<dyn DatasetStore>, ingestion: Arc<DatasetIngestionUseCase>) -> Self {
        Self { store, ingestion }
    }

    /// Ingests the built-in sample datasets, skipping any whose name is
    /// already present. Safe to run on every startup. Returns how many
    /// datasets were actually created.
    pub async fn seed(&self) -> Result<usize> {
        let existing: HashSet<String> = self
            .store
            .list_datasets()
            .await?
            .into_iter()
            .map(|meta| meta.name)
            .collect();

        let mut seeded = 0;
        for sample in samples() {
            if existing.contains(sample.name) {
                continue;
            }
            let meta = self
                .ingestion
                .ingest(IngestDatasetInput {
                    name: sample.name.to_string(),
                    description: Some(sample.description.to_string()),
                    category: sample.category.to_string(),
                    source: Some(SAMPLE_SOURCE.to_string()),
                    source_url: None,
                    rows: sample.rows,
                })
                .await?;
            info!(dataset_id = %meta.id, name = %meta.name, "Seeded sample dataset");
            seeded += 1;
        }
        Ok(seeded)
    }
}

fn row(pairs: Vec<(&str, CellValue)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn n(value: f64) -> CellValue {
    CellValue::Number(value)
}

fn t(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn samples() -> Vec<SampleDataset> {
    vec![
        SampleDataset {
            name: "E-commerce Sales",
            description:
                "Sample e-commerce sales data with products, categories, and regional information",
            category: "Sales",
            rows: ecommerce_sales_rows(),
        },
        SampleDataset {
            name: "Marketing Campaigns",
            description: "Marketing campaign performance metrics across different platforms",
            category: "Marketing",
            rows: marketing_rows(),
        },
        SampleDataset {
            name: "Customer Satisfaction",
            description: "Customer satisfaction survey results by department",
            category: "Customer Service",
            rows: customer_satisfaction_rows(),
        },
    ]
}

// Dates are plain text on purpose: seeded datasets behave exactly like
// CSV uploads, where the time axis comes from the column-name heuristic.
fn ecommerce_sales_rows() -> Vec<Row> {
    [
        ("2024-01-01", "Laptop", "Electronics", "North", 1200.0, 2.0),
        ("2024-01-02", "Mouse", "Electronics", "South", 25.0, 5.0),
        ("2024-01-03", "Keyboard", "Electronics", "East", 75.0, 3.0),
        ("2024-01-04", "Monitor", "Electronics", "West", 300.0, 1.0),
        ("2024-01-05", "Laptop", "Electronics", "North", 2400.0, 4.0),
        ("2024-02-01", "Desk", "Furniture", "South", 450.0, 2.0),
        ("2024-02-02", "Chair", "Furniture", "East", 200.0, 4.0),
        ("2024-02-03", "Lamp", "Furniture", "West", 60.0, 6.0),
        ("2024-03-01", "Notebook", "Stationery", "North", 15.0, 10.0),
        ("2024-03-02", "Pen", "Stationery", "South", 5.0, 20.0),
    ]
    .into_iter()
    .map(|(date, product, category, region, revenue, units)| {
        row(vec![
            ("date", t(date)),
            ("product", t(product)),
            ("category", t(category)),
            ("region", t(region)),
            ("revenue", n(revenue)),
            ("units", n(units)),
        ])
    })
    .collect()
}

fn marketing_rows() -> Vec<Row> {
    [
        ("2024-01-01", "Social Media", "Facebook", 10000.0, 500.0, 25.0, 200.0),
        ("2024-01-02", "Social Media", "Instagram", 8000.0, 400.0, 20.0, 150.0),
        ("2024-01-03", "Email", "Newsletter", 5000.0, 250.0, 30.0, 50.0),
        ("2024-02-01", "Search Ads", "Google", 15000.0, 750.0, 50.0, 500.0),
        ("2024-02-02", "Display Ads", "Banner", 20000.0, 300.0, 15.0, 300.0),
    ]
    .into_iter()
    .map(|(date, campaign, platform, impressions, clicks, conversions, cost)| {
        row(vec![
            ("date", t(date)),
            ("campaign", t(campaign)),
            ("platform", t(platform)),
            ("impressions", n(impressions)),
            ("clicks", n(clicks)),
            ("conversions", n(conversions)),
            ("cost", n(cost)),
        ])
    })
    .collect()
}

fn customer_satisfaction_rows() -> Vec<Row> {
    [
        ("2024-01-15", "Sales", 4.5, 120.0, 45.0),
        ("2024-01-15", "Support", 4.2, 95.0, 38.0),
        ("2024-01-15", "Product", 4.7, 150.0, 52.0),
        ("2024-02-15", "Sales", 4.6, 130.0, 48.0),
        ("2024-02-15", "Support", 4.4, 105.0, 42.0),
        ("2024-02-15", "Product", 4.8, 160.0, 55.0),
    ]
    .into_iter()
    .map(|(date, department, rating, responses, nps_score)| {
        row(vec![
            ("date", t(date)),
            ("department", t(department)),
            ("rating", n(rating)),
            ("responses", n(responses)),
            ("nps_score", n(nps_score)),
        ])
    })
    .collect()
}
