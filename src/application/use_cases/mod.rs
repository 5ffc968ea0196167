pub mod aggregation;
pub mod csv_import;
pub mod dataset_ingestion;
pub mod sample_datasets;
pub mod schema_classifier;
pub mod type_inference;
