pub mod use_cases;

pub use use_cases::csv_import::CsvImportUseCase;
pub use use_cases::dataset_ingestion::DatasetIngestionUseCase;
pub use use_cases::sample_datasets::SampleSeeder;
