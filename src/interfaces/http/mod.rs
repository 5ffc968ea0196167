use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{delete, dev::Server, get, post, web, App, HttpResponse, HttpServer, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::application::use_cases::aggregation::{aggregate, display_name};
use crate::application::use_cases::csv_import::{CsvImportInput, CsvImportUseCase};
use crate::application::use_cases::dataset_ingestion::{
    DatasetIngestionUseCase, IngestDatasetInput,
};
use crate::application::use_cases::schema_classifier::{
    dimension_columns, metric_columns, resolve_selection, temporal_columns,
};
use crate::domain::analytics::AggregationResult;
use crate::domain::dataset::{ColumnDescriptor, DatasetMeta, Row, Selection};
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::datasets::DatasetStore;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::FetchError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

pub struct HttpState {
    pub store: Arc<dyn DatasetStore>,
    pub ingestion: Arc<DatasetIngestionUseCase>,
    pub import: Arc<CsvImportUseCase>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub data: Vec<Row>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    /// Raw CSV text; when absent, `sourceUrl` is fetched instead.
    #[serde(default)]
    pub csv: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub dataset_id: String,
}

/// One picker entry: raw column name plus its display label.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOption {
    pub name: String,
    pub label: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub dataset: DatasetMeta,
    pub metric_columns: Vec<ColumnOption>,
    pub dimension_columns: Vec<ColumnOption>,
    pub time_columns: Vec<ColumnOption>,
    pub selection: Selection,
    pub result: AggregationResult,
}

fn options(columns: Vec<&ColumnDescriptor>) -> Vec<ColumnOption> {
    columns
        .into_iter()
        .map(|c| ColumnOption {
            name: c.name.clone(),
            label: display_name(&c.name),
        })
        .collect()
}

#[post("/datasets/upload")]
async fn upload_dataset(
    data: web::Data<HttpState>,
    req: web::Json<UploadRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!(name = %req.name, rows = req.data.len(), "Received upload request");

    let meta = data
        .ingestion
        .ingest(IngestDatasetInput {
            name: req.name,
            description: req.description,
            category: req.category,
            source: req.source,
            source_url: req.source_url,
            rows: req.data,
        })
        .await?;

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        dataset_id: meta.id,
    }))
}

#[post("/datasets/import")]
async fn import_dataset(
    data: web::Data<HttpState>,
    req: web::Json<ImportRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    info!(name = %req.name, has_inline_csv = req.csv.is_some(), "Received import request");

    let input = CsvImportInput {
        name: req.name,
        description: req.description,
        category: req.category,
        source: req.source,
        source_url: req.source_url,
    };

    let meta = match req.csv.filter(|c| !c.trim().is_empty()) {
        Some(csv) => data.import.import_text(input, &csv).await?,
        None => data.import.import_url(input).await?,
    };

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        dataset_id: meta.id,
    }))
}

#[get("/datasets")]
async fn list_datasets(data: web::Data<HttpState>) -> Result<HttpResponse, AppError> {
    let datasets = data.store.list_datasets().await?;
    Ok(HttpResponse::Ok().json(datasets))
}

#[get("/datasets/{id}")]
async fn get_dataset(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let dataset = data.store.get_dataset(&path).await?;
    Ok(HttpResponse::Ok().json(dataset))
}

#[get("/datasets/{id}/dashboard")]
async fn dataset_dashboard(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<Selection>,
) -> Result<HttpResponse, AppError> {
    let dataset = data.store.get_dataset(&path).await?;

    let selection = resolve_selection(&dataset.columns, query.into_inner());
    let result = aggregate(&dataset.rows, &dataset.columns, &selection);

    Ok(HttpResponse::Ok().json(DashboardResponse {
        metric_columns: options(metric_columns(&dataset.columns)),
        dimension_columns: options(dimension_columns(&dataset.columns)),
        time_columns: options(temporal_columns(&dataset.columns)),
        dataset: dataset.dataset,
        selection,
        result,
    }))
}

#[delete("/datasets/{id}")]
async fn delete_dataset(
    data: web::Data<HttpState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let deleted = data.store.delete_dataset(&path).await?;
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Dataset not found: {path}")));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Registers the API routes; shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(upload_dataset)
            .service(import_dataset)
            .service(list_datasets)
            .service(dataset_dashboard)
            .service(get_dataset)
            .service(delete_dataset),
    );
}

pub fn start_server(config: &AppConfig, state: HttpState) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_memory_db;
    use crate::infrastructure::db::datasets::SqliteDatasetStore;
    use actix_web::{test, App};

    async fn state() -> web::Data<HttpState> {
        let store: Arc<dyn DatasetStore> =
            Arc::new(SqliteDatasetStore::new(init_memory_db().await.unwrap()));
        let ingestion = Arc::new(DatasetIngestionUseCase::new(store.clone(), 100));
        let import = Arc::new(CsvImportUseCase::new(ingestion.clone(), 1024 * 1024));
        web::Data::new(HttpState {
            store,
            ingestion,
            import,
        })
    }

    fn upload_body() -> serde_json::Value {
        json!({
            "name": "Sales",
            "category": "Sales",
            "source": "seed",
            "data": [
                { "date": "2024-01-01", "region": "North", "revenue": 100 },
                { "date": "2024-01-02", "region": "South", "revenue": 50 },
                { "date": "2024-01-02", "region": "North", "revenue": 25 }
            ]
        })
    }

    #[actix_web::test]
    async fn test_upload_then_dashboard() {
        let app =
            test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let resp: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/datasets/upload")
                .set_json(upload_body())
                .to_request(),
        )
        .await;
        assert_eq!(resp["success"], true);
        let id = resp["datasetId"].as_str().unwrap().to_string();

        let dashboard: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/datasets/{id}/dashboard"))
                .to_request(),
        )
        .await;

        // Defaults: dimension=date (first text column), metric=revenue,
        // time column=date (name heuristic).
        assert_eq!(dashboard["selection"]["dimension"], "date");
        assert_eq!(dashboard["selection"]["metric"], "revenue");
        assert_eq!(dashboard["selection"]["timeColumn"], "date");

        let kpis = dashboard["result"]["kpis"].as_array().unwrap();
        assert_eq!(kpis.len(), 1);
        assert_eq!(kpis[0]["name"], "Revenue");
        assert_eq!(kpis[0]["total"], 175.0);

        let series = dashboard["result"]["timeSeries"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["time"], "2024-01-01");
    }

    #[actix_web::test]
    async fn test_dashboard_honors_explicit_selection() {
        let app =
            test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let resp: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/datasets/upload")
                .set_json(upload_body())
                .to_request(),
        )
        .await;
        let id = resp["datasetId"].as_str().unwrap().to_string();

        let dashboard: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/datasets/{id}/dashboard?dimension=region"))
                .to_request(),
        )
        .await;

        let breakdown = dashboard["result"]["dimensionBreakdown"].as_array().unwrap();
        assert_eq!(breakdown[0]["name"], "North");
        assert_eq!(breakdown[0]["value"], 125.0);
        assert_eq!(breakdown[1]["name"], "South");
    }

    #[actix_web::test]
    async fn test_upload_validation_is_bad_request() {
        let app =
            test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/datasets/upload")
                .set_json(json!({ "name": "", "category": "Sales", "data": [] }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_missing_dataset_is_not_found() {
        let app =
            test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/datasets/nope/dashboard")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_import_inline_csv_and_delete() {
        let app =
            test::init_service(App::new().app_data(state().await).configure(configure)).await;

        let resp: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/datasets/import")
                .set_json(json!({
                    "name": "Orders",
                    "category": "Sales",
                    "csv": "order_date,item,total\n2024-02-01,widget,9.5\n"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp["success"], true);
        let id = resp["datasetId"].as_str().unwrap().to_string();

        let dataset: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/datasets/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(dataset["dataset"]["source"], "CSV Upload");
        assert_eq!(dataset["rows"][0]["total"], 9.5);

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/datasets/{id}"))
                .to_request(),
        )
        .await;
        assert!(resp.status().is_success());

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/datasets/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
