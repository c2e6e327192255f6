use crate::context::ServiceContext;
use crate::error::{status_for, ApiError, ErrorBody};
use crate::health::HealthStatus;
use crate::response::Outcome;
use actix_cors::Cors;
use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer, Result as ActixResult};
use incidentx_core::{Capability, ErrorKind, RawAttributes};
use incidentx_model::DEFAULT_THRESHOLD;
use incidentx_similarity::{DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
struct FraudQuery {
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct SearchQuery {
    top_k: Option<usize>,
    min_similarity: Option<f64>,
}

#[derive(Deserialize)]
struct DuplicateQuery {
    threshold: Option<f64>,
}

#[derive(Serialize)]
struct Importance {
    feature: String,
    importance: f64,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(context: Arc<ServiceContext>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::from(context.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every route. The app must carry `web::Data<ServiceContext>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health))
        .route("/predict/fraud", web::post().to(predict_fraud))
        .route("/predict/fraud/batch", web::post().to(predict_fraud_batch))
        .route("/predict/risk", web::post().to(predict_risk))
        .route("/predict/risk/batch", web::post().to(predict_risk_batch))
        .route("/predict/risk/distribution", web::post().to(risk_distribution))
        .route("/similarity/search", web::post().to(find_similar))
        .route("/similarity/duplicates", web::post().to(find_duplicates))
        .route("/similarity/matrix", web::post().to(similarity_matrix))
        .route("/similarity/stats", web::get().to(dataset_stats))
        .route("/models/{capability}/importance", web::get().to(feature_importance));
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorBody::new(err.to_string(), ErrorKind::Validation);
    tracing::warn!("Malformed request: {}", body.error);
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| bad_request(err))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

fn respond<T: Outcome + Serialize>(response: T) -> HttpResponse {
    match response.error_kind() {
        Some(kind) => HttpResponse::build(status_for(kind)).json(response),
        None => HttpResponse::Ok().json(response),
    }
}

async fn health(context: web::Data<ServiceContext>) -> ActixResult<HttpResponse> {
    let report = context.health();
    Ok(match report.status {
        HealthStatus::Healthy => HttpResponse::Ok().json(report),
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(report),
    })
}

async fn predict_fraud(
    context: web::Data<ServiceContext>,
    query: web::Query<FraudQuery>,
    req: web::Json<RawAttributes>,
) -> ActixResult<HttpResponse> {
    let threshold = query.threshold.unwrap_or(DEFAULT_THRESHOLD);
    Ok(respond(context.predict_fraud(&req, threshold)))
}

async fn predict_fraud_batch(
    context: web::Data<ServiceContext>,
    query: web::Query<FraudQuery>,
    req: web::Json<Vec<RawAttributes>>,
) -> Result<HttpResponse, ApiError> {
    context.fraud().map_err(|e| ApiError::new(Capability::Fraud, e))?;
    let threshold = query.threshold.unwrap_or(DEFAULT_THRESHOLD);
    let predictions = context.predict_fraud_batch(&req, threshold);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "predictions": predictions,
    })))
}

async fn predict_risk(
    context: web::Data<ServiceContext>,
    req: web::Json<RawAttributes>,
) -> ActixResult<HttpResponse> {
    Ok(respond(context.predict_risk(&req)))
}

async fn predict_risk_batch(
    context: web::Data<ServiceContext>,
    req: web::Json<Vec<RawAttributes>>,
) -> Result<HttpResponse, ApiError> {
    context.risk().map_err(|e| ApiError::new(Capability::Risk, e))?;
    let predictions = context.predict_risk_batch(&req);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "predictions": predictions,
    })))
}

async fn risk_distribution(
    context: web::Data<ServiceContext>,
    req: web::Json<Vec<RawAttributes>>,
) -> Result<HttpResponse, ApiError> {
    let distribution = context
        .risk_distribution(&req)
        .map_err(|e| ApiError::new(Capability::Risk, e))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "distribution": distribution,
        "total": distribution.total(),
    })))
}

async fn find_similar(
    context: web::Data<ServiceContext>,
    query: web::Query<SearchQuery>,
    req: web::Json<RawAttributes>,
) -> ActixResult<HttpResponse> {
    let top_k = query.top_k.unwrap_or(DEFAULT_TOP_K);
    let min_similarity = query.min_similarity.unwrap_or(0.0);
    Ok(respond(context.find_similar(&req, top_k, min_similarity)))
}

async fn find_duplicates(
    context: web::Data<ServiceContext>,
    query: web::Query<DuplicateQuery>,
    req: web::Json<RawAttributes>,
) -> ActixResult<HttpResponse> {
    let threshold = query.threshold.unwrap_or(DEFAULT_DUPLICATE_THRESHOLD);
    Ok(respond(context.find_duplicates(&req, threshold)))
}

async fn similarity_matrix(
    context: web::Data<ServiceContext>,
    req: web::Json<Vec<RawAttributes>>,
) -> Result<HttpResponse, ApiError> {
    let matrix = context
        .similarity_matrix(&req)
        .map_err(|e| ApiError::new(Capability::Similarity, e))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "similarity_matrix": matrix,
    })))
}

async fn dataset_stats(context: web::Data<ServiceContext>) -> Result<HttpResponse, ApiError> {
    let stats = context
        .dataset_stats()
        .map_err(|e| ApiError::new(Capability::Similarity, e))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "stats": stats,
    })))
}

async fn feature_importance(
    context: web::Data<ServiceContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let capability: Capability = path.into_inner().parse()?;
    let importance: Vec<Importance> = context
        .feature_importance(capability)
        .map_err(|e| ApiError::new(capability, e))?
        .into_iter()
        .map(|(feature, importance)| Importance { feature, importance })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "capability": capability,
        "feature_importance": importance,
    })))
}
