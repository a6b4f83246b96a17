use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{BugChanges, BugDraft, BugPayload};
use crate::store::BugStore;
use crate::validation::{validate_bug, validate_status};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/")
                .route(web::get().to(homepage))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/bugs")
                .route(web::get().to(get_bugs))
                .route(web::post().to(create_bug))
                .default_service(web::to(not_found)),
        )
        .service(
            web::resource("/bugs/{id}")
                .route(web::get().to(get_bug_by_id))
                .route(web::put().to(update_bug))
                .route(web::delete().to(delete_bug))
                .default_service(web::to(not_found)),
        )
        .default_service(web::to(not_found));
}

/// Undecodable JSON bodies answer with the same error shape as everything else.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BugNotFound)
}

async fn homepage() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body("Bug Tracker API is running...")
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let path = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| req.path());
    Err(ApiError::RouteNotFound(path.to_string()))
}

// === GET /bugs ===
async fn get_bugs(store: web::Data<BugStore>) -> Result<HttpResponse, ApiError> {
    let bugs = store.find_all().await?;
    Ok(HttpResponse::Ok().json(bugs))
}

// === GET /bugs/{id} ===
async fn get_bug_by_id(
    store: web::Data<BugStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let bug = store.find_by_id(id).await?.ok_or(ApiError::BugNotFound)?;
    Ok(HttpResponse::Ok().json(bug))
}

// === POST /bugs ===
async fn create_bug(
    store: web::Data<BugStore>,
    payload: web::Json<BugPayload>,
) -> Result<HttpResponse, ApiError> {
    let draft = BugDraft::from_payload(payload.into_inner().with_defaults())?;
    let bug = store.insert(&draft, Utc::now()).await?;
    info!("created bug {}", bug.id);
    Ok(HttpResponse::Created().json(bug))
}

// === PUT /bugs/{id} ===
//
// The merged record is validated as a whole, but only the supplied fields
// are written.
async fn update_bug(
    store: web::Data<BugStore>,
    path: web::Path<String>,
    payload: web::Json<BugPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let existing = store.find_by_id(id).await?.ok_or(ApiError::BugNotFound)?;
    let payload = payload.into_inner();

    if let Some(status) = &payload.status {
        validate_status(status.as_deref())?;
    }
    let changes = BugChanges::from_payload(&payload)?;
    validate_bug(&existing.as_payload().overlay(&payload), false)?;

    // updatedAt never moves backwards, even if the clock does
    let updated_at = Utc::now().max(existing.updated_at);
    let bug = store
        .update_by_id(id, &changes, updated_at)
        .await?
        .ok_or(ApiError::BugNotFound)?;
    info!("updated bug {id}");
    Ok(HttpResponse::Ok().json(bug))
}

// === DELETE /bugs/{id} ===
async fn delete_bug(
    store: web::Data<BugStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    store.find_by_id(id).await?.ok_or(ApiError::BugNotFound)?;
    if !store.delete_by_id(id).await? {
        return Err(ApiError::BugNotFound);
    }
    info!("deleted bug {id}");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Bug removed" })))
}
