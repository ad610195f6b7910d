use actix_web::{get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::extractors::TenantHeaders,
    models::{
        domain::CredentialDocument,
        dto::{request::SignupRequest, response::MessageResponse},
    },
};

#[post("/api/vault/fetch")]
pub async fn fetch_vault(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let document = state
        .account_service(tenant.mode)
        .fetch_document(&tenant.coordinates)
        .await?;
    Ok(HttpResponse::Ok().json(document))
}

#[post("/api/vault/store")]
pub async fn store_vault(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    document: web::Json<CredentialDocument>,
) -> Result<HttpResponse, AppError> {
    state
        .account_service(tenant.mode)
        .store_document(&tenant.coordinates, document.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Stored")))
}

#[post("/api/account/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let summary = state
        .account_service(tenant.mode)
        .signup(&tenant.coordinates, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(summary))
}

#[post("/api/account/login")]
pub async fn login(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let summary = state
        .account_service(tenant.mode)
        .login(&tenant.coordinates)
        .await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/api/settings")]
pub async fn get_settings(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let settings = state
        .account_service(tenant.mode)
        .load_settings(&tenant.coordinates)
        .await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[put("/api/settings")]
pub async fn save_settings(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    changes: web::Json<CredentialDocument>,
) -> Result<HttpResponse, AppError> {
    let settings = state
        .account_service(tenant.mode)
        .save_settings(&tenant.coordinates, changes.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(settings))
}
