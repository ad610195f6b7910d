use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError, handlers::extractors::TenantHeaders};

#[get("/api/dashboard")]
pub async fn dashboard(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let stats = scope.dashboard_service().stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
