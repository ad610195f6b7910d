use actix_web::{get, post, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    handlers::extractors::TenantHeaders,
    models::dto::request::CreateParticipantRequest,
};

#[get("/api/participants")]
pub async fn list_participants(state: web::Data<AppState>, tenant: TenantHeaders) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let participants = scope.participant_service().list_participants().await?;
    Ok(HttpResponse::Ok().json(participants))
}

/// The password is echoed once so the operator can hand it out.
#[post("/api/participants")]
pub async fn create_participant(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    request: web::Json<CreateParticipantRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let password = request.password.clone();
    let participant = scope
        .participant_service()
        .create_participant(request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "participant": participant,
        "user_id": participant.user_id,
        "password": password,
    })))
}

#[get("/api/participants/{id}/details")]
pub async fn participant_details(
    state: web::Data<AppState>,
    tenant: TenantHeaders,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let scope = state.tenant(&tenant.coordinates, tenant.mode).await?;
    let details = scope.participant_service().participant_details(&id).await?;
    Ok(HttpResponse::Ok().json(details))
}
