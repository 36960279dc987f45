// src/handlers/config.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::scoring::{NivelUmbral, Pesos, ScoringConfig},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigPayload {
    pub pesos: Pesos,

    pub niveles: Vec<NivelUmbral>,

    #[schema(example = 12)]
    pub meses_reevaluacion: i32,
}

// GET /api/scoring/config
#[utoipa::path(
    get,
    path = "/api/scoring/config",
    tag = "Configuración",
    responses(
        (status = 200, description = "Configuración del tenant (creada con defaults si no existía)", body = ScoringConfig)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state
        .config_service
        .get_or_create(&app_state.db_pool, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(config)))
}

// PUT /api/scoring/config
#[utoipa::path(
    put,
    path = "/api/scoring/config",
    tag = "Configuración",
    request_body = UpdateConfigPayload,
    responses(
        (status = 200, description = "Configuración actualizada", body = ScoringConfig),
        (status = 400, description = "Pesos o niveles inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn update_config(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<UpdateConfigPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = app_state
        .config_service
        .update(
            &app_state.db_pool,
            tenant.0,
            payload.pesos,
            payload.niveles,
            payload.meses_reevaluacion,
        )
        .await?;

    Ok((StatusCode::OK, Json(config)))
}
