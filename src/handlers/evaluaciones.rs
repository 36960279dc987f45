// src/handlers/evaluaciones.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::evaluacion::{EstadoEvaluacion, Evaluacion},
    models::historial::RegistradoPor,
    models::scoring::{ItemScoring, NivelRiesgo},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearEvaluacionPayload {
    pub crm_organizacion_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Comercial Andina S.A.S.")]
    pub razon_social: String,

    #[schema(example = "900123456-7")]
    pub nit: Option<String>,

    #[schema(value_type = f64, example = 2000000)]
    pub patrimonio: Decimal,

    pub items: Vec<ItemScoring>,

    #[schema(example = 720.0)]
    pub score_buro: Option<f64>,

    pub ajuste_manual: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AprobarPayload {
    // Opcional no payload para que a ausência vire erro de validação
    // nosso (400), não rejeição de deserialização do axum.
    pub nivel_asignado: Option<NivelRiesgo>,

    #[schema(value_type = Option<f64>, example = 500000)]
    pub cupo_asignado: Option<Decimal>,

    pub aprobado_por: RegistradoPor,

    #[schema(example = 90)]
    pub vigencia_dias: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RechazarPayload {
    #[schema(example = "Patrimonio insuficiente para el cupo solicitado")]
    pub motivo: Option<String>,

    pub rechazado_por: RegistradoPor,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarEvaluacionPayload {
    pub razon_social: Option<String>,
    pub nit: Option<String>,
    pub score_buro: Option<f64>,
    pub ajuste_manual: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListarEvaluacionesQuery {
    pub crm_organizacion_id: Option<Uuid>,
    pub estado: Option<EstadoEvaluacion>,

    #[serde(default)]
    pub incluir_eliminadas: bool,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/evaluaciones
#[utoipa::path(
    post,
    path = "/api/evaluaciones",
    tag = "Evaluaciones",
    request_body = CrearEvaluacionPayload,
    responses(
        (status = 201, description = "Evaluación creada en pendiente, con score calculado", body = Evaluacion),
        (status = 400, description = "Lista de ítems vacía u otros datos inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn crear_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CrearEvaluacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let evaluacion = app_state
        .evaluacion_service
        .crear(
            &app_state.db_pool,
            tenant.0,
            payload.crm_organizacion_id,
            &payload.razon_social,
            payload.nit.as_deref(),
            payload.patrimonio,
            payload.items,
            payload.score_buro,
            payload.ajuste_manual,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(evaluacion)))
}

// GET /api/evaluaciones
#[utoipa::path(
    get,
    path = "/api/evaluaciones",
    tag = "Evaluaciones",
    responses(
        (status = 200, description = "Evaluaciones del tenant, más recientes primero", body = Vec<Evaluacion>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Option<Uuid>, Query, description = "Filtrar por cliente"),
        ("estado" = Option<String>, Query, description = "pendiente | aprobada | rechazada"),
        ("incluirEliminadas" = Option<bool>, Query, description = "Incluir soft-deleted")
    )
)]
pub async fn listar_evaluaciones(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListarEvaluacionesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let evaluaciones = app_state
        .evaluacion_service
        .listar(
            &app_state.db_pool,
            tenant.0,
            query.crm_organizacion_id,
            query.estado,
            query.incluir_eliminadas,
        )
        .await?;

    Ok((StatusCode::OK, Json(evaluaciones)))
}

// GET /api/evaluaciones/{id}
#[utoipa::path(
    get,
    path = "/api/evaluaciones/{id}",
    tag = "Evaluaciones",
    responses(
        (status = 200, description = "Evaluación encontrada", body = Evaluacion),
        (status = 404, description = "No existe para este tenant")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("id" = Uuid, Path, description = "ID de la evaluación")
    )
)]
pub async fn obtener_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let evaluacion = app_state
        .evaluacion_service
        .buscar(&app_state.db_pool, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(evaluacion)))
}

// POST /api/evaluaciones/{id}/aprobar
#[utoipa::path(
    post,
    path = "/api/evaluaciones/{id}/aprobar",
    tag = "Evaluaciones",
    request_body = AprobarPayload,
    responses(
        (status = 200, description = "Evaluación aprobada y snapshot agregado al historial", body = Evaluacion),
        (status = 400, description = "Falta el nivel o el cupo"),
        (status = 404, description = "No existe"),
        (status = 409, description = "Ya está en estado terminal; nada fue sobrescrito")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("id" = Uuid, Path, description = "ID de la evaluación")
    )
)]
pub async fn aprobar_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AprobarPayload>,
) -> Result<impl IntoResponse, AppError> {
    let nivel = payload.nivel_asignado.ok_or_else(|| {
        AppError::Validation("El nivel asignado es obligatorio para aprobar.".to_string())
    })?;
    let cupo = payload.cupo_asignado.ok_or_else(|| {
        AppError::Validation("El cupo asignado es obligatorio para aprobar.".to_string())
    })?;

    let evaluacion = app_state
        .evaluacion_service
        .aprobar(
            &app_state.db_pool,
            tenant.0,
            id,
            nivel,
            cupo,
            payload.aprobado_por,
            payload.vigencia_dias,
        )
        .await?;

    Ok((StatusCode::OK, Json(evaluacion)))
}

// POST /api/evaluaciones/{id}/rechazar
#[utoipa::path(
    post,
    path = "/api/evaluaciones/{id}/rechazar",
    tag = "Evaluaciones",
    request_body = RechazarPayload,
    responses(
        (status = 200, description = "Evaluación rechazada", body = Evaluacion),
        (status = 404, description = "No existe"),
        (status = 409, description = "Ya está en estado terminal")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("id" = Uuid, Path, description = "ID de la evaluación")
    )
)]
pub async fn rechazar_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RechazarPayload>,
) -> Result<impl IntoResponse, AppError> {
    let evaluacion = app_state
        .evaluacion_service
        .rechazar(
            &app_state.db_pool,
            tenant.0,
            id,
            payload.motivo.as_deref(),
            payload.rechazado_por,
        )
        .await?;

    Ok((StatusCode::OK, Json(evaluacion)))
}

// PUT /api/evaluaciones/{id}
#[utoipa::path(
    put,
    path = "/api/evaluaciones/{id}",
    tag = "Evaluaciones",
    request_body = ActualizarEvaluacionPayload,
    responses(
        (status = 200, description = "Evaluación actualizada (solo en pendiente)", body = Evaluacion),
        (status = 404, description = "No existe"),
        (status = 409, description = "Ya no está pendiente")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("id" = Uuid, Path, description = "ID de la evaluación")
    )
)]
pub async fn actualizar_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActualizarEvaluacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let evaluacion = app_state
        .evaluacion_service
        .actualizar(
            &app_state.db_pool,
            tenant.0,
            id,
            payload.razon_social.as_deref(),
            payload.nit.as_deref(),
            payload.score_buro,
            payload.ajuste_manual,
        )
        .await?;

    Ok((StatusCode::OK, Json(evaluacion)))
}

// DELETE /api/evaluaciones/{id}
#[utoipa::path(
    delete,
    path = "/api/evaluaciones/{id}",
    tag = "Evaluaciones",
    responses(
        (status = 200, description = "Evaluación soft-deleted (solo en pendiente)", body = Evaluacion),
        (status = 404, description = "No existe"),
        (status = 409, description = "Ya no está pendiente")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("id" = Uuid, Path, description = "ID de la evaluación")
    )
)]
pub async fn eliminar_evaluacion(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let evaluacion = app_state
        .evaluacion_service
        .eliminar(&app_state.db_pool, tenant.0, id)
        .await?;

    Ok((StatusCode::OK, Json(evaluacion)))
}
