// src/handlers/historial.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::historial::{
        ActivoItem, ConsultaBuro, HistorialActivo, HistorialEstadoFinanciero, HistorialScoring,
        RegistradoPor,
    },
    models::scoring::{ItemScoring, NivelRiesgo},
};

// Query comum a todas as listagens do historial
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorialQuery {
    pub crm_organizacion_id: Uuid,
    pub limit: Option<i64>,
}

// =============================================================================
//  1. SCORING
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgregarScoringPayload {
    pub crm_organizacion_id: Uuid,

    pub factores_evaluados: Vec<ItemScoring>,

    #[schema(example = 80.5)]
    pub score_total: f64,

    pub nivel: Option<NivelRiesgo>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub datos_soporte: Value,

    #[schema(example = 90)]
    pub vigencia_dias: i32,

    pub registrado_por: RegistradoPor,
}

// POST /api/historial/scoring
#[utoipa::path(
    post,
    path = "/api/historial/scoring",
    tag = "Historial",
    request_body = AgregarScoringPayload,
    responses(
        (status = 201, description = "Snapshot de scoring agregado (inmutable)", body = HistorialScoring),
        (status = 400, description = "Factores vacíos o vigencia inválida")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn agregar_scoring(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<AgregarScoringPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let registro = app_state
        .historial_service
        .agregar_scoring(
            &app_state.db_pool,
            tenant.0,
            payload.crm_organizacion_id,
            payload.factores_evaluados,
            payload.score_total,
            payload.nivel,
            payload.datos_soporte,
            payload.vigencia_dias,
            payload.registrado_por,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

// GET /api/historial/scoring
#[utoipa::path(
    get,
    path = "/api/historial/scoring",
    tag = "Historial",
    responses(
        (status = 200, description = "Snapshots de scoring, más recientes primero", body = Vec<HistorialScoring>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Uuid, Query, description = "ID del cliente"),
        ("limit" = Option<i64>, Query, description = "Máximo de registros")
    )
)]
pub async fn listar_scoring(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<HistorialQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state
        .historial_service
        .historial_scoring(
            &app_state.db_pool,
            tenant.0,
            query.crm_organizacion_id,
            query.limit,
        )
        .await?;

    Ok((StatusCode::OK, Json(registros)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VigenteQuery {
    pub crm_organizacion_id: Uuid,
}

// GET /api/historial/scoring/vigente
//
// `registro: null` significa "necesita reevaluación", tanto para cliente
// sin historial como para snapshot vencido. Nunca devolvemos un snapshot
// vencido como si fuera vigente.
#[utoipa::path(
    get,
    path = "/api/historial/scoring/vigente",
    tag = "Historial",
    responses(
        (status = 200, description = "Último snapshot si sigue vigente; null si venció o no existe")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Uuid, Query, description = "ID del cliente")
    )
)]
pub async fn scoring_vigente(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<VigenteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registro = app_state
        .historial_service
        .scoring_vigente(&app_state.db_pool, tenant.0, query.crm_organizacion_id)
        .await?;

    let body = json!({
        "vigente": registro.is_some(),
        "registro": registro,
    });

    Ok((StatusCode::OK, Json(body)))
}

// =============================================================================
//  2. ESTADOS FINANCIEROS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgregarEstadoFinancieroPayload {
    pub crm_organizacion_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-12-31")]
    pub periodo: NaiveDate,

    #[schema(value_type = f64)]
    pub activos_totales: Decimal,

    #[schema(value_type = f64)]
    pub pasivos_totales: Decimal,

    #[schema(value_type = f64)]
    pub patrimonio: Decimal,

    #[schema(value_type = Option<f64>)]
    pub ingresos: Option<Decimal>,

    #[schema(value_type = Option<f64>)]
    pub gastos: Option<Decimal>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub detalle: Value,

    pub registrado_por: RegistradoPor,
}

// POST /api/historial/estados-financieros
#[utoipa::path(
    post,
    path = "/api/historial/estados-financieros",
    tag = "Historial",
    request_body = AgregarEstadoFinancieroPayload,
    responses(
        (status = 201, description = "Snapshot financiero agregado", body = HistorialEstadoFinanciero)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn agregar_estado_financiero(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<AgregarEstadoFinancieroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let registro = app_state
        .historial_service
        .agregar_estado_financiero(
            &app_state.db_pool,
            tenant.0,
            payload.crm_organizacion_id,
            payload.periodo,
            payload.activos_totales,
            payload.pasivos_totales,
            payload.patrimonio,
            payload.ingresos,
            payload.gastos,
            payload.detalle,
            payload.registrado_por,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

// GET /api/historial/estados-financieros
#[utoipa::path(
    get,
    path = "/api/historial/estados-financieros",
    tag = "Historial",
    responses(
        (status = 200, description = "Snapshots financieros, más recientes primero", body = Vec<HistorialEstadoFinanciero>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Uuid, Query, description = "ID del cliente"),
        ("limit" = Option<i64>, Query, description = "Máximo de registros")
    )
)]
pub async fn listar_estados_financieros(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<HistorialQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state
        .historial_service
        .historial_estados_financieros(
            &app_state.db_pool,
            tenant.0,
            query.crm_organizacion_id,
            query.limit,
        )
        .await?;

    Ok((StatusCode::OK, Json(registros)))
}

// =============================================================================
//  3. ACTIVOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgregarActivosPayload {
    pub crm_organizacion_id: Uuid,

    pub activos: Vec<ActivoItem>,

    pub registrado_por: RegistradoPor,
}

// POST /api/historial/activos
#[utoipa::path(
    post,
    path = "/api/historial/activos",
    tag = "Historial",
    request_body = AgregarActivosPayload,
    responses(
        (status = 201, description = "Snapshot de activos agregado; el total se calcula en el servidor", body = HistorialActivo),
        (status = 400, description = "Lista de activos vacía")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn agregar_activos(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<AgregarActivosPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let registro = app_state
        .historial_service
        .agregar_activos(
            &app_state.db_pool,
            tenant.0,
            payload.crm_organizacion_id,
            payload.activos,
            payload.registrado_por,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

// GET /api/historial/activos
#[utoipa::path(
    get,
    path = "/api/historial/activos",
    tag = "Historial",
    responses(
        (status = 200, description = "Snapshots de activos, más recientes primero", body = Vec<HistorialActivo>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Uuid, Query, description = "ID del cliente"),
        ("limit" = Option<i64>, Query, description = "Máximo de registros")
    )
)]
pub async fn listar_activos(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<HistorialQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state
        .historial_service
        .historial_activos(
            &app_state.db_pool,
            tenant.0,
            query.crm_organizacion_id,
            query.limit,
        )
        .await?;

    Ok((StatusCode::OK, Json(registros)))
}

// =============================================================================
//  4. CONSULTAS A BURÓ
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgregarConsultaBuroPayload {
    pub crm_organizacion_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "datacredito")]
    pub fuente: String,

    #[schema(example = 720.0)]
    pub score: Option<f64>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub respuesta: Value,

    pub registrado_por: RegistradoPor,
}

// POST /api/historial/consultas-buro
#[utoipa::path(
    post,
    path = "/api/historial/consultas-buro",
    tag = "Historial",
    request_body = AgregarConsultaBuroPayload,
    responses(
        (status = 201, description = "Consulta a buró registrada", body = ConsultaBuro)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant")
    )
)]
pub async fn agregar_consulta_buro(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<AgregarConsultaBuroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let registro = app_state
        .historial_service
        .agregar_consulta_buro(
            &app_state.db_pool,
            tenant.0,
            payload.crm_organizacion_id,
            &payload.fuente,
            payload.score,
            payload.respuesta,
            payload.registrado_por,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(registro)))
}

// GET /api/historial/consultas-buro
#[utoipa::path(
    get,
    path = "/api/historial/consultas-buro",
    tag = "Historial",
    responses(
        (status = 200, description = "Consultas a buró, más recientes primero", body = Vec<ConsultaBuro>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID del tenant"),
        ("crmOrganizacionId" = Uuid, Query, description = "ID del cliente"),
        ("limit" = Option<i64>, Query, description = "Máximo de registros")
    )
)]
pub async fn listar_consultas_buro(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<HistorialQuery>,
) -> Result<impl IntoResponse, AppError> {
    let registros = app_state
        .historial_service
        .historial_consultas_buro(
            &app_state.db_pool,
            tenant.0,
            query.crm_organizacion_id,
            query.limit,
        )
        .await?;

    Ok((StatusCode::OK, Json(registros)))
}
