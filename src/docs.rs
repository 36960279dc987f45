// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Configuración de scoring ---
        handlers::config::get_config,
        handlers::config::update_config,

        // --- Evaluaciones ---
        handlers::evaluaciones::crear_evaluacion,
        handlers::evaluaciones::listar_evaluaciones,
        handlers::evaluaciones::obtener_evaluacion,
        handlers::evaluaciones::actualizar_evaluacion,
        handlers::evaluaciones::eliminar_evaluacion,
        handlers::evaluaciones::aprobar_evaluacion,
        handlers::evaluaciones::rechazar_evaluacion,

        // --- Historial ---
        handlers::historial::agregar_scoring,
        handlers::historial::listar_scoring,
        handlers::historial::scoring_vigente,
        handlers::historial::agregar_estado_financiero,
        handlers::historial::listar_estados_financieros,
        handlers::historial::agregar_activos,
        handlers::historial::listar_activos,
        handlers::historial::agregar_consulta_buro,
        handlers::historial::listar_consultas_buro,
    ),
    components(
        schemas(
            models::scoring::ScoringConfig,
            models::scoring::Pesos,
            models::scoring::NivelUmbral,
            models::scoring::NivelRiesgo,
            models::scoring::CategoriaItem,
            models::scoring::ItemScoring,
            models::evaluacion::Evaluacion,
            models::evaluacion::EstadoEvaluacion,
            models::historial::RegistradoPor,
            models::historial::HistorialScoring,
            models::historial::HistorialEstadoFinanciero,
            models::historial::ActivoItem,
            models::historial::HistorialActivo,
            models::historial::ConsultaBuro,
            handlers::config::UpdateConfigPayload,
            handlers::evaluaciones::CrearEvaluacionPayload,
            handlers::evaluaciones::AprobarPayload,
            handlers::evaluaciones::RechazarPayload,
            handlers::evaluaciones::ActualizarEvaluacionPayload,
            handlers::historial::AgregarScoringPayload,
            handlers::historial::AgregarEstadoFinancieroPayload,
            handlers::historial::AgregarActivosPayload,
            handlers::historial::AgregarConsultaBuroPayload,
        )
    ),
    tags(
        (name = "Configuración", description = "Pesos y umbrales de scoring por tenant"),
        (name = "Evaluaciones", description = "Workflow de evaluación de crédito"),
        (name = "Historial", description = "Ledger append-only por cliente")
    )
)]
pub struct ApiDoc;
