// src/models/evaluacion.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::scoring::{ItemScoring, NivelRiesgo};

// Estado do workflow de avaliação. `pendiente` é o único estado que
// aceita mutação; `aprobada` e `rechazada` são terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "estado_evaluacion", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EstadoEvaluacion {
    Pendiente,
    Aprobada,
    Rechazada,
}

impl EstadoEvaluacion {
    pub fn es_terminal(&self) -> bool {
        matches!(self, Self::Aprobada | Self::Rechazada)
    }

    // Mensagem de conflito para uma transição sobre estado terminal.
    // O guard de verdade é o UPDATE condicional no repositório; isto só
    // traduz o estado observado para o cliente.
    pub fn mensaje_conflicto(&self) -> &'static str {
        match self {
            Self::Aprobada => "La evaluación ya fue aprobada; no admite otra transición.",
            Self::Rechazada => "La evaluación ya fue rechazada; no admite otra transición.",
            Self::Pendiente => "La evaluación sigue pendiente.",
        }
    }
}

// Registro de avaliação de crédito. `score_total` é calculado UMA vez na
// criação (decisão point-in-time) e nunca recalculado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Evaluacion {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub crm_organizacion_id: Uuid,

    #[schema(example = "Comercial Andina S.A.S.")]
    pub razon_social: String,

    #[schema(example = "900123456-7")]
    pub nit: Option<String>,

    #[schema(value_type = f64, example = 2000000)]
    pub patrimonio: Decimal,

    #[schema(value_type = Vec<ItemScoring>)]
    pub items: Json<Vec<ItemScoring>>,

    // Registrados junto ao score, mas nunca misturados no cálculo:
    // o composite deve ser reproduzível só a partir de `items`.
    #[schema(example = 720.0)]
    pub score_buro: Option<f64>,
    pub ajuste_manual: Option<f64>,

    #[schema(example = 80.5)]
    pub score_total: f64,

    pub nivel_sugerido: Option<NivelRiesgo>,

    pub estado: EstadoEvaluacion,

    pub nivel_asignado: Option<NivelRiesgo>,

    #[schema(value_type = Option<f64>, example = 500000)]
    pub cupo_asignado: Option<Decimal>,

    pub aprobado_por: Option<Uuid>,
    pub aprobado_por_nombre: Option<String>,
    pub fecha_aprobacion: Option<DateTime<Utc>>,
    pub motivo_rechazo: Option<String>,

    pub eliminado_en: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solo_los_estados_finales_son_terminales() {
        assert!(!EstadoEvaluacion::Pendiente.es_terminal());
        assert!(EstadoEvaluacion::Aprobada.es_terminal());
        assert!(EstadoEvaluacion::Rechazada.es_terminal());
    }
}
