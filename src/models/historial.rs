// src/models/historial.rs
//
// Entradas do histórico (ledger) por cliente. Todas são imutáveis depois
// de gravadas: o repositório só expõe INSERT e SELECT, não existe caminho
// de UPDATE/DELETE para nenhuma delas.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::scoring::{ItemScoring, NivelRiesgo};

// Identidade obrigatória de quem registrou a entrada (trilha de auditoria).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistradoPor {
    pub id: Uuid,

    #[schema(example = "Laura Méndez")]
    pub nombre: String,
}

// --- 1. Snapshot de scoring ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorialScoring {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub crm_organizacion_id: Uuid,

    #[schema(value_type = Vec<ItemScoring>)]
    pub factores_evaluados: Json<Vec<ItemScoring>>,

    #[schema(example = 80.5)]
    pub score_total: f64,

    pub nivel: Option<NivelRiesgo>,

    // Cifras de apoio (patrimonio, cupo, score de buró...) no momento
    // da decisão.
    #[schema(value_type = Object)]
    pub datos_soporte: Json<Value>,

    #[schema(example = 90)]
    pub vigencia_dias: i32,

    pub registrado_por_id: Uuid,
    pub registrado_por_nombre: String,
    pub creado_en: DateTime<Utc>,
}

impl HistorialScoring {
    // Janela de validade: o snapshot vale até creado_en + vigencia_dias.
    // Depois disso o chamador deve disparar uma nova avaliação.
    pub fn es_vigente(&self, ahora: DateTime<Utc>) -> bool {
        ahora <= self.creado_en + Duration::days(i64::from(self.vigencia_dias))
    }
}

// --- 2. Snapshot de estados financieros ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorialEstadoFinanciero {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

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

    #[schema(value_type = Object)]
    pub detalle: Json<Value>,

    pub registrado_por_id: Uuid,
    pub registrado_por_nombre: String,
    pub creado_en: DateTime<Utc>,
}

// --- 3. Snapshot de activos ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivoItem {
    #[schema(example = "Bodega zona franca")]
    pub descripcion: String,

    #[schema(value_type = f64, example = 120000)]
    pub valor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistorialActivo {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub crm_organizacion_id: Uuid,

    #[schema(value_type = Vec<ActivoItem>)]
    pub activos: Json<Vec<ActivoItem>>,

    #[schema(value_type = f64)]
    pub total: Decimal,

    pub registrado_por_id: Uuid,
    pub registrado_por_nombre: String,
    pub creado_en: DateTime<Utc>,
}

// --- 4. Log de consultas a centrales de riesgo (buró) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultaBuro {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub crm_organizacion_id: Uuid,

    #[schema(example = "datacredito")]
    pub fuente: String,

    #[schema(example = 720.0)]
    pub score: Option<f64>,

    #[schema(value_type = Object)]
    pub respuesta: Json<Value>,

    pub registrado_por_id: Uuid,
    pub registrado_por_nombre: String,
    pub creado_en: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(creado_en: DateTime<Utc>, vigencia_dias: i32) -> HistorialScoring {
        HistorialScoring {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            crm_organizacion_id: Uuid::new_v4(),
            factores_evaluados: Json(vec![]),
            score_total: 80.5,
            nivel: Some(NivelRiesgo::B),
            datos_soporte: Json(json!({})),
            vigencia_dias,
            registrado_por_id: Uuid::new_v4(),
            registrado_por_nombre: "Analista".to_string(),
            creado_en,
        }
    }

    #[test]
    fn snapshot_vigente_dentro_de_la_ventana() {
        let t0 = Utc::now();
        let s = snapshot(t0, 90);
        assert!(s.es_vigente(t0 + Duration::days(89)));
    }

    #[test]
    fn snapshot_vencido_fuera_de_la_ventana() {
        let t0 = Utc::now();
        let s = snapshot(t0, 90);
        assert!(!s.es_vigente(t0 + Duration::days(91)));
    }

    #[test]
    fn el_limite_exacto_sigue_vigente() {
        let t0 = Utc::now();
        let s = snapshot(t0, 90);
        assert!(s.es_vigente(t0 + Duration::days(90)));
    }
}
