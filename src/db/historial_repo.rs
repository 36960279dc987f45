// src/db/historial_repo.rs
//
// Repositório do histórico append-only. A imutabilidade é arquitetural:
// este arquivo só contém INSERT e SELECT. Não escreva UPDATE/DELETE aqui.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::historial::{
        ActivoItem, ConsultaBuro, HistorialActivo, HistorialEstadoFinanciero, HistorialScoring,
        RegistradoPor,
    },
    models::scoring::{ItemScoring, NivelRiesgo},
};

const LIMITE_DEFAULT: i64 = 50;

#[derive(Clone)]
pub struct HistorialRepository {
    pool: PgPool,
}

impl HistorialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  1. SNAPSHOTS DE SCORING
    // =========================================================================

    pub async fn insert_scoring<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        factores_evaluados: &[ItemScoring],
        score_total: f64,
        nivel: Option<NivelRiesgo>,
        datos_soporte: &Value,
        vigencia_dias: i32,
        registrado_por: &RegistradoPor,
    ) -> Result<HistorialScoring, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registro = sqlx::query_as::<_, HistorialScoring>(
            r#"
            INSERT INTO historial_scoring (
                tenant_id, crm_organizacion_id, factores_evaluados, score_total,
                nivel, datos_soporte, vigencia_dias,
                registrado_por_id, registrado_por_nombre
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(Json(factores_evaluados.to_vec()))
        .bind(score_total)
        .bind(nivel)
        .bind(Json(datos_soporte.clone()))
        .bind(vigencia_dias)
        .bind(registrado_por.id)
        .bind(&registrado_por.nombre)
        .fetch_one(executor)
        .await?;

        Ok(registro)
    }

    pub async fn list_scoring<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialScoring>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registros = sqlx::query_as::<_, HistorialScoring>(
            r#"
            SELECT * FROM historial_scoring
            WHERE tenant_id = $1 AND crm_organizacion_id = $2
            ORDER BY creado_en DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(limit.unwrap_or(LIMITE_DEFAULT))
        .fetch_all(executor)
        .await?;

        Ok(registros)
    }

    // O mais recente; a checagem de vigência fica no serviço/modelo.
    pub async fn latest_scoring<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
    ) -> Result<Option<HistorialScoring>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registro = sqlx::query_as::<_, HistorialScoring>(
            r#"
            SELECT * FROM historial_scoring
            WHERE tenant_id = $1 AND crm_organizacion_id = $2
            ORDER BY creado_en DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .fetch_optional(executor)
        .await?;

        Ok(registro)
    }

    // =========================================================================
    //  2. ESTADOS FINANCIEROS
    // =========================================================================

    pub async fn insert_estado_financiero<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        periodo: NaiveDate,
        activos_totales: Decimal,
        pasivos_totales: Decimal,
        patrimonio: Decimal,
        ingresos: Option<Decimal>,
        gastos: Option<Decimal>,
        detalle: &Value,
        registrado_por: &RegistradoPor,
    ) -> Result<HistorialEstadoFinanciero, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registro = sqlx::query_as::<_, HistorialEstadoFinanciero>(
            r#"
            INSERT INTO historial_estados_financieros (
                tenant_id, crm_organizacion_id, periodo,
                activos_totales, pasivos_totales, patrimonio, ingresos, gastos,
                detalle, registrado_por_id, registrado_por_nombre
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(periodo)
        .bind(activos_totales)
        .bind(pasivos_totales)
        .bind(patrimonio)
        .bind(ingresos)
        .bind(gastos)
        .bind(Json(detalle.clone()))
        .bind(registrado_por.id)
        .bind(&registrado_por.nombre)
        .fetch_one(executor)
        .await?;

        Ok(registro)
    }

    pub async fn list_estados_financieros<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialEstadoFinanciero>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registros = sqlx::query_as::<_, HistorialEstadoFinanciero>(
            r#"
            SELECT * FROM historial_estados_financieros
            WHERE tenant_id = $1 AND crm_organizacion_id = $2
            ORDER BY creado_en DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(limit.unwrap_or(LIMITE_DEFAULT))
        .fetch_all(executor)
        .await?;

        Ok(registros)
    }

    // =========================================================================
    //  3. ACTIVOS
    // =========================================================================

    pub async fn insert_activo<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        activos: &[ActivoItem],
        total: Decimal,
        registrado_por: &RegistradoPor,
    ) -> Result<HistorialActivo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registro = sqlx::query_as::<_, HistorialActivo>(
            r#"
            INSERT INTO historial_activos (
                tenant_id, crm_organizacion_id, activos, total,
                registrado_por_id, registrado_por_nombre
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(Json(activos.to_vec()))
        .bind(total)
        .bind(registrado_por.id)
        .bind(&registrado_por.nombre)
        .fetch_one(executor)
        .await?;

        Ok(registro)
    }

    pub async fn list_activos<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialActivo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registros = sqlx::query_as::<_, HistorialActivo>(
            r#"
            SELECT * FROM historial_activos
            WHERE tenant_id = $1 AND crm_organizacion_id = $2
            ORDER BY creado_en DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(limit.unwrap_or(LIMITE_DEFAULT))
        .fetch_all(executor)
        .await?;

        Ok(registros)
    }

    // =========================================================================
    //  4. CONSULTAS A BURÓ
    // =========================================================================

    pub async fn insert_consulta_buro<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        fuente: &str,
        score: Option<f64>,
        respuesta: &Value,
        registrado_por: &RegistradoPor,
    ) -> Result<ConsultaBuro, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registro = sqlx::query_as::<_, ConsultaBuro>(
            r#"
            INSERT INTO historial_consultas_buro (
                tenant_id, crm_organizacion_id, fuente, score, respuesta,
                registrado_por_id, registrado_por_nombre
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(fuente)
        .bind(score)
        .bind(Json(respuesta.clone()))
        .bind(registrado_por.id)
        .bind(&registrado_por.nombre)
        .fetch_one(executor)
        .await?;

        Ok(registro)
    }

    pub async fn list_consultas_buro<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ConsultaBuro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let registros = sqlx::query_as::<_, ConsultaBuro>(
            r#"
            SELECT * FROM historial_consultas_buro
            WHERE tenant_id = $1 AND crm_organizacion_id = $2
            ORDER BY creado_en DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(limit.unwrap_or(LIMITE_DEFAULT))
        .fetch_all(executor)
        .await?;

        Ok(registros)
    }
}
