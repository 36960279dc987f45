// src/services/historial_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::HistorialRepository,
    models::historial::{
        ActivoItem, ConsultaBuro, HistorialActivo, HistorialEstadoFinanciero, HistorialScoring,
        RegistradoPor,
    },
    models::scoring::{ItemScoring, NivelRiesgo},
};

#[derive(Clone)]
pub struct HistorialService {
    repo: HistorialRepository,
}

impl HistorialService {
    pub fn new(repo: HistorialRepository) -> Self {
        Self { repo }
    }

    // Append manual de um snapshot de scoring (fora do fluxo de aprovação;
    // a aprovação grava o dela dentro da própria transação do workflow).
    pub async fn agregar_scoring<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        factores_evaluados: Vec<ItemScoring>,
        score_total: f64,
        nivel: Option<NivelRiesgo>,
        datos_soporte: Value,
        vigencia_dias: i32,
        registrado_por: RegistradoPor,
    ) -> Result<HistorialScoring, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if factores_evaluados.is_empty() {
            return Err(AppError::Validation(
                "El snapshot de scoring debe incluir los factores evaluados.".to_string(),
            ));
        }
        if vigencia_dias <= 0 {
            return Err(AppError::Validation(
                "La vigencia debe ser un número positivo de días.".to_string(),
            ));
        }

        self.repo
            .insert_scoring(
                executor,
                tenant_id,
                crm_organizacion_id,
                &factores_evaluados,
                score_total,
                nivel,
                &datos_soporte,
                vigencia_dias,
                &registrado_por,
            )
            .await
    }

    pub async fn historial_scoring<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialScoring>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_scoring(executor, tenant_id, crm_organizacion_id, limit)
            .await
    }

    // Determinação "vigente": pega o snapshot mais recente e testa a
    // janela de validade. Um snapshot vencido NÃO é devolvido; `None`
    // sinaliza que o cliente precisa de nova avaliação.
    pub async fn scoring_vigente<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
    ) -> Result<Option<HistorialScoring>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ultimo = self
            .repo
            .latest_scoring(executor, tenant_id, crm_organizacion_id)
            .await?;

        Ok(ultimo.filter(|registro| registro.es_vigente(Utc::now())))
    }

    pub async fn agregar_estado_financiero<'e, E>(
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
        detalle: Value,
        registrado_por: RegistradoPor,
    ) -> Result<HistorialEstadoFinanciero, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .insert_estado_financiero(
                executor,
                tenant_id,
                crm_organizacion_id,
                periodo,
                activos_totales,
                pasivos_totales,
                patrimonio,
                ingresos,
                gastos,
                &detalle,
                &registrado_por,
            )
            .await
    }

    pub async fn historial_estados_financieros<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialEstadoFinanciero>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_estados_financieros(executor, tenant_id, crm_organizacion_id, limit)
            .await
    }

    // O total do snapshot de activos é derivado dos itens, não confiado
    // ao payload.
    pub async fn agregar_activos<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        activos: Vec<ActivoItem>,
        registrado_por: RegistradoPor,
    ) -> Result<HistorialActivo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if activos.is_empty() {
            return Err(AppError::Validation(
                "El snapshot de activos debe incluir al menos un activo.".to_string(),
            ));
        }

        let total: Decimal = activos.iter().map(|a| a.valor).sum();

        self.repo
            .insert_activo(
                executor,
                tenant_id,
                crm_organizacion_id,
                &activos,
                total,
                &registrado_por,
            )
            .await
    }

    pub async fn historial_activos<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistorialActivo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_activos(executor, tenant_id, crm_organizacion_id, limit)
            .await
    }

    pub async fn agregar_consulta_buro<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        fuente: &str,
        score: Option<f64>,
        respuesta: Value,
        registrado_por: RegistradoPor,
    ) -> Result<ConsultaBuro, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .insert_consulta_buro(
                executor,
                tenant_id,
                crm_organizacion_id,
                fuente,
                score,
                &respuesta,
                &registrado_por,
            )
            .await
    }

    pub async fn historial_consultas_buro<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ConsultaBuro>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_consultas_buro(executor, tenant_id, crm_organizacion_id, limit)
            .await
    }
}
