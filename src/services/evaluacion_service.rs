// src/services/evaluacion_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ConfigRepository, EvaluacionRepository, HistorialRepository},
    models::evaluacion::{EstadoEvaluacion, Evaluacion},
    models::historial::RegistradoPor,
    models::scoring::{ItemScoring, NivelRiesgo},
    services::scoring::{calcular_score, clasificar},
};

// Dias por mês ao converter a cadência de reevaluación em vigência.
const DIAS_POR_MES: i32 = 30;

#[derive(Clone)]
pub struct EvaluacionService {
    repo: EvaluacionRepository,
    config_repo: ConfigRepository,
    historial_repo: HistorialRepository,
}

impl EvaluacionService {
    pub fn new(
        repo: EvaluacionRepository,
        config_repo: ConfigRepository,
        historial_repo: HistorialRepository,
    ) -> Self {
        Self {
            repo,
            config_repo,
            historial_repo,
        }
    }

    // Cria a avaliação em `pendiente`. O score é calculado AQUI, uma única
    // vez, com a configuração vigente do tenant; o registro carrega também
    // a sugestão de nível do classificador como dado point-in-time.
    pub async fn crear<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        razon_social: &str,
        nit: Option<&str>,
        patrimonio: Decimal,
        items: Vec<ItemScoring>,
        score_buro: Option<f64>,
        ajuste_manual: Option<f64>,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Err(AppError::Validation(
                "La evaluación debe incluir al menos un ítem de scoring.".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        let config = self.config_repo.get_or_create(&mut *tx, tenant_id).await?;
        let score_total = calcular_score(&items, &config.pesos.0);
        let nivel_sugerido = clasificar(score_total, patrimonio, &config.niveles.0);

        let evaluacion = self
            .repo
            .insert(
                &mut *tx,
                tenant_id,
                crm_organizacion_id,
                razon_social,
                nit,
                patrimonio,
                &items,
                score_buro,
                ajuste_manual,
                score_total,
                nivel_sugerido,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            evaluacion = %evaluacion.id,
            score = score_total,
            "evaluación creada en estado pendiente"
        );

        Ok(evaluacion)
    }

    pub async fn buscar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, tenant_id, id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("La evaluación no existe.".to_string()))
    }

    pub async fn listar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Option<Uuid>,
        estado: Option<EstadoEvaluacion>,
        incluir_eliminadas: bool,
    ) -> Result<Vec<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list(
                executor,
                tenant_id,
                crm_organizacion_id,
                estado,
                incluir_eliminadas,
            )
            .await
    }

    // Aprovação: transição condicional + snapshot de scoring na MESMA
    // transação. Se o append do histórico falhar, a aprovação inteira é
    // revertida; não existe "aprobada mas sem trilha de auditoria".
    pub async fn aprobar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        nivel: NivelRiesgo,
        cupo: Decimal,
        aprobado_por: RegistradoPor,
        vigencia_dias: Option<i32>,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let actualizada = self
            .repo
            .aprobar_condicional(
                &mut *tx,
                tenant_id,
                id,
                nivel,
                cupo,
                aprobado_por.id,
                &aprobado_por.nombre,
            )
            .await?;

        let evaluacion = match actualizada {
            Some(e) => e,
            // Zero linhas: ou não existe, ou já saiu de pendiente. A
            // leitura aqui só traduz o motivo; o guard foi o UPDATE.
            None => {
                return Err(self.motivo_transicion_fallida(&mut tx, tenant_id, id).await?);
            }
        };

        if evaluacion.nivel_sugerido != Some(nivel) {
            tracing::warn!(
                evaluacion = %evaluacion.id,
                sugerido = ?evaluacion.nivel_sugerido,
                asignado = ?nivel,
                "nivel aprobado distinto del sugerido por el clasificador"
            );
        }

        let config = self.config_repo.get_or_create(&mut *tx, tenant_id).await?;
        let vigencia = vigencia_dias.unwrap_or(config.meses_reevaluacion * DIAS_POR_MES);

        let datos_soporte = json!({
            "patrimonio": evaluacion.patrimonio,
            "cupoAsignado": cupo,
            "scoreBuro": evaluacion.score_buro,
            "ajusteManual": evaluacion.ajuste_manual,
            "nivelSugerido": evaluacion.nivel_sugerido,
        });

        self.historial_repo
            .insert_scoring(
                &mut *tx,
                tenant_id,
                evaluacion.crm_organizacion_id,
                &evaluacion.items.0,
                evaluacion.score_total,
                Some(nivel),
                &datos_soporte,
                vigencia,
                &aprobado_por,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            evaluacion = %evaluacion.id,
            nivel = ?nivel,
            "evaluación aprobada y snapshot registrado"
        );

        Ok(evaluacion)
    }

    pub async fn rechazar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        motivo: Option<&str>,
        rechazado_por: RegistradoPor,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let actualizada = self
            .repo
            .rechazar_condicional(
                &mut *tx,
                tenant_id,
                id,
                motivo,
                rechazado_por.id,
                &rechazado_por.nombre,
            )
            .await?;

        let evaluacion = match actualizada {
            Some(e) => e,
            None => {
                return Err(self.motivo_transicion_fallida(&mut tx, tenant_id, id).await?);
            }
        };

        tx.commit().await?;

        Ok(evaluacion)
    }

    pub async fn actualizar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        razon_social: Option<&str>,
        nit: Option<&str>,
        score_buro: Option<f64>,
        ajuste_manual: Option<f64>,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let actualizada = self
            .repo
            .actualizar_pendiente(
                &mut *tx,
                tenant_id,
                id,
                razon_social,
                nit,
                score_buro,
                ajuste_manual,
            )
            .await?;

        let evaluacion = match actualizada {
            Some(e) => e,
            None => {
                return Err(self.motivo_transicion_fallida(&mut tx, tenant_id, id).await?);
            }
        };

        tx.commit().await?;

        Ok(evaluacion)
    }

    pub async fn eliminar<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let eliminada = self.repo.eliminar_pendiente(&mut *tx, tenant_id, id).await?;

        let evaluacion = match eliminada {
            Some(e) => e,
            None => {
                return Err(self.motivo_transicion_fallida(&mut tx, tenant_id, id).await?);
            }
        };

        tx.commit().await?;

        Ok(evaluacion)
    }

    // Distingue NotFound de Conflict quando um UPDATE condicional não
    // afetou linhas. Devolve o erro pronto (o chamador só propaga).
    async fn motivo_transicion_fallida(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<AppError, AppError> {
        let existente = self.repo.find_by_id(&mut **tx, tenant_id, id, false).await?;

        Ok(match existente {
            None => AppError::NotFound("La evaluación no existe.".to_string()),
            Some(e) => AppError::Conflict(e.estado.mensaje_conflicto().to_string()),
        })
    }
}
