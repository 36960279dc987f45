// src/db/evaluacion_repo.rs

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::evaluacion::{EstadoEvaluacion, Evaluacion},
    models::scoring::{ItemScoring, NivelRiesgo},
};

#[derive(Clone)]
pub struct EvaluacionRepository {
    pool: PgPool,
}

impl EvaluacionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        crm_organizacion_id: Uuid,
        razon_social: &str,
        nit: Option<&str>,
        patrimonio: Decimal,
        items: &[ItemScoring],
        score_buro: Option<f64>,
        ajuste_manual: Option<f64>,
        score_total: f64,
        nivel_sugerido: Option<NivelRiesgo>,
    ) -> Result<Evaluacion, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            INSERT INTO evaluaciones (
                tenant_id, crm_organizacion_id, razon_social, nit, patrimonio,
                items, score_buro, ajuste_manual, score_total, nivel_sugerido
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(razon_social)
        .bind(nit)
        .bind(patrimonio)
        .bind(Json(items.to_vec()))
        .bind(score_buro)
        .bind(ajuste_manual)
        .bind(score_total)
        .bind(nivel_sugerido)
        .fetch_one(executor)
        .await?;

        Ok(evaluacion)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        incluir_eliminadas: bool,
    ) -> Result<Option<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            SELECT * FROM evaluaciones
            WHERE tenant_id = $1 AND id = $2
              AND (eliminado_en IS NULL OR $3)
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(incluir_eliminadas)
        .fetch_optional(executor)
        .await?;

        Ok(evaluacion)
    }

    // Filtros opcionais via parâmetros anuláveis; o predicado tenant_id
    // nunca é opcional.
    pub async fn list<'e, E>(
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
        let evaluaciones = sqlx::query_as::<_, Evaluacion>(
            r#"
            SELECT * FROM evaluaciones
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR crm_organizacion_id = $2)
              AND ($3::estado_evaluacion IS NULL OR estado = $3)
              AND (eliminado_en IS NULL OR $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(crm_organizacion_id)
        .bind(estado)
        .bind(incluir_eliminadas)
        .fetch_all(executor)
        .await?;

        Ok(evaluaciones)
    }

    // Transição condicional (compare-and-set no campo estado). Só muda a
    // linha se ela AINDA estiver pendiente; a segunda aprovação concorrente
    // vê zero linhas afetadas, não sobrescreve nada. O guard mora aqui, no
    // storage, não num read-then-write da aplicação.
    pub async fn aprobar_condicional<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        nivel: NivelRiesgo,
        cupo: Decimal,
        aprobado_por: Uuid,
        aprobado_por_nombre: &str,
    ) -> Result<Option<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            UPDATE evaluaciones
            SET estado = 'aprobada',
                nivel_asignado = $3,
                cupo_asignado = $4,
                aprobado_por = $5,
                aprobado_por_nombre = $6,
                fecha_aprobacion = NOW(),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND estado = 'pendiente'
              AND eliminado_en IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(nivel)
        .bind(cupo)
        .bind(aprobado_por)
        .bind(aprobado_por_nombre)
        .fetch_optional(executor)
        .await?;

        Ok(evaluacion)
    }

    pub async fn rechazar_condicional<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        motivo: Option<&str>,
        rechazado_por: Uuid,
        rechazado_por_nombre: &str,
    ) -> Result<Option<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            UPDATE evaluaciones
            SET estado = 'rechazada',
                motivo_rechazo = $3,
                aprobado_por = $4,
                aprobado_por_nombre = $5,
                fecha_aprobacion = NOW(),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND estado = 'pendiente'
              AND eliminado_en IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(motivo)
        .bind(rechazado_por)
        .bind(rechazado_por_nombre)
        .fetch_optional(executor)
        .await?;

        Ok(evaluacion)
    }

    // Atualização de campos de apoio, permitida apenas em pendiente.
    // Itens e score_total ficam de fora de propósito: o score é calculado
    // na criação e nunca recalculado.
    pub async fn actualizar_pendiente<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        razon_social: Option<&str>,
        nit: Option<&str>,
        score_buro: Option<f64>,
        ajuste_manual: Option<f64>,
    ) -> Result<Option<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            UPDATE evaluaciones
            SET razon_social = COALESCE($3, razon_social),
                nit = COALESCE($4, nit),
                score_buro = COALESCE($5, score_buro),
                ajuste_manual = COALESCE($6, ajuste_manual),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND estado = 'pendiente'
              AND eliminado_en IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(razon_social)
        .bind(nit)
        .bind(score_buro)
        .bind(ajuste_manual)
        .fetch_optional(executor)
        .await?;

        Ok(evaluacion)
    }

    // Soft delete, também condicionado a pendiente.
    pub async fn eliminar_pendiente<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Evaluacion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let evaluacion = sqlx::query_as::<_, Evaluacion>(
            r#"
            UPDATE evaluaciones
            SET eliminado_en = NOW(), updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
              AND estado = 'pendiente'
              AND eliminado_en IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(evaluacion)
    }
}
