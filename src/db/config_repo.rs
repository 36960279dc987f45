// src/db/config_repo.rs

use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::scoring::{
        MESES_REEVALUACION_DEFAULT, NivelUmbral, Pesos, ScoringConfig, niveles_default,
    },
};

#[derive(Clone)]
pub struct ConfigRepository {
    pool: PgPool,
}

impl ConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Get-or-create em UMA instrução. O ON CONFLICT com um SET inócuo faz
    // o RETURNING devolver a linha existente sem tocar nos valores dela;
    // duas chamadas concorrentes para o mesmo tenant convergem na mesma
    // linha. Nunca falha por "não existir".
    pub async fn get_or_create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<ScoringConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let config = sqlx::query_as::<_, ScoringConfig>(
            r#"
            INSERT INTO scoring_config (tenant_id, pesos, niveles, meses_reevaluacion)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id)
            DO UPDATE SET tenant_id = EXCLUDED.tenant_id
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(Json(Pesos::default()))
        .bind(Json(niveles_default()))
        .bind(MESES_REEVALUACION_DEFAULT)
        .fetch_one(executor)
        .await?;

        Ok(config)
    }

    // Last-writer-wins no nível do documento; a validação dos pesos já
    // aconteceu no serviço antes de chegar aqui.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        pesos: Pesos,
        niveles: Vec<NivelUmbral>,
        meses_reevaluacion: i32,
    ) -> Result<ScoringConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let config = sqlx::query_as::<_, ScoringConfig>(
            r#"
            UPDATE scoring_config
            SET pesos = $2, niveles = $3, meses_reevaluacion = $4, updated_at = NOW()
            WHERE tenant_id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(Json(pesos))
        .bind(Json(niveles))
        .bind(meses_reevaluacion)
        .fetch_one(executor)
        .await?;

        Ok(config)
    }
}
