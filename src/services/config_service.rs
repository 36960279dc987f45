// src/services/config_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ConfigRepository,
    models::scoring::{NivelUmbral, Pesos, ScoringConfig, validar_niveles},
};

#[derive(Clone)]
pub struct ConfigService {
    repo: ConfigRepository,
}

impl ConfigService {
    pub fn new(repo: ConfigRepository) -> Self {
        Self { repo }
    }

    pub async fn get_or_create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<ScoringConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_or_create(executor, tenant_id).await
    }

    // Valida ANTES de persistir: numa falha de validação a configuração
    // gravada permanece intacta.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        pesos: Pesos,
        niveles: Vec<NivelUmbral>,
        meses_reevaluacion: i32,
    ) -> Result<ScoringConfig, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        pesos.validar()?;
        validar_niveles(&niveles)?;

        if meses_reevaluacion <= 0 {
            return Err(AppError::Validation(
                "La cadencia de reevaluación debe ser un número positivo de meses.".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        // Garante a linha (get-or-create) e aplica last-writer-wins.
        self.repo.get_or_create(&mut *tx, tenant_id).await?;
        let config = self
            .repo
            .update(&mut *tx, tenant_id, pesos, niveles, meses_reevaluacion)
            .await?;

        tx.commit().await?;

        Ok(config)
    }
}
