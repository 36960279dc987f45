// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{ConfigRepository, EvaluacionRepository, HistorialRepository},
    services::{ConfigService, EvaluacionService, HistorialService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config_service: ConfigService,
    pub evaluacion_service: EvaluacionService,
    pub historial_service: HistorialService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("conexão com o banco de dados estabelecida");

        // --- Monta o gráfico de dependências ---
        let config_repo = ConfigRepository::new(db_pool.clone());
        let evaluacion_repo = EvaluacionRepository::new(db_pool.clone());
        let historial_repo = HistorialRepository::new(db_pool.clone());

        let config_service = ConfigService::new(config_repo.clone());
        let historial_service = HistorialService::new(historial_repo.clone());
        let evaluacion_service =
            EvaluacionService::new(evaluacion_repo, config_repo, historial_repo);

        Ok(Self {
            db_pool,
            config_service,
            evaluacion_service,
            historial_service,
        })
    }
}
