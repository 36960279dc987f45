// src/main.rs

use axum::{
    Json, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("migrações do banco de dados executadas com sucesso");

    let scoring_config_routes = Router::new().route(
        "/config",
        get(handlers::config::get_config).put(handlers::config::update_config),
    );

    let evaluaciones_routes = Router::new()
        .route(
            "/",
            post(handlers::evaluaciones::crear_evaluacion)
                .get(handlers::evaluaciones::listar_evaluaciones),
        )
        .route(
            "/{id}",
            get(handlers::evaluaciones::obtener_evaluacion)
                .put(handlers::evaluaciones::actualizar_evaluacion)
                .delete(handlers::evaluaciones::eliminar_evaluacion),
        )
        .route("/{id}/aprobar", post(handlers::evaluaciones::aprobar_evaluacion))
        .route("/{id}/rechazar", post(handlers::evaluaciones::rechazar_evaluacion));

    let historial_routes = Router::new()
        .route(
            "/scoring",
            post(handlers::historial::agregar_scoring).get(handlers::historial::listar_scoring),
        )
        .route("/scoring/vigente", get(handlers::historial::scoring_vigente))
        .route(
            "/estados-financieros",
            post(handlers::historial::agregar_estado_financiero)
                .get(handlers::historial::listar_estados_financieros),
        )
        .route(
            "/activos",
            post(handlers::historial::agregar_activos).get(handlers::historial::listar_activos),
        )
        .route(
            "/consultas-buro",
            post(handlers::historial::agregar_consulta_buro)
                .get(handlers::historial::listar_consultas_buro),
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(docs::ApiDoc::openapi()) }),
        )
        .nest("/api/scoring", scoring_config_routes)
        .nest("/api/evaluaciones", evaluaciones_routes)
        .nest("/api/historial", historial_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
