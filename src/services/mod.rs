pub mod config_service;
pub mod evaluacion_service;
pub mod historial_service;
pub mod scoring;

pub use config_service::ConfigService;
pub use evaluacion_service::EvaluacionService;
pub use historial_service::HistorialService;
