pub mod config_repo;
pub use config_repo::ConfigRepository;
pub mod evaluacion_repo;
pub use evaluacion_repo::EvaluacionRepository;
pub mod historial_repo;
pub use historial_repo::HistorialRepository;
