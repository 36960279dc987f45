pub mod config;
pub mod evaluaciones;
pub mod historial;
