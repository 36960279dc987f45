pub mod evaluacion;
pub mod historial;
pub mod scoring;
