// Biblioteca raíz del crate `investiga`.
// Backend de gestión de investigación: periodos, horas, entregas de producto,
// planes de trabajo con informes, convocatorias y tablero de desempeño.
pub mod almacenamiento;
pub mod config;
pub mod contexto;
pub mod db;
pub mod error;
pub mod models;
pub mod reglas;
pub mod reportes;
pub mod revision;
pub mod server;
pub mod servicios;
mod server_handlers;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
