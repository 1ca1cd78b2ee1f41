//! Reglas de negocio como funciones puras sobre agregados ya consultados.
//!
//! Ninguna función de este módulo toca la base de datos: los servicios
//! consultan los agregados, llaman a la regla y solo entonces escriben.

pub mod eliminacion;
pub mod entregas;
pub mod horas;
pub mod informes;
pub mod validacion;

pub use horas::ResumenHoras;
pub use validacion::Validador;
