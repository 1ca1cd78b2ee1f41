pub mod convocatorias;
pub mod entregas;
pub mod organizacion;
pub mod periodos;
pub mod planes;
pub mod reportes;

pub use convocatorias::*;
pub use entregas::*;
pub use organizacion::*;
pub use periodos::*;
pub use planes::*;
pub use reportes::*;

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

/// Respuesta de una mutación exitosa: `{"status": "ok", "mensaje": ..., "data": ...}`.
pub(crate) fn ok<T: Serialize>(mensaje: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok", "mensaje": mensaje, "data": data}))
}

pub(crate) fn creado<T: Serialize>(mensaje: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({"status": "ok", "mensaje": mensaje, "data": data}))
}
