//! Modelo de errores de la aplicación.
//!
//! Tres familias: autorización (403), validación de entrada (422, mapa
//! campo → mensaje) y rechazos de reglas de negocio (409, mensaje para el
//! usuario). Todo lo demás es un fallo interno.

use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Rechazos de reglas de negocio. El `Display` es el mensaje que ve el usuario.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rechazo {
    #[error("Horas insuficientes: solicitadas {solicitadas}, disponibles {disponibles}")]
    HorasInsuficientes { solicitadas: f64, disponibles: f64 },

    #[error("El periodo '{0}' no está activo")]
    PeriodoInactivo(String),

    #[error("El periodo tiene entregas u horas registradas; solo se puede cambiar su estado")]
    PeriodoEnUso,

    #[error("El plazo de {tipo} venció el {limite}")]
    FueraDePlazo { tipo: String, limite: String },

    #[error("Ya existe una entrega de {0} para este producto en el periodo")]
    EntregaDuplicada(String),

    #[error("Debe registrar la entrega de planeación antes de la de evidencias")]
    SinPlaneacion,

    #[error("Solo el responsable del producto puede registrar sus entregas")]
    NoEsResponsable,

    #[error("El plan de trabajo debe estar aprobado (estado actual: {0})")]
    PlanNoAprobado(String),

    #[error("El plan no admite cambios en estado {0}")]
    PlanNoEditable(String),

    #[error("El plan ya tiene todos los informes permitidos para su vigencia")]
    InformesCompletos,

    #[error("Ya existe un informe para este plan en el periodo '{0}'")]
    InformeDuplicado(String),

    #[error("Fuera de la ventana de informes del periodo")]
    FueraDeVentanaInforme,

    #[error("El avance de la actividad {actividad_id} no puede bajar de {actual}% a {nuevo}%")]
    AvanceRegresivo { actividad_id: i64, actual: f64, nuevo: f64 },

    #[error("Transición de estado no permitida: {desde} → {hacia}")]
    TransicionInvalida { desde: String, hacia: String },

    #[error("No se puede eliminar: {0}")]
    EliminacionBloqueada(String),

    #[error("La convocatoria no está abierta para postulaciones")]
    ConvocatoriaCerrada,

    #[error("Ya existe una postulación de este usuario a la convocatoria")]
    PostulacionDuplicada,

    #[error("Falta el archivo del requisito obligatorio '{0}'")]
    RequisitoFaltante(String),

    #[error("Ya existe un registro de horas para este usuario en el periodo")]
    HorasDuplicadas,
}

/// Errores de validación de entrada: campo → mensaje.
#[derive(Error, Debug, Clone, Default, PartialEq)]
#[error("datos inválidos ({})", resumen(.0))]
pub struct ErroresValidacion(pub BTreeMap<String, String>);

impl ErroresValidacion {
    pub fn campos(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn contiene(&self, campo: &str) -> bool {
        self.0.contains_key(campo)
    }
}

fn resumen(campos: &BTreeMap<String, String>) -> String {
    campos.iter().map(|(k, v)| format!("{}: {}", k, v)).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("usuario no autenticado")]
    NoAutenticado,

    #[error("{0}")]
    NoAutorizado(String),

    #[error(transparent)]
    Validacion(#[from] ErroresValidacion),

    #[error(transparent)]
    Rechazo(#[from] Rechazo),

    #[error("{0} no encontrado")]
    NoEncontrado(String),

    #[error("error de base de datos: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("error de almacenamiento: {0}")]
    Almacenamiento(#[from] std::io::Error),

    #[error("error de serialización: {0}")]
    Serializacion(#[from] serde_json::Error),

    #[error("{0}")]
    Interno(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoAutenticado => StatusCode::UNAUTHORIZED,
            AppError::NoAutorizado(_) => StatusCode::FORBIDDEN,
            AppError::Validacion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Rechazo(_) => StatusCode::CONFLICT,
            AppError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Almacenamiento(_) | AppError::Serializacion(_) | AppError::Interno(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "fallo interno atendiendo la solicitud");
            return HttpResponse::build(status).json(json!({"error": "error interno del servidor"}));
        }
        match self {
            AppError::Validacion(errores) => HttpResponse::build(status).json(json!({
                "error": "datos inválidos",
                "campos": errores.campos(),
            })),
            otro => HttpResponse::build(status).json(json!({"error": otro.to_string()})),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Interno(format!("tarea bloqueante cancelada: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validacion_lista_campos_en_el_mensaje() {
        let mut campos = BTreeMap::new();
        campos.insert("email".to_string(), "ya está registrado".to_string());
        campos.insert("nombre".to_string(), "es obligatorio".to_string());
        let err = AppError::from(ErroresValidacion(campos));
        assert_eq!(err.to_string(), "datos inválidos (email: ya está registrado; nombre: es obligatorio)");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
