// Estructuras de datos principales

pub mod estados;

pub use estados::{
    EstadoConvocatoria, EstadoPlan, EstadoPostulacion, EstadoProyecto, EstadoRegistro, TipoEntrega,
    Vigencia,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub grupo_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrupoInvestigacion {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProyectoInvestigativo {
    pub id: i64,
    pub titulo: String,
    pub grupo_id: Option<i64>,
    pub estado: EstadoProyecto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductoInvestigativo {
    pub id: i64,
    pub proyecto_id: i64,
    pub usuario_id: i64,
    pub titulo: String,
    /// Promedio redondeado del progreso de sus entregas de evidencia (0 - 100).
    pub progreso: i64,
}

/// Ventana administrativa con plazos de planeación y de evidencias.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Periodo {
    pub id: i64,
    pub nombre: String,
    pub fecha_limite_planeacion: DateTime<Utc>,
    pub fecha_limite_evidencias: DateTime<Utc>,
    pub estado: EstadoRegistro,
}

impl Periodo {
    /// Ventana de informes: `[fecha_limite_planeacion, fecha_limite_evidencias]`, ambos extremos incluidos.
    pub fn en_ventana_informes(&self, ahora: DateTime<Utc>) -> bool {
        ahora >= self.fecha_limite_planeacion && ahora <= self.fecha_limite_evidencias
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HorasInvestigacion {
    pub id: i64,
    pub usuario_id: i64,
    pub periodo_id: i64,
    pub horas: f64,
    pub estado: EstadoRegistro,
}

/// Ítem libre de la planeación de una entrega.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemPlaneacion {
    pub nombre: String,
    pub porcentaje: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntregaProducto {
    pub id: i64,
    pub producto_id: i64,
    pub periodo_id: i64,
    pub usuario_id: i64,
    pub tipo: TipoEntrega,
    pub actividades_planeacion: Vec<ItemPlaneacion>,
    pub horas_planeacion: f64,
    pub horas_evidencia: f64,
    pub progreso_planeacion: f64,
    pub progreso_evidencia: f64,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Actividad del catálogo institucional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActividadInvestigacion {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanTrabajo {
    pub id: i64,
    pub usuario_id: i64,
    pub nombre: String,
    pub vigencia: Vigencia,
    /// Periodo de inicio. Para vigencia anual el plan cubre también el siguiente.
    pub periodo_id: i64,
    pub estado: EstadoPlan,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActividadPlan {
    pub id: i64,
    pub plan_id: i64,
    pub actividad_id: i64,
    pub descripcion: Option<String>,
    pub horas: f64,
    pub porcentaje_progreso: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InformePlanTrabajo {
    pub id: i64,
    pub plan_id: i64,
    pub periodo_id: i64,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidenciaInforme {
    pub id: i64,
    pub informe_id: i64,
    pub actividad_plan_id: i64,
    pub porcentaje_progreso_anterior: f64,
    pub porcentaje_progreso_nuevo: f64,
    pub descripcion: String,
    pub archivo: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Convocatoria {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: DateTime<Utc>,
    pub estado: EstadoConvocatoria,
}

impl Convocatoria {
    pub fn recibe_postulaciones(&self, ahora: DateTime<Utc>) -> bool {
        self.estado == EstadoConvocatoria::Abierta && ahora >= self.fecha_inicio && ahora <= self.fecha_fin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequisitoConvocatoria {
    pub id: i64,
    pub convocatoria_id: i64,
    pub nombre: String,
    pub obligatorio: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Postulacion {
    pub id: i64,
    pub convocatoria_id: i64,
    pub usuario_id: i64,
    pub estado: EstadoPostulacion,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchivoPostulacion {
    pub id: i64,
    pub postulacion_id: i64,
    pub requisito_id: i64,
    pub nombre_original: String,
    pub ruta: String,
}
