use rusqlite::Connection;
use serde::Deserialize;

use crate::contexto::{Contexto, permisos};
use crate::db::{self, planes};
use crate::error::AppResult;
use crate::reglas::Validador;
use crate::revision::{ComparadorTextos, Similitud};

/// Cada lado se toma del texto dado o, si falta, de la descripción de la evidencia.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolicitudComparacion {
    #[serde(default)]
    pub evidencia_a: Option<i64>,
    #[serde(default)]
    pub evidencia_b: Option<i64>,
    #[serde(default)]
    pub texto_a: Option<String>,
    #[serde(default)]
    pub texto_b: Option<String>,
}

fn resolver(conn: &Connection, texto: &Option<String>, evidencia: Option<i64>) -> AppResult<Option<String>> {
    if let Some(t) = texto.as_deref().filter(|t| !t.trim().is_empty()) {
        return Ok(Some(t.to_string()));
    }
    match evidencia {
        Some(id) => Ok(Some(db::requerir(planes::buscar_evidencia(conn, id)?, "evidencia")?.descripcion)),
        None => Ok(None),
    }
}

pub fn comparar(
    conn: &Connection,
    comparador: &dyn ComparadorTextos,
    ctx: &Contexto,
    sol: &SolicitudComparacion,
) -> AppResult<Similitud> {
    ctx.autorizar(permisos::REVISION_USAR)?;
    let a = resolver(conn, &sol.texto_a, sol.evidencia_a)?;
    let b = resolver(conn, &sol.texto_b, sol.evidencia_b)?;
    let mensaje = "indique una evidencia o un texto";
    Validador::new()
        .condicion("evidencia_a", a.is_some(), mensaje)
        .condicion("evidencia_b", b.is_some(), mensaje)
        .terminar()?;
    let (a, b) = (a.unwrap_or_default(), b.unwrap_or_default());
    let similitud = comparador.comparar(&a, &b);
    tracing::info!(usuario_id = ctx.usuario_id, puntaje = similitud.puntaje, "comparación de evidencias");
    Ok(similitud)
}
