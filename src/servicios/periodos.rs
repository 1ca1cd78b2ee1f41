use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use super::regla;
use crate::contexto::{Contexto, permisos};
use crate::db::{self, periodos};
use crate::error::{AppResult, Rechazo};
use crate::models::{EstadoRegistro, Periodo};
use crate::reglas::{Validador, eliminacion};

#[derive(Debug, Clone, Deserialize)]
pub struct DatosPeriodo {
    pub nombre: String,
    pub fecha_limite_planeacion: DateTime<Utc>,
    pub fecha_limite_evidencias: DateTime<Utc>,
    #[serde(default)]
    pub estado: Option<EstadoRegistro>,
}

fn validar(datos: &DatosPeriodo) -> AppResult<()> {
    Validador::new()
        .requerido("nombre", &datos.nombre)
        .condicion(
            "fecha_limite_evidencias",
            datos.fecha_limite_evidencias >= datos.fecha_limite_planeacion,
            "debe ser posterior al límite de planeación",
        )
        .terminar()?;
    Ok(())
}

pub fn listar(conn: &Connection) -> AppResult<Vec<Periodo>> {
    periodos::listar(conn)
}

pub fn obtener(conn: &Connection, id: i64) -> AppResult<Periodo> {
    db::requerir(periodos::buscar(conn, id)?, "periodo")
}

pub fn crear(conn: &Connection, ctx: &Contexto, datos: &DatosPeriodo) -> AppResult<Periodo> {
    ctx.autorizar(permisos::PERIODOS_GESTIONAR)?;
    validar(datos)?;
    let periodo = periodos::insertar(
        conn,
        datos.nombre.trim(),
        datos.fecha_limite_planeacion,
        datos.fecha_limite_evidencias,
        datos.estado.unwrap_or(EstadoRegistro::Activo),
    )?;
    tracing::info!(periodo_id = periodo.id, nombre = %periodo.nombre, "periodo creado");
    Ok(periodo)
}

/// Un periodo con entregas u horas solo admite cambios de estado.
pub fn actualizar(conn: &mut Connection, ctx: &Contexto, id: i64, datos: &DatosPeriodo) -> AppResult<Periodo> {
    ctx.autorizar(permisos::PERIODOS_GESTIONAR)?;
    validar(datos)?;
    let tx = conn.transaction()?;
    let actual = db::requerir(periodos::buscar(&tx, id)?, "periodo")?;
    let nuevo = Periodo {
        id,
        nombre: datos.nombre.trim().to_string(),
        fecha_limite_planeacion: datos.fecha_limite_planeacion,
        fecha_limite_evidencias: datos.fecha_limite_evidencias,
        estado: datos.estado.unwrap_or(actual.estado),
    };
    let cambia_contenido = nuevo.nombre != actual.nombre
        || nuevo.fecha_limite_planeacion != actual.fecha_limite_planeacion
        || nuevo.fecha_limite_evidencias != actual.fecha_limite_evidencias;
    if cambia_contenido {
        let dep = periodos::dependencias(&tx, id)?;
        if dep.entregas > 0 || dep.registros_horas > 0 {
            return regla(Err(Rechazo::PeriodoEnUso));
        }
    }
    periodos::actualizar(&tx, &nuevo)?;
    tx.commit()?;
    tracing::info!(periodo_id = id, estado = %nuevo.estado, "periodo actualizado");
    Ok(nuevo)
}

pub fn eliminar(conn: &mut Connection, ctx: &Contexto, id: i64) -> AppResult<()> {
    ctx.autorizar(permisos::PERIODOS_GESTIONAR)?;
    let tx = conn.transaction()?;
    db::requerir(periodos::buscar(&tx, id)?, "periodo")?;
    let dep = periodos::dependencias(&tx, id)?;
    regla(eliminacion::periodo(&dep))?;
    periodos::eliminar(&tx, id)?;
    tx.commit()?;
    tracing::info!(periodo_id = id, "periodo eliminado");
    Ok(())
}
