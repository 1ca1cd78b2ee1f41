use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{EstadoRegistro, Periodo};
use crate::reglas::eliminacion::DependenciasPeriodo;

const COLUMNAS: &str = "id, nombre, fecha_limite_planeacion, fecha_limite_evidencias, estado";

fn desde_fila(row: &Row<'_>) -> rusqlite::Result<Periodo> {
    Ok(Periodo {
        id: row.get(0)?,
        nombre: row.get(1)?,
        fecha_limite_planeacion: row.get(2)?,
        fecha_limite_evidencias: row.get(3)?,
        estado: row.get(4)?,
    })
}

pub fn insertar(
    conn: &Connection,
    nombre: &str,
    fecha_limite_planeacion: DateTime<Utc>,
    fecha_limite_evidencias: DateTime<Utc>,
    estado: EstadoRegistro,
) -> AppResult<Periodo> {
    conn.execute(
        "INSERT INTO periodos (nombre, fecha_limite_planeacion, fecha_limite_evidencias, estado) VALUES (?1, ?2, ?3, ?4)",
        params![nombre, fecha_limite_planeacion, fecha_limite_evidencias, estado],
    )?;
    Ok(Periodo {
        id: conn.last_insert_rowid(),
        nombre: nombre.to_string(),
        fecha_limite_planeacion,
        fecha_limite_evidencias,
        estado,
    })
}

pub fn actualizar(conn: &Connection, periodo: &Periodo) -> AppResult<()> {
    conn.execute(
        "UPDATE periodos SET nombre = ?1, fecha_limite_planeacion = ?2, fecha_limite_evidencias = ?3, estado = ?4 WHERE id = ?5",
        params![
            periodo.nombre,
            periodo.fecha_limite_planeacion,
            periodo.fecha_limite_evidencias,
            periodo.estado,
            periodo.id
        ],
    )?;
    Ok(())
}

pub fn buscar(conn: &Connection, id: i64) -> AppResult<Option<Periodo>> {
    let sql = format!("SELECT {} FROM periodos WHERE id = ?1", COLUMNAS);
    Ok(conn.query_row(&sql, params![id], desde_fila).optional()?)
}

/// Periodo inmediatamente posterior por orden de id.
pub fn siguiente(conn: &Connection, id: i64) -> AppResult<Option<Periodo>> {
    let sql = format!("SELECT {} FROM periodos WHERE id > ?1 ORDER BY id ASC LIMIT 1", COLUMNAS);
    Ok(conn.query_row(&sql, params![id], desde_fila).optional()?)
}

pub fn listar(conn: &Connection) -> AppResult<Vec<Periodo>> {
    let sql = format!("SELECT {} FROM periodos ORDER BY id ASC", COLUMNAS);
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map([], desde_fila)?;
    recolectar(filas)
}

/// Los `limite` periodos más recientes, en orden cronológico.
pub fn recientes(conn: &Connection, limite: usize) -> AppResult<Vec<Periodo>> {
    let sql = format!("SELECT {} FROM periodos ORDER BY id DESC LIMIT ?1", COLUMNAS);
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map(params![limite as i64], desde_fila)?;
    let mut out = recolectar(filas)?;
    out.reverse();
    Ok(out)
}

pub fn dependencias(conn: &Connection, id: i64) -> AppResult<DependenciasPeriodo> {
    let entregas: i64 =
        conn.query_row("SELECT COUNT(*) FROM entregas_producto WHERE periodo_id = ?1", params![id], |r| r.get(0))?;
    let registros_horas: i64 =
        conn.query_row("SELECT COUNT(*) FROM horas_investigacion WHERE periodo_id = ?1", params![id], |r| r.get(0))?;
    Ok(DependenciasPeriodo { entregas, registros_horas })
}

pub fn eliminar(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM periodos WHERE id = ?1", params![id])?;
    Ok(())
}
