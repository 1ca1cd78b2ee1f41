use rusqlite::{Connection, OptionalExtension, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{EstadoRegistro, HorasInvestigacion};
use crate::reglas::ResumenHoras;

fn desde_fila(row: &Row<'_>) -> rusqlite::Result<HorasInvestigacion> {
    Ok(HorasInvestigacion {
        id: row.get(0)?,
        usuario_id: row.get(1)?,
        periodo_id: row.get(2)?,
        horas: row.get(3)?,
        estado: row.get(4)?,
    })
}

pub fn existe(conn: &Connection, usuario_id: i64, periodo_id: i64) -> AppResult<bool> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM horas_investigacion WHERE usuario_id = ?1 AND periodo_id = ?2",
            params![usuario_id, periodo_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id.is_some())
}

pub fn insertar(
    conn: &Connection,
    usuario_id: i64,
    periodo_id: i64,
    horas: f64,
    estado: EstadoRegistro,
) -> AppResult<HorasInvestigacion> {
    conn.execute(
        "INSERT INTO horas_investigacion (usuario_id, periodo_id, horas, estado) VALUES (?1, ?2, ?3, ?4)",
        params![usuario_id, periodo_id, horas, estado],
    )?;
    Ok(HorasInvestigacion { id: conn.last_insert_rowid(), usuario_id, periodo_id, horas, estado })
}

pub fn listar(conn: &Connection, usuario_id: Option<i64>, periodo_id: Option<i64>) -> AppResult<Vec<HorasInvestigacion>> {
    let mut stmt = conn.prepare(
        "SELECT id, usuario_id, periodo_id, horas, estado FROM horas_investigacion
         WHERE (?1 IS NULL OR usuario_id = ?1) AND (?2 IS NULL OR periodo_id = ?2)
         ORDER BY periodo_id, usuario_id",
    )?;
    let filas = stmt.query_map(params![usuario_id, periodo_id], desde_fila)?;
    recolectar(filas)
}

/// Horas asignadas (solo registros activos) y horas ya comprometidas en
/// entregas del usuario para el periodo.
pub fn resumen(conn: &Connection, usuario_id: i64, periodo_id: i64) -> AppResult<ResumenHoras> {
    let asignadas: f64 = conn.query_row(
        "SELECT COALESCE(SUM(horas), 0) FROM horas_investigacion
         WHERE usuario_id = ?1 AND periodo_id = ?2 AND estado = ?3",
        params![usuario_id, periodo_id, EstadoRegistro::Activo],
        |r| r.get(0),
    )?;
    let comprometidas: f64 = conn.query_row(
        "SELECT COALESCE(SUM(horas_planeacion), 0) FROM entregas_producto WHERE usuario_id = ?1 AND periodo_id = ?2",
        params![usuario_id, periodo_id],
        |r| r.get(0),
    )?;
    Ok(ResumenHoras { asignadas, comprometidas })
}
