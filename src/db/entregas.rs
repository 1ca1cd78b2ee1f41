use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{EntregaProducto, ItemPlaneacion, TipoEntrega};
use crate::reglas::entregas::EntregasExistentes;

const COLUMNAS: &str = "id, producto_id, periodo_id, usuario_id, tipo, actividades_planeacion, horas_planeacion, \
     horas_evidencia, progreso_planeacion, progreso_evidencia, descripcion, created_at";

fn desde_fila(row: &Row<'_>) -> rusqlite::Result<EntregaProducto> {
    let items_json: String = row.get(5)?;
    let actividades_planeacion: Vec<ItemPlaneacion> = serde_json::from_str(&items_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?;
    Ok(EntregaProducto {
        id: row.get(0)?,
        producto_id: row.get(1)?,
        periodo_id: row.get(2)?,
        usuario_id: row.get(3)?,
        tipo: row.get(4)?,
        actividades_planeacion,
        horas_planeacion: row.get(6)?,
        horas_evidencia: row.get(7)?,
        progreso_planeacion: row.get(8)?,
        progreso_evidencia: row.get(9)?,
        descripcion: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Datos de una entrega nueva, antes de tener id.
#[derive(Debug, Clone)]
pub struct FilaNuevaEntrega<'a> {
    pub producto_id: i64,
    pub periodo_id: i64,
    pub usuario_id: i64,
    pub tipo: TipoEntrega,
    pub actividades_planeacion: &'a [ItemPlaneacion],
    pub horas_planeacion: f64,
    pub horas_evidencia: f64,
    pub progreso_planeacion: f64,
    pub progreso_evidencia: f64,
    pub descripcion: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

pub fn insertar(conn: &Connection, nueva: &FilaNuevaEntrega<'_>) -> AppResult<EntregaProducto> {
    let items_json = serde_json::to_string(nueva.actividades_planeacion)?;
    conn.execute(
        "INSERT INTO entregas_producto (producto_id, periodo_id, usuario_id, tipo, actividades_planeacion,
            horas_planeacion, horas_evidencia, progreso_planeacion, progreso_evidencia, descripcion, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            nueva.producto_id,
            nueva.periodo_id,
            nueva.usuario_id,
            nueva.tipo,
            items_json,
            nueva.horas_planeacion,
            nueva.horas_evidencia,
            nueva.progreso_planeacion,
            nueva.progreso_evidencia,
            nueva.descripcion,
            nueva.created_at,
        ],
    )?;
    Ok(EntregaProducto {
        id: conn.last_insert_rowid(),
        producto_id: nueva.producto_id,
        periodo_id: nueva.periodo_id,
        usuario_id: nueva.usuario_id,
        tipo: nueva.tipo,
        actividades_planeacion: nueva.actividades_planeacion.to_vec(),
        horas_planeacion: nueva.horas_planeacion,
        horas_evidencia: nueva.horas_evidencia,
        progreso_planeacion: nueva.progreso_planeacion,
        progreso_evidencia: nueva.progreso_evidencia,
        descripcion: nueva.descripcion.map(str::to_string),
        created_at: nueva.created_at,
    })
}

pub fn existentes(conn: &Connection, producto_id: i64, periodo_id: i64) -> AppResult<EntregasExistentes> {
    let mut stmt = conn.prepare("SELECT tipo FROM entregas_producto WHERE producto_id = ?1 AND periodo_id = ?2")?;
    let tipos = recolectar(stmt.query_map(params![producto_id, periodo_id], |r| r.get::<_, TipoEntrega>(0))?)?;
    Ok(EntregasExistentes {
        planeacion: tipos.contains(&TipoEntrega::Planeacion),
        evidencia: tipos.contains(&TipoEntrega::Evidencia),
    })
}

pub fn progresos_evidencia(conn: &Connection, producto_id: i64) -> AppResult<Vec<f64>> {
    let mut stmt =
        conn.prepare("SELECT progreso_evidencia FROM entregas_producto WHERE producto_id = ?1 AND tipo = ?2")?;
    let filas = stmt.query_map(params![producto_id, TipoEntrega::Evidencia], |r| r.get::<_, f64>(0))?;
    recolectar(filas)
}

pub fn listar(conn: &Connection, producto_id: Option<i64>, periodo_id: Option<i64>) -> AppResult<Vec<EntregaProducto>> {
    let sql = format!(
        "SELECT {} FROM entregas_producto
         WHERE (?1 IS NULL OR producto_id = ?1) AND (?2 IS NULL OR periodo_id = ?2)
         ORDER BY periodo_id, producto_id, id",
        COLUMNAS
    );
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map(params![producto_id, periodo_id], desde_fila)?;
    recolectar(filas)
}
