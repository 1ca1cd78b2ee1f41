// Planes de trabajo, sus actividades, informes y evidencias.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{ActividadPlan, EstadoPlan, EvidenciaInforme, InformePlanTrabajo, PlanTrabajo, Vigencia};

const COLUMNAS_PLAN: &str = "id, usuario_id, nombre, vigencia, periodo_id, estado, observaciones, created_at";

fn plan_desde_fila(row: &Row<'_>) -> rusqlite::Result<PlanTrabajo> {
    Ok(PlanTrabajo {
        id: row.get(0)?,
        usuario_id: row.get(1)?,
        nombre: row.get(2)?,
        vigencia: row.get(3)?,
        periodo_id: row.get(4)?,
        estado: row.get(5)?,
        observaciones: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn actividad_desde_fila(row: &Row<'_>) -> rusqlite::Result<ActividadPlan> {
    Ok(ActividadPlan {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        actividad_id: row.get(2)?,
        descripcion: row.get(3)?,
        horas: row.get(4)?,
        porcentaje_progreso: row.get(5)?,
    })
}

fn informe_desde_fila(row: &Row<'_>) -> rusqlite::Result<InformePlanTrabajo> {
    Ok(InformePlanTrabajo {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        periodo_id: row.get(2)?,
        descripcion: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn evidencia_desde_fila(row: &Row<'_>) -> rusqlite::Result<EvidenciaInforme> {
    Ok(EvidenciaInforme {
        id: row.get(0)?,
        informe_id: row.get(1)?,
        actividad_plan_id: row.get(2)?,
        porcentaje_progreso_anterior: row.get(3)?,
        porcentaje_progreso_nuevo: row.get(4)?,
        descripcion: row.get(5)?,
        archivo: row.get(6)?,
        url: row.get(7)?,
    })
}

// --- planes ---

pub fn insertar_plan(
    conn: &Connection,
    usuario_id: i64,
    nombre: &str,
    vigencia: Vigencia,
    periodo_id: i64,
    created_at: DateTime<Utc>,
) -> AppResult<PlanTrabajo> {
    let estado = EstadoPlan::Creado;
    conn.execute(
        "INSERT INTO planes_trabajo (usuario_id, nombre, vigencia, periodo_id, estado, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![usuario_id, nombre, vigencia, periodo_id, estado, created_at],
    )?;
    Ok(PlanTrabajo {
        id: conn.last_insert_rowid(),
        usuario_id,
        nombre: nombre.to_string(),
        vigencia,
        periodo_id,
        estado,
        observaciones: None,
        created_at,
    })
}

pub fn buscar_plan(conn: &Connection, id: i64) -> AppResult<Option<PlanTrabajo>> {
    let sql = format!("SELECT {} FROM planes_trabajo WHERE id = ?1", COLUMNAS_PLAN);
    Ok(conn.query_row(&sql, params![id], plan_desde_fila).optional()?)
}

pub fn listar_planes(conn: &Connection, usuario_id: Option<i64>) -> AppResult<Vec<PlanTrabajo>> {
    let sql = format!(
        "SELECT {} FROM planes_trabajo WHERE (?1 IS NULL OR usuario_id = ?1) ORDER BY id",
        COLUMNAS_PLAN
    );
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map(params![usuario_id], plan_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_estado_plan(
    conn: &Connection,
    id: i64,
    estado: EstadoPlan,
    observaciones: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "UPDATE planes_trabajo SET estado = ?1, observaciones = ?2 WHERE id = ?3",
        params![estado, observaciones, id],
    )?;
    Ok(())
}

// --- actividades del plan ---

pub fn insertar_actividad_plan(
    conn: &Connection,
    plan_id: i64,
    actividad_id: i64,
    descripcion: Option<&str>,
    horas: f64,
) -> AppResult<ActividadPlan> {
    conn.execute(
        "INSERT INTO actividades_plan (plan_id, actividad_id, descripcion, horas, porcentaje_progreso)
         VALUES (?1, ?2, ?3, ?4, 0)",
        params![plan_id, actividad_id, descripcion, horas],
    )?;
    Ok(ActividadPlan {
        id: conn.last_insert_rowid(),
        plan_id,
        actividad_id,
        descripcion: descripcion.map(str::to_string),
        horas,
        porcentaje_progreso: 0.0,
    })
}

pub fn actividades_de_plan(conn: &Connection, plan_id: i64) -> AppResult<Vec<ActividadPlan>> {
    let mut stmt = conn.prepare(
        "SELECT id, plan_id, actividad_id, descripcion, horas, porcentaje_progreso
         FROM actividades_plan WHERE plan_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![plan_id], actividad_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_avance(conn: &Connection, actividad_plan_id: i64, porcentaje: f64) -> AppResult<()> {
    conn.execute(
        "UPDATE actividades_plan SET porcentaje_progreso = ?1 WHERE id = ?2",
        params![porcentaje, actividad_plan_id],
    )?;
    Ok(())
}

// --- informes ---

pub fn insertar_informe(
    conn: &Connection,
    plan_id: i64,
    periodo_id: i64,
    descripcion: Option<&str>,
    created_at: DateTime<Utc>,
) -> AppResult<InformePlanTrabajo> {
    conn.execute(
        "INSERT INTO informes_plan_trabajo (plan_id, periodo_id, descripcion, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![plan_id, periodo_id, descripcion, created_at],
    )?;
    Ok(InformePlanTrabajo {
        id: conn.last_insert_rowid(),
        plan_id,
        periodo_id,
        descripcion: descripcion.map(str::to_string),
        created_at,
    })
}

pub fn informes_de_plan(conn: &Connection, plan_id: i64) -> AppResult<Vec<InformePlanTrabajo>> {
    let mut stmt = conn.prepare(
        "SELECT id, plan_id, periodo_id, descripcion, created_at FROM informes_plan_trabajo
         WHERE plan_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![plan_id], informe_desde_fila)?;
    recolectar(filas)
}

/// Periodo de cada informe registrado para el plan.
pub fn periodos_con_informe(conn: &Connection, plan_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT periodo_id FROM informes_plan_trabajo WHERE plan_id = ?1 ORDER BY id")?;
    let filas = stmt.query_map(params![plan_id], |r| r.get::<_, i64>(0))?;
    recolectar(filas)
}

// --- evidencias ---

#[derive(Debug, Clone)]
pub struct FilaNuevaEvidencia<'a> {
    pub informe_id: i64,
    pub actividad_plan_id: i64,
    pub porcentaje_progreso_anterior: f64,
    pub porcentaje_progreso_nuevo: f64,
    pub descripcion: &'a str,
    pub archivo: Option<String>,
    pub url: Option<&'a str>,
}

pub fn insertar_evidencia(conn: &Connection, nueva: FilaNuevaEvidencia<'_>) -> AppResult<EvidenciaInforme> {
    conn.execute(
        "INSERT INTO evidencias_informe (informe_id, actividad_plan_id, porcentaje_progreso_anterior,
            porcentaje_progreso_nuevo, descripcion, archivo, url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            nueva.informe_id,
            nueva.actividad_plan_id,
            nueva.porcentaje_progreso_anterior,
            nueva.porcentaje_progreso_nuevo,
            nueva.descripcion,
            nueva.archivo,
            nueva.url,
        ],
    )?;
    Ok(EvidenciaInforme {
        id: conn.last_insert_rowid(),
        informe_id: nueva.informe_id,
        actividad_plan_id: nueva.actividad_plan_id,
        porcentaje_progreso_anterior: nueva.porcentaje_progreso_anterior,
        porcentaje_progreso_nuevo: nueva.porcentaje_progreso_nuevo,
        descripcion: nueva.descripcion.to_string(),
        archivo: nueva.archivo,
        url: nueva.url.map(str::to_string),
    })
}

pub fn buscar_evidencia(conn: &Connection, id: i64) -> AppResult<Option<EvidenciaInforme>> {
    Ok(conn
        .query_row(
            "SELECT id, informe_id, actividad_plan_id, porcentaje_progreso_anterior, porcentaje_progreso_nuevo,
                    descripcion, archivo, url
             FROM evidencias_informe WHERE id = ?1",
            params![id],
            evidencia_desde_fila,
        )
        .optional()?)
}

pub fn evidencias_de_informe(conn: &Connection, informe_id: i64) -> AppResult<Vec<EvidenciaInforme>> {
    let mut stmt = conn.prepare(
        "SELECT id, informe_id, actividad_plan_id, porcentaje_progreso_anterior, porcentaje_progreso_nuevo,
                descripcion, archivo, url
         FROM evidencias_informe WHERE informe_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![informe_id], evidencia_desde_fila)?;
    recolectar(filas)
}
