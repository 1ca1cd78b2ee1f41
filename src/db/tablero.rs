// Consultas planas que alimentan el tablero de desempeño.

use rusqlite::{Connection, params_from_iter};

use super::recolectar;
use crate::error::AppResult;
use crate::reportes::tablero::{EvidenciaRegistrada, InformeRegistrado, Investigador};

pub fn investigadores(conn: &Connection) -> AppResult<Vec<Investigador>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.nombre, u.grupo_id, g.nombre
         FROM usuarios u LEFT JOIN grupos_investigacion g ON g.id = u.grupo_id
         ORDER BY u.id",
    )?;
    let filas = stmt.query_map([], |r| {
        Ok(Investigador { id: r.get(0)?, nombre: r.get(1)?, grupo_id: r.get(2)?, grupo_nombre: r.get(3)? })
    })?;
    recolectar(filas)
}

fn marcadores(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Un elemento por informe: (usuario dueño del plan, periodo del informe).
pub fn informes_en(conn: &Connection, periodos: &[i64]) -> AppResult<Vec<InformeRegistrado>> {
    if periodos.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT p.usuario_id, i.periodo_id
         FROM informes_plan_trabajo i JOIN planes_trabajo p ON p.id = i.plan_id
         WHERE i.periodo_id IN ({})",
        marcadores(periodos.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map(params_from_iter(periodos.iter()), |r| Ok((r.get(0)?, r.get(1)?)))?;
    recolectar(filas)
}

/// Un elemento por evidencia: (usuario, periodo, porcentaje_progreso_nuevo).
pub fn evidencias_en(conn: &Connection, periodos: &[i64]) -> AppResult<Vec<EvidenciaRegistrada>> {
    if periodos.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT p.usuario_id, i.periodo_id, e.porcentaje_progreso_nuevo
         FROM evidencias_informe e
         JOIN informes_plan_trabajo i ON i.id = e.informe_id
         JOIN planes_trabajo p ON p.id = i.plan_id
         WHERE i.periodo_id IN ({})",
        marcadores(periodos.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let filas = stmt.query_map(params_from_iter(periodos.iter()), |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?;
    recolectar(filas)
}
