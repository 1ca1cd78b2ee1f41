// Convocatorias, requisitos, postulaciones y archivos.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{
    ArchivoPostulacion, Convocatoria, EstadoConvocatoria, EstadoPostulacion, Postulacion, RequisitoConvocatoria,
};
use crate::reglas::eliminacion::DependenciasConvocatoria;

fn convocatoria_desde_fila(row: &Row<'_>) -> rusqlite::Result<Convocatoria> {
    Ok(Convocatoria {
        id: row.get(0)?,
        nombre: row.get(1)?,
        descripcion: row.get(2)?,
        fecha_inicio: row.get(3)?,
        fecha_fin: row.get(4)?,
        estado: row.get(5)?,
    })
}

fn requisito_desde_fila(row: &Row<'_>) -> rusqlite::Result<RequisitoConvocatoria> {
    Ok(RequisitoConvocatoria {
        id: row.get(0)?,
        convocatoria_id: row.get(1)?,
        nombre: row.get(2)?,
        obligatorio: row.get(3)?,
    })
}

fn postulacion_desde_fila(row: &Row<'_>) -> rusqlite::Result<Postulacion> {
    Ok(Postulacion {
        id: row.get(0)?,
        convocatoria_id: row.get(1)?,
        usuario_id: row.get(2)?,
        estado: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn archivo_desde_fila(row: &Row<'_>) -> rusqlite::Result<ArchivoPostulacion> {
    Ok(ArchivoPostulacion {
        id: row.get(0)?,
        postulacion_id: row.get(1)?,
        requisito_id: row.get(2)?,
        nombre_original: row.get(3)?,
        ruta: row.get(4)?,
    })
}

// --- convocatorias ---

pub fn insertar_convocatoria(
    conn: &Connection,
    nombre: &str,
    descripcion: Option<&str>,
    fecha_inicio: DateTime<Utc>,
    fecha_fin: DateTime<Utc>,
    estado: EstadoConvocatoria,
) -> AppResult<Convocatoria> {
    conn.execute(
        "INSERT INTO convocatorias (nombre, descripcion, fecha_inicio, fecha_fin, estado) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![nombre, descripcion, fecha_inicio, fecha_fin, estado],
    )?;
    Ok(Convocatoria {
        id: conn.last_insert_rowid(),
        nombre: nombre.to_string(),
        descripcion: descripcion.map(str::to_string),
        fecha_inicio,
        fecha_fin,
        estado,
    })
}

pub fn buscar_convocatoria(conn: &Connection, id: i64) -> AppResult<Option<Convocatoria>> {
    Ok(conn
        .query_row(
            "SELECT id, nombre, descripcion, fecha_inicio, fecha_fin, estado FROM convocatorias WHERE id = ?1",
            params![id],
            convocatoria_desde_fila,
        )
        .optional()?)
}

pub fn listar_convocatorias(conn: &Connection) -> AppResult<Vec<Convocatoria>> {
    let mut stmt = conn.prepare(
        "SELECT id, nombre, descripcion, fecha_inicio, fecha_fin, estado FROM convocatorias ORDER BY fecha_inicio DESC, id DESC",
    )?;
    let filas = stmt.query_map([], convocatoria_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_estado_convocatoria(conn: &Connection, id: i64, estado: EstadoConvocatoria) -> AppResult<()> {
    conn.execute("UPDATE convocatorias SET estado = ?1 WHERE id = ?2", params![estado, id])?;
    Ok(())
}

pub fn dependencias_convocatoria(conn: &Connection, convocatoria: &Convocatoria) -> AppResult<DependenciasConvocatoria> {
    let postulaciones: i64 = conn.query_row(
        "SELECT COUNT(*) FROM postulaciones WHERE convocatoria_id = ?1",
        params![convocatoria.id],
        |r| r.get(0),
    )?;
    let archivos: i64 = conn.query_row(
        "SELECT COUNT(*) FROM archivos_postulacion a
         JOIN requisitos_convocatoria r ON r.id = a.requisito_id
         WHERE r.convocatoria_id = ?1",
        params![convocatoria.id],
        |r| r.get(0),
    )?;
    Ok(DependenciasConvocatoria {
        postulaciones,
        archivos,
        estado: convocatoria.estado,
        fecha_fin: convocatoria.fecha_fin,
    })
}

/// Borra la convocatoria; sus requisitos caen en cascada.
pub fn eliminar_convocatoria(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM convocatorias WHERE id = ?1", params![id])?;
    Ok(())
}

// --- requisitos ---

pub fn insertar_requisito(
    conn: &Connection,
    convocatoria_id: i64,
    nombre: &str,
    obligatorio: bool,
) -> AppResult<RequisitoConvocatoria> {
    conn.execute(
        "INSERT INTO requisitos_convocatoria (convocatoria_id, nombre, obligatorio) VALUES (?1, ?2, ?3)",
        params![convocatoria_id, nombre, obligatorio],
    )?;
    Ok(RequisitoConvocatoria { id: conn.last_insert_rowid(), convocatoria_id, nombre: nombre.to_string(), obligatorio })
}

pub fn requisitos_de(conn: &Connection, convocatoria_id: i64) -> AppResult<Vec<RequisitoConvocatoria>> {
    let mut stmt = conn.prepare(
        "SELECT id, convocatoria_id, nombre, obligatorio FROM requisitos_convocatoria
         WHERE convocatoria_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![convocatoria_id], requisito_desde_fila)?;
    recolectar(filas)
}

// --- postulaciones ---

pub fn existe_postulacion(conn: &Connection, convocatoria_id: i64, usuario_id: i64) -> AppResult<bool> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM postulaciones WHERE convocatoria_id = ?1 AND usuario_id = ?2",
            params![convocatoria_id, usuario_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id.is_some())
}

pub fn insertar_postulacion(
    conn: &Connection,
    convocatoria_id: i64,
    usuario_id: i64,
    created_at: DateTime<Utc>,
) -> AppResult<Postulacion> {
    let estado = EstadoPostulacion::Pendiente;
    conn.execute(
        "INSERT INTO postulaciones (convocatoria_id, usuario_id, estado, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![convocatoria_id, usuario_id, estado, created_at],
    )?;
    Ok(Postulacion { id: conn.last_insert_rowid(), convocatoria_id, usuario_id, estado, created_at })
}

pub fn buscar_postulacion(conn: &Connection, id: i64) -> AppResult<Option<Postulacion>> {
    Ok(conn
        .query_row(
            "SELECT id, convocatoria_id, usuario_id, estado, created_at FROM postulaciones WHERE id = ?1",
            params![id],
            postulacion_desde_fila,
        )
        .optional()?)
}

pub fn postulaciones_de(conn: &Connection, convocatoria_id: i64) -> AppResult<Vec<Postulacion>> {
    let mut stmt = conn.prepare(
        "SELECT id, convocatoria_id, usuario_id, estado, created_at FROM postulaciones
         WHERE convocatoria_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![convocatoria_id], postulacion_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_estado_postulacion(conn: &Connection, id: i64, estado: EstadoPostulacion) -> AppResult<()> {
    conn.execute("UPDATE postulaciones SET estado = ?1 WHERE id = ?2", params![estado, id])?;
    Ok(())
}

// --- archivos ---

pub fn insertar_archivo(
    conn: &Connection,
    postulacion_id: i64,
    requisito_id: i64,
    nombre_original: &str,
    ruta: &str,
) -> AppResult<ArchivoPostulacion> {
    conn.execute(
        "INSERT INTO archivos_postulacion (postulacion_id, requisito_id, nombre_original, ruta) VALUES (?1, ?2, ?3, ?4)",
        params![postulacion_id, requisito_id, nombre_original, ruta],
    )?;
    Ok(ArchivoPostulacion {
        id: conn.last_insert_rowid(),
        postulacion_id,
        requisito_id,
        nombre_original: nombre_original.to_string(),
        ruta: ruta.to_string(),
    })
}

pub fn buscar_archivo(conn: &Connection, id: i64) -> AppResult<Option<ArchivoPostulacion>> {
    Ok(conn
        .query_row(
            "SELECT id, postulacion_id, requisito_id, nombre_original, ruta FROM archivos_postulacion WHERE id = ?1",
            params![id],
            archivo_desde_fila,
        )
        .optional()?)
}

pub fn archivos_de(conn: &Connection, postulacion_id: i64) -> AppResult<Vec<ArchivoPostulacion>> {
    let mut stmt = conn.prepare(
        "SELECT id, postulacion_id, requisito_id, nombre_original, ruta FROM archivos_postulacion
         WHERE postulacion_id = ?1 ORDER BY id",
    )?;
    let filas = stmt.query_map(params![postulacion_id], archivo_desde_fila)?;
    recolectar(filas)
}
