// Usuarios, grupos, proyectos, productos y catálogo de actividades.

use rusqlite::{Connection, OptionalExtension, Row, params};

use super::recolectar;
use crate::error::AppResult;
use crate::models::{
    ActividadInvestigacion, EstadoProyecto, GrupoInvestigacion, ProductoInvestigativo, ProyectoInvestigativo,
    Usuario,
};
use crate::reglas::eliminacion::{DependenciasGrupo, DependenciasProducto, DependenciasProyecto};

fn usuario_desde_fila(row: &Row<'_>) -> rusqlite::Result<Usuario> {
    Ok(Usuario { id: row.get(0)?, nombre: row.get(1)?, email: row.get(2)?, grupo_id: row.get(3)? })
}

fn grupo_desde_fila(row: &Row<'_>) -> rusqlite::Result<GrupoInvestigacion> {
    Ok(GrupoInvestigacion { id: row.get(0)?, nombre: row.get(1)?, descripcion: row.get(2)? })
}

fn proyecto_desde_fila(row: &Row<'_>) -> rusqlite::Result<ProyectoInvestigativo> {
    Ok(ProyectoInvestigativo { id: row.get(0)?, titulo: row.get(1)?, grupo_id: row.get(2)?, estado: row.get(3)? })
}

fn producto_desde_fila(row: &Row<'_>) -> rusqlite::Result<ProductoInvestigativo> {
    Ok(ProductoInvestigativo {
        id: row.get(0)?,
        proyecto_id: row.get(1)?,
        usuario_id: row.get(2)?,
        titulo: row.get(3)?,
        progreso: row.get(4)?,
    })
}

// --- usuarios ---

pub fn insertar_usuario(conn: &Connection, nombre: &str, email: &str, grupo_id: Option<i64>) -> AppResult<Usuario> {
    conn.execute(
        "INSERT INTO usuarios (nombre, email, grupo_id) VALUES (?1, ?2, ?3)",
        params![nombre, email, grupo_id],
    )?;
    Ok(Usuario { id: conn.last_insert_rowid(), nombre: nombre.to_string(), email: email.to_string(), grupo_id })
}

pub fn existe_email(conn: &Connection, email: &str) -> AppResult<bool> {
    let id: Option<i64> = conn
        .query_row("SELECT id FROM usuarios WHERE email = ?1", params![email], |r| r.get(0))
        .optional()?;
    Ok(id.is_some())
}

pub fn buscar_usuario(conn: &Connection, id: i64) -> AppResult<Option<Usuario>> {
    Ok(conn
        .query_row("SELECT id, nombre, email, grupo_id FROM usuarios WHERE id = ?1", params![id], usuario_desde_fila)
        .optional()?)
}

pub fn listar_usuarios(conn: &Connection) -> AppResult<Vec<Usuario>> {
    let mut stmt = conn.prepare("SELECT id, nombre, email, grupo_id FROM usuarios ORDER BY nombre, id")?;
    let filas = stmt.query_map([], usuario_desde_fila)?;
    recolectar(filas)
}

// --- grupos ---

pub fn insertar_grupo(conn: &Connection, nombre: &str, descripcion: Option<&str>) -> AppResult<GrupoInvestigacion> {
    conn.execute(
        "INSERT INTO grupos_investigacion (nombre, descripcion) VALUES (?1, ?2)",
        params![nombre, descripcion],
    )?;
    Ok(GrupoInvestigacion {
        id: conn.last_insert_rowid(),
        nombre: nombre.to_string(),
        descripcion: descripcion.map(str::to_string),
    })
}

pub fn buscar_grupo(conn: &Connection, id: i64) -> AppResult<Option<GrupoInvestigacion>> {
    Ok(conn
        .query_row(
            "SELECT id, nombre, descripcion FROM grupos_investigacion WHERE id = ?1",
            params![id],
            grupo_desde_fila,
        )
        .optional()?)
}

pub fn listar_grupos(conn: &Connection) -> AppResult<Vec<GrupoInvestigacion>> {
    let mut stmt = conn.prepare("SELECT id, nombre, descripcion FROM grupos_investigacion ORDER BY nombre")?;
    let filas = stmt.query_map([], grupo_desde_fila)?;
    recolectar(filas)
}

pub fn dependencias_grupo(conn: &Connection, id: i64) -> AppResult<DependenciasGrupo> {
    let usuarios: i64 = conn.query_row("SELECT COUNT(*) FROM usuarios WHERE grupo_id = ?1", params![id], |r| r.get(0))?;
    let proyectos: i64 =
        conn.query_row("SELECT COUNT(*) FROM proyectos_investigativos WHERE grupo_id = ?1", params![id], |r| r.get(0))?;
    Ok(DependenciasGrupo { usuarios, proyectos })
}

pub fn eliminar_grupo(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM grupos_investigacion WHERE id = ?1", params![id])?;
    Ok(())
}

// --- proyectos ---

pub fn insertar_proyecto(
    conn: &Connection,
    titulo: &str,
    grupo_id: Option<i64>,
    estado: EstadoProyecto,
) -> AppResult<ProyectoInvestigativo> {
    conn.execute(
        "INSERT INTO proyectos_investigativos (titulo, grupo_id, estado) VALUES (?1, ?2, ?3)",
        params![titulo, grupo_id, estado],
    )?;
    Ok(ProyectoInvestigativo { id: conn.last_insert_rowid(), titulo: titulo.to_string(), grupo_id, estado })
}

pub fn buscar_proyecto(conn: &Connection, id: i64) -> AppResult<Option<ProyectoInvestigativo>> {
    Ok(conn
        .query_row(
            "SELECT id, titulo, grupo_id, estado FROM proyectos_investigativos WHERE id = ?1",
            params![id],
            proyecto_desde_fila,
        )
        .optional()?)
}

pub fn listar_proyectos(conn: &Connection) -> AppResult<Vec<ProyectoInvestigativo>> {
    let mut stmt = conn.prepare("SELECT id, titulo, grupo_id, estado FROM proyectos_investigativos ORDER BY id")?;
    let filas = stmt.query_map([], proyecto_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_estado_proyecto(conn: &Connection, id: i64, estado: EstadoProyecto) -> AppResult<()> {
    conn.execute("UPDATE proyectos_investigativos SET estado = ?1 WHERE id = ?2", params![estado, id])?;
    Ok(())
}

pub fn dependencias_proyecto(conn: &Connection, id: i64) -> AppResult<DependenciasProyecto> {
    let productos: i64 = conn.query_row(
        "SELECT COUNT(*) FROM productos_investigativos WHERE proyecto_id = ?1",
        params![id],
        |r| r.get(0),
    )?;
    Ok(DependenciasProyecto { productos })
}

pub fn eliminar_proyecto(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM proyectos_investigativos WHERE id = ?1", params![id])?;
    Ok(())
}

// --- productos ---

pub fn insertar_producto(
    conn: &Connection,
    proyecto_id: i64,
    usuario_id: i64,
    titulo: &str,
) -> AppResult<ProductoInvestigativo> {
    conn.execute(
        "INSERT INTO productos_investigativos (proyecto_id, usuario_id, titulo, progreso) VALUES (?1, ?2, ?3, 0)",
        params![proyecto_id, usuario_id, titulo],
    )?;
    Ok(ProductoInvestigativo {
        id: conn.last_insert_rowid(),
        proyecto_id,
        usuario_id,
        titulo: titulo.to_string(),
        progreso: 0,
    })
}

pub fn buscar_producto(conn: &Connection, id: i64) -> AppResult<Option<ProductoInvestigativo>> {
    Ok(conn
        .query_row(
            "SELECT id, proyecto_id, usuario_id, titulo, progreso FROM productos_investigativos WHERE id = ?1",
            params![id],
            producto_desde_fila,
        )
        .optional()?)
}

pub fn listar_productos(conn: &Connection, proyecto_id: Option<i64>) -> AppResult<Vec<ProductoInvestigativo>> {
    let mut stmt = conn.prepare(
        "SELECT id, proyecto_id, usuario_id, titulo, progreso FROM productos_investigativos
         WHERE (?1 IS NULL OR proyecto_id = ?1) ORDER BY id",
    )?;
    let filas = stmt.query_map(params![proyecto_id], producto_desde_fila)?;
    recolectar(filas)
}

pub fn actualizar_progreso_producto(conn: &Connection, id: i64, progreso: i64) -> AppResult<()> {
    conn.execute("UPDATE productos_investigativos SET progreso = ?1 WHERE id = ?2", params![progreso, id])?;
    Ok(())
}

pub fn dependencias_producto(conn: &Connection, producto: &ProductoInvestigativo) -> AppResult<DependenciasProducto> {
    let estado_proyecto: EstadoProyecto = conn.query_row(
        "SELECT estado FROM proyectos_investigativos WHERE id = ?1",
        params![producto.proyecto_id],
        |r| r.get(0),
    )?;
    let entregas: i64 = conn.query_row(
        "SELECT COUNT(*) FROM entregas_producto WHERE producto_id = ?1",
        params![producto.id],
        |r| r.get(0),
    )?;
    Ok(DependenciasProducto { estado_proyecto, entregas })
}

pub fn eliminar_producto(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM productos_investigativos WHERE id = ?1", params![id])?;
    Ok(())
}

// --- catálogo ---

pub fn insertar_actividad(conn: &Connection, nombre: &str) -> AppResult<ActividadInvestigacion> {
    conn.execute("INSERT INTO actividades_investigacion (nombre) VALUES (?1)", params![nombre])?;
    Ok(ActividadInvestigacion { id: conn.last_insert_rowid(), nombre: nombre.to_string() })
}

pub fn buscar_actividad(conn: &Connection, id: i64) -> AppResult<Option<ActividadInvestigacion>> {
    Ok(conn
        .query_row("SELECT id, nombre FROM actividades_investigacion WHERE id = ?1", params![id], |r| {
            Ok(ActividadInvestigacion { id: r.get(0)?, nombre: r.get(1)? })
        })
        .optional()?)
}

pub fn listar_actividades(conn: &Connection) -> AppResult<Vec<ActividadInvestigacion>> {
    let mut stmt = conn.prepare("SELECT id, nombre FROM actividades_investigacion ORDER BY nombre")?;
    let filas = stmt.query_map([], |r| Ok(ActividadInvestigacion { id: r.get(0)?, nombre: r.get(1)? }))?;
    recolectar(filas)
}
