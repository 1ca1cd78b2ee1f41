//! Persistencia en SQLite: apertura de la conexión, esquema y repositorios.
//!
//! Los repositorios reciben `&Connection`; dentro de una transacción se les
//! pasa la `Transaction` (que se desreferencia a `Connection`).

pub mod convocatorias;
pub mod entregas;
pub mod horas;
pub mod organizacion;
pub mod periodos;
pub mod planes;
pub mod tablero;

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::config::DB_EN_MEMORIA;
use crate::error::AppResult;

const ESQUEMA: &str = "
CREATE TABLE IF NOT EXISTS grupos_investigacion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    descripcion TEXT
);

CREATE TABLE IF NOT EXISTS usuarios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    grupo_id INTEGER REFERENCES grupos_investigacion(id)
);

CREATE TABLE IF NOT EXISTS proyectos_investigativos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    titulo TEXT NOT NULL,
    grupo_id INTEGER REFERENCES grupos_investigacion(id),
    estado TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS productos_investigativos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    proyecto_id INTEGER NOT NULL REFERENCES proyectos_investigativos(id),
    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
    titulo TEXT NOT NULL,
    progreso INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS periodos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    fecha_limite_planeacion TEXT NOT NULL,
    fecha_limite_evidencias TEXT NOT NULL,
    estado TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS horas_investigacion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
    periodo_id INTEGER NOT NULL REFERENCES periodos(id),
    horas REAL NOT NULL,
    estado TEXT NOT NULL,
    UNIQUE (usuario_id, periodo_id)
);

CREATE TABLE IF NOT EXISTS entregas_producto (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    producto_id INTEGER NOT NULL REFERENCES productos_investigativos(id),
    periodo_id INTEGER NOT NULL REFERENCES periodos(id),
    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
    tipo TEXT NOT NULL,
    actividades_planeacion TEXT NOT NULL DEFAULT '[]',
    horas_planeacion REAL NOT NULL DEFAULT 0,
    horas_evidencia REAL NOT NULL DEFAULT 0,
    progreso_planeacion REAL NOT NULL DEFAULT 0,
    progreso_evidencia REAL NOT NULL DEFAULT 0,
    descripcion TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (producto_id, periodo_id, tipo)
);

CREATE TABLE IF NOT EXISTS actividades_investigacion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS planes_trabajo (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
    nombre TEXT NOT NULL,
    vigencia TEXT NOT NULL,
    periodo_id INTEGER NOT NULL REFERENCES periodos(id),
    estado TEXT NOT NULL,
    observaciones TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS actividades_plan (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plan_id INTEGER NOT NULL REFERENCES planes_trabajo(id),
    actividad_id INTEGER NOT NULL REFERENCES actividades_investigacion(id),
    descripcion TEXT,
    horas REAL NOT NULL DEFAULT 0,
    porcentaje_progreso REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS informes_plan_trabajo (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    plan_id INTEGER NOT NULL REFERENCES planes_trabajo(id),
    periodo_id INTEGER NOT NULL REFERENCES periodos(id),
    descripcion TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (plan_id, periodo_id)
);

CREATE TABLE IF NOT EXISTS evidencias_informe (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    informe_id INTEGER NOT NULL REFERENCES informes_plan_trabajo(id),
    actividad_plan_id INTEGER NOT NULL REFERENCES actividades_plan(id),
    porcentaje_progreso_anterior REAL NOT NULL,
    porcentaje_progreso_nuevo REAL NOT NULL,
    descripcion TEXT NOT NULL,
    archivo TEXT,
    url TEXT
);

CREATE TABLE IF NOT EXISTS convocatorias (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    descripcion TEXT,
    fecha_inicio TEXT NOT NULL,
    fecha_fin TEXT NOT NULL,
    estado TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS requisitos_convocatoria (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    convocatoria_id INTEGER NOT NULL REFERENCES convocatorias(id) ON DELETE CASCADE,
    nombre TEXT NOT NULL,
    obligatorio INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS postulaciones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    convocatoria_id INTEGER NOT NULL REFERENCES convocatorias(id),
    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
    estado TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (convocatoria_id, usuario_id)
);

CREATE TABLE IF NOT EXISTS archivos_postulacion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    postulacion_id INTEGER NOT NULL REFERENCES postulaciones(id),
    requisito_id INTEGER NOT NULL REFERENCES requisitos_convocatoria(id),
    nombre_original TEXT NOT NULL,
    ruta TEXT NOT NULL
);
";

/// Abre la base de datos. `:memory:` abre una base en memoria; para una
/// ruta en disco se crea el directorio padre si hace falta.
pub fn abrir(db_path: &str) -> AppResult<Connection> {
    let conn = if db_path == DB_EN_MEMORIA {
        Connection::open_in_memory()?
    } else {
        if let Some(dir) = Path::new(db_path).parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        Connection::open(db_path)?
    };
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Crea las tablas que falten.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(ESQUEMA)?;
    Ok(())
}

pub fn abrir_e_inicializar(db_path: &str) -> AppResult<Connection> {
    let conn = abrir(db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

/// Convierte un `Option` de consulta en `NoEncontrado` con el nombre de la entidad.
pub fn requerir<T>(valor: Option<T>, entidad: &str) -> AppResult<T> {
    valor.ok_or_else(|| crate::error::AppError::NoEncontrado(entidad.to_string()))
}

pub(crate) fn recolectar<T>(filas: impl Iterator<Item = rusqlite::Result<T>>) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for f in filas {
        out.push(f?);
    }
    Ok(out)
}
