// Usuarios, grupos, proyectos, productos y catálogo de actividades.

use rusqlite::Connection;
use serde::Deserialize;

use super::regla;
use crate::contexto::{Contexto, permisos};
use crate::db::{self, organizacion as repo};
use crate::error::AppResult;
use crate::models::{
    ActividadInvestigacion, EstadoProyecto, GrupoInvestigacion, ProductoInvestigativo, ProyectoInvestigativo, Usuario,
};
use crate::reglas::{Validador, eliminacion};

#[derive(Debug, Clone, Deserialize)]
pub struct DatosUsuario {
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub grupo_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosGrupo {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosProyecto {
    pub titulo: String,
    #[serde(default)]
    pub grupo_id: Option<i64>,
    #[serde(default)]
    pub estado: Option<EstadoProyecto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosProducto {
    pub proyecto_id: i64,
    pub usuario_id: i64,
    pub titulo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosActividad {
    pub nombre: String,
}

// --- usuarios ---

pub fn listar_usuarios(conn: &Connection) -> AppResult<Vec<Usuario>> {
    repo::listar_usuarios(conn)
}

pub fn crear_usuario(conn: &Connection, ctx: &Contexto, datos: &DatosUsuario) -> AppResult<Usuario> {
    ctx.autorizar(permisos::USUARIOS_GESTIONAR)?;
    let email = datos.email.trim().to_lowercase();
    Validador::new()
        .requerido("nombre", &datos.nombre)
        .condicion("email", email.contains('@') && !email.starts_with('@'), "no es un correo válido")
        .terminar()?;
    Validador::new()
        .condicion("email", !repo::existe_email(conn, &email)?, "ya está registrado")
        .terminar()?;
    if let Some(grupo_id) = datos.grupo_id {
        db::requerir(repo::buscar_grupo(conn, grupo_id)?, "grupo")?;
    }
    let usuario = repo::insertar_usuario(conn, datos.nombre.trim(), &email, datos.grupo_id)?;
    tracing::info!(usuario_id = usuario.id, "usuario registrado");
    Ok(usuario)
}

// --- grupos ---

pub fn listar_grupos(conn: &Connection) -> AppResult<Vec<GrupoInvestigacion>> {
    repo::listar_grupos(conn)
}

pub fn crear_grupo(conn: &Connection, ctx: &Contexto, datos: &DatosGrupo) -> AppResult<GrupoInvestigacion> {
    ctx.autorizar(permisos::GRUPOS_GESTIONAR)?;
    Validador::new().requerido("nombre", &datos.nombre).terminar()?;
    let grupo = repo::insertar_grupo(conn, datos.nombre.trim(), datos.descripcion.as_deref())?;
    tracing::info!(grupo_id = grupo.id, "grupo creado");
    Ok(grupo)
}

pub fn eliminar_grupo(conn: &mut Connection, ctx: &Contexto, id: i64) -> AppResult<()> {
    ctx.autorizar(permisos::GRUPOS_GESTIONAR)?;
    let tx = conn.transaction()?;
    db::requerir(repo::buscar_grupo(&tx, id)?, "grupo")?;
    regla(eliminacion::grupo(&repo::dependencias_grupo(&tx, id)?))?;
    repo::eliminar_grupo(&tx, id)?;
    tx.commit()?;
    tracing::info!(grupo_id = id, "grupo eliminado");
    Ok(())
}

// --- proyectos ---

pub fn listar_proyectos(conn: &Connection) -> AppResult<Vec<ProyectoInvestigativo>> {
    repo::listar_proyectos(conn)
}

pub fn crear_proyecto(conn: &Connection, ctx: &Contexto, datos: &DatosProyecto) -> AppResult<ProyectoInvestigativo> {
    ctx.autorizar(permisos::PROYECTOS_GESTIONAR)?;
    Validador::new().requerido("titulo", &datos.titulo).terminar()?;
    if let Some(grupo_id) = datos.grupo_id {
        db::requerir(repo::buscar_grupo(conn, grupo_id)?, "grupo")?;
    }
    let proyecto = repo::insertar_proyecto(
        conn,
        datos.titulo.trim(),
        datos.grupo_id,
        datos.estado.unwrap_or(EstadoProyecto::Formulacion),
    )?;
    tracing::info!(proyecto_id = proyecto.id, "proyecto creado");
    Ok(proyecto)
}

pub fn cambiar_estado_proyecto(
    conn: &mut Connection,
    ctx: &Contexto,
    id: i64,
    hacia: EstadoProyecto,
) -> AppResult<ProyectoInvestigativo> {
    ctx.autorizar(permisos::PROYECTOS_GESTIONAR)?;
    let tx = conn.transaction()?;
    let mut proyecto = db::requerir(repo::buscar_proyecto(&tx, id)?, "proyecto")?;
    proyecto.estado = regla(proyecto.estado.transicion(hacia))?;
    repo::actualizar_estado_proyecto(&tx, id, proyecto.estado)?;
    tx.commit()?;
    tracing::info!(proyecto_id = id, estado = %proyecto.estado, "estado de proyecto actualizado");
    Ok(proyecto)
}

pub fn eliminar_proyecto(conn: &mut Connection, ctx: &Contexto, id: i64) -> AppResult<()> {
    ctx.autorizar(permisos::PROYECTOS_GESTIONAR)?;
    let tx = conn.transaction()?;
    db::requerir(repo::buscar_proyecto(&tx, id)?, "proyecto")?;
    regla(eliminacion::proyecto(&repo::dependencias_proyecto(&tx, id)?))?;
    repo::eliminar_proyecto(&tx, id)?;
    tx.commit()?;
    tracing::info!(proyecto_id = id, "proyecto eliminado");
    Ok(())
}

// --- productos ---

pub fn listar_productos(conn: &Connection, proyecto_id: Option<i64>) -> AppResult<Vec<ProductoInvestigativo>> {
    repo::listar_productos(conn, proyecto_id)
}

pub fn crear_producto(conn: &Connection, ctx: &Contexto, datos: &DatosProducto) -> AppResult<ProductoInvestigativo> {
    ctx.autorizar(permisos::PROYECTOS_GESTIONAR)?;
    Validador::new().requerido("titulo", &datos.titulo).terminar()?;
    db::requerir(repo::buscar_proyecto(conn, datos.proyecto_id)?, "proyecto")?;
    db::requerir(repo::buscar_usuario(conn, datos.usuario_id)?, "usuario")?;
    let producto = repo::insertar_producto(conn, datos.proyecto_id, datos.usuario_id, datos.titulo.trim())?;
    tracing::info!(producto_id = producto.id, proyecto_id = datos.proyecto_id, "producto creado");
    Ok(producto)
}

pub fn eliminar_producto(conn: &mut Connection, ctx: &Contexto, id: i64) -> AppResult<()> {
    ctx.autorizar(permisos::PROYECTOS_GESTIONAR)?;
    let tx = conn.transaction()?;
    let producto = db::requerir(repo::buscar_producto(&tx, id)?, "producto")?;
    regla(eliminacion::producto(&repo::dependencias_producto(&tx, &producto)?))?;
    repo::eliminar_producto(&tx, id)?;
    tx.commit()?;
    tracing::info!(producto_id = id, "producto eliminado");
    Ok(())
}

// --- catálogo ---

pub fn listar_actividades(conn: &Connection) -> AppResult<Vec<ActividadInvestigacion>> {
    repo::listar_actividades(conn)
}

pub fn crear_actividad(conn: &Connection, ctx: &Contexto, datos: &DatosActividad) -> AppResult<ActividadInvestigacion> {
    ctx.autorizar(permisos::CATALOGO_GESTIONAR)?;
    Validador::new().requerido("nombre", &datos.nombre).terminar()?;
    let actividad = repo::insertar_actividad(conn, datos.nombre.trim())?;
    tracing::info!(actividad_id = actividad.id, "actividad de catálogo creada");
    Ok(actividad)
}
