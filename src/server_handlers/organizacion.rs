use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;

use super::{creado, ok};
use crate::contexto::Contexto;
use crate::error::AppError;
use crate::models::EstadoProyecto;
use crate::server::{AppState, con_db};
use crate::servicios::organizacion::{
    self as servicio, DatosActividad, DatosGrupo, DatosProducto, DatosProyecto, DatosUsuario,
};

#[derive(Debug, Deserialize)]
pub struct FiltroProductos {
    pub proyecto_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CambioEstadoProyecto {
    pub estado: EstadoProyecto,
}

pub async fn listar_usuarios(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(con_db(&estado, |conn, _| servicio::listar_usuarios(conn)).await?))
}

pub async fn crear_usuario(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosUsuario>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let usuario = con_db(&estado, move |conn, _| servicio::crear_usuario(conn, &ctx, &datos)).await?;
    Ok(creado("Usuario registrado", usuario))
}

pub async fn listar_grupos(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(con_db(&estado, |conn, _| servicio::listar_grupos(conn)).await?))
}

pub async fn crear_grupo(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosGrupo>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let grupo = con_db(&estado, move |conn, _| servicio::crear_grupo(conn, &ctx, &datos)).await?;
    Ok(creado("Grupo creado", grupo))
}

pub async fn eliminar_grupo(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    con_db(&estado, move |conn, _| servicio::eliminar_grupo(conn, &ctx, id)).await?;
    Ok(ok("Grupo eliminado", Value::Null))
}

pub async fn listar_proyectos(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(con_db(&estado, |conn, _| servicio::listar_proyectos(conn)).await?))
}

pub async fn crear_proyecto(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosProyecto>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let proyecto = con_db(&estado, move |conn, _| servicio::crear_proyecto(conn, &ctx, &datos)).await?;
    Ok(creado("Proyecto creado", proyecto))
}

pub async fn cambiar_estado_proyecto(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<CambioEstadoProyecto>,
) -> Result<HttpResponse, AppError> {
    let (id, hacia) = (id.into_inner(), body.into_inner().estado);
    let proyecto = con_db(&estado, move |conn, _| servicio::cambiar_estado_proyecto(conn, &ctx, id, hacia)).await?;
    Ok(ok("Estado del proyecto actualizado", proyecto))
}

pub async fn eliminar_proyecto(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    con_db(&estado, move |conn, _| servicio::eliminar_proyecto(conn, &ctx, id)).await?;
    Ok(ok("Proyecto eliminado", Value::Null))
}

pub async fn listar_productos(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    filtro: web::Query<FiltroProductos>,
) -> Result<HttpResponse, AppError> {
    let proyecto_id = filtro.into_inner().proyecto_id;
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| servicio::listar_productos(conn, proyecto_id)).await?))
}

pub async fn crear_producto(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosProducto>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let producto = con_db(&estado, move |conn, _| servicio::crear_producto(conn, &ctx, &datos)).await?;
    Ok(creado("Producto creado", producto))
}

pub async fn eliminar_producto(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    con_db(&estado, move |conn, _| servicio::eliminar_producto(conn, &ctx, id)).await?;
    Ok(ok("Producto eliminado", Value::Null))
}

pub async fn listar_actividades(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(con_db(&estado, |conn, _| servicio::listar_actividades(conn)).await?))
}

pub async fn crear_actividad(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosActividad>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let actividad = con_db(&estado, move |conn, _| servicio::crear_actividad(conn, &ctx, &datos)).await?;
    Ok(creado("Actividad creada", actividad))
}
