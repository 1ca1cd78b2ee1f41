use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde_json::Value;

use super::{creado, ok};
use crate::contexto::Contexto;
use crate::error::AppError;
use crate::reportes::ModoEntrega;
use crate::server::{AppState, con_db};
use crate::servicios::convocatorias::{
    self as servicio, CambioEstadoConvocatoria, CambioEstadoPostulacion, DatosConvocatoria, DatosRequisito,
    SolicitudPostulacion,
};

pub async fn listar_convocatorias(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(con_db(&estado, |conn, _| servicio::listar(conn)).await?))
}

pub async fn obtener_convocatoria(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| servicio::obtener(conn, id)).await?))
}

pub async fn crear_convocatoria(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosConvocatoria>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let detalle = con_db(&estado, move |conn, _| servicio::crear(conn, &ctx, &datos)).await?;
    Ok(creado("Convocatoria creada", detalle))
}

pub async fn eliminar_convocatoria(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    con_db(&estado, move |conn, app| servicio::eliminar(conn, &ctx, app.ahora(), id)).await?;
    Ok(ok("Convocatoria eliminada", Value::Null))
}

pub async fn cambiar_estado_convocatoria(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<CambioEstadoConvocatoria>,
) -> Result<HttpResponse, AppError> {
    let (id, nuevo) = (id.into_inner(), body.into_inner().estado);
    let convocatoria = con_db(&estado, move |conn, _| servicio::cambiar_estado(conn, &ctx, id, nuevo)).await?;
    Ok(ok("Estado de la convocatoria actualizado", convocatoria))
}

pub async fn agregar_requisito(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<DatosRequisito>,
) -> Result<HttpResponse, AppError> {
    let (id, datos) = (id.into_inner(), body.into_inner());
    let requisito = con_db(&estado, move |conn, _| servicio::agregar_requisito(conn, &ctx, id, &datos)).await?;
    Ok(creado("Requisito agregado", requisito))
}

pub async fn listar_postulaciones(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| servicio::listar_postulaciones(conn, &ctx, id)).await?))
}

pub async fn crear_postulacion(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<SolicitudPostulacion>,
) -> Result<HttpResponse, AppError> {
    let (id, sol) = (id.into_inner(), body.into_inner());
    let detalle = con_db(&estado, move |conn, app| {
        servicio::postular(conn, app.almacenamiento.as_ref(), &ctx, app.ahora(), id, &sol)
    })
    .await?;
    Ok(creado("Postulación registrada", detalle))
}

pub async fn evaluar_postulacion(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<CambioEstadoPostulacion>,
) -> Result<HttpResponse, AppError> {
    let (id, nuevo) = (id.into_inner(), body.into_inner().estado);
    let postulacion = con_db(&estado, move |conn, _| servicio::evaluar(conn, &ctx, id, nuevo)).await?;
    Ok(ok("Postulación evaluada", postulacion))
}

/// GET /postulaciones/{id}/archivos/{archivo_id}
pub async fn descargar_archivo_postulacion(
    estado: web::Data<AppState>,
    ctx: Contexto,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (postulacion_id, archivo_id) = path.into_inner();
    let archivo = con_db(&estado, move |conn, app| {
        servicio::descargar_archivo(conn, app.almacenamiento.as_ref(), &ctx, postulacion_id, archivo_id)
    })
    .await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header((header::CONTENT_DISPOSITION, ModoEntrega::Descarga.disposicion(&archivo.nombre)))
        .body(archivo.contenido))
}
