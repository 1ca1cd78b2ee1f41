use std::collections::HashMap;

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::{creado, ok};
use crate::contexto::Contexto;
use crate::error::AppError;
use crate::reportes::ModoEntrega;
use crate::server::{AppState, con_db};
use crate::servicios::informes::{self, SolicitudInforme};
use crate::servicios::planes::{self, CambioEstadoPlan, DatosActividadPlan, DatosPlan};
use crate::servicios::reportes;

#[derive(Debug, Deserialize)]
pub struct FiltroPlanes {
    pub usuario_id: Option<i64>,
}

pub async fn listar_planes(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    filtro: web::Query<FiltroPlanes>,
) -> Result<HttpResponse, AppError> {
    let usuario_id = filtro.into_inner().usuario_id;
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| planes::listar(conn, usuario_id)).await?))
}

pub async fn obtener_plan(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| planes::obtener(conn, id)).await?))
}

pub async fn crear_plan(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosPlan>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let plan = con_db(&estado, move |conn, app| planes::crear(conn, &ctx, app.ahora(), &datos)).await?;
    Ok(creado("Plan de trabajo creado", plan))
}

pub async fn agregar_actividad_plan(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<DatosActividadPlan>,
) -> Result<HttpResponse, AppError> {
    let (id, datos) = (id.into_inner(), body.into_inner());
    let actividad = con_db(&estado, move |conn, _| planes::agregar_actividad(conn, &ctx, id, &datos)).await?;
    Ok(creado("Actividad agregada al plan", actividad))
}

pub async fn enviar_plan(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let plan = con_db(&estado, move |conn, _| planes::enviar(conn, &ctx, id)).await?;
    Ok(ok("Plan enviado a revisión", plan))
}

pub async fn cambiar_estado_plan(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<CambioEstadoPlan>,
) -> Result<HttpResponse, AppError> {
    let (id, cambio) = (id.into_inner(), body.into_inner());
    let plan = con_db(&estado, move |conn, _| planes::cambiar_estado(conn, &ctx, id, &cambio)).await?;
    Ok(ok("Estado del plan actualizado", plan))
}

/// GET /planes/{id}/reporte?modo=stream|descarga
pub async fn reporte_plan(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let modo = ModoEntrega::desde_query(query.get("modo").map(String::as_str));
    let documento =
        con_db(&estado, move |conn, app| reportes::reporte_plan(conn, app.renderizador.as_ref(), &ctx, id)).await?;
    let nombre = format!("plan_trabajo_{}.{}", id, documento.extension);
    Ok(HttpResponse::Ok()
        .content_type(documento.tipo_contenido)
        .insert_header((header::CONTENT_DISPOSITION, modo.disposicion(&nombre)))
        .body(documento.contenido))
}

pub async fn listar_informes(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    Ok(HttpResponse::Ok().json(con_db(&estado, move |conn, _| informes::listar(conn, id)).await?))
}

pub async fn crear_informe(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<SolicitudInforme>,
) -> Result<HttpResponse, AppError> {
    let (id, sol) = (id.into_inner(), body.into_inner());
    let informe = con_db(&estado, move |conn, app| {
        informes::crear(conn, app.almacenamiento.as_ref(), &ctx, app.ahora(), id, &sol)
    })
    .await?;
    Ok(creado("Informe registrado", informe))
}
