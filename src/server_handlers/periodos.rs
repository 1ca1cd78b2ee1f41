use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::{creado, ok};
use crate::contexto::Contexto;
use crate::error::AppError;
use crate::server::{AppState, con_db};
use crate::servicios::horas::{self as horas, DatosHoras};
use crate::servicios::periodos::{self as periodos, DatosPeriodo};

pub async fn listar_periodos(estado: web::Data<AppState>, _ctx: Contexto) -> Result<HttpResponse, AppError> {
    let lista = con_db(&estado, |conn, _| periodos::listar(conn)).await?;
    Ok(HttpResponse::Ok().json(lista))
}

pub async fn obtener_periodo(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let periodo = con_db(&estado, move |conn, _| periodos::obtener(conn, id)).await?;
    Ok(HttpResponse::Ok().json(periodo))
}

pub async fn crear_periodo(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosPeriodo>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let periodo = con_db(&estado, move |conn, _| periodos::crear(conn, &ctx, &datos)).await?;
    Ok(creado("Periodo creado", periodo))
}

pub async fn actualizar_periodo(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
    body: web::Json<DatosPeriodo>,
) -> Result<HttpResponse, AppError> {
    let (id, datos) = (id.into_inner(), body.into_inner());
    let periodo = con_db(&estado, move |conn, _| periodos::actualizar(conn, &ctx, id, &datos)).await?;
    Ok(ok("Periodo actualizado", periodo))
}

pub async fn eliminar_periodo(
    estado: web::Data<AppState>,
    ctx: Contexto,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    con_db(&estado, move |conn, _| periodos::eliminar(conn, &ctx, id)).await?;
    Ok(ok("Periodo eliminado", serde_json::Value::Null))
}

#[derive(Debug, Deserialize)]
pub struct FiltroHoras {
    pub usuario_id: Option<i64>,
    pub periodo_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ConsultaDisponibles {
    pub usuario_id: i64,
    pub periodo_id: i64,
}

pub async fn listar_horas(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    filtro: web::Query<FiltroHoras>,
) -> Result<HttpResponse, AppError> {
    let filtro = filtro.into_inner();
    let lista = con_db(&estado, move |conn, _| horas::listar(conn, filtro.usuario_id, filtro.periodo_id)).await?;
    Ok(HttpResponse::Ok().json(lista))
}

pub async fn crear_horas(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<DatosHoras>,
) -> Result<HttpResponse, AppError> {
    let datos = body.into_inner();
    let registro = con_db(&estado, move |conn, _| horas::crear(conn, &ctx, &datos)).await?;
    Ok(creado("Horas de investigación asignadas", registro))
}

pub async fn horas_disponibles(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    consulta: web::Query<ConsultaDisponibles>,
) -> Result<HttpResponse, AppError> {
    let consulta = consulta.into_inner();
    let resumen =
        con_db(&estado, move |conn, _| horas::disponibles(conn, consulta.usuario_id, consulta.periodo_id)).await?;
    Ok(HttpResponse::Ok().json(resumen))
}
