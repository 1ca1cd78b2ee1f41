use actix_web::{HttpResponse, web};
use serde::Deserialize;

use super::creado;
use crate::contexto::Contexto;
use crate::error::AppError;
use crate::server::{AppState, con_db};
use crate::servicios::entregas::{self as servicio, SolicitudEntrega};

#[derive(Debug, Deserialize)]
pub struct FiltroEntregas {
    pub producto_id: Option<i64>,
    pub periodo_id: Option<i64>,
}

pub async fn listar_entregas(
    estado: web::Data<AppState>,
    _ctx: Contexto,
    filtro: web::Query<FiltroEntregas>,
) -> Result<HttpResponse, AppError> {
    let filtro = filtro.into_inner();
    let lista = con_db(&estado, move |conn, _| servicio::listar(conn, filtro.producto_id, filtro.periodo_id)).await?;
    Ok(HttpResponse::Ok().json(lista))
}

/// POST /entregas
pub async fn crear_entrega(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<SolicitudEntrega>,
) -> Result<HttpResponse, AppError> {
    let sol = body.into_inner();
    let entrega = con_db(&estado, move |conn, app| servicio::crear(conn, &ctx, app.ahora(), &sol)).await?;
    Ok(creado("Entrega registrada", entrega))
}
