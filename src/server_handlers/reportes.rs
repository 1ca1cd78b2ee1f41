use actix_web::{HttpResponse, web};

use crate::contexto::Contexto;
use crate::error::AppError;
use crate::server::{AppState, con_db};
use crate::servicios::reportes;
use crate::servicios::revision::{self, SolicitudComparacion};

/// GET /reportes/tablero
pub async fn ver_tablero(estado: web::Data<AppState>, ctx: Contexto) -> Result<HttpResponse, AppError> {
    let tablero =
        con_db(&estado, move |conn, app| reportes::tablero(conn, &ctx, app.config.periodos_tablero)).await?;
    Ok(HttpResponse::Ok().json(tablero))
}

/// GET /reportes/tablero/grafico.svg
pub async fn grafico_tablero(estado: web::Data<AppState>, ctx: Contexto) -> Result<HttpResponse, AppError> {
    let svg =
        con_db(&estado, move |conn, app| reportes::grafico_tablero(conn, &ctx, app.config.periodos_tablero)).await?;
    Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
}

/// POST /revision/comparar
pub async fn comparar_evidencias(
    estado: web::Data<AppState>,
    ctx: Contexto,
    body: web::Json<SolicitudComparacion>,
) -> Result<HttpResponse, AppError> {
    let sol = body.into_inner();
    let similitud =
        con_db(&estado, move |conn, app| revision::comparar(conn, app.comparador.as_ref(), &ctx, &sol)).await?;
    Ok(HttpResponse::Ok().json(similitud))
}
