use rusqlite::Connection;

use crate::contexto::{Contexto, permisos};
use crate::db::{self, organizacion, periodos, planes, tablero as consultas};
use crate::error::AppResult;
use crate::reportes::documento::datos_plan_trabajo;
use crate::reportes::tablero::ColumnaPeriodo;
use crate::reportes::{Documento, Renderizador, Tablero, construir_tablero, grafico_grupos_svg};

pub const PLANTILLA_PLAN_TRABAJO: &str = "plan_trabajo";

/// Tablero de desempeño sobre los `cantidad_periodos` periodos más recientes.
pub fn tablero(conn: &Connection, ctx: &Contexto, cantidad_periodos: usize) -> AppResult<Tablero> {
    ctx.autorizar(permisos::REPORTES_VER)?;
    let columnas: Vec<ColumnaPeriodo> = periodos::recientes(conn, cantidad_periodos)?
        .into_iter()
        .map(|p| ColumnaPeriodo { id: p.id, nombre: p.nombre })
        .collect();
    let ids: Vec<i64> = columnas.iter().map(|c| c.id).collect();
    let investigadores = consultas::investigadores(conn)?;
    let informes = consultas::informes_en(conn, &ids)?;
    let evidencias = consultas::evidencias_en(conn, &ids)?;
    tracing::debug!(periodos = ids.len(), investigadores = investigadores.len(), "construyendo tablero");
    Ok(construir_tablero(columnas, &investigadores, &informes, &evidencias))
}

pub fn grafico_tablero(conn: &Connection, ctx: &Contexto, cantidad_periodos: usize) -> AppResult<String> {
    let tablero = tablero(conn, ctx, cantidad_periodos)?;
    grafico_grupos_svg(&tablero)
}

/// Reporte de un plan de trabajo, para su dueño o un revisor.
pub fn reporte_plan(
    conn: &Connection,
    renderizador: &dyn Renderizador,
    ctx: &Contexto,
    plan_id: i64,
) -> AppResult<Documento> {
    let plan = db::requerir(planes::buscar_plan(conn, plan_id)?, "plan de trabajo")?;
    ctx.autorizar_dueno_o(plan.usuario_id, permisos::PLANES_REVISAR)?;
    let usuario = db::requerir(organizacion::buscar_usuario(conn, plan.usuario_id)?, "usuario")?;
    let periodo = db::requerir(periodos::buscar(conn, plan.periodo_id)?, "periodo")?;
    let actividades = planes::actividades_de_plan(conn, plan.id)?;
    let catalogo = organizacion::listar_actividades(conn)?;
    let informes = planes::informes_de_plan(conn, plan.id)?;
    let datos = datos_plan_trabajo(&plan, &usuario, &periodo, &actividades, &catalogo, &informes);
    renderizador.renderizar(PLANTILLA_PLAN_TRABAJO, &datos)
}
