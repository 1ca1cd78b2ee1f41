use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::regla;
use crate::contexto::{Contexto, permisos};
use crate::db::{self, horas, organizacion, periodos};
use crate::error::{AppResult, Rechazo};
use crate::models::{EstadoRegistro, HorasInvestigacion};
use crate::reglas::Validador;

#[derive(Debug, Clone, Deserialize)]
pub struct DatosHoras {
    pub usuario_id: i64,
    pub periodo_id: i64,
    pub horas: f64,
    #[serde(default)]
    pub estado: Option<EstadoRegistro>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HorasDisponibles {
    pub usuario_id: i64,
    pub periodo_id: i64,
    pub asignadas: f64,
    pub comprometidas: f64,
    pub disponibles: f64,
}

pub fn listar(conn: &Connection, usuario_id: Option<i64>, periodo_id: Option<i64>) -> AppResult<Vec<HorasInvestigacion>> {
    horas::listar(conn, usuario_id, periodo_id)
}

pub fn crear(conn: &mut Connection, ctx: &Contexto, datos: &DatosHoras) -> AppResult<HorasInvestigacion> {
    ctx.autorizar(permisos::HORAS_GESTIONAR)?;
    Validador::new().no_negativo("horas", datos.horas).terminar()?;
    let tx = conn.transaction()?;
    db::requerir(organizacion::buscar_usuario(&tx, datos.usuario_id)?, "usuario")?;
    db::requerir(periodos::buscar(&tx, datos.periodo_id)?, "periodo")?;
    if horas::existe(&tx, datos.usuario_id, datos.periodo_id)? {
        return regla(Err(Rechazo::HorasDuplicadas));
    }
    let registro = horas::insertar(
        &tx,
        datos.usuario_id,
        datos.periodo_id,
        datos.horas,
        datos.estado.unwrap_or(EstadoRegistro::Activo),
    )?;
    tx.commit()?;
    tracing::info!(usuario_id = datos.usuario_id, periodo_id = datos.periodo_id, horas = datos.horas, "horas asignadas");
    Ok(registro)
}

pub fn disponibles(conn: &Connection, usuario_id: i64, periodo_id: i64) -> AppResult<HorasDisponibles> {
    let resumen = horas::resumen(conn, usuario_id, periodo_id)?;
    Ok(HorasDisponibles {
        usuario_id,
        periodo_id,
        asignadas: resumen.asignadas,
        comprometidas: resumen.comprometidas,
        disponibles: resumen.disponibles(),
    })
}
