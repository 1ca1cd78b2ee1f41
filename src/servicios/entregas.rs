//! Registro de entregas de producto (planeación y evidencias).

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use super::regla;
use crate::contexto::{Contexto, permisos};
use crate::db::{self, entregas, horas, organizacion, periodos};
use crate::error::{AppResult, Rechazo};
use crate::models::{EntregaProducto, ItemPlaneacion, TipoEntrega};
use crate::reglas::{Validador, entregas as reglas_entregas, horas as reglas_horas};

#[derive(Debug, Clone, Deserialize)]
pub struct SolicitudEntrega {
    pub producto_id: i64,
    pub periodo_id: i64,
    pub tipo: TipoEntrega,
    #[serde(default)]
    pub actividades_planeacion: Vec<ItemPlaneacion>,
    #[serde(default)]
    pub horas_planeacion: f64,
    #[serde(default)]
    pub horas_evidencia: f64,
    #[serde(default)]
    pub progreso_planeacion: f64,
    #[serde(default)]
    pub progreso_evidencia: f64,
    #[serde(default)]
    pub descripcion: Option<String>,
}

fn validar(sol: &SolicitudEntrega) -> AppResult<()> {
    let mut v = Validador::new();
    v.no_negativo("horas_planeacion", sol.horas_planeacion)
        .no_negativo("horas_evidencia", sol.horas_evidencia)
        .rango("progreso_planeacion", sol.progreso_planeacion, 0.0, 100.0)
        .rango("progreso_evidencia", sol.progreso_evidencia, 0.0, 100.0);
    for (i, item) in sol.actividades_planeacion.iter().enumerate() {
        v.requerido(&format!("actividades_planeacion.{}.nombre", i), &item.nombre)
            .rango(&format!("actividades_planeacion.{}.porcentaje", i), item.porcentaje, 0.0, 100.0);
    }
    v.terminar()?;
    Ok(())
}

pub fn listar(conn: &Connection, producto_id: Option<i64>, periodo_id: Option<i64>) -> AppResult<Vec<EntregaProducto>> {
    entregas::listar(conn, producto_id, periodo_id)
}

/// Registra una entrega y, si es de evidencias, recalcula el progreso del
/// producto en la misma transacción.
///
/// Orden de verificación: periodo activo, responsable del producto, plazo,
/// cadencia y presupuesto de horas. Las horas se descuentan al responsable.
pub fn crear(conn: &mut Connection, ctx: &Contexto, ahora: DateTime<Utc>, sol: &SolicitudEntrega) -> AppResult<EntregaProducto> {
    ctx.autorizar(permisos::ENTREGAS_CREAR)?;
    validar(sol)?;

    let tx = conn.transaction()?;
    let producto = db::requerir(organizacion::buscar_producto(&tx, sol.producto_id)?, "producto")?;
    let periodo = db::requerir(periodos::buscar(&tx, sol.periodo_id)?, "periodo")?;

    regla(reglas_entregas::verificar_periodo_activo(&periodo))?;
    if producto.usuario_id != ctx.usuario_id && !ctx.tiene(permisos::ENTREGAS_GESTIONAR) {
        return regla(Err(Rechazo::NoEsResponsable));
    }
    regla(reglas_entregas::verificar_plazo(sol.tipo, &periodo, ahora))?;
    let existentes = entregas::existentes(&tx, producto.id, periodo.id)?;
    regla(reglas_entregas::verificar_cadencia(sol.tipo, &existentes))?;
    let resumen = horas::resumen(&tx, producto.usuario_id, periodo.id)?;
    regla(reglas_horas::verificar_presupuesto(&resumen, sol.horas_planeacion, sol.horas_evidencia))?;

    let entrega = entregas::insertar(
        &tx,
        &entregas::FilaNuevaEntrega {
            producto_id: producto.id,
            periodo_id: periodo.id,
            usuario_id: producto.usuario_id,
            tipo: sol.tipo,
            actividades_planeacion: &sol.actividades_planeacion,
            horas_planeacion: sol.horas_planeacion,
            horas_evidencia: sol.horas_evidencia,
            progreso_planeacion: sol.progreso_planeacion,
            progreso_evidencia: sol.progreso_evidencia,
            descripcion: sol.descripcion.as_deref(),
            created_at: ahora,
        },
    )?;

    if entrega.tipo == TipoEntrega::Evidencia {
        let progresos = entregas::progresos_evidencia(&tx, producto.id)?;
        if let Some(progreso) = reglas_entregas::progreso_producto(&progresos) {
            organizacion::actualizar_progreso_producto(&tx, producto.id, progreso)?;
            tracing::debug!(producto_id = producto.id, progreso, "progreso de producto recalculado");
        }
    }
    tx.commit()?;
    tracing::info!(
        entrega_id = entrega.id,
        producto_id = producto.id,
        periodo_id = periodo.id,
        tipo = %entrega.tipo,
        "entrega registrada"
    );
    Ok(entrega)
}
