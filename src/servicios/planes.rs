// Planes de trabajo: creación, actividades y ciclo de revisión.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::regla;
use crate::contexto::{Contexto, permisos};
use crate::db::{self, organizacion, periodos, planes};
use crate::error::{AppResult, Rechazo};
use crate::models::{ActividadPlan, EstadoPlan, InformePlanTrabajo, PlanTrabajo, Vigencia};
use crate::reglas::Validador;

#[derive(Debug, Clone, Deserialize)]
pub struct DatosPlan {
    pub nombre: String,
    pub vigencia: Vigencia,
    pub periodo_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosActividadPlan {
    pub actividad_id: i64,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub horas: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CambioEstadoPlan {
    pub estado: EstadoPlan,
    #[serde(default)]
    pub observaciones: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetallePlan {
    pub plan: PlanTrabajo,
    pub actividades: Vec<ActividadPlan>,
    pub informes: Vec<InformePlanTrabajo>,
}

pub fn listar(conn: &Connection, usuario_id: Option<i64>) -> AppResult<Vec<PlanTrabajo>> {
    planes::listar_planes(conn, usuario_id)
}

pub fn obtener(conn: &Connection, id: i64) -> AppResult<DetallePlan> {
    let plan = db::requerir(planes::buscar_plan(conn, id)?, "plan de trabajo")?;
    let actividades = planes::actividades_de_plan(conn, id)?;
    let informes = planes::informes_de_plan(conn, id)?;
    Ok(DetallePlan { plan, actividades, informes })
}

/// El plan queda a nombre del usuario autenticado, en estado Creado.
pub fn crear(conn: &Connection, ctx: &Contexto, ahora: DateTime<Utc>, datos: &DatosPlan) -> AppResult<PlanTrabajo> {
    ctx.autorizar(permisos::PLANES_GESTIONAR)?;
    Validador::new().requerido("nombre", &datos.nombre).terminar()?;
    db::requerir(periodos::buscar(conn, datos.periodo_id)?, "periodo")?;
    let plan = planes::insertar_plan(conn, ctx.usuario_id, datos.nombre.trim(), datos.vigencia, datos.periodo_id, ahora)?;
    tracing::info!(plan_id = plan.id, usuario_id = ctx.usuario_id, vigencia = %plan.vigencia, "plan de trabajo creado");
    Ok(plan)
}

/// Solo los planes en Creado o Correccion aceptan actividades nuevas.
pub fn agregar_actividad(
    conn: &mut Connection,
    ctx: &Contexto,
    plan_id: i64,
    datos: &DatosActividadPlan,
) -> AppResult<ActividadPlan> {
    ctx.autorizar(permisos::PLANES_GESTIONAR)?;
    Validador::new().no_negativo("horas", datos.horas).terminar()?;
    let tx = conn.transaction()?;
    let plan = db::requerir(planes::buscar_plan(&tx, plan_id)?, "plan de trabajo")?;
    ctx.autorizar_dueno_o(plan.usuario_id, permisos::TODOS)?;
    if !matches!(plan.estado, EstadoPlan::Creado | EstadoPlan::Correccion) {
        return regla(Err(Rechazo::PlanNoEditable(plan.estado.to_string())));
    }
    db::requerir(organizacion::buscar_actividad(&tx, datos.actividad_id)?, "actividad")?;
    let actividad = planes::insertar_actividad_plan(&tx, plan_id, datos.actividad_id, datos.descripcion.as_deref(), datos.horas)?;
    tx.commit()?;
    tracing::info!(plan_id, actividad_plan_id = actividad.id, "actividad agregada al plan");
    Ok(actividad)
}

/// El dueño envía el plan a revisión (Creado o Correccion → Pendiente).
pub fn enviar(conn: &mut Connection, ctx: &Contexto, plan_id: i64) -> AppResult<PlanTrabajo> {
    ctx.autorizar(permisos::PLANES_GESTIONAR)?;
    let tx = conn.transaction()?;
    let mut plan = db::requerir(planes::buscar_plan(&tx, plan_id)?, "plan de trabajo")?;
    ctx.autorizar_dueno_o(plan.usuario_id, permisos::TODOS)?;
    plan.estado = regla(plan.estado.transicion(EstadoPlan::Pendiente))?;
    planes::actualizar_estado_plan(&tx, plan_id, plan.estado, plan.observaciones.as_deref())?;
    tx.commit()?;
    tracing::info!(plan_id, "plan enviado a revisión");
    Ok(plan)
}

/// Decisión del revisor. Devolver a corrección exige observaciones.
pub fn cambiar_estado(conn: &mut Connection, ctx: &Contexto, plan_id: i64, cambio: &CambioEstadoPlan) -> AppResult<PlanTrabajo> {
    ctx.autorizar(permisos::PLANES_REVISAR)?;
    let observaciones = cambio.observaciones.as_deref().map(str::trim).filter(|s| !s.is_empty());
    Validador::new()
        .condicion(
            "observaciones",
            cambio.estado != EstadoPlan::Correccion || observaciones.is_some(),
            "son obligatorias al devolver el plan a corrección",
        )
        .terminar()?;

    let tx = conn.transaction()?;
    let mut plan = db::requerir(planes::buscar_plan(&tx, plan_id)?, "plan de trabajo")?;
    plan.estado = regla(plan.estado.transicion(cambio.estado))?;
    if let Some(texto) = observaciones {
        plan.observaciones = Some(texto.to_string());
    }
    planes::actualizar_estado_plan(&tx, plan_id, plan.estado, plan.observaciones.as_deref())?;
    tx.commit()?;
    tracing::info!(plan_id, estado = %plan.estado, revisor = ctx.usuario_id, "estado de plan actualizado");
    Ok(plan)
}
