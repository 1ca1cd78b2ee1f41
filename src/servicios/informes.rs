//! Informes de avance de un plan de trabajo aprobado.
//!
//! El informe y sus evidencias se insertan en una sola transacción. Los
//! archivos se escriben en `informes/{plan}/{informe}/`; si algo falla
//! antes del commit, el directorio se elimina y la transacción se revierte.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};

use super::{ArchivoAdjunto, limpiar_directorio, regla};
use crate::almacenamiento::{Almacenamiento, nombre_seguro};
use crate::contexto::{Contexto, permisos};
use crate::db::{self, periodos, planes};
use crate::error::AppResult;
use crate::models::{EvidenciaInforme, InformePlanTrabajo, Vigencia};
use crate::reglas::informes::{AvanceAceptado, AvanceSolicitado, periodo_objetivo, validar_avances};
use crate::reglas::Validador;

pub const MIN_CARACTERES_DESCRIPCION: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct EvidenciaSolicitada {
    pub actividad_plan_id: i64,
    pub porcentaje_progreso_nuevo: f64,
    pub descripcion: String,
    #[serde(default)]
    pub archivo: Option<ArchivoAdjunto>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolicitudInforme {
    #[serde(default)]
    pub descripcion: Option<String>,
    pub evidencias: Vec<EvidenciaSolicitada>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetalleInforme {
    pub informe: InformePlanTrabajo,
    pub evidencias: Vec<EvidenciaInforme>,
}

/// Valida la entrada y decodifica los archivos, uno por evidencia.
fn validar(sol: &SolicitudInforme) -> AppResult<Vec<Option<Vec<u8>>>> {
    let mut v = Validador::new();
    v.condicion("evidencias", !sol.evidencias.is_empty(), "debe incluir al menos una evidencia");
    let mut archivos = Vec::with_capacity(sol.evidencias.len());
    for (i, e) in sol.evidencias.iter().enumerate() {
        let campo = |nombre: &str| format!("evidencias.{}.{}", i, nombre);
        v.min_caracteres(&campo("descripcion"), &e.descripcion, MIN_CARACTERES_DESCRIPCION)
            .rango(&campo("porcentaje_progreso_nuevo"), e.porcentaje_progreso_nuevo, 0.0, 100.0)
            .alguno(
                &campo("archivo"),
                &[e.archivo.as_ref().map(|a| a.contenido_base64.as_str()), e.url.as_deref()],
            );
        archivos.push(e.archivo.as_ref().and_then(|a| a.decodificar(&mut v, &campo("archivo"))));
    }
    v.terminar()?;
    Ok(archivos)
}

pub fn listar(conn: &Connection, plan_id: i64) -> AppResult<Vec<DetalleInforme>> {
    db::requerir(planes::buscar_plan(conn, plan_id)?, "plan de trabajo")?;
    planes::informes_de_plan(conn, plan_id)?
        .into_iter()
        .map(|informe| {
            let evidencias = planes::evidencias_de_informe(conn, informe.id)?;
            Ok(DetalleInforme { informe, evidencias })
        })
        .collect()
}

pub fn crear(
    conn: &mut Connection,
    almacenamiento: &dyn Almacenamiento,
    ctx: &Contexto,
    ahora: DateTime<Utc>,
    plan_id: i64,
    sol: &SolicitudInforme,
) -> AppResult<DetalleInforme> {
    ctx.autorizar(permisos::INFORMES_CREAR)?;
    let archivos = validar(sol)?;

    let tx = conn.transaction()?;
    let plan = db::requerir(planes::buscar_plan(&tx, plan_id)?, "plan de trabajo")?;
    ctx.autorizar_dueno_o(plan.usuario_id, permisos::TODOS)?;

    let inicio = db::requerir(periodos::buscar(&tx, plan.periodo_id)?, "periodo")?;
    let siguiente = match plan.vigencia {
        Vigencia::Anual => periodos::siguiente(&tx, inicio.id)?,
        Vigencia::Semestral => None,
    };
    let con_informe = planes::periodos_con_informe(&tx, plan.id)?;
    let objetivo = regla(periodo_objetivo(&plan, &inicio, siguiente.as_ref(), &con_informe, ahora))?;

    let actividades = planes::actividades_de_plan(&tx, plan.id)?;
    let solicitados: Vec<AvanceSolicitado> = sol
        .evidencias
        .iter()
        .map(|e| AvanceSolicitado { actividad_plan_id: e.actividad_plan_id, porcentaje_nuevo: e.porcentaje_progreso_nuevo })
        .collect();
    let aceptados = regla(validar_avances(plan.id, &actividades, &solicitados))?;

    let informe = planes::insertar_informe(&tx, plan.id, objetivo.id, sol.descripcion.as_deref(), ahora)?;
    let dir = format!("informes/{}/{}", plan.id, informe.id);

    let resultado =
        registrar_evidencias(&tx, almacenamiento, &dir, informe.id, sol, &archivos, &aceptados).and_then(|evidencias| {
            tx.commit()?;
            Ok(evidencias)
        });
    let evidencias = match resultado {
        Ok(evidencias) => evidencias,
        Err(e) => {
            limpiar_directorio(almacenamiento, &dir);
            return Err(e);
        }
    };

    tracing::info!(
        plan_id = plan.id,
        informe_id = informe.id,
        periodo_id = objetivo.id,
        evidencias = evidencias.len(),
        "informe registrado"
    );
    Ok(DetalleInforme { informe, evidencias })
}

fn registrar_evidencias(
    tx: &Transaction<'_>,
    almacenamiento: &dyn Almacenamiento,
    dir: &str,
    informe_id: i64,
    sol: &SolicitudInforme,
    archivos: &[Option<Vec<u8>>],
    aceptados: &[AvanceAceptado],
) -> AppResult<Vec<EvidenciaInforme>> {
    let mut evidencias = Vec::with_capacity(aceptados.len());
    for avance in aceptados {
        let solicitada = &sol.evidencias[avance.indice];
        let archivo = match (&solicitada.archivo, &archivos[avance.indice]) {
            (Some(adjunto), Some(bytes)) => {
                let ruta = format!("{}/{}_{}", dir, avance.indice + 1, nombre_seguro(&adjunto.nombre));
                almacenamiento.guardar(&ruta, bytes)?;
                Some(ruta)
            }
            _ => None,
        };
        let evidencia = planes::insertar_evidencia(
            tx,
            planes::FilaNuevaEvidencia {
                informe_id,
                actividad_plan_id: avance.actividad_plan_id,
                porcentaje_progreso_anterior: avance.porcentaje_anterior,
                porcentaje_progreso_nuevo: avance.porcentaje_nuevo,
                descripcion: solicitada.descripcion.trim(),
                archivo,
                url: solicitada.url.as_deref().map(str::trim).filter(|u| !u.is_empty()),
            },
        )?;
        planes::actualizar_avance(tx, avance.actividad_plan_id, avance.porcentaje_nuevo)?;
        evidencias.push(evidencia);
    }
    Ok(evidencias)
}
