//! Convocatorias, sus requisitos y las postulaciones de los investigadores.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};

use super::{ArchivoAdjunto, limpiar_directorio, regla};
use crate::almacenamiento::{Almacenamiento, nombre_seguro};
use crate::contexto::{Contexto, permisos};
use crate::db::{self, convocatorias as repo};
use crate::error::{AppError, AppResult, Rechazo};
use crate::models::{
    ArchivoPostulacion, Convocatoria, EstadoConvocatoria, EstadoPostulacion, Postulacion, RequisitoConvocatoria,
};
use crate::reglas::{Validador, eliminacion};

fn verdadero() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosRequisito {
    pub nombre: String,
    #[serde(default = "verdadero")]
    pub obligatorio: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatosConvocatoria {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_fin: DateTime<Utc>,
    #[serde(default)]
    pub estado: Option<EstadoConvocatoria>,
    #[serde(default)]
    pub requisitos: Vec<DatosRequisito>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchivoRequisito {
    pub requisito_id: i64,
    #[serde(flatten)]
    pub archivo: ArchivoAdjunto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolicitudPostulacion {
    #[serde(default)]
    pub archivos: Vec<ArchivoRequisito>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CambioEstadoConvocatoria {
    pub estado: EstadoConvocatoria,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CambioEstadoPostulacion {
    pub estado: EstadoPostulacion,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetalleConvocatoria {
    pub convocatoria: Convocatoria,
    pub requisitos: Vec<RequisitoConvocatoria>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetallePostulacion {
    pub postulacion: Postulacion,
    pub archivos: Vec<ArchivoPostulacion>,
}

/// Archivo listo para enviarse al cliente.
#[derive(Debug, Clone)]
pub struct ArchivoDescargado {
    pub nombre: String,
    pub contenido: Vec<u8>,
}

// --- convocatorias ---

pub fn listar(conn: &Connection) -> AppResult<Vec<Convocatoria>> {
    repo::listar_convocatorias(conn)
}

pub fn obtener(conn: &Connection, id: i64) -> AppResult<DetalleConvocatoria> {
    let convocatoria = db::requerir(repo::buscar_convocatoria(conn, id)?, "convocatoria")?;
    let requisitos = repo::requisitos_de(conn, id)?;
    Ok(DetalleConvocatoria { convocatoria, requisitos })
}

pub fn crear(conn: &mut Connection, ctx: &Contexto, datos: &DatosConvocatoria) -> AppResult<DetalleConvocatoria> {
    ctx.autorizar(permisos::CONVOCATORIAS_GESTIONAR)?;
    let mut v = Validador::new();
    v.requerido("nombre", &datos.nombre).condicion(
        "fecha_fin",
        datos.fecha_fin >= datos.fecha_inicio,
        "debe ser posterior a la fecha de inicio",
    );
    for (i, r) in datos.requisitos.iter().enumerate() {
        v.requerido(&format!("requisitos.{}.nombre", i), &r.nombre);
    }
    v.terminar()?;

    let tx = conn.transaction()?;
    let convocatoria = repo::insertar_convocatoria(
        &tx,
        datos.nombre.trim(),
        datos.descripcion.as_deref(),
        datos.fecha_inicio,
        datos.fecha_fin,
        datos.estado.unwrap_or(EstadoConvocatoria::Abierta),
    )?;
    let mut requisitos = Vec::with_capacity(datos.requisitos.len());
    for r in &datos.requisitos {
        requisitos.push(repo::insertar_requisito(&tx, convocatoria.id, r.nombre.trim(), r.obligatorio)?);
    }
    tx.commit()?;
    tracing::info!(convocatoria_id = convocatoria.id, requisitos = requisitos.len(), "convocatoria creada");
    Ok(DetalleConvocatoria { convocatoria, requisitos })
}

pub fn cambiar_estado(conn: &Connection, ctx: &Contexto, id: i64, estado: EstadoConvocatoria) -> AppResult<Convocatoria> {
    ctx.autorizar(permisos::CONVOCATORIAS_GESTIONAR)?;
    let mut convocatoria = db::requerir(repo::buscar_convocatoria(conn, id)?, "convocatoria")?;
    repo::actualizar_estado_convocatoria(conn, id, estado)?;
    convocatoria.estado = estado;
    tracing::info!(convocatoria_id = id, estado = %estado, "estado de convocatoria actualizado");
    Ok(convocatoria)
}

pub fn agregar_requisito(
    conn: &Connection,
    ctx: &Contexto,
    convocatoria_id: i64,
    datos: &DatosRequisito,
) -> AppResult<RequisitoConvocatoria> {
    ctx.autorizar(permisos::CONVOCATORIAS_GESTIONAR)?;
    Validador::new().requerido("nombre", &datos.nombre).terminar()?;
    db::requerir(repo::buscar_convocatoria(conn, convocatoria_id)?, "convocatoria")?;
    let requisito = repo::insertar_requisito(conn, convocatoria_id, datos.nombre.trim(), datos.obligatorio)?;
    tracing::info!(convocatoria_id, requisito_id = requisito.id, "requisito agregado");
    Ok(requisito)
}

pub fn eliminar(conn: &mut Connection, ctx: &Contexto, ahora: DateTime<Utc>, id: i64) -> AppResult<()> {
    ctx.autorizar(permisos::CONVOCATORIAS_GESTIONAR)?;
    let tx = conn.transaction()?;
    let convocatoria = db::requerir(repo::buscar_convocatoria(&tx, id)?, "convocatoria")?;
    let dep = repo::dependencias_convocatoria(&tx, &convocatoria)?;
    regla(eliminacion::convocatoria(&dep, ahora))?;
    repo::eliminar_convocatoria(&tx, id)?;
    tx.commit()?;
    tracing::info!(convocatoria_id = id, "convocatoria eliminada");
    Ok(())
}

// --- postulaciones ---

/// Los evaluadores ven todas las postulaciones; los demás, solo la propia.
pub fn listar_postulaciones(conn: &Connection, ctx: &Contexto, convocatoria_id: i64) -> AppResult<Vec<DetallePostulacion>> {
    db::requerir(repo::buscar_convocatoria(conn, convocatoria_id)?, "convocatoria")?;
    let ve_todas = ctx.tiene(permisos::POSTULACIONES_EVALUAR);
    repo::postulaciones_de(conn, convocatoria_id)?
        .into_iter()
        .filter(|p| ve_todas || p.usuario_id == ctx.usuario_id)
        .map(|postulacion| {
            let archivos = repo::archivos_de(conn, postulacion.id)?;
            Ok(DetallePostulacion { postulacion, archivos })
        })
        .collect()
}

/// Registra la postulación del usuario autenticado con sus archivos.
pub fn postular(
    conn: &mut Connection,
    almacenamiento: &dyn Almacenamiento,
    ctx: &Contexto,
    ahora: DateTime<Utc>,
    convocatoria_id: i64,
    sol: &SolicitudPostulacion,
) -> AppResult<DetallePostulacion> {
    ctx.autorizar(permisos::POSTULACIONES_CREAR)?;
    let mut v = Validador::new();
    let contenidos: Vec<Option<Vec<u8>>> = sol
        .archivos
        .iter()
        .enumerate()
        .map(|(i, a)| a.archivo.decodificar(&mut v, &format!("archivos.{}", i)))
        .collect();
    v.terminar()?;

    let tx = conn.transaction()?;
    let convocatoria = db::requerir(repo::buscar_convocatoria(&tx, convocatoria_id)?, "convocatoria")?;
    if !convocatoria.recibe_postulaciones(ahora) {
        return regla(Err(Rechazo::ConvocatoriaCerrada));
    }
    if repo::existe_postulacion(&tx, convocatoria_id, ctx.usuario_id)? {
        return regla(Err(Rechazo::PostulacionDuplicada));
    }

    let requisitos = repo::requisitos_de(&tx, convocatoria_id)?;
    let mut v = Validador::new();
    for (i, a) in sol.archivos.iter().enumerate() {
        v.condicion(
            &format!("archivos.{}.requisito_id", i),
            requisitos.iter().any(|r| r.id == a.requisito_id),
            "no corresponde a un requisito de la convocatoria",
        );
    }
    v.terminar()?;
    if let Some(faltante) =
        requisitos.iter().find(|r| r.obligatorio && !sol.archivos.iter().any(|a| a.requisito_id == r.id))
    {
        return regla(Err(Rechazo::RequisitoFaltante(faltante.nombre.clone())));
    }

    let postulacion = repo::insertar_postulacion(&tx, convocatoria_id, ctx.usuario_id, ahora)?;
    let dir = format!("convocatorias/postulaciones/{}", postulacion.id);
    let resultado = guardar_archivos(&tx, almacenamiento, &dir, postulacion.id, sol, &contenidos).and_then(|archivos| {
        tx.commit()?;
        Ok(archivos)
    });
    let archivos = match resultado {
        Ok(archivos) => archivos,
        Err(e) => {
            tracing::error!(convocatoria_id, usuario_id = ctx.usuario_id, error = %e, "postulación revertida");
            limpiar_directorio(almacenamiento, &dir);
            return Err(e);
        }
    };

    tracing::info!(postulacion_id = postulacion.id, convocatoria_id, archivos = archivos.len(), "postulación registrada");
    Ok(DetallePostulacion { postulacion, archivos })
}

fn guardar_archivos(
    tx: &Transaction<'_>,
    almacenamiento: &dyn Almacenamiento,
    dir: &str,
    postulacion_id: i64,
    sol: &SolicitudPostulacion,
    contenidos: &[Option<Vec<u8>>],
) -> AppResult<Vec<ArchivoPostulacion>> {
    let mut archivos = Vec::with_capacity(sol.archivos.len());
    for (i, (a, contenido)) in sol.archivos.iter().zip(contenidos).enumerate() {
        let Some(bytes) = contenido else {
            return Err(AppError::Interno(format!("archivo {} sin contenido decodificado", i)));
        };
        let ruta = format!("{}/{}_{}_{}", dir, i + 1, a.requisito_id, nombre_seguro(&a.archivo.nombre));
        almacenamiento.guardar(&ruta, bytes)?;
        archivos.push(repo::insertar_archivo(tx, postulacion_id, a.requisito_id, a.archivo.nombre.trim(), &ruta)?);
    }
    Ok(archivos)
}

pub fn evaluar(conn: &mut Connection, ctx: &Contexto, postulacion_id: i64, estado: EstadoPostulacion) -> AppResult<Postulacion> {
    ctx.autorizar(permisos::POSTULACIONES_EVALUAR)?;
    let tx = conn.transaction()?;
    let mut postulacion = db::requerir(repo::buscar_postulacion(&tx, postulacion_id)?, "postulación")?;
    postulacion.estado = regla(postulacion.estado.transicion(estado))?;
    repo::actualizar_estado_postulacion(&tx, postulacion_id, postulacion.estado)?;
    tx.commit()?;
    tracing::info!(postulacion_id, estado = %postulacion.estado, evaluador = ctx.usuario_id, "postulación evaluada");
    Ok(postulacion)
}

/// Archivo de una postulación; lo ve su autor o un evaluador.
pub fn descargar_archivo(
    conn: &Connection,
    almacenamiento: &dyn Almacenamiento,
    ctx: &Contexto,
    postulacion_id: i64,
    archivo_id: i64,
) -> AppResult<ArchivoDescargado> {
    let postulacion = db::requerir(repo::buscar_postulacion(conn, postulacion_id)?, "postulación")?;
    ctx.autorizar_dueno_o(postulacion.usuario_id, permisos::POSTULACIONES_EVALUAR)?;
    let archivo = repo::buscar_archivo(conn, archivo_id)?.filter(|a| a.postulacion_id == postulacion_id);
    let archivo = db::requerir(archivo, "archivo")?;
    let contenido = almacenamiento.leer(&archivo.ruta)?;
    Ok(ArchivoDescargado { nombre: nombre_seguro(&archivo.nombre_original), contenido })
}
