//! Tablero de desempeño: puntaje por investigador y periodo, reagrupado por grupo.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Puntaje asignado cuando hubo informe en el periodo pero sin evidencias.
pub const PUNTAJE_INFORME_SIN_EVIDENCIAS: f64 = 10.0;

pub const NOMBRE_SIN_GRUPO: &str = "Sin grupo";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnaPeriodo {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Investigador {
    pub id: i64,
    pub nombre: String,
    pub grupo_id: Option<i64>,
    pub grupo_nombre: Option<String>,
}

/// Un informe presentado: (usuario, periodo).
pub type InformeRegistrado = (i64, i64);

/// Una evidencia: (usuario, periodo, porcentaje_progreso_nuevo).
pub type EvidenciaRegistrada = (i64, i64, f64);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SerieGrupo {
    pub grupo_id: Option<i64>,
    pub nombre: String,
    /// Un promedio por columna de `Tablero::periodos`.
    pub promedios: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilaInvestigador {
    pub id: i64,
    pub nombre: String,
    pub puntajes: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetalleGrupo {
    pub grupo_id: Option<i64>,
    pub nombre: String,
    pub investigadores: Vec<FilaInvestigador>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tablero {
    pub periodos: Vec<ColumnaPeriodo>,
    pub grupos: Vec<SerieGrupo>,
    pub detalle: Vec<DetalleGrupo>,
}

fn redondear(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn promedio(valores: &[f64]) -> f64 {
    if valores.is_empty() {
        0.0
    } else {
        valores.iter().sum::<f64>() / valores.len() as f64
    }
}

/// Construye el tablero. Todo investigador aparece en todas las columnas;
/// la ausencia de datos se reporta como 0.
pub fn construir_tablero(
    periodos: Vec<ColumnaPeriodo>,
    investigadores: &[Investigador],
    informes: &[InformeRegistrado],
    evidencias: &[EvidenciaRegistrada],
) -> Tablero {
    let mut conteo_informes: HashMap<(i64, i64), usize> = HashMap::new();
    for clave in informes {
        *conteo_informes.entry(*clave).or_default() += 1;
    }
    let mut porcentajes: HashMap<(i64, i64), Vec<f64>> = HashMap::new();
    for (usuario, periodo, pct) in evidencias {
        porcentajes.entry((*usuario, *periodo)).or_default().push(*pct);
    }

    let puntaje = |usuario: i64, periodo: i64| -> f64 {
        match porcentajes.get(&(usuario, periodo)) {
            Some(v) if !v.is_empty() => redondear(promedio(v)),
            _ if conteo_informes.get(&(usuario, periodo)).copied().unwrap_or(0) > 0 => PUNTAJE_INFORME_SIN_EVIDENCIAS,
            _ => 0.0,
        }
    };

    // Orden: grupos por nombre, "Sin grupo" al final.
    let mut por_grupo: BTreeMap<(bool, String, Option<i64>), Vec<FilaInvestigador>> = BTreeMap::new();
    for inv in investigadores {
        let nombre_grupo = match (inv.grupo_id, &inv.grupo_nombre) {
            (Some(_), Some(n)) => n.clone(),
            (Some(id), None) => format!("Grupo {}", id),
            (None, _) => NOMBRE_SIN_GRUPO.to_string(),
        };
        let fila = FilaInvestigador {
            id: inv.id,
            nombre: inv.nombre.clone(),
            puntajes: periodos.iter().map(|p| puntaje(inv.id, p.id)).collect(),
        };
        por_grupo
            .entry((inv.grupo_id.is_none(), nombre_grupo, inv.grupo_id))
            .or_default()
            .push(fila);
    }

    let mut grupos = Vec::with_capacity(por_grupo.len());
    let mut detalle = Vec::with_capacity(por_grupo.len());
    for ((_, nombre, grupo_id), mut filas) in por_grupo {
        filas.sort_by(|a, b| a.nombre.cmp(&b.nombre).then(a.id.cmp(&b.id)));
        let promedios = (0..periodos.len())
            .map(|i| {
                let columna: Vec<f64> = filas.iter().map(|f| f.puntajes[i]).collect();
                redondear(promedio(&columna))
            })
            .collect();
        grupos.push(SerieGrupo { grupo_id, nombre: nombre.clone(), promedios });
        detalle.push(DetalleGrupo { grupo_id, nombre, investigadores: filas });
    }

    Tablero { periodos, grupos, detalle }
}
