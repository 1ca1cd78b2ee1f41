//! Revisión inteligente: compara el texto de dos evidencias.
//!
//! El servicio de IA externo se conecta implementando `ComparadorTextos`.
//! `ComparadorLocal` usa medidas de similitud de cadenas.

use serde::Serialize;
use strsim::{jaro_winkler, normalized_levenshtein, sorensen_dice};

/// Umbral (0 - 100) desde el cual dos evidencias se consideran muy similares.
pub const UMBRAL_ALTA_SIMILITUD: f64 = 80.0;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Similitud {
    /// Puntaje entre 0 y 100.
    pub puntaje: f64,
    pub veredicto: String,
    pub metodo: String,
}

pub trait ComparadorTextos: Send + Sync {
    fn comparar(&self, a: &str, b: &str) -> Similitud;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ComparadorLocal;

fn normalizar(texto: &str) -> String {
    texto
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn veredicto(puntaje: f64) -> &'static str {
    if puntaje >= UMBRAL_ALTA_SIMILITUD {
        "alta similitud: posible evidencia duplicada"
    } else if puntaje >= 50.0 {
        "similitud parcial"
    } else {
        "evidencias distintas"
    }
}

impl ComparadorTextos for ComparadorLocal {
    fn comparar(&self, a: &str, b: &str) -> Similitud {
        let (na, nb) = (normalizar(a), normalizar(b));
        let puntaje = if na.is_empty() && nb.is_empty() {
            0.0
        } else {
            // Promedio de tres medidas: edición, bigramas y prefijos.
            let valor = (normalized_levenshtein(&na, &nb) + sorensen_dice(&na, &nb) + jaro_winkler(&na, &nb)) / 3.0;
            (valor * 10000.0).round() / 100.0
        };
        Similitud { puntaje, veredicto: veredicto(puntaje).to_string(), metodo: "local".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textos_iguales_salvo_formato() {
        let s = ComparadorLocal.comparar("Avance documentado, en detalle.", "avance  documentado en DETALLE");
        assert_eq!(s.puntaje, 100.0);
        assert!(s.veredicto.starts_with("alta"));
    }

    #[test]
    fn textos_distintos() {
        let s = ComparadorLocal.comparar("Informe de laboratorio de química", "zzz 123");
        assert!(s.puntaje < 50.0);
        assert_eq!(ComparadorLocal.comparar("", "").puntaje, 0.0);
    }
}
