//! Validación declarativa de campos de entrada.
//!
//! Acumula un mensaje por campo (el primero que falla) y se convierte en
//! `ErroresValidacion` al terminar, antes de cualquier mutación.

use std::collections::BTreeMap;

use crate::error::ErroresValidacion;

#[derive(Debug, Default)]
pub struct Validador {
    errores: BTreeMap<String, String>,
}

impl Validador {
    pub fn new() -> Self {
        Self::default()
    }

    fn registrar(&mut self, campo: &str, mensaje: String) {
        self.errores.entry(campo.to_string()).or_insert(mensaje);
    }

    pub fn requerido(&mut self, campo: &str, valor: &str) -> &mut Self {
        if valor.trim().is_empty() {
            self.registrar(campo, "es obligatorio".to_string());
        }
        self
    }

    /// Longitud mínima en caracteres, sin contar espacios al inicio o al final.
    pub fn min_caracteres(&mut self, campo: &str, valor: &str, minimo: usize) -> &mut Self {
        if valor.trim().chars().count() < minimo {
            self.registrar(campo, format!("debe tener al menos {} caracteres", minimo));
        }
        self
    }

    pub fn rango(&mut self, campo: &str, valor: f64, min: f64, max: f64) -> &mut Self {
        if !valor.is_finite() || valor < min || valor > max {
            self.registrar(campo, format!("debe estar entre {} y {}", min, max));
        }
        self
    }

    pub fn no_negativo(&mut self, campo: &str, valor: f64) -> &mut Self {
        if !valor.is_finite() || valor < 0.0 {
            self.registrar(campo, "no puede ser negativo".to_string());
        }
        self
    }

    /// Al menos uno de los valores debe venir con contenido.
    pub fn alguno(&mut self, campo: &str, valores: &[Option<&str>]) -> &mut Self {
        let presente = valores.iter().any(|v| v.map(|s| !s.trim().is_empty()).unwrap_or(false));
        if !presente {
            self.registrar(campo, "debe adjuntar un archivo o indicar una URL".to_string());
        }
        self
    }

    pub fn condicion(&mut self, campo: &str, ok: bool, mensaje: &str) -> &mut Self {
        if !ok {
            self.registrar(campo, mensaje.to_string());
        }
        self
    }

    pub fn terminar(&mut self) -> Result<(), ErroresValidacion> {
        if self.errores.is_empty() {
            Ok(())
        } else {
            Err(ErroresValidacion(std::mem::take(&mut self.errores)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acumula_primer_error_por_campo() {
        let mut v = Validador::new();
        v.requerido("nombre", "  ")
            .min_caracteres("nombre", "", 3)
            .rango("porcentaje", 120.0, 0.0, 100.0)
            .alguno("archivo", &[None, Some(" ")]);
        let err = v.terminar().unwrap_err();
        assert_eq!(err.campos().len(), 3);
        assert_eq!(err.campos()["nombre"], "es obligatorio");
        assert!(err.contiene("porcentaje"));
        assert!(err.contiene("archivo"));
    }

    #[test]
    fn cuenta_caracteres_no_bytes() {
        let mut v = Validador::new();
        v.min_caracteres("descripcion", "ñandúñandú", 10);
        assert!(v.terminar().is_ok());
    }
}
