//! Casos de uso. Cada servicio recibe el `Contexto` de la solicitud y, si
//! depende del reloj, el instante `ahora`; las mutaciones de varios pasos
//! corren dentro de una transacción explícita.

pub mod convocatorias;
pub mod entregas;
pub mod horas;
pub mod informes;
pub mod organizacion;
pub mod periodos;
pub mod planes;
pub mod reportes;
pub mod revision;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::almacenamiento::Almacenamiento;
use crate::error::{AppResult, Rechazo};
use crate::reglas::Validador;

/// Aplica una regla de negocio; el rechazo queda en el log antes de propagarse.
pub(crate) fn regla<T>(resultado: Result<T, Rechazo>) -> AppResult<T> {
    resultado.map_err(|r| {
        tracing::warn!(motivo = %r, "solicitud rechazada por regla de negocio");
        r.into()
    })
}

/// Archivo recibido en el cuerpo JSON, codificado en base64.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchivoAdjunto {
    pub nombre: String,
    pub contenido_base64: String,
}

impl ArchivoAdjunto {
    /// Decodifica el contenido; un archivo vacío o mal codificado queda como error del campo.
    pub(crate) fn decodificar(&self, v: &mut Validador, campo: &str) -> Option<Vec<u8>> {
        v.requerido(&format!("{}.nombre", campo), &self.nombre);
        match STANDARD.decode(self.contenido_base64.trim()) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => {
                v.condicion(campo, false, "el archivo está vacío");
                None
            }
            Err(_) => {
                v.condicion(campo, false, "el contenido no es base64 válido");
                None
            }
        }
    }
}

/// Borra el directorio de archivos de una operación que no llegó a confirmarse.
pub(crate) fn limpiar_directorio(almacenamiento: &dyn Almacenamiento, dir: &str) {
    if let Err(e) = almacenamiento.eliminar_directorio(dir) {
        tracing::error!(dir, error = %e, "no se pudo limpiar el directorio de una operación fallida");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodifica_o_marca_el_campo() {
        let ok = ArchivoAdjunto { nombre: "a.pdf".into(), contenido_base64: STANDARD.encode(b"pdf") };
        let malo = ArchivoAdjunto { nombre: "".into(), contenido_base64: "%%%".into() };
        let mut v = Validador::new();
        assert_eq!(ok.decodificar(&mut v, "archivo").as_deref(), Some(&b"pdf"[..]));
        assert!(malo.decodificar(&mut v, "otro").is_none());
        let errores = v.terminar().unwrap_err();
        assert!(errores.contiene("otro"));
        assert!(errores.contiene("otro.nombre"));
        assert!(!errores.contiene("archivo"));
    }
}
