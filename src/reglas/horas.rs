//! Presupuesto de horas de investigación por usuario y periodo.

use crate::error::Rechazo;

/// Agregado de horas de un usuario en un periodo.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct ResumenHoras {
    /// Suma de las horas asignadas en registros activos.
    pub asignadas: f64,
    /// Suma de `horas_planeacion` de las entregas ya registradas.
    pub comprometidas: f64,
}

impl ResumenHoras {
    pub fn disponibles(&self) -> f64 {
        self.asignadas - self.comprometidas
    }
}

pub fn verificar_presupuesto(
    resumen: &ResumenHoras,
    horas_planeacion: f64,
    horas_evidencia: f64,
) -> Result<(), Rechazo> {
    let solicitadas = horas_planeacion + horas_evidencia;
    let disponibles = resumen.disponibles();
    if solicitadas > disponibles {
        return Err(Rechazo::HorasInsuficientes { solicitadas, disponibles });
    }
    Ok(())
}
