//! Plazos y cadencia de entregas de producto.

use chrono::{DateTime, Utc};

use crate::error::Rechazo;
use crate::models::{EstadoRegistro, Periodo, TipoEntrega};

/// Entregas ya registradas para un (producto, periodo).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntregasExistentes {
    pub planeacion: bool,
    pub evidencia: bool,
}

pub fn verificar_periodo_activo(periodo: &Periodo) -> Result<(), Rechazo> {
    if periodo.estado != EstadoRegistro::Activo {
        return Err(Rechazo::PeriodoInactivo(periodo.nombre.clone()));
    }
    Ok(())
}

pub fn verificar_plazo(tipo: TipoEntrega, periodo: &Periodo, ahora: DateTime<Utc>) -> Result<(), Rechazo> {
    let limite = match tipo {
        TipoEntrega::Planeacion => periodo.fecha_limite_planeacion,
        TipoEntrega::Evidencia => periodo.fecha_limite_evidencias,
    };
    if ahora > limite {
        return Err(Rechazo::FueraDePlazo {
            tipo: tipo.to_string(),
            limite: limite.format("%Y-%m-%d %H:%M").to_string(),
        });
    }
    Ok(())
}

pub fn verificar_cadencia(tipo: TipoEntrega, existentes: &EntregasExistentes) -> Result<(), Rechazo> {
    match tipo {
        TipoEntrega::Planeacion if existentes.planeacion => Err(Rechazo::EntregaDuplicada(tipo.to_string())),
        TipoEntrega::Evidencia if existentes.evidencia => Err(Rechazo::EntregaDuplicada(tipo.to_string())),
        TipoEntrega::Evidencia if !existentes.planeacion => Err(Rechazo::SinPlaneacion),
        _ => Ok(()),
    }
}

/// Progreso general del producto: promedio redondeado del progreso de
/// todas sus entregas de evidencia. `None` si todavía no hay ninguna.
pub fn progreso_producto(progresos_evidencia: &[f64]) -> Option<i64> {
    if progresos_evidencia.is_empty() {
        return None;
    }
    let suma: f64 = progresos_evidencia.iter().sum();
    Some((suma / progresos_evidencia.len() as f64).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn periodo() -> Periodo {
        Periodo {
            id: 1,
            nombre: "2024-A".into(),
            fecha_limite_planeacion: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            fecha_limite_evidencias: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            estado: EstadoRegistro::Activo,
        }
    }

    #[test]
    fn plazos_por_tipo() {
        let p = periodo();
        let abril = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert!(verificar_plazo(TipoEntrega::Planeacion, &p, abril).is_err());
        assert!(verificar_plazo(TipoEntrega::Evidencia, &p, abril).is_ok());
        assert!(verificar_plazo(TipoEntrega::Planeacion, &p, p.fecha_limite_planeacion).is_ok());
    }

    #[test]
    fn cadencia_planeacion_luego_evidencia() {
        let nada = EntregasExistentes::default();
        assert!(verificar_cadencia(TipoEntrega::Planeacion, &nada).is_ok());
        assert_eq!(verificar_cadencia(TipoEntrega::Evidencia, &nada), Err(Rechazo::SinPlaneacion));

        let con_plan = EntregasExistentes { planeacion: true, evidencia: false };
        assert!(verificar_cadencia(TipoEntrega::Evidencia, &con_plan).is_ok());
        assert!(matches!(
            verificar_cadencia(TipoEntrega::Planeacion, &con_plan),
            Err(Rechazo::EntregaDuplicada(_))
        ));

        let ambas = EntregasExistentes { planeacion: true, evidencia: true };
        assert!(matches!(verificar_cadencia(TipoEntrega::Evidencia, &ambas), Err(Rechazo::EntregaDuplicada(_))));
    }

    #[test]
    fn periodo_inactivo() {
        let mut p = periodo();
        p.estado = EstadoRegistro::Inactivo;
        assert_eq!(verificar_periodo_activo(&p), Err(Rechazo::PeriodoInactivo("2024-A".into())));
    }

    #[test]
    fn progreso_redondeado() {
        assert_eq!(progreso_producto(&[]), None);
        assert_eq!(progreso_producto(&[50.0, 75.0]), Some(63));
        assert_eq!(progreso_producto(&[33.0, 33.0, 34.0]), Some(33));
    }
}
