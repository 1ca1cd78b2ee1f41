//! Elegibilidad de informes de plan de trabajo y control de avances.

use chrono::{DateTime, Utc};

use crate::error::Rechazo;
use crate::models::{ActividadPlan, EstadoPlan, Periodo, PlanTrabajo, Vigencia};

/// Decide en qué periodo cae un informe nuevo del plan.
///
/// `siguiente` es el periodo inmediatamente posterior al de inicio (solo se
/// usa con vigencia anual). `periodos_con_informe` lista el periodo de cada
/// informe ya registrado para el plan.
pub fn periodo_objetivo<'a>(
    plan: &PlanTrabajo,
    inicio: &'a Periodo,
    siguiente: Option<&'a Periodo>,
    periodos_con_informe: &[i64],
    ahora: DateTime<Utc>,
) -> Result<&'a Periodo, Rechazo> {
    if plan.estado != EstadoPlan::Aprobado {
        return Err(Rechazo::PlanNoAprobado(plan.estado.to_string()));
    }

    let candidatos: Vec<&'a Periodo> = match plan.vigencia {
        Vigencia::Semestral => vec![inicio],
        Vigencia::Anual => std::iter::once(inicio).chain(siguiente).collect(),
    };

    let objetivo = candidatos
        .into_iter()
        .find(|p| p.en_ventana_informes(ahora))
        .ok_or(Rechazo::FueraDeVentanaInforme)?;

    if periodos_con_informe.contains(&objetivo.id) {
        return Err(Rechazo::InformeDuplicado(objetivo.nombre.clone()));
    }
    if periodos_con_informe.len() >= plan.vigencia.informes_permitidos() {
        return Err(Rechazo::InformesCompletos);
    }
    Ok(objetivo)
}

/// Avance solicitado para una actividad del plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvanceSolicitado {
    pub actividad_plan_id: i64,
    pub porcentaje_nuevo: f64,
}

/// Avance que pasó las reglas. `indice` apunta al ítem original de la solicitud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvanceAceptado {
    pub indice: usize,
    pub actividad_plan_id: i64,
    pub porcentaje_anterior: f64,
    pub porcentaje_nuevo: f64,
}

/// Filtra y valida los avances contra las actividades del plan.
///
/// Ítems de actividades ajenas al plan se ignoran. Si algún ítem intenta
/// bajar el avance, se rechaza la solicitud completa.
pub fn validar_avances(
    plan_id: i64,
    actividades: &[ActividadPlan],
    solicitados: &[AvanceSolicitado],
) -> Result<Vec<AvanceAceptado>, Rechazo> {
    let mut aceptados = Vec::with_capacity(solicitados.len());
    for (indice, s) in solicitados.iter().enumerate() {
        let Some(actividad) = actividades
            .iter()
            .find(|a| a.id == s.actividad_plan_id && a.plan_id == plan_id)
        else {
            tracing::debug!(actividad_plan_id = s.actividad_plan_id, plan_id, "actividad ajena al plan, se omite");
            continue;
        };
        if s.porcentaje_nuevo < actividad.porcentaje_progreso {
            return Err(Rechazo::AvanceRegresivo {
                actividad_id: actividad.id,
                actual: actividad.porcentaje_progreso,
                nuevo: s.porcentaje_nuevo,
            });
        }
        aceptados.push(AvanceAceptado {
            indice,
            actividad_plan_id: actividad.id,
            porcentaje_anterior: actividad.porcentaje_progreso,
            porcentaje_nuevo: s.porcentaje_nuevo,
        });
    }
    Ok(aceptados)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EstadoRegistro;
    use chrono::TimeZone;

    fn fecha(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn periodo(id: i64, nombre: &str, plan: DateTime<Utc>, evid: DateTime<Utc>) -> Periodo {
        Periodo {
            id,
            nombre: nombre.into(),
            fecha_limite_planeacion: plan,
            fecha_limite_evidencias: evid,
            estado: EstadoRegistro::Activo,
        }
    }

    fn plan(vigencia: Vigencia, estado: EstadoPlan) -> PlanTrabajo {
        PlanTrabajo {
            id: 7,
            usuario_id: 1,
            nombre: "Plan".into(),
            vigencia,
            periodo_id: 1,
            estado,
            observaciones: None,
            created_at: fecha(2024, 1, 1),
        }
    }

    #[test]
    fn semestral_un_informe_por_periodo() {
        let a = periodo(1, "2024-A", fecha(2024, 3, 1), fecha(2024, 6, 1));
        let p = plan(Vigencia::Semestral, EstadoPlan::Aprobado);
        let ahora = fecha(2024, 4, 1);
        assert_eq!(periodo_objetivo(&p, &a, None, &[], ahora).map(|x| x.id), Ok(1));
        assert_eq!(
            periodo_objetivo(&p, &a, None, &[1], ahora),
            Err(Rechazo::InformeDuplicado("2024-A".into()))
        );
    }

    #[test]
    fn anual_usa_periodo_siguiente_y_luego_se_completa() {
        let a = periodo(1, "2024-A", fecha(2024, 3, 1), fecha(2024, 6, 1));
        let b = periodo(2, "2024-B", fecha(2024, 9, 1), fecha(2024, 12, 1));
        let p = plan(Vigencia::Anual, EstadoPlan::Aprobado);

        assert_eq!(periodo_objetivo(&p, &a, Some(&b), &[], fecha(2024, 4, 1)).map(|x| x.id), Ok(1));
        assert_eq!(periodo_objetivo(&p, &a, Some(&b), &[1], fecha(2024, 10, 1)).map(|x| x.id), Ok(2));
        assert!(periodo_objetivo(&p, &a, Some(&b), &[1, 2], fecha(2024, 10, 1)).is_err());
        assert!(periodo_objetivo(&p, &a, Some(&b), &[1, 2], fecha(2024, 4, 1)).is_err());
        assert_eq!(
            periodo_objetivo(&p, &a, Some(&b), &[1, 2], fecha(2025, 1, 10)),
            Err(Rechazo::FueraDeVentanaInforme)
        );
    }

    #[test]
    fn requiere_plan_aprobado_y_ventana() {
        let a = periodo(1, "2024-A", fecha(2024, 3, 1), fecha(2024, 6, 1));
        let pendiente = plan(Vigencia::Semestral, EstadoPlan::Pendiente);
        assert_eq!(
            periodo_objetivo(&pendiente, &a, None, &[], fecha(2024, 4, 1)),
            Err(Rechazo::PlanNoAprobado("Pendiente".into()))
        );
        let aprobado = plan(Vigencia::Semestral, EstadoPlan::Aprobado);
        assert_eq!(
            periodo_objetivo(&aprobado, &a, None, &[], fecha(2024, 2, 1)),
            Err(Rechazo::FueraDeVentanaInforme)
        );
    }

    fn actividad(id: i64, plan_id: i64, pct: f64) -> ActividadPlan {
        ActividadPlan { id, plan_id, actividad_id: 1, descripcion: None, horas: 10.0, porcentaje_progreso: pct }
    }

    #[test]
    fn avances_omiten_actividades_ajenas() {
        let actividades = vec![actividad(1, 7, 40.0), actividad(2, 8, 0.0)];
        let solicitados = vec![
            AvanceSolicitado { actividad_plan_id: 2, porcentaje_nuevo: 90.0 },
            AvanceSolicitado { actividad_plan_id: 1, porcentaje_nuevo: 60.0 },
        ];
        let aceptados = validar_avances(7, &actividades, &solicitados).unwrap();
        assert_eq!(
            aceptados,
            vec![AvanceAceptado { indice: 1, actividad_plan_id: 1, porcentaje_anterior: 40.0, porcentaje_nuevo: 60.0 }]
        );
    }

    #[test]
    fn avance_regresivo_rechaza_todo() {
        let actividades = vec![actividad(1, 7, 40.0), actividad(3, 7, 50.0)];
        let solicitados = vec![
            AvanceSolicitado { actividad_plan_id: 1, porcentaje_nuevo: 70.0 },
            AvanceSolicitado { actividad_plan_id: 3, porcentaje_nuevo: 45.0 },
        ];
        assert_eq!(
            validar_avances(7, &actividades, &solicitados),
            Err(Rechazo::AvanceRegresivo { actividad_id: 3, actual: 50.0, nuevo: 45.0 })
        );
    }
}
