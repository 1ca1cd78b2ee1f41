//! Guardas de eliminación: cada entidad solo se borra si nada depende de ella.

use chrono::{DateTime, Utc};

use crate::error::Rechazo;
use crate::models::{EstadoConvocatoria, EstadoProyecto};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependenciasConvocatoria {
    pub postulaciones: i64,
    pub archivos: i64,
    pub estado: EstadoConvocatoria,
    pub fecha_fin: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DependenciasGrupo {
    pub usuarios: i64,
    pub proyectos: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DependenciasPeriodo {
    pub entregas: i64,
    pub registros_horas: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependenciasProducto {
    pub estado_proyecto: EstadoProyecto,
    pub entregas: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DependenciasProyecto {
    pub productos: i64,
}

fn bloqueada(motivo: &str) -> Rechazo {
    Rechazo::EliminacionBloqueada(motivo.to_string())
}

pub fn convocatoria(dep: &DependenciasConvocatoria, ahora: DateTime<Utc>) -> Result<(), Rechazo> {
    if dep.postulaciones > 0 {
        return Err(bloqueada("la convocatoria tiene postulaciones registradas"));
    }
    if dep.archivos > 0 {
        return Err(bloqueada("la convocatoria tiene archivos asociados a sus requisitos"));
    }
    if dep.estado == EstadoConvocatoria::Abierta && dep.fecha_fin > ahora {
        return Err(bloqueada("la convocatoria está abierta y aún no finaliza"));
    }
    Ok(())
}

pub fn grupo(dep: &DependenciasGrupo) -> Result<(), Rechazo> {
    if dep.usuarios > 0 {
        return Err(bloqueada("el grupo tiene usuarios asociados"));
    }
    if dep.proyectos > 0 {
        return Err(bloqueada("el grupo tiene proyectos asociados"));
    }
    Ok(())
}

pub fn periodo(dep: &DependenciasPeriodo) -> Result<(), Rechazo> {
    if dep.entregas > 0 {
        return Err(bloqueada("el periodo tiene entregas registradas"));
    }
    if dep.registros_horas > 0 {
        return Err(bloqueada("el periodo tiene horas de investigación asignadas"));
    }
    Ok(())
}

pub fn producto(dep: &DependenciasProducto) -> Result<(), Rechazo> {
    if dep.estado_proyecto == EstadoProyecto::Formulacion {
        return Err(bloqueada("el proyecto del producto está en formulación"));
    }
    if dep.entregas > 0 {
        return Err(bloqueada("el producto tiene entregas registradas"));
    }
    Ok(())
}

pub fn proyecto(dep: &DependenciasProyecto) -> Result<(), Rechazo> {
    if dep.productos > 0 {
        return Err(bloqueada("el proyecto tiene productos asociados"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn convocatoria_abierta_vigente_no_se_borra() {
        let ahora = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut dep = DependenciasConvocatoria {
            postulaciones: 0,
            archivos: 0,
            estado: EstadoConvocatoria::Abierta,
            fecha_fin: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        };
        assert!(convocatoria(&dep, ahora).is_err());
        dep.estado = EstadoConvocatoria::Cerrada;
        assert!(convocatoria(&dep, ahora).is_ok());
        dep.postulaciones = 1;
        assert!(convocatoria(&dep, ahora).is_err());
    }

    #[test]
    fn convocatoria_abierta_vencida_se_borra() {
        let ahora = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let dep = DependenciasConvocatoria {
            postulaciones: 0,
            archivos: 0,
            estado: EstadoConvocatoria::Abierta,
            fecha_fin: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        };
        assert!(convocatoria(&dep, ahora).is_ok());
    }

    #[test]
    fn grupo_periodo_proyecto() {
        assert!(grupo(&DependenciasGrupo::default()).is_ok());
        assert!(grupo(&DependenciasGrupo { usuarios: 0, proyectos: 1 }).is_err());
        assert!(periodo(&DependenciasPeriodo { entregas: 0, registros_horas: 2 }).is_err());
        assert!(proyecto(&DependenciasProyecto { productos: 0 }).is_ok());
    }

    #[test]
    fn producto_en_formulacion() {
        let dep = DependenciasProducto { estado_proyecto: EstadoProyecto::Formulacion, entregas: 0 };
        assert!(producto(&dep).is_err());
        let dep = DependenciasProducto { estado_proyecto: EstadoProyecto::EnEjecucion, entregas: 0 };
        assert!(producto(&dep).is_ok());
    }
}
