//! Contexto explícito de la solicitud: usuario autenticado, roles y permisos.
//!
//! El proveedor de identidad (externo) deja el usuario en cabeceras; el
//! contexto se extrae una vez por solicitud y se pasa a cada servicio.

use std::collections::HashSet;
use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::error::AppError;

pub const CABECERA_USUARIO: &str = "X-Usuario-Id";
pub const CABECERA_ROLES: &str = "X-Roles";
pub const CABECERA_PERMISOS: &str = "X-Permisos";

pub mod permisos {
    pub const TODOS: &str = "*";
    pub const PERIODOS_GESTIONAR: &str = "periodos.gestionar";
    pub const HORAS_GESTIONAR: &str = "horas.gestionar";
    pub const GRUPOS_GESTIONAR: &str = "grupos.gestionar";
    pub const PROYECTOS_GESTIONAR: &str = "proyectos.gestionar";
    pub const CATALOGO_GESTIONAR: &str = "catalogo.gestionar";
    pub const ENTREGAS_CREAR: &str = "entregas.crear";
    pub const ENTREGAS_GESTIONAR: &str = "entregas.gestionar";
    pub const PLANES_GESTIONAR: &str = "planes.gestionar";
    pub const PLANES_REVISAR: &str = "planes.revisar";
    pub const INFORMES_CREAR: &str = "informes.crear";
    pub const CONVOCATORIAS_GESTIONAR: &str = "convocatorias.gestionar";
    pub const POSTULACIONES_CREAR: &str = "postulaciones.crear";
    pub const POSTULACIONES_EVALUAR: &str = "postulaciones.evaluar";
    pub const REPORTES_VER: &str = "reportes.ver";
    pub const REVISION_USAR: &str = "revision.usar";
    pub const USUARIOS_GESTIONAR: &str = "usuarios.gestionar";
}

fn permisos_de_rol(rol: &str) -> &'static [&'static str] {
    use permisos::*;
    match rol {
        "administrador" => &[TODOS],
        "coordinador" => &[
            PERIODOS_GESTIONAR,
            HORAS_GESTIONAR,
            CONVOCATORIAS_GESTIONAR,
            PLANES_REVISAR,
            POSTULACIONES_EVALUAR,
            REPORTES_VER,
            CATALOGO_GESTIONAR,
        ],
        "investigador" => &[ENTREGAS_CREAR, INFORMES_CREAR, PLANES_GESTIONAR, POSTULACIONES_CREAR, REVISION_USAR],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contexto {
    pub usuario_id: i64,
    pub roles: Vec<String>,
    permisos: HashSet<String>,
}

impl Contexto {
    pub fn new(usuario_id: i64, roles: &[&str], permisos_extra: &[&str]) -> Self {
        let mut permisos: HashSet<String> = HashSet::new();
        for rol in roles {
            permisos.extend(permisos_de_rol(rol).iter().map(|p| p.to_string()));
        }
        permisos.extend(permisos_extra.iter().map(|p| p.to_string()));
        Contexto { usuario_id, roles: roles.iter().map(|r| r.to_string()).collect(), permisos }
    }

    pub fn tiene(&self, permiso: &str) -> bool {
        self.permisos.contains(permisos::TODOS) || self.permisos.contains(permiso)
    }

    pub fn autorizar(&self, permiso: &str) -> Result<(), AppError> {
        if self.tiene(permiso) {
            Ok(())
        } else {
            tracing::warn!(usuario_id = self.usuario_id, permiso, "acceso denegado");
            Err(AppError::NoAutorizado(format!("No tiene permiso para esta acción ({})", permiso)))
        }
    }

    /// El dueño del recurso pasa siempre; los demás necesitan `permiso`.
    pub fn autorizar_dueno_o(&self, dueno_id: i64, permiso: &str) -> Result<(), AppError> {
        if self.usuario_id == dueno_id {
            Ok(())
        } else {
            self.autorizar(permiso)
        }
    }

    fn desde_cabeceras(req: &HttpRequest) -> Result<Self, AppError> {
        let cabecera = |nombre: &str| req.headers().get(nombre).and_then(|v| v.to_str().ok()).map(str::trim);
        let usuario_id = cabecera(CABECERA_USUARIO)
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or(AppError::NoAutenticado)?;
        let lista = |nombre: &str| -> Vec<String> {
            cabecera(nombre)
                .map(|s| s.split(',').map(|p| p.trim().to_lowercase()).filter(|p| !p.is_empty()).collect())
                .unwrap_or_default()
        };
        let roles = lista(CABECERA_ROLES);
        let extra = lista(CABECERA_PERMISOS);
        let roles_ref: Vec<&str> = roles.iter().map(String::as_str).collect();
        let extra_ref: Vec<&str> = extra.iter().map(String::as_str).collect();
        Ok(Contexto::new(usuario_id, &roles_ref, &extra_ref))
    }
}

impl FromRequest for Contexto {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Contexto::desde_cabeceras(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn roles_expanden_permisos() {
        let ctx = Contexto::new(1, &["investigador"], &[]);
        assert!(ctx.tiene(permisos::ENTREGAS_CREAR));
        assert!(!ctx.tiene(permisos::PERIODOS_GESTIONAR));
        assert!(Contexto::new(2, &["administrador"], &[]).tiene(permisos::REPORTES_VER));
        assert!(Contexto::new(3, &[], &["reportes.ver"]).tiene(permisos::REPORTES_VER));
    }

    #[test]
    fn dueno_pasa_sin_permiso() {
        let ctx = Contexto::new(5, &[], &[]);
        assert!(ctx.autorizar_dueno_o(5, permisos::PLANES_REVISAR).is_ok());
        assert!(matches!(ctx.autorizar_dueno_o(6, permisos::PLANES_REVISAR), Err(AppError::NoAutorizado(_))));
    }

    #[test]
    fn extrae_de_cabeceras() {
        let req = TestRequest::default()
            .insert_header((CABECERA_USUARIO, "42"))
            .insert_header((CABECERA_ROLES, "Coordinador, "))
            .to_http_request();
        let ctx = Contexto::desde_cabeceras(&req).unwrap();
        assert_eq!(ctx.usuario_id, 42);
        assert!(ctx.tiene(permisos::PLANES_REVISAR));

        let anonima = TestRequest::default().to_http_request();
        assert!(matches!(Contexto::desde_cabeceras(&anonima), Err(AppError::NoAutenticado)));
    }
}
