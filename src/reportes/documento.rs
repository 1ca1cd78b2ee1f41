//! Generación de documentos a partir de una plantilla y una bolsa de datos.
//!
//! El motor de PDF es un colaborador externo: se conecta implementando
//! `Renderizador`. `RenderizadorTexto` produce un documento de texto plano
//! con la misma bolsa de datos.

use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::{ActividadInvestigacion, ActividadPlan, InformePlanTrabajo, Periodo, PlanTrabajo, Usuario};

#[derive(Debug, Clone, PartialEq)]
pub struct Documento {
    pub contenido: Vec<u8>,
    pub tipo_contenido: &'static str,
    pub extension: &'static str,
}

/// `Stream` se muestra en el navegador; `Descarga` se entrega como adjunto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModoEntrega {
    Stream,
    Descarga,
}

impl ModoEntrega {
    pub fn desde_query(valor: Option<&str>) -> Self {
        match valor {
            Some("descarga") | Some("download") => ModoEntrega::Descarga,
            _ => ModoEntrega::Stream,
        }
    }

    pub fn disposicion(&self, nombre_archivo: &str) -> String {
        match self {
            ModoEntrega::Stream => format!("inline; filename=\"{}\"", nombre_archivo),
            ModoEntrega::Descarga => format!("attachment; filename=\"{}\"", nombre_archivo),
        }
    }
}

pub trait Renderizador: Send + Sync {
    fn renderizar(&self, plantilla: &str, datos: &Value) -> Result<Documento, AppError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderizadorTexto;

impl Renderizador for RenderizadorTexto {
    fn renderizar(&self, plantilla: &str, datos: &Value) -> Result<Documento, AppError> {
        let mut salida = String::new();
        let titulo = datos.get("titulo").and_then(Value::as_str).unwrap_or(plantilla);
        writeln!(salida, "{}", titulo).map_err(|e| AppError::Interno(e.to_string()))?;
        writeln!(salida, "{}", "=".repeat(titulo.chars().count())).map_err(|e| AppError::Interno(e.to_string()))?;
        escribir_valor(&mut salida, datos, 0);
        Ok(Documento { contenido: salida.into_bytes(), tipo_contenido: "text/plain; charset=utf-8", extension: "txt" })
    }
}

fn escribir_valor(salida: &mut String, valor: &Value, nivel: usize) {
    let sangria = "  ".repeat(nivel);
    match valor {
        Value::Object(mapa) => {
            for (clave, v) in mapa {
                if clave == "titulo" && nivel == 0 {
                    continue;
                }
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        salida.push_str(&format!("{}{}:\n", sangria, clave));
                        escribir_valor(salida, v, nivel + 1);
                    }
                    _ => salida.push_str(&format!("{}{}: {}\n", sangria, clave, escalar(v))),
                }
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                salida.push_str(&format!("{}- [{}]\n", sangria, i + 1));
                escribir_valor(salida, v, nivel + 1);
            }
        }
        otro => salida.push_str(&format!("{}{}\n", sangria, escalar(otro))),
    }
}

fn escalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        otro => otro.to_string(),
    }
}

/// Bolsa de datos del reporte de un plan de trabajo.
pub fn datos_plan_trabajo(
    plan: &PlanTrabajo,
    usuario: &Usuario,
    periodo: &Periodo,
    actividades: &[ActividadPlan],
    catalogo: &[ActividadInvestigacion],
    informes: &[InformePlanTrabajo],
) -> Value {
    let actividades: Vec<Value> = actividades
        .iter()
        .map(|a| {
            let nombre = catalogo
                .iter()
                .find(|c| c.id == a.actividad_id)
                .map(|c| c.nombre.clone())
                .unwrap_or_else(|| format!("Actividad {}", a.actividad_id));
            json!({
                "actividad": nombre,
                "descripcion": a.descripcion,
                "horas": a.horas,
                "avance": format!("{}%", a.porcentaje_progreso),
            })
        })
        .collect();
    let informes: Vec<Value> = informes
        .iter()
        .map(|i| json!({"periodo_id": i.periodo_id, "fecha": i.created_at.format("%Y-%m-%d").to_string()}))
        .collect();
    json!({
        "titulo": format!("Plan de trabajo: {}", plan.nombre),
        "investigador": usuario.nombre,
        "correo": usuario.email,
        "periodo": periodo.nombre,
        "vigencia": plan.vigencia.as_str(),
        "estado": plan.estado.as_str(),
        "actividades": actividades,
        "informes": informes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texto_plano_con_titulo_y_listas() {
        let datos = json!({"titulo": "Reporte", "periodo": "2024-A", "actividades": [{"actividad": "Artículo"}]});
        let doc = RenderizadorTexto.renderizar("plan_trabajo", &datos).unwrap();
        let texto = String::from_utf8(doc.contenido).unwrap();
        assert!(texto.starts_with("Reporte\n=======\n"));
        assert!(texto.contains("periodo: 2024-A"));
        assert!(texto.contains("actividad: Artículo"));
    }

    #[test]
    fn modo_por_query() {
        assert_eq!(ModoEntrega::desde_query(Some("descarga")), ModoEntrega::Descarga);
        assert_eq!(ModoEntrega::desde_query(None), ModoEntrega::Stream);
        assert!(ModoEntrega::Descarga.disposicion("a.txt").starts_with("attachment"));
    }
}
