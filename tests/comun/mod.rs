// Utilidades compartidas por las pruebas de integración.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;

use investiga::config::DB_EN_MEMORIA;
use investiga::contexto::Contexto;
use investiga::db;
use investiga::models::{EstadoPlan, Periodo, PlanTrabajo, Usuario, Vigencia};
use investiga::servicios::organizacion::{self, DatosActividad, DatosUsuario};
use investiga::servicios::periodos::{self, DatosPeriodo};
use investiga::servicios::planes::{self, CambioEstadoPlan, DatosActividadPlan, DatosPlan};

pub fn conexion() -> Connection {
    db::abrir_e_inicializar(DB_EN_MEMORIA).expect("Debe abrir la base en memoria")
}

pub fn fecha(anio: i32, mes: u32, dia: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(anio, mes, dia, 0, 0, 0).unwrap()
}

pub fn admin() -> Contexto {
    Contexto::new(0, &["administrador"], &[])
}

pub fn coordinador() -> Contexto {
    Contexto::new(0, &["coordinador"], &[])
}

pub fn investigador(usuario_id: i64) -> Contexto {
    Contexto::new(usuario_id, &["investigador"], &[])
}

pub fn usuario(conn: &Connection, nombre: &str, grupo_id: Option<i64>) -> Usuario {
    let datos = DatosUsuario {
        nombre: nombre.to_string(),
        email: format!("{}@universidad.edu", nombre.to_lowercase()),
        grupo_id,
    };
    organizacion::crear_usuario(conn, &admin(), &datos).expect("Debe crear el usuario")
}

/// Periodo activo con sus dos plazos.
pub fn periodo(conn: &Connection, nombre: &str, planeacion: DateTime<Utc>, evidencias: DateTime<Utc>) -> Periodo {
    let datos = DatosPeriodo {
        nombre: nombre.to_string(),
        fecha_limite_planeacion: planeacion,
        fecha_limite_evidencias: evidencias,
        estado: None,
    };
    periodos::crear(conn, &admin(), &datos).expect("Debe crear el periodo")
}

/// "2024-A": planeación hasta el 1 de marzo, evidencias hasta el 1 de junio.
pub fn periodo_2024_a(conn: &Connection) -> Periodo {
    periodo(conn, "2024-A", fecha(2024, 3, 1), fecha(2024, 6, 1))
}

/// Plan aprobado del usuario con una actividad por cada avance inicial dado.
/// Devuelve el plan y los ids de sus actividades.
pub fn plan_aprobado(
    conn: &mut Connection,
    dueno: i64,
    vigencia: Vigencia,
    periodo_id: i64,
    avances_iniciales: &[f64],
) -> (PlanTrabajo, Vec<i64>) {
    let ctx = investigador(dueno);
    let catalogo = organizacion::crear_actividad(conn, &admin(), &DatosActividad { nombre: "Artículo".into() })
        .expect("Debe crear la actividad de catálogo");
    let datos = DatosPlan { nombre: "Plan de prueba".into(), vigencia, periodo_id };
    let plan = planes::crear(conn, &ctx, fecha(2024, 1, 15), &datos).expect("Debe crear el plan");

    let mut actividades = Vec::new();
    for avance in avances_iniciales {
        let a = planes::agregar_actividad(
            conn,
            &ctx,
            plan.id,
            &DatosActividadPlan { actividad_id: catalogo.id, descripcion: None, horas: 10.0 },
        )
        .expect("Debe agregar la actividad");
        db::planes::actualizar_avance(conn, a.id, *avance).expect("Debe fijar el avance inicial");
        actividades.push(a.id);
    }

    planes::enviar(conn, &ctx, plan.id).expect("Debe enviar el plan");
    let aprobado = planes::cambiar_estado(
        conn,
        &coordinador(),
        plan.id,
        &CambioEstadoPlan { estado: EstadoPlan::Aprobado, observaciones: None },
    )
    .expect("Debe aprobar el plan");
    (aprobado, actividades)
}
