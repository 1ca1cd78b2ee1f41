use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, middleware, web};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

use crate::almacenamiento::{Almacenamiento, DiscoLocal};
use crate::config::Config;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::reportes::{Renderizador, RenderizadorTexto};
use crate::revision::{ComparadorLocal, ComparadorTextos};
use crate::server_handlers::*;

pub type Reloj = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Estado compartido por todos los workers.
pub struct AppState {
    pub db: Mutex<Connection>,
    pub almacenamiento: Arc<dyn Almacenamiento>,
    pub renderizador: Arc<dyn Renderizador>,
    pub comparador: Arc<dyn ComparadorTextos>,
    pub config: Config,
    reloj: Reloj,
}

impl AppState {
    /// Estado con los colaboradores locales: disco, texto plano y comparador strsim.
    pub fn new(conn: Connection, config: Config) -> Self {
        AppState {
            db: Mutex::new(conn),
            almacenamiento: Arc::new(DiscoLocal::new(&config.storage_dir)),
            renderizador: Arc::new(RenderizadorTexto),
            comparador: Arc::new(ComparadorLocal),
            config,
            reloj: Arc::new(Utc::now),
        }
    }

    pub fn con_reloj(mut self, reloj: Reloj) -> Self {
        self.reloj = reloj;
        self
    }

    pub fn con_almacenamiento(mut self, almacenamiento: Arc<dyn Almacenamiento>) -> Self {
        self.almacenamiento = almacenamiento;
        self
    }

    pub fn ahora(&self) -> DateTime<Utc> {
        (self.reloj)()
    }
}

/// Ejecuta `f` con la conexión en el pool bloqueante de actix.
pub(crate) async fn con_db<T, F>(estado: &web::Data<AppState>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut Connection, &AppState) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let estado = estado.clone();
    web::block(move || {
        let mut conn = estado
            .db
            .lock()
            .map_err(|_| AppError::Interno("la conexión a la base de datos quedó inutilizable".to_string()))?;
        f(&mut conn, &estado)
    })
    .await?
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Tabla de rutas. Se usa tanto en el servidor como en las pruebas.
pub fn configurar(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_handler))
        // periodos y horas
        .route("/periodos", web::get().to(listar_periodos))
        .route("/periodos", web::post().to(crear_periodo))
        .route("/periodos/{id}", web::get().to(obtener_periodo))
        .route("/periodos/{id}", web::put().to(actualizar_periodo))
        .route("/periodos/{id}", web::delete().to(eliminar_periodo))
        .route("/horas", web::get().to(listar_horas))
        .route("/horas", web::post().to(crear_horas))
        .route("/horas/disponibles", web::get().to(horas_disponibles))
        // organización
        .route("/usuarios", web::get().to(listar_usuarios))
        .route("/usuarios", web::post().to(crear_usuario))
        .route("/grupos", web::get().to(listar_grupos))
        .route("/grupos", web::post().to(crear_grupo))
        .route("/grupos/{id}", web::delete().to(eliminar_grupo))
        .route("/proyectos", web::get().to(listar_proyectos))
        .route("/proyectos", web::post().to(crear_proyecto))
        .route("/proyectos/{id}", web::delete().to(eliminar_proyecto))
        .route("/proyectos/{id}/estado", web::put().to(cambiar_estado_proyecto))
        .route("/productos", web::get().to(listar_productos))
        .route("/productos", web::post().to(crear_producto))
        .route("/productos/{id}", web::delete().to(eliminar_producto))
        .route("/actividades", web::get().to(listar_actividades))
        .route("/actividades", web::post().to(crear_actividad))
        // entregas
        .route("/entregas", web::get().to(listar_entregas))
        .route("/entregas", web::post().to(crear_entrega))
        // planes e informes
        .route("/planes", web::get().to(listar_planes))
        .route("/planes", web::post().to(crear_plan))
        .route("/planes/{id}", web::get().to(obtener_plan))
        .route("/planes/{id}/actividades", web::post().to(agregar_actividad_plan))
        .route("/planes/{id}/enviar", web::post().to(enviar_plan))
        .route("/planes/{id}/estado", web::post().to(cambiar_estado_plan))
        .route("/planes/{id}/reporte", web::get().to(reporte_plan))
        .route("/planes/{id}/informes", web::get().to(listar_informes))
        .route("/planes/{id}/informes", web::post().to(crear_informe))
        // convocatorias y postulaciones
        .route("/convocatorias", web::get().to(listar_convocatorias))
        .route("/convocatorias", web::post().to(crear_convocatoria))
        .route("/convocatorias/{id}", web::get().to(obtener_convocatoria))
        .route("/convocatorias/{id}", web::delete().to(eliminar_convocatoria))
        .route("/convocatorias/{id}/estado", web::post().to(cambiar_estado_convocatoria))
        .route("/convocatorias/{id}/requisitos", web::post().to(agregar_requisito))
        .route("/convocatorias/{id}/postulaciones", web::get().to(listar_postulaciones))
        .route("/convocatorias/{id}/postulaciones", web::post().to(crear_postulacion))
        .route("/postulaciones/{id}/estado", web::post().to(evaluar_postulacion))
        .route("/postulaciones/{id}/archivos/{archivo_id}", web::get().to(descargar_archivo_postulacion))
        // reportes y revisión
        .route("/reportes/tablero", web::get().to(ver_tablero))
        .route("/reportes/tablero/grafico.svg", web::get().to(grafico_tablero))
        .route("/revision/comparar", web::post().to(comparar_evidencias));
}

/// Errores de deserialización del cuerpo o la query con el mismo formato JSON que el resto.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(16 * 1024 * 1024).error_handler(|err, _req| {
        let mensaje = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({"error": format!("cuerpo JSON inválido: {}", mensaje)})),
        )
        .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let mensaje = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({"error": format!("parámetros inválidos: {}", mensaje)})),
        )
        .into()
    })
}

/// Configuración común de extractores y rutas, aplicada al `App`.
pub fn configurar_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config()).configure(configurar);
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let conn = db::abrir_e_inicializar(&config.db_path).map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind = config.bind.clone();
    let workers = config.workers;
    tracing::info!(bind = %bind, workers, db = %config.db_path, storage = %config.storage_dir.display(), "iniciando servidor");

    let estado = web::Data::new(AppState::new(conn, config));
    HttpServer::new(move || {
        App::new()
            .app_data(estado.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configurar_app)
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await
}
