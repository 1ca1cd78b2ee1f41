// Pruebas de la API HTTP contra la tabla de rutas real.
mod comun;

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use comun::{conexion, fecha};
use investiga::config::Config;
use investiga::server::{AppState, configurar_app};

fn estado(storage: &std::path::Path) -> web::Data<AppState> {
    let config = Config { storage_dir: storage.to_path_buf(), workers: 1, ..Config::default() };
    web::Data::new(AppState::new(conexion(), config).con_reloj(Arc::new(|| fecha(2024, 4, 1))))
}

const ADMIN: (&str, &str) = ("X-Roles", "administrador");
const COORDINADOR: (&str, &str) = ("X-Roles", "coordinador");
const INVESTIGADOR: (&str, &str) = ("X-Roles", "investigador");

fn como(usuario_id: i64, rol: (&'static str, &'static str)) -> [(&'static str, String); 2] {
    [("X-Usuario-Id", usuario_id.to_string()), (rol.0, rol.1.to_string())]
}

fn post(uri: &str, usuario_id: i64, rol: (&'static str, &'static str), cuerpo: Value) -> test::TestRequest {
    let [u, r] = como(usuario_id, rol);
    test::TestRequest::post().uri(uri).insert_header(u).insert_header(r).set_json(cuerpo)
}

fn get(uri: &str, usuario_id: i64, rol: (&'static str, &'static str)) -> test::TestRequest {
    let [u, r] = como(usuario_id, rol);
    test::TestRequest::get().uri(uri).insert_header(u).insert_header(r)
}

#[actix_web::test]
async fn health_responde_ok() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert_eq!(cuerpo, json!({"status": "ok"}));
}

#[actix_web::test]
async fn autenticacion_y_permisos() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let anonimo = test::call_service(&app, test::TestRequest::get().uri("/periodos").to_request()).await;
    assert_eq!(anonimo.status(), StatusCode::UNAUTHORIZED);

    let datos = json!({
        "nombre": "2024-A",
        "fecha_limite_planeacion": "2024-03-01T00:00:00Z",
        "fecha_limite_evidencias": "2024-06-01T00:00:00Z"
    });
    let denegado = test::call_service(&app, post("/periodos", 7, INVESTIGADOR, datos).to_request()).await;
    assert_eq!(denegado.status(), StatusCode::FORBIDDEN);
    let cuerpo: Value = test::read_body_json(denegado).await;
    assert!(cuerpo["error"].is_string());
}

#[actix_web::test]
async fn crear_y_listar_periodos() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let datos = json!({
        "nombre": "2024-A",
        "fecha_limite_planeacion": "2024-03-01T00:00:00Z",
        "fecha_limite_evidencias": "2024-06-01T00:00:00Z"
    });
    let resp = test::call_service(&app, post("/periodos", 1, COORDINADOR, datos).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert_eq!(cuerpo["status"], "ok");
    assert_eq!(cuerpo["data"]["estado"], "Activo");

    let lista: Value = test::call_and_read_body_json(&app, get("/periodos", 1, INVESTIGADOR).to_request()).await;
    assert_eq!(lista.as_array().map(Vec::len), Some(1));
    assert_eq!(lista[0]["nombre"], "2024-A");
}

#[actix_web::test]
async fn errores_de_entrada() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let invalido = json!({
        "nombre": "  ",
        "fecha_limite_planeacion": "2024-06-01T00:00:00Z",
        "fecha_limite_evidencias": "2024-03-01T00:00:00Z"
    });
    let resp = test::call_service(&app, post("/periodos", 1, ADMIN, invalido).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert!(cuerpo["campos"]["nombre"].is_string());
    assert!(cuerpo["campos"]["fecha_limite_evidencias"].is_string());

    let mal_formado = test::call_service(&app, post("/periodos", 1, ADMIN, json!({"nombre": 5})).to_request()).await;
    assert_eq!(mal_formado.status(), StatusCode::BAD_REQUEST);

    let inexistente = test::call_service(&app, get("/periodos/99", 1, ADMIN).to_request()).await;
    assert_eq!(inexistente.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn grupo_con_proyecto_responde_conflicto() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let grupo: Value =
        test::call_and_read_body_json(&app, post("/grupos", 1, ADMIN, json!({"nombre": "Redes"})).to_request()).await;
    let grupo_id = grupo["data"]["id"].as_i64().expect("id del grupo");
    let proyecto = post("/proyectos", 1, ADMIN, json!({"titulo": "Sensores", "grupo_id": grupo_id}));
    assert_eq!(test::call_service(&app, proyecto.to_request()).await.status(), StatusCode::CREATED);

    let [u, r] = como(1, ADMIN);
    let borrar = test::TestRequest::delete().uri(&format!("/grupos/{}", grupo_id)).insert_header(u).insert_header(r);
    let resp = test::call_service(&app, borrar.to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert!(cuerpo["error"].as_str().expect("mensaje").starts_with("No se puede eliminar"));
}

#[actix_web::test]
async fn plan_informe_reporte_y_tablero() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let id_de = |v: &Value| v["data"]["id"].as_i64().expect("id en la respuesta");

    let periodo = json!({
        "nombre": "2024-A",
        "fecha_limite_planeacion": "2024-03-01T00:00:00Z",
        "fecha_limite_evidencias": "2024-06-01T00:00:00Z"
    });
    let periodo_id = id_de(&test::call_and_read_body_json(&app, post("/periodos", 1, ADMIN, periodo).to_request()).await);
    let usuario = json!({"nombre": "Ana", "email": "Ana@Universidad.edu"});
    let creado: Value = test::call_and_read_body_json(&app, post("/usuarios", 1, ADMIN, usuario).to_request()).await;
    assert_eq!(creado["data"]["email"], "ana@universidad.edu");
    let ana = id_de(&creado);
    let actividad_id = id_de(
        &test::call_and_read_body_json(&app, post("/actividades", 1, ADMIN, json!({"nombre": "Artículo"})).to_request())
            .await,
    );

    let plan = json!({"nombre": "Plan 2024-A", "vigencia": "Semestral", "periodo_id": periodo_id});
    let plan_id = id_de(&test::call_and_read_body_json(&app, post("/planes", ana, INVESTIGADOR, plan).to_request()).await);
    let actividad = json!({"actividad_id": actividad_id, "horas": 12.0});
    let actividad_plan_id = id_de(
        &test::call_and_read_body_json(
            &app,
            post(&format!("/planes/{}/actividades", plan_id), ana, INVESTIGADOR, actividad).to_request(),
        )
        .await,
    );
    let enviar = post(&format!("/planes/{}/enviar", plan_id), ana, INVESTIGADOR, json!({}));
    assert_eq!(test::call_service(&app, enviar.to_request()).await.status(), StatusCode::OK);
    let aprobar = post(&format!("/planes/{}/estado", plan_id), 2, COORDINADOR, json!({"estado": "Aprobado"}));
    assert_eq!(test::call_service(&app, aprobar.to_request()).await.status(), StatusCode::OK);

    let informe = json!({
        "evidencias": [{
            "actividad_plan_id": actividad_plan_id,
            "porcentaje_progreso_nuevo": 60.0,
            "descripcion": "Avance documentado en detalle",
            "archivo": {"nombre": "avance.pdf", "contenido_base64": STANDARD.encode(b"%PDF avance")}
        }]
    });
    let uri = format!("/planes/{}/informes", plan_id);
    let resp = test::call_service(&app, post(&uri, ana, INVESTIGADOR, informe.clone()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert_eq!(cuerpo["data"]["evidencias"][0]["porcentaje_progreso_nuevo"], 60.0);

    let repetido = test::call_service(&app, post(&uri, ana, INVESTIGADOR, informe).to_request()).await;
    assert_eq!(repetido.status(), StatusCode::CONFLICT);

    let reporte = test::call_service(
        &app,
        get(&format!("/planes/{}/reporte?modo=descarga", plan_id), ana, INVESTIGADOR).to_request(),
    )
    .await;
    assert_eq!(reporte.status(), StatusCode::OK);
    let disposicion = reporte
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("Content-Disposition");
    assert!(disposicion.starts_with("attachment"));

    let ajeno = test::call_service(&app, get(&format!("/planes/{}/reporte", plan_id), 99, INVESTIGADOR).to_request()).await;
    assert_eq!(ajeno.status(), StatusCode::FORBIDDEN);

    let tablero: Value = test::call_and_read_body_json(&app, get("/reportes/tablero", 2, COORDINADOR).to_request()).await;
    assert_eq!(tablero["periodos"][0]["nombre"], "2024-A");
    assert_eq!(tablero["detalle"][0]["investigadores"][0]["puntajes"][0], 60.0);

    let grafico = test::call_service(&app, get("/reportes/tablero/grafico.svg", 2, COORDINADOR).to_request()).await;
    assert_eq!(grafico.status(), StatusCode::OK);
    assert_eq!(grafico.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()), Some("image/svg+xml"));
}

#[actix_web::test]
async fn comparar_textos() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let iguales = json!({"texto_a": "Informe de campo", "texto_b": "informe de campo"});
    let similitud: Value =
        test::call_and_read_body_json(&app, post("/revision/comparar", 3, INVESTIGADOR, iguales).to_request()).await;
    assert_eq!(similitud["puntaje"], 100.0);

    let incompleta = post("/revision/comparar", 3, INVESTIGADOR, json!({"texto_a": "solo un lado"}));
    let resp = test::call_service(&app, incompleta.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert!(cuerpo["campos"]["evidencia_b"].is_string());
}

#[actix_web::test]
async fn email_duplicado_responde_422() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let app = test::init_service(App::new().app_data(estado(tmp.path())).configure(configurar_app)).await;

    let datos = json!({"nombre": "Ana", "email": "ana@universidad.edu"});
    let primero = test::call_service(&app, post("/usuarios", 1, ADMIN, datos).to_request()).await;
    assert_eq!(primero.status(), StatusCode::CREATED);

    let repetido = json!({"nombre": "Ana B.", "email": "ANA@universidad.edu"});
    let resp = test::call_service(&app, post("/usuarios", 1, ADMIN, repetido).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let cuerpo: Value = test::read_body_json(resp).await;
    assert_eq!(cuerpo["campos"]["email"], "ya está registrado");
}
