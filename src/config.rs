use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub const DB_EN_MEMORIA: &str = ":memory:";

/// Configuración del servicio. Se lee de `.env` y de variables `INVESTIGA_*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: String,
    pub db_path: String,
    pub storage_dir: PathBuf,
    pub workers: usize,
    /// Cantidad de periodos recientes que muestra el tablero.
    pub periodos_tablero: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1:8080".to_string(),
            db_path: "data/investiga.db".to_string(),
            storage_dir: PathBuf::from("storage"),
            workers: num_cpus::get(),
            periodos_tablero: 5,
        }
    }
}

impl Config {
    pub fn desde_entorno() -> Self {
        let _ = dotenv::dotenv();
        let vars: HashMap<String, String> = env::vars().filter(|(k, _)| k.starts_with("INVESTIGA_")).collect();
        Self::desde_mapa(&vars)
    }

    /// Valores ausentes, vacíos o inválidos caen al valor por defecto.
    pub fn desde_mapa(vars: &HashMap<String, String>) -> Self {
        let base = Config::default();
        let texto = |clave: &str| vars.get(clave).map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string);
        let positivo = |clave: &str, defecto: usize| {
            match texto(clave).map(|s| s.parse::<usize>()) {
                Some(Ok(n)) if n > 0 => n,
                Some(_) => {
                    tracing::warn!(clave, "valor inválido en configuración, se usa {}", defecto);
                    defecto
                }
                None => defecto,
            }
        };

        Config {
            bind: texto("INVESTIGA_BIND").unwrap_or(base.bind),
            db_path: texto("INVESTIGA_DB_PATH").unwrap_or(base.db_path),
            storage_dir: texto("INVESTIGA_STORAGE_DIR").map(PathBuf::from).unwrap_or(base.storage_dir),
            workers: positivo("INVESTIGA_WORKERS", base.workers),
            periodos_tablero: positivo("INVESTIGA_DASHBOARD_PERIODOS", base.periodos_tablero),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapa_sobrescribe_y_respeta_defectos() {
        let mut vars = HashMap::new();
        vars.insert("INVESTIGA_BIND".to_string(), "0.0.0.0:9000".to_string());
        vars.insert("INVESTIGA_DASHBOARD_PERIODOS".to_string(), "3".to_string());
        vars.insert("INVESTIGA_WORKERS".to_string(), "cero".to_string());
        let c = Config::desde_mapa(&vars);
        assert_eq!(c.bind, "0.0.0.0:9000");
        assert_eq!(c.periodos_tablero, 3);
        assert_eq!(c.workers, num_cpus::get());
        assert_eq!(c.db_path, "data/investiga.db");
    }
}
