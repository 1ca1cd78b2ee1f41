//! Almacenamiento de archivos bajo un directorio raíz, con rutas relativas por entidad
//! (`informes/{plan}/{informe}/...`, `convocatorias/postulaciones/{id}/...`).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

pub trait Almacenamiento: Send + Sync {
    fn guardar(&self, ruta: &str, contenido: &[u8]) -> io::Result<()>;
    fn leer(&self, ruta: &str) -> io::Result<Vec<u8>>;
    fn eliminar_directorio(&self, ruta: &str) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct DiscoLocal {
    raiz: PathBuf,
}

impl DiscoLocal {
    pub fn new<P: AsRef<Path>>(raiz: P) -> Self {
        DiscoLocal { raiz: raiz.as_ref().to_path_buf() }
    }

    /// Resuelve una ruta relativa dentro de la raíz; rechaza rutas absolutas y `..`.
    fn resolver(&self, ruta: &str) -> io::Result<PathBuf> {
        let relativa = Path::new(ruta);
        let valida = !ruta.is_empty()
            && relativa.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !valida {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("ruta no permitida: {}", ruta)));
        }
        Ok(self.raiz.join(relativa))
    }
}

impl Almacenamiento for DiscoLocal {
    fn guardar(&self, ruta: &str, contenido: &[u8]) -> io::Result<()> {
        let destino = self.resolver(ruta)?;
        if let Some(dir) = destino.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(destino, contenido)
    }

    fn leer(&self, ruta: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolver(ruta)?)
    }

    fn eliminar_directorio(&self, ruta: &str) -> io::Result<()> {
        let dir = self.resolver(ruta)?;
        match fs::remove_dir_all(&dir) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            otro => otro,
        }
    }
}

/// Deja solo caracteres seguros en un nombre de archivo recibido del cliente.
pub fn nombre_seguro(nombre: &str) -> String {
    let limpio: String = nombre
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let limpio = limpio.trim_start_matches('.').to_string();
    if limpio.is_empty() { "archivo".to_string() } else { limpio }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarda_lee_y_elimina() {
        let tmp = tempfile::tempdir().unwrap();
        let disco = DiscoLocal::new(tmp.path());
        disco.guardar("informes/1/2/a.txt", b"hola").unwrap();
        assert_eq!(disco.leer("informes/1/2/a.txt").unwrap(), b"hola");
        disco.eliminar_directorio("informes/1/2").unwrap();
        assert!(disco.leer("informes/1/2/a.txt").is_err());
        disco.eliminar_directorio("informes/1/2").unwrap();
    }

    #[test]
    fn rechaza_rutas_fuera_de_la_raiz() {
        let tmp = tempfile::tempdir().unwrap();
        let disco = DiscoLocal::new(tmp.path());
        assert!(disco.guardar("../fuera.txt", b"x").is_err());
        assert!(disco.guardar("/etc/x", b"x").is_err());
    }

    #[test]
    fn nombres_seguros() {
        assert_eq!(nombre_seguro("../../etc/passwd"), "passwd");
        assert_eq!(nombre_seguro("informe final.pdf"), "informe_final.pdf");
        assert_eq!(nombre_seguro(".."), "archivo");
    }
}
