// Estados y tipos cerrados de las entidades.
//
// Cada enum se guarda en SQLite y viaja en JSON con su nombre en texto.
// Las transiciones válidas viven en tablas estáticas junto a cada enum.

use crate::error::Rechazo;

macro_rules! enum_texto {
    ($(#[$meta:meta])* $nombre:ident { $($variante:ident => $texto:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $nombre {
            $(#[serde(rename = $texto)] $variante),+
        }

        impl $nombre {
            pub const TODOS: &'static [$nombre] = &[$($nombre::$variante),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($nombre::$variante => $texto),+
                }
            }
        }

        impl std::fmt::Display for $nombre {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $nombre {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($texto => Ok($nombre::$variante),)+
                    otro => Err(format!("valor desconocido para {}: '{}'", stringify!($nombre), otro)),
                }
            }
        }

        impl rusqlite::types::ToSql for $nombre {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $nombre {
            fn column_result(valor: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let texto = valor.as_str()?;
                texto
                    .parse()
                    .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
            }
        }
    };
}

enum_texto! {
    /// Estado de periodos y registros de horas.
    EstadoRegistro {
        Activo => "Activo",
        Inactivo => "Inactivo",
    }
}

enum_texto! {
    TipoEntrega {
        Planeacion => "planeacion",
        Evidencia => "evidencia",
    }
}

enum_texto! {
    /// Semestral cubre un periodo; Anual cubre el periodo de inicio y el siguiente.
    Vigencia {
        Anual => "Anual",
        Semestral => "Semestral",
    }
}

enum_texto! {
    EstadoPlan {
        Creado => "Creado",
        Pendiente => "Pendiente",
        Correccion => "Correccion",
        Aprobado => "Aprobado",
        Terminado => "Terminado",
    }
}

enum_texto! {
    EstadoProyecto {
        Formulacion => "Formulacion",
        EnEjecucion => "En ejecucion",
        Finalizado => "Finalizado",
    }
}

enum_texto! {
    EstadoConvocatoria {
        Abierta => "Abierta",
        Cerrada => "Cerrada",
    }
}

enum_texto! {
    EstadoPostulacion {
        Pendiente => "Pendiente",
        Aprobada => "Aprobada",
        Rechazada => "Rechazada",
    }
}

impl Vigencia {
    /// Cantidad de informes que admite un plan con esta vigencia.
    pub fn informes_permitidos(&self) -> usize {
        match self {
            Vigencia::Semestral => 1,
            Vigencia::Anual => 2,
        }
    }
}

const TRANSICIONES_PLAN: &[(EstadoPlan, EstadoPlan)] = &[
    (EstadoPlan::Creado, EstadoPlan::Pendiente),
    (EstadoPlan::Pendiente, EstadoPlan::Aprobado),
    (EstadoPlan::Pendiente, EstadoPlan::Correccion),
    (EstadoPlan::Correccion, EstadoPlan::Pendiente),
    (EstadoPlan::Aprobado, EstadoPlan::Terminado),
];

const TRANSICIONES_PROYECTO: &[(EstadoProyecto, EstadoProyecto)] = &[
    (EstadoProyecto::Formulacion, EstadoProyecto::EnEjecucion),
    (EstadoProyecto::EnEjecucion, EstadoProyecto::Finalizado),
];

const TRANSICIONES_POSTULACION: &[(EstadoPostulacion, EstadoPostulacion)] = &[
    (EstadoPostulacion::Pendiente, EstadoPostulacion::Aprobada),
    (EstadoPostulacion::Pendiente, EstadoPostulacion::Rechazada),
];

fn validar_transicion<E>(tabla: &[(E, E)], desde: E, hacia: E) -> Result<(), Rechazo>
where
    E: PartialEq + Copy + std::fmt::Display,
{
    if tabla.iter().any(|(a, b)| *a == desde && *b == hacia) {
        Ok(())
    } else {
        Err(Rechazo::TransicionInvalida { desde: desde.to_string(), hacia: hacia.to_string() })
    }
}

impl EstadoPlan {
    pub fn transicion(self, hacia: EstadoPlan) -> Result<EstadoPlan, Rechazo> {
        validar_transicion(TRANSICIONES_PLAN, self, hacia).map(|_| hacia)
    }
}

impl EstadoProyecto {
    pub fn transicion(self, hacia: EstadoProyecto) -> Result<EstadoProyecto, Rechazo> {
        validar_transicion(TRANSICIONES_PROYECTO, self, hacia).map(|_| hacia)
    }
}

impl EstadoPostulacion {
    pub fn transicion(self, hacia: EstadoPostulacion) -> Result<EstadoPostulacion, Rechazo> {
        validar_transicion(TRANSICIONES_POSTULACION, self, hacia).map(|_| hacia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_sigue_el_ciclo_de_revision() {
        let estado = EstadoPlan::Creado.transicion(EstadoPlan::Pendiente).unwrap();
        let estado = estado.transicion(EstadoPlan::Correccion).unwrap();
        let estado = estado.transicion(EstadoPlan::Pendiente).unwrap();
        let estado = estado.transicion(EstadoPlan::Aprobado).unwrap();
        assert_eq!(estado.transicion(EstadoPlan::Terminado), Ok(EstadoPlan::Terminado));
    }

    #[test]
    fn plan_no_salta_la_revision() {
        let err = EstadoPlan::Creado.transicion(EstadoPlan::Aprobado).unwrap_err();
        assert_eq!(
            err,
            Rechazo::TransicionInvalida { desde: "Creado".into(), hacia: "Aprobado".into() }
        );
        assert!(EstadoPlan::Terminado.transicion(EstadoPlan::Pendiente).is_err());
    }

    #[test]
    fn texto_ida_y_vuelta() {
        for e in EstadoProyecto::TODOS {
            assert_eq!(e.as_str().parse::<EstadoProyecto>(), Ok(*e));
        }
        assert!("Abierto".parse::<EstadoConvocatoria>().is_err());
        assert_eq!(serde_json::to_string(&TipoEntrega::Evidencia).unwrap(), "\"evidencia\"");
    }
}
