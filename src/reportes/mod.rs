pub mod documento;
pub mod grafico;
pub mod tablero;

pub use documento::{Documento, ModoEntrega, Renderizador, RenderizadorTexto};
pub use grafico::grafico_grupos_svg;
pub use tablero::{Tablero, construir_tablero};
