//! Gráfico comparativo de grupos (barras agrupadas por periodo) en SVG.

use plotters::prelude::*;

use crate::error::AppError;
use crate::reportes::tablero::Tablero;

const ANCHO: u32 = 900;
const ALTO: u32 = 480;

fn error_grafico<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Interno(format!("no se pudo dibujar el gráfico: {}", e))
}

pub fn grafico_grupos_svg(tablero: &Tablero) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (ANCHO, ALTO)).into_drawing_area();
        root.fill(&WHITE).map_err(error_grafico)?;

        let columnas = tablero.periodos.len().max(1);
        let series = tablero.grupos.len().max(1);
        let etiquetas: Vec<String> = tablero.periodos.iter().map(|p| p.nombre.clone()).collect();
        let formatear = |x: &f64| -> String {
            etiquetas.get(x.floor().max(0.0) as usize).cloned().unwrap_or_default()
        };

        let mut chart = ChartBuilder::on(&root)
            .caption("Desempeño promedio por grupo", ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(48)
            .build_cartesian_2d(0f64..columnas as f64, 0f64..100f64)
            .map_err(error_grafico)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(columnas)
            .x_label_formatter(&formatear)
            .y_desc("Avance (%)")
            .draw()
            .map_err(error_grafico)?;

        let ancho_barra = 0.8 / series as f64;
        for (g, serie) in tablero.grupos.iter().enumerate() {
            let color = Palette99::pick(g).to_rgba();
            chart
                .draw_series(serie.promedios.iter().enumerate().map(|(i, v)| {
                    let x0 = i as f64 + 0.1 + g as f64 * ancho_barra;
                    Rectangle::new([(x0, 0.0), (x0 + ancho_barra, v.clamp(0.0, 100.0))], color.filled())
                }))
                .map_err(error_grafico)?
                .label(serie.nombre.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if !tablero.grupos.is_empty() {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(error_grafico)?;
        }

        root.present().map_err(error_grafico)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reportes::tablero::{construir_tablero, ColumnaPeriodo, Investigador};

    #[test]
    fn genera_svg_con_leyenda() {
        let tablero = construir_tablero(
            vec![ColumnaPeriodo { id: 1, nombre: "2024-A".into() }],
            &[Investigador { id: 1, nombre: "Ana".into(), grupo_id: Some(3), grupo_nombre: Some("Redes".into()) }],
            &[(1, 1)],
            &[(1, 1, 55.0)],
        );
        let svg = grafico_grupos_svg(&tablero).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Redes"));
    }
}
