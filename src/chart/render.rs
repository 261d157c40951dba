// src/chart/render.rs

use plotters::prelude::*;

const CHART_WIDTH: u32 = 600;
const CHART_HEIGHT: u32 = 400;

const BAR_COLOR: RGBColor = RGBColor(255, 165, 0);
const LINE_COLOR: RGBColor = GREEN;
const LINE_STROKE_WIDTH: u32 = 2;

type RenderResult = Result<String, Box<dyn std::error::Error>>;

/// Bar chart of summed values per day, orange fill, one bar per group.
pub(super) fn bar_chart(grouped: &[(String, f64)]) -> RenderResult {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Ventas por día", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..grouped.len() as f64, 0f64..y_ceiling(grouped))?;

        chart
            .configure_mesh()
            .x_desc("Día")
            .y_desc("Valor")
            .x_labels(grouped.len().min(12))
            .x_label_formatter(&|x| day_label(grouped, *x))
            .draw()?;

        chart.draw_series(grouped.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *value)],
                BAR_COLOR.filled(),
            )
        }))?;

        root.present()?;
    }
    Ok(svg)
}

/// Line chart over the same aggregate, green stroke, one vertex per group
/// centered on its bar slot.
pub(super) fn line_chart(grouped: &[(String, f64)]) -> RenderResult {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Tendencia de ventas", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(0f64..grouped.len() as f64, 0f64..y_ceiling(grouped))?;

        chart
            .configure_mesh()
            .x_desc("Día")
            .y_desc("Valor")
            .x_labels(grouped.len().min(12))
            .x_label_formatter(&|x| day_label(grouped, *x))
            .draw()?;

        chart.draw_series(LineSeries::new(
            grouped
                .iter()
                .enumerate()
                .map(|(i, (_, value))| (i as f64 + 0.5, *value)),
            LINE_COLOR.stroke_width(LINE_STROKE_WIDTH),
        ))?;

        root.present()?;
    }
    Ok(svg)
}

fn day_label(grouped: &[(String, f64)], x: f64) -> String {
    grouped
        .get(x.floor() as usize)
        .map(|(day, _)| day.clone())
        .unwrap_or_default()
}

/// Y axis upper bound: a little headroom above the tallest group, and never a
/// degenerate zero-height range.
fn y_ceiling(grouped: &[(String, f64)]) -> f64 {
    let max = grouped.iter().map(|(_, v)| *v).fold(0.0f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_chart_emits_one_rect_per_group() {
        let grouped = vec![
            ("Mon".to_string(), 15.0),
            ("Tue".to_string(), 3.0),
            ("Wed".to_string(), 7.0),
        ];
        let svg = bar_chart(&grouped).unwrap().to_ascii_uppercase();
        assert!(svg.contains("<SVG"));
        // Orange fill appears once per bar.
        assert_eq!(svg.matches("#FFA500").count(), 3);
    }

    #[test]
    fn line_chart_uses_green_stroke() {
        let grouped = vec![("Mon".to_string(), 15.0), ("Tue".to_string(), 3.0)];
        let svg = line_chart(&grouped).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.to_ascii_uppercase().contains("#00FF00"));
        assert!(svg.contains("stroke-width=\"2\""));
    }

    #[test]
    fn y_ceiling_handles_all_zero_values() {
        let grouped = vec![("Mon".to_string(), 0.0)];
        assert_eq!(y_ceiling(&grouped), 1.0);
    }
}
