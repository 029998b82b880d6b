use std::panic;
use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use rhythm_curve::{energy_label, ChartData};

const CHART_SIZE: (u32, u32) = (1280, 720);

#[derive(Clone, Copy, Debug)]
pub enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ChartKind::Svg,
            _ => ChartKind::Png,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlotOptions {
    pub show_points: bool,
    pub show_phases: bool,
    pub show_controls: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            show_points: true,
            show_phases: true,
            show_controls: false,
        }
    }
}

/// Render without letting a backend panic (missing fonts, mostly) take the
/// process down.
pub fn render_chart_guard(
    chart: &ChartData,
    path: &Path,
    kind: ChartKind,
    opts: &PlotOptions,
) -> Result<(), String> {
    let render = || -> Result<(), String> {
        render_chart(chart, path, kind, opts).map_err(|e| format!("plotting error: {}", e))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn render_chart(chart: &ChartData, path: &Path, kind: ChartKind, opts: &PlotOptions) -> Result<()> {
    if chart.points.is_empty() {
        return Ok(());
    }
    match kind {
        ChartKind::Png => {
            let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
            draw_energy_chart(root, chart, opts)
        }
        ChartKind::Svg => {
            let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
            draw_energy_chart(root, chart, opts)
        }
    }
}

fn y_label(v: &f64) -> String {
    let level = v.round();
    if (v - level).abs() < 1e-6 && (1.0..=5.0).contains(&level) {
        energy_label(level as u8).to_string()
    } else {
        String::new()
    }
}

fn reported_note(data: &ChartData) -> Option<String> {
    match (data.reported_peak_level, data.reported_low_level) {
        (None, None) => None,
        (peak, low) => {
            let show = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v}/5"));
            Some(format!("You rated your peak {} and your low {}.", show(peak), show(low)))
        }
    }
}

fn draw_energy_chart<DB>(
    root: DrawingArea<DB, Shift>,
    data: &ChartData,
    opts: &PlotOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let x_max = f64::from(data.cycle_length.max(2));

    let title_font = FontDesc::new(FontFamily::SansSerif, 28.0, FontStyle::Normal);
    let axis_font = FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Normal);
    let note_font = FontDesc::new(FontFamily::SansSerif, 16.0, FontStyle::Italic);

    let x_desc = if data.fuzziness.x_axis {
        format!("Day of cycle ({}, estimated)", data.display_cycle_length_label)
    } else {
        format!("Day of cycle ({})", data.display_cycle_length_label)
    };

    let mut chart = ChartBuilder::on(&root)
        .caption("Your energy rhythm", title_font)
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 120)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(1.0..x_max, 0.5..5.5)?;

    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(&BLACK.mix(0.08))
        .x_labels(data.cycle_length.min(40) as usize)
        .y_labels(11)
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&y_label)
        .x_desc(x_desc)
        .label_style(axis_font.clone().color(&BLACK.mix(0.85)))
        .draw()?;

    if opts.show_phases {
        let bands = [
            (1.0, f64::from(data.phases.follicular), RGBColor(255, 182, 193)),
            (
                f64::from(data.phases.follicular),
                f64::from(data.phases.follicular + data.phases.ovulation),
                RGBColor(255, 215, 0),
            ),
            (
                f64::from(data.phases.follicular + data.phases.ovulation),
                x_max,
                RGBColor(176, 196, 222),
            ),
        ];
        chart.draw_series(bands.iter().filter(|(lo, hi, _)| hi > lo).map(|(lo, hi, color)| {
            Rectangle::new([(*lo, 0.5), (*hi, 5.5)], color.mix(0.15).filled())
        }))?;
    }

    let samples = data.denormalized_samples();
    let curve_color = RGBColor(194, 24, 91);

    chart.draw_series(
        AreaSeries::new(samples.iter().copied(), 1.0, curve_color.mix(0.18))
            .border_style(TRANSPARENT),
    )?;

    chart
        .draw_series(LineSeries::new(
            samples.iter().copied(),
            ShapeStyle {
                color: curve_color.to_rgba(),
                filled: false,
                stroke_width: 3,
            },
        ))?
        .label("Energy")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], curve_color));

    if opts.show_points {
        let point_color = RGBColor(90, 90, 90);
        chart.draw_series(
            data.points
                .iter()
                .map(|p| Circle::new((f64::from(p.day), p.energy), 3, point_color.filled())),
        )?;
    }

    if opts.show_controls {
        let control_color = RGBColor(30, 144, 255);
        chart.draw_series(data.control_points.iter().map(|p| {
            EmptyElement::at((f64::from(p.day), p.energy))
                + Cross::new((0, 0), 6, control_color.stroke_width(2))
                + Text::new(format!("c{}", p.day), (8, -8), axis_font.clone())
        }))?;
    }

    let marker_font = FontDesc::new(FontFamily::SansSerif, 18.0, FontStyle::Bold);
    let peak_energy = data.energy_on(data.peak_day).unwrap_or(5.0);
    let low_energy = data.energy_on(data.lowest_day).unwrap_or(1.0);
    chart.draw_series(std::iter::once(
        EmptyElement::at((f64::from(data.peak_day), peak_energy))
            + Circle::new((0, 0), 7, curve_color.filled())
            + Text::new(data.peak_message.clone(), (10, -28), marker_font.clone()),
    ))?;
    chart.draw_series(std::iter::once(
        EmptyElement::at((f64::from(data.lowest_day), low_energy))
            + Circle::new((0, 0), 7, RGBColor(70, 70, 160).filled())
            + Text::new(data.low_message.clone(), (-40, -28), marker_font),
    ))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .label_font(axis_font.color(&BLACK))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    let (_, height) = root.dim_in_pixel();
    let mut notes = Vec::new();
    if data.fuzziness.x_axis {
        notes.push("* Cycle length is an estimate.".to_string());
    }
    if let Some(message) = data.condition_message.as_ref() {
        notes.push(message.clone());
    }
    if let Some(note) = reported_note(data) {
        notes.push(note);
    }
    for (idx, note) in notes.into_iter().enumerate() {
        let y = height as i32 - 22 * (idx as i32 + 1);
        root.draw(&Text::new(note, (30, y), note_font.clone()))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_backend_from_extension() {
        assert!(matches!(ChartKind::from_path(Path::new("a.SVG")), ChartKind::Svg));
        assert!(matches!(ChartKind::from_path(Path::new("a.png")), ChartKind::Png));
        assert!(matches!(ChartKind::from_path(Path::new("chart")), ChartKind::Png));
    }

    #[test]
    fn y_axis_shows_labels_on_whole_levels_only() {
        assert_eq!(y_label(&1.0), "Very Low");
        assert_eq!(y_label(&5.0), "Peak Energy");
        assert_eq!(y_label(&2.5), "");
        assert_eq!(y_label(&0.5), "");
    }

    #[test]
    fn reported_levels_become_a_note() {
        let mut data = rhythm_curve::generate_chart_data(&rhythm_curve::QuizAnswers::default());
        assert_eq!(reported_note(&data), None);
        data.reported_peak_level = Some(4.25);
        assert_eq!(
            reported_note(&data).as_deref(),
            Some("You rated your peak 4.25/5 and your low n/a.")
        );
    }
}
