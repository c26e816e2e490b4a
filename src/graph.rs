use crate::aggregate::ChartKind;
use crate::dashboard::PlannedChart;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::PI;
use std::ops::Range;

/// Category10 palette; a series never has more than ten points
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Largest accepted canvas side in pixels
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Renders one planned chart to an encoded image
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl Canvas {
    pub fn new(options: &RenderOptions) -> Result<Self> {
        if options.width == 0 || options.height == 0 {
            anyhow::bail!(
                "Canvas size must be non-zero (width: {}, height: {})",
                options.width,
                options.height
            );
        }
        if options.width > MAX_CANVAS_SIDE
            || options.height > MAX_CANVAS_SIDE
            || pixel_buffer_len(options.width, options.height).is_none()
        {
            anyhow::bail!(
                "Canvas size {}x{} is too large",
                options.width,
                options.height
            );
        }
        Ok(Self {
            width: options.width,
            height: options.height,
            format: options.format,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Draw the chart and encode it as PNG or SVG bytes
    pub fn render(&self, chart: &PlannedChart) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Png => self.render_png(chart),
            OutputFormat::Svg => self.render_svg(chart),
        }
    }

    fn render_png(&self, chart: &PlannedChart) -> Result<Vec<u8>> {
        let len = pixel_buffer_len(self.width, self.height)
            .context("Canvas size overflows the pixel buffer")?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            draw_chart(&root, chart)?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }

    fn render_svg(&self, chart: &PlannedChart) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            draw_chart(&root, chart)?;
        }
        Ok(svg.into_bytes())
    }
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, chart: &PlannedChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    if chart.series.is_empty() {
        let area = root
            .titled(&chart.heading, ("sans-serif", 20).into_font())
            .context("Failed to draw title")?;
        area.draw(&Text::new("No values", (10, 10), ("sans-serif", 14).into_font()))
            .context("Failed to draw placeholder")?;
    } else {
        match chart.series.kind {
            ChartKind::Bar => draw_bar(root, chart)?,
            ChartKind::Line => draw_line(root, chart)?,
            ChartKind::Pie => draw_pie(root, chart)?,
        }
    }

    root.present().context("Failed to present drawing")?;
    Ok(())
}

fn draw_bar<DB>(root: &DrawingArea<DB, Shift>, chart: &PlannedChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let series = &chart.series;
    let labels = &series.labels;
    let n = series.len();

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.heading, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(n), value_range(&series.values))
        .context("Failed to build chart")?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(labels, *x))
        .draw()
        .context("Failed to draw mesh")?;

    let color = PALETTE[0].mix(0.85);
    ctx.draw_series(series.values.iter().enumerate().map(|(idx, &value)| {
        let x = idx as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], color.filled())
    }))
    .context("Failed to draw bars")?
    .label(chart.legend.as_str())
    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

    draw_legend(&mut ctx)
}

fn draw_line<DB>(root: &DrawingArea<DB, Shift>, chart: &PlannedChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let series = &chart.series;
    let labels = &series.labels;
    let n = series.len();

    let mut ctx = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.heading, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(category_range(n), value_range(&series.values))
        .context("Failed to build chart")?;

    ctx.configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| category_label(labels, *x))
        .draw()
        .context("Failed to draw mesh")?;

    let color = PALETTE[0];
    let points: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .map(|(idx, &value)| (idx as f64, value))
        .collect();

    ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
        .context("Failed to draw line series")?
        .label(chart.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color.stroke_width(2)));

    ctx.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
        .context("Failed to draw points")?;

    draw_legend(&mut ctx)
}

fn draw_legend<'a, DB>(
    ctx: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .context("Failed to draw legend")?;
    Ok(())
}

fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, chart: &PlannedChart) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = root
        .titled(&chart.heading, ("sans-serif", 20).into_font())
        .context("Failed to draw title")?;
    let (width, height) = area.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);

    let legend_width = width / 3;
    let center = ((width - legend_width) / 2, height / 2);
    let radius = f64::from((width - legend_width).min(height)) * 0.4;

    let total: f64 = chart.series.values.iter().filter(|v| is_slice(**v)).sum();
    let mut start = -PI / 2.0;

    area.draw(&Text::new(
        chart.legend.as_str(),
        (width - legend_width, 10),
        ("sans-serif", 14).into_font(),
    ))
    .context("Failed to draw legend title")?;

    for (idx, (label, value)) in chart.series.points().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];

        if is_slice(value) && total > 0.0 {
            let sweep = value / total * 2.0 * PI;
            let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
            let mut wedge = Vec::with_capacity(steps + 2);
            wedge.push(center);
            for step in 0..=steps {
                let angle = start + sweep * step as f64 / steps as f64;
                wedge.push((
                    center.0 + (radius * angle.cos()).round() as i32,
                    center.1 + (radius * angle.sin()).round() as i32,
                ));
            }
            area.draw(&Polygon::new(wedge, color.filled()))
                .context("Failed to draw pie slice")?;
            start += sweep;
        }

        let x = width - legend_width;
        let y = 34 + idx as i32 * 20;
        area.draw(&Rectangle::new([(x, y), (x + 12, y + 12)], color.filled()))
            .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(
            format!("{}: {}", label, value),
            (x + 18, y),
            ("sans-serif", 13).into_font(),
        ))
        .context("Failed to draw legend entry")?;
    }

    Ok(())
}

/// Byte length of an RGB buffer, `None` when it does not fit in memory indexing
fn pixel_buffer_len(width: u32, height: u32) -> Option<usize> {
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(3)?;
    isize::try_from(len).ok().map(|_| len)
}

fn is_slice(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Categories sit on integer positions 0..n
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Value axis always includes zero
fn value_range(values: &[f64]) -> Range<f64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(0.0, f64::min);
    let max = finite.fold(0.0, f64::max);

    if min == max {
        return min..(max + 1.0);
    }

    let padding = (max - min) * 0.05;
    let lower = if min < 0.0 { min - padding } else { min };
    let upper = if max > 0.0 { max + padding } else { max };
    lower..upper
}

fn category_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
