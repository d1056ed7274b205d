//! `egui_plot` backed surface

use egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, PlotUi, Points, VLine};
use pp_core::{MarkerSymbol, Rgb};

use crate::{Primitive, PrimitiveHandle, PrimitiveKind, PrimitiveStyle, RecordingSurface, RenderSurface};

const REGION_COLOR: Color32 = Color32::from_rgb(255, 200, 60);

/// Surface that retains primitives and draws them into an `egui_plot::Plot`.
///
/// It also owns the drag interaction used for range selection: while
/// selecting, primary drags sweep an x-interval instead of panning.
pub struct EguiPlotSurface {
    primitives: RecordingSurface,
    plot_id: String,
    reset_view: bool,
    region: Option<(f64, f64)>,
    drag_anchor: Option<f64>,
}

impl EguiPlotSurface {
    pub fn new(plot_id: impl Into<String>) -> Self {
        Self {
            primitives: RecordingSurface::new(),
            plot_id: plot_id.into(),
            reset_view: true,
            region: None,
            drag_anchor: None,
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        self.primitives.primitives()
    }

    /// The interval currently swept on the x-axis, if any
    pub fn region(&self) -> Option<(f64, f64)> {
        self.region
    }

    /// Category labels for the x-axis ticks, taken from the first bar
    /// primitive that carries them
    pub fn axis_labels(&self) -> Option<&[String]> {
        self.primitives
            .primitives()
            .iter()
            .find(|p| p.kind == PrimitiveKind::Bars && !p.style.labels.is_empty())
            .map(|p| p.style.labels.as_slice())
    }

    /// Forget the swept interval
    pub fn clear_region(&mut self) {
        self.region = None;
        self.drag_anchor = None;
    }

    /// Draw the plot. Returns the swept `(low, high)` interval when a
    /// selection drag finishes this frame.
    pub fn show(&mut self, ui: &mut Ui, selecting: bool) -> Option<(f64, f64)> {
        let mut plot = Plot::new(&self.plot_id)
            .legend(Legend::default())
            .allow_drag(!selecting)
            .allow_boxed_zoom(!selecting);
        if std::mem::take(&mut self.reset_view) {
            plot = plot.reset();
        }
        if let Some(labels) = self.axis_labels() {
            let labels = labels.to_vec();
            plot = plot.x_axis_formatter(move |value, _, _| tick_label(&labels, value));
        }

        let primitives = self.primitives.primitives();
        let mut anchor = self.drag_anchor;
        let mut region = self.region;
        let mut finished = None;

        plot.show(ui, |plot_ui| {
            for primitive in primitives {
                draw_primitive(plot_ui, primitive);
            }

            if selecting {
                let pointer_x = plot_ui.pointer_coordinate().map(|p| p.x);
                let response = plot_ui.response();
                if response.drag_started() {
                    anchor = pointer_x;
                }
                if response.dragged() {
                    if let (Some(start), Some(current)) = (anchor, pointer_x) {
                        region = Some((start.min(current), start.max(current)));
                    }
                }
                if response.drag_released() {
                    anchor = None;
                    finished = region;
                }
            }

            if let Some((low, high)) = region {
                for x in [low, high] {
                    plot_ui.vline(
                        VLine::new(x)
                            .color(REGION_COLOR)
                            .style(LineStyle::Dashed { length: 6.0 }),
                    );
                }
            }
        });

        self.drag_anchor = anchor;
        self.region = region;
        finished
    }
}

impl RenderSurface for EguiPlotSurface {
    fn add_primitive(
        &mut self,
        kind: PrimitiveKind,
        x: Vec<f64>,
        y: Option<Vec<f64>>,
        style: PrimitiveStyle,
    ) -> PrimitiveHandle {
        self.primitives.add_primitive(kind, x, y, style)
    }

    fn remove_primitive(&mut self, handle: PrimitiveHandle) -> bool {
        self.primitives.remove_primitive(handle)
    }

    fn clear_all(&mut self) {
        self.primitives.clear_all();
    }

    fn autoscale(&mut self) {
        self.reset_view = true;
    }
}

/// Text for an x tick over category bars at positions `0..labels.len()`.
/// Ticks between or beyond the bars stay blank.
fn tick_label(labels: &[String], value: f64) -> String {
    let position = value.round();
    if (value - position).abs() > 1e-6 || position < 0.0 {
        return String::new();
    }
    labels.get(position as usize).cloned().unwrap_or_default()
}

fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r(), color.g(), color.b())
}

fn marker_shape(symbol: MarkerSymbol) -> MarkerShape {
    match symbol {
        MarkerSymbol::Circle => MarkerShape::Circle,
        MarkerSymbol::Down => MarkerShape::Down,
        MarkerSymbol::Up => MarkerShape::Up,
        MarkerSymbol::Right => MarkerShape::Right,
        MarkerSymbol::Left => MarkerShape::Left,
        MarkerSymbol::Square => MarkerShape::Square,
        MarkerSymbol::Asterisk => MarkerShape::Asterisk,
        MarkerSymbol::Plus => MarkerShape::Plus,
        MarkerSymbol::Diamond => MarkerShape::Diamond,
        MarkerSymbol::Cross => MarkerShape::Cross,
    }
}

fn draw_primitive(plot_ui: &mut PlotUi, primitive: &Primitive) {
    let color = to_color32(primitive.style.color);
    let name = &primitive.style.name;

    match primitive.kind {
        PrimitiveKind::Scatter => {
            let shape = primitive.style.symbol.map(marker_shape).unwrap_or(MarkerShape::Circle);
            plot_ui.points(
                Points::new(PlotPoints::new(finite_points(primitive)))
                    .color(color)
                    .shape(shape)
                    .radius(3.0)
                    .name(name),
            );
        }
        PrimitiveKind::Line => {
            plot_ui.line(
                Line::new(PlotPoints::new(finite_points(primitive)))
                    .color(color)
                    .width(1.5)
                    .name(name),
            );
        }
        PrimitiveKind::Bars => {
            let width = primitive.style.bar_width.unwrap_or(1.0);
            let bars = primitive
                .x
                .iter()
                .zip(&primitive.y)
                .enumerate()
                .filter(|(_, (x, y))| x.is_finite() && y.is_finite())
                .map(|(i, (&x, &y))| {
                    let bar = Bar::new(x, y).width(width).fill(color.linear_multiply(0.7));
                    match primitive.style.labels.get(i) {
                        Some(label) => bar.name(label),
                        None => bar,
                    }
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(name));
        }
    }
}

fn finite_points(primitive: &Primitive) -> Vec<[f64; 2]> {
    primitive
        .x
        .iter()
        .zip(&primitive.y)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| [x, y])
        .collect()
}
