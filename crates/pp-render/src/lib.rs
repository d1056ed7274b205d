//! Rendering abstraction layer
//!
//! The reconciler only ever talks to a [`RenderSurface`]: a retained list of
//! plot primitives it can add to, remove from, clear and rescale. Two
//! surfaces are provided: [`RecordingSurface`] keeps primitives in memory for
//! inspection, [`EguiPlotSurface`] draws them with `egui_plot`.

mod egui_surface;
mod recording;

pub use egui_surface::EguiPlotSurface;
pub use recording::RecordingSurface;

use pp_core::{MarkerSymbol, Rgb};

/// Identifies a primitive on the surface that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle(pub u64);

/// How a primitive's points are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Markers only, no connecting line
    Scatter,
    /// Polyline through the points in the order given
    Line,
    /// One bar per point, from zero to y
    Bars,
}

/// Visual parameters of a primitive
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveStyle {
    /// Legend entry
    pub name: String,
    pub color: Rgb,
    /// Marker for scatter primitives
    pub symbol: Option<MarkerSymbol>,
    /// Width of every bar, for bar primitives
    pub bar_width: Option<f64>,
    /// Per-point labels, e.g. the category each bar counts
    pub labels: Vec<String>,
}

impl PrimitiveStyle {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
            symbol: None,
            bar_width: None,
            labels: Vec::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: MarkerSymbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_bar_width(mut self, width: f64) -> Self {
        self.bar_width = Some(width);
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

/// A primitive as stored by a surface
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub handle: PrimitiveHandle,
    pub kind: PrimitiveKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub style: PrimitiveStyle,
}

/// Retained-mode drawing target
pub trait RenderSurface {
    /// Add a primitive. Without `y`, each x value is plotted against its
    /// position in `x`.
    fn add_primitive(
        &mut self,
        kind: PrimitiveKind,
        x: Vec<f64>,
        y: Option<Vec<f64>>,
        style: PrimitiveStyle,
    ) -> PrimitiveHandle;

    /// Remove a primitive; returns `false` for unknown handles
    fn remove_primitive(&mut self, handle: PrimitiveHandle) -> bool;

    /// Remove every primitive
    fn clear_all(&mut self);

    /// Fit the view to the primitives currently present
    fn autoscale(&mut self);
}
