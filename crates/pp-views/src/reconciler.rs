//! Keeps the primitives on a [`RenderSurface`] in step with model events.

use std::sync::Arc;
use tracing::{debug, warn};

use pp_core::{BinSpec, PlotterSettings, Rgb};
use pp_data::{Column, ColumnKind, ColumnValues};
use pp_render::{PrimitiveHandle, PrimitiveKind, PrimitiveStyle, RenderSurface};

use crate::aggregate::{category_counts, histogram, row_bar_width};
use crate::model::{ModelEvent, PlotMode, SeriesStyle, SeriesUpdate};

/// Translates [`ModelEvent`]s into primitive edits.
///
/// In aggregate modes the surface holds at most one primitive. In series
/// mode `series[i]` is the primitive of the series at position `i`; an
/// entry is `None` when that series could not be drawn.
pub struct RenderReconciler<S: RenderSurface> {
    surface: S,
    mode: PlotMode,
    x: Option<Arc<Column>>,
    series: Vec<Option<PrimitiveHandle>>,
    aggregate: Option<PrimitiveHandle>,
    bins: BinSpec,
    bar_width: f64,
}

impl<S: RenderSurface> RenderReconciler<S> {
    pub fn new(surface: S, settings: &PlotterSettings) -> Self {
        Self {
            surface,
            mode: PlotMode::Empty,
            x: None,
            series: Vec::new(),
            aggregate: None,
            bins: settings.histogram_bins,
            bar_width: settings.bar_width,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    pub fn bins(&self) -> BinSpec {
        self.bins
    }

    /// Primitive of each series position, in series order
    pub fn series_handles(&self) -> &[Option<PrimitiveHandle>] {
        &self.series
    }

    /// Kind of the x column last received
    pub fn x_kind(&self) -> Option<ColumnKind> {
        self.x.as_ref().map(|x| x.kind())
    }

    /// The aggregate primitive, when one is drawn
    pub fn aggregate_handle(&self) -> Option<PrimitiveHandle> {
        self.aggregate
    }

    pub fn handle(&mut self, event: &ModelEvent) {
        match event {
            ModelEvent::Reset => {
                debug!("Reconciler reset");
                self.x = None;
                self.show_aggregate();
            }
            ModelEvent::XChanged(x) => {
                self.x = x.clone();
                if self.mode != PlotMode::Series {
                    self.show_aggregate();
                }
            }
            ModelEvent::SeriesChanged(update) => self.update_series(update),
            ModelEvent::SeriesRemoved { position } => self.remove_series(*position),
        }
    }

    /// Change the histogram binning. Only applies while the continuous
    /// aggregate is shown; returns whether it did.
    pub fn set_bins(&mut self, bins: BinSpec) -> bool {
        if self.mode != PlotMode::AggregateContinuous {
            return false;
        }
        self.bins = bins;
        self.show_aggregate();
        true
    }

    fn clear(&mut self) {
        self.surface.clear_all();
        self.series.clear();
        self.aggregate = None;
    }

    fn show_aggregate(&mut self) {
        self.clear();
        let Some(x) = self.x.clone() else {
            self.mode = PlotMode::Empty;
            self.surface.autoscale();
            return;
        };

        self.aggregate = match x.values() {
            ColumnValues::Categorical(values) => {
                self.mode = PlotMode::AggregateCategorical;
                self.counts_bars(x.name(), values, Rgb::GRAY)
            }
            ColumnValues::Continuous(values) => {
                self.mode = PlotMode::AggregateContinuous;
                match histogram(values, self.bins) {
                    Some(hist) => {
                        let style = PrimitiveStyle::new(x.name(), Rgb::GRAY).with_bar_width(hist.width());
                        let heights = hist.counts.iter().map(|&c| c as f64).collect();
                        Some(self.surface.add_primitive(PrimitiveKind::Bars, hist.centers(), Some(heights), style))
                    }
                    None => {
                        warn!("Column '{}' is empty or has undefined values, histogram suppressed", x.name());
                        None
                    }
                }
            }
        };
        self.surface.autoscale();
    }

    fn update_series(&mut self, update: &SeriesUpdate) {
        if self.mode != PlotMode::Series {
            self.clear();
            self.mode = PlotMode::Series;
        }
        self.x = Some(update.x.clone());

        if let Some(Some(old)) = self.series.get(update.position) {
            self.surface.remove_primitive(*old);
        }
        let handle = self.draw_series(update);

        if update.position < self.series.len() {
            self.series[update.position] = handle;
        } else {
            if update.position > self.series.len() {
                warn!(
                    "Series position {} skips past {} drawn series",
                    update.position,
                    self.series.len()
                );
            }
            self.series.resize(update.position, None);
            self.series.push(handle);
        }
        self.surface.autoscale();
    }

    fn remove_series(&mut self, position: usize) {
        if self.mode != PlotMode::Series || position >= self.series.len() {
            return;
        }
        if let Some(handle) = self.series.remove(position) {
            self.surface.remove_primitive(handle);
        }

        if self.series.is_empty() {
            self.show_aggregate();
        } else {
            self.surface.autoscale();
        }
    }

    fn draw_series(&mut self, update: &SeriesUpdate) -> Option<PrimitiveHandle> {
        let name = update.y.name();
        match update.y.values() {
            ColumnValues::Categorical(values) => self.counts_bars(name, values, update.color),
            ColumnValues::Continuous(y) => {
                let x = update.x.as_continuous()?;
                if update.x.has_undefined() || update.y.has_undefined() {
                    warn!("Series '{}' has undefined values, not drawn", name);
                    return None;
                }

                let style = PrimitiveStyle::new(name, update.color);
                let (kind, style) = match update.style {
                    SeriesStyle::Scatter => (PrimitiveKind::Scatter, style.with_symbol(update.symbol)),
                    SeriesStyle::Line => (PrimitiveKind::Line, style),
                    SeriesStyle::Bar => (
                        PrimitiveKind::Bars,
                        style.with_bar_width(row_bar_width(x, self.bar_width)),
                    ),
                };
                Some(self.surface.add_primitive(kind, x.to_vec(), Some(y.clone()), style))
            }
        }
    }

    /// Bar-of-counts over the distinct labels of a categorical column
    fn counts_bars(&mut self, name: &str, values: &[Option<String>], color: Rgb) -> Option<PrimitiveHandle> {
        let Some(counts) = category_counts(values) else {
            warn!("Column '{}' has undefined values, counts suppressed", name);
            return None;
        };
        let style = PrimitiveStyle::new(name, color)
            .with_bar_width(self.bar_width)
            .with_labels(counts.labels.clone());
        Some(
            self.surface
                .add_primitive(PrimitiveKind::Bars, counts.positions(), Some(counts.heights()), style),
        )
    }
}
