//! Composition root wiring binding, model, reconciler and range selector

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use tracing::warn;

use pp_core::{BinSpec, PlotterSettings, SubscriptionId};
use pp_data::{Layer, LayerList};
use pp_render::RenderSurface;

use crate::binding::{SourceBinding, SourceError};
use crate::model::{AxisSeriesModel, ModelError, ModelEvent, PlotMode, SeriesSlot, SeriesStyle};
use crate::range_selector::RangeSelector;
use crate::reconciler::RenderReconciler;

/// The property plotter panel minus its widgets.
///
/// Event flow: the bound layer's table goes into the model, model events
/// drive the reconciler, and the selector is switched off whenever the plot
/// leaves series mode. Any x change discards the swept region, and an
/// aborted range clears the bound layer's selection.
pub struct PropertyPlotter<S: RenderSurface + Send + 'static> {
    binding: Arc<SourceBinding>,
    model: Arc<Mutex<AxisSeriesModel>>,
    reconciler: Arc<Mutex<RenderReconciler<S>>>,
    selector: Arc<Mutex<RangeSelector>>,
    /// Layer that received the last swept selection
    swept: Arc<Mutex<Option<Weak<Layer>>>>,
    table_subscription: SubscriptionId,
}

impl<S: RenderSurface + Send + 'static> PropertyPlotter<S> {
    pub fn new(layers: Arc<LayerList>, surface: S, settings: &PlotterSettings) -> Self {
        let model = Arc::new(Mutex::new(AxisSeriesModel::new(settings)));
        let reconciler = Arc::new(Mutex::new(RenderReconciler::new(surface, settings)));
        let selector = Arc::new(Mutex::new(RangeSelector::new()));
        let binding = SourceBinding::attach(layers);

        {
            let model = model.lock();

            let sink = reconciler.clone();
            model.events().subscribe(move |event: &ModelEvent| sink.lock().handle(event));

            // Runs after the reconciler, so its mode is already current
            let mode_source = reconciler.clone();
            let guarded = selector.clone();
            model.events().subscribe(move |event: &ModelEvent| {
                let mode = mode_source.lock().mode();
                let mut selector = guarded.lock();
                if mode != PlotMode::Series {
                    selector.set_enabled(false, mode);
                } else if matches!(event, ModelEvent::XChanged(_)) {
                    // A region swept over the old x data no longer applies
                    selector.discard_region();
                }
            });
        }

        // The binding may already point at another layer by the time a
        // region is discarded, so clear the one that was swept
        let swept: Arc<Mutex<Option<Weak<Layer>>>> = Arc::new(Mutex::new(None));
        let stale = swept.clone();
        selector.lock().aborted().subscribe(move |_| {
            if let Some(layer) = stale.lock().take().and_then(|l| l.upgrade()) {
                layer.set_selected_rows(BTreeSet::new());
            }
        });

        let target = model.clone();
        let table_subscription = binding
            .table_replaced()
            .subscribe(move |table| target.lock().set_table(table.clone()));

        model.lock().set_table(binding.current_table());

        Self {
            binding,
            model,
            reconciler,
            selector,
            swept,
            table_subscription,
        }
    }

    /// Bind to another layer
    pub fn select_layer(&self, name: &str) -> Result<(), SourceError> {
        self.binding.select(name)
    }

    pub fn selectable_layers(&self) -> Vec<String> {
        self.binding.selectable_names()
    }

    pub fn current_layer_name(&self) -> Option<String> {
        self.binding.current_layer().map(|l| l.name().to_string())
    }

    pub fn columns(&self) -> Vec<String> {
        self.model.lock().columns()
    }

    pub fn current_x(&self) -> Option<String> {
        self.model.lock().current_x().map(str::to_string)
    }

    pub fn set_x(&self, name: &str) -> Result<(), ModelError> {
        self.model.lock().set_x(name).map_err(log_rejected)
    }

    pub fn add_series(&self, name: &str) -> Result<usize, ModelError> {
        self.model.lock().add_series(name).map_err(log_rejected)
    }

    pub fn remove_series(&self, position: usize) -> Result<(), ModelError> {
        self.model.lock().remove_series(position).map_err(log_rejected)
    }

    pub fn set_series_style(&self, position: usize, style: SeriesStyle) -> Result<(), ModelError> {
        self.model.lock().set_series_style(position, style).map_err(log_rejected)
    }

    pub fn set_series_column(&self, position: usize, name: &str) -> Result<(), ModelError> {
        self.model.lock().set_series_column(position, name).map_err(log_rejected)
    }

    /// Snapshot of the configured series
    pub fn series(&self) -> Vec<SeriesSlot> {
        self.model.lock().series().to_vec()
    }

    pub fn valid_styles(&self, column: &str) -> Result<&'static [SeriesStyle], ModelError> {
        self.model.lock().valid_styles(column)
    }

    pub fn plot_mode(&self) -> PlotMode {
        self.model.lock().plot_mode()
    }

    pub fn bins(&self) -> BinSpec {
        self.reconciler.lock().bins()
    }

    /// Rebin the histogram; `false` unless it is currently shown
    pub fn set_bins(&self, bins: BinSpec) -> bool {
        self.reconciler.lock().set_bins(bins)
    }

    pub fn range_selection_enabled(&self) -> bool {
        self.selector.lock().is_enabled()
    }

    /// Returns whether selection is on afterwards
    pub fn set_range_selection_enabled(&self, enabled: bool) -> bool {
        let mode = self.plot_mode();
        self.selector.lock().set_enabled(enabled, mode)
    }

    /// Select the rows of the bound layer whose x lies in the interval
    pub fn on_drag_region(&self, low: f64, high: f64) -> Option<BTreeSet<usize>> {
        let x = self.model.lock().x_column().cloned();
        let layer = self.binding.current_layer();
        let rows = self
            .selector
            .lock()
            .on_drag_region(low, high, x.as_deref(), layer.as_deref())?;
        *self.swept.lock() = layer.as_ref().map(Arc::downgrade);
        Some(rows)
    }

    pub fn on_drag_cleared(&self) {
        let layer = self.binding.current_layer();
        self.selector.lock().on_drag_cleared(layer.as_deref());
        *self.swept.lock() = None;
    }

    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(self.reconciler.lock().surface())
    }

    pub fn with_surface_mut<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(self.reconciler.lock().surface_mut())
    }
}

impl<S: RenderSurface + Send + 'static> Drop for PropertyPlotter<S> {
    fn drop(&mut self) {
        self.binding.table_replaced().unsubscribe(self.table_subscription);
    }
}

fn log_rejected(err: ModelError) -> ModelError {
    warn!("{}", err);
    err
}
