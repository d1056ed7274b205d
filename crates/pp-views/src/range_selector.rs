//! Drag-to-select over the x-axis

use std::collections::BTreeSet;
use pp_core::Signal;
use pp_data::{Column, Layer};
use tracing::debug;

use crate::model::PlotMode;

/// Rows whose x value lies in `[low, high]`. Reversed bounds are swapped;
/// undefined and categorical values never match.
pub fn rows_in_range(column: &Column, low: f64, high: f64) -> BTreeSet<usize> {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let Some(values) = column.as_continuous() else {
        return BTreeSet::new();
    };

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| low <= **v && **v <= high)
        .map(|(row, _)| row)
        .collect()
}

/// Turns a dragged x-interval into a row selection on the bound layer
#[derive(Debug, Default)]
pub struct RangeSelector {
    enabled: bool,
    region: Option<(f64, f64)>,
    aborted: Signal<()>,
}

impl RangeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The last dragged interval, normalized so `low <= high`
    pub fn region(&self) -> Option<(f64, f64)> {
        self.region
    }

    /// Fired when an existing region is discarded
    pub fn aborted(&self) -> &Signal<()> {
        &self.aborted
    }

    /// Turn selection on or off. Enabling only works in series mode;
    /// returns the resulting state.
    pub fn set_enabled(&mut self, enabled: bool, mode: PlotMode) -> bool {
        if enabled {
            if mode == PlotMode::Series {
                self.enabled = true;
            }
            return self.enabled;
        }

        self.enabled = false;
        self.discard_region();
        false
    }

    /// Drop the current region, emitting an abort if there was one.
    /// Selection stays enabled.
    pub fn discard_region(&mut self) -> bool {
        if self.region.take().is_none() {
            return false;
        }
        debug!("Range selection aborted");
        self.aborted.emit(&());
        true
    }

    /// Select the rows of `target` whose `x` value lies in the dragged
    /// interval. Returns the forwarded set; `None` when selection is off or
    /// nothing is bound.
    pub fn on_drag_region(
        &mut self,
        low: f64,
        high: f64,
        x: Option<&Column>,
        target: Option<&Layer>,
    ) -> Option<BTreeSet<usize>> {
        if !self.enabled {
            return None;
        }
        let (x, target) = (x?, target?);

        let rows = rows_in_range(x, low, high);
        self.region = Some((low.min(high), low.max(high)));
        debug!(
            "Range {}..{} on '{}' selects {} rows of '{}'",
            low,
            high,
            x.name(),
            rows.len(),
            target.name()
        );
        target.set_selected_rows(rows.clone());
        Some(rows)
    }

    /// Forward an empty selection after the region is dismissed
    pub fn on_drag_cleared(&mut self, target: Option<&Layer>) {
        if !self.enabled {
            return;
        }
        self.region = None;
        if let Some(target) = target {
            target.set_selected_rows(BTreeSet::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn layer() -> Arc<Layer> {
        Layer::new("points", None)
    }

    #[test]
    fn test_rows_in_range_is_inclusive() {
        let x = Column::continuous("a", vec![1.0, 2.0, 3.0, f64::NAN, 2.5]);

        assert_eq!(rows_in_range(&x, 1.5, 2.5), BTreeSet::from([1, 4]));
        assert_eq!(rows_in_range(&x, 3.0, 1.0), BTreeSet::from([0, 1, 2, 4]));
        assert!(rows_in_range(&x, 10.0, 20.0).is_empty());

        let labels = Column::categorical("b", [Some("x")]);
        assert!(rows_in_range(&labels, f64::NEG_INFINITY, f64::INFINITY).is_empty());
    }

    #[test]
    fn test_enable_only_in_series_mode() {
        let mut selector = RangeSelector::new();
        assert!(!selector.set_enabled(true, PlotMode::AggregateContinuous));
        assert!(!selector.set_enabled(true, PlotMode::Empty));
        assert!(selector.set_enabled(true, PlotMode::Series));
        assert!(selector.is_enabled());
    }

    #[test]
    fn test_drag_forwards_selection() {
        let mut selector = RangeSelector::new();
        let target = layer();
        let x = Column::continuous("a", vec![1.0, 2.0, 3.0]);

        assert!(selector.on_drag_region(1.5, 2.5, Some(&x), Some(&target)).is_none());
        assert!(target.selected_rows().is_empty());

        selector.set_enabled(true, PlotMode::Series);
        let rows = selector.on_drag_region(2.5, 1.5, Some(&x), Some(&target));
        assert_eq!(rows, Some(BTreeSet::from([1])));
        assert_eq!(target.selected_rows(), BTreeSet::from([1]));
        assert_eq!(selector.region(), Some((1.5, 2.5)));

        selector.on_drag_cleared(Some(&target));
        assert!(target.selected_rows().is_empty());
        assert_eq!(selector.region(), None);
    }

    #[test]
    fn test_unbound_drag_is_silent() {
        let mut selector = RangeSelector::new();
        selector.set_enabled(true, PlotMode::Series);
        let x = Column::continuous("a", vec![1.0]);

        assert!(selector.on_drag_region(0.0, 2.0, Some(&x), None).is_none());
        assert!(selector.on_drag_region(0.0, 2.0, None, Some(&layer())).is_none());
        selector.on_drag_cleared(None);
    }

    #[test]
    fn test_discard_region_keeps_selection_enabled() {
        let mut selector = RangeSelector::new();
        let aborts = Arc::new(Mutex::new(0));
        let counter = aborts.clone();
        selector.aborted().subscribe(move |_| *counter.lock() += 1);

        assert!(!selector.discard_region());
        selector.set_enabled(true, PlotMode::Series);
        let x = Column::continuous("a", vec![1.0, 2.0]);
        selector.on_drag_region(0.0, 1.0, Some(&x), Some(&layer()));

        assert!(selector.discard_region());
        assert!(selector.is_enabled());
        assert_eq!(selector.region(), None);
        assert_eq!(*aborts.lock(), 1);
    }

    #[test]
    fn test_disable_with_region_aborts() {
        let mut selector = RangeSelector::new();
        let aborts = Arc::new(Mutex::new(0));
        let counter = aborts.clone();
        selector.aborted().subscribe(move |_| *counter.lock() += 1);

        selector.set_enabled(true, PlotMode::Series);
        selector.set_enabled(false, PlotMode::Series);
        assert_eq!(*aborts.lock(), 0);

        selector.set_enabled(true, PlotMode::Series);
        let x = Column::continuous("a", vec![1.0, 2.0]);
        selector.on_drag_region(0.0, 1.0, Some(&x), Some(&layer()));
        selector.set_enabled(false, PlotMode::Series);

        assert_eq!(*aborts.lock(), 1);
        assert_eq!(selector.region(), None);
    }
}
