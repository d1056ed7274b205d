//! Property plotter engine
//!
//! Keeps a layer's attribute table, the user's axis and series choices and
//! the primitives on a render surface consistent with each other:
//!
//! - [`SourceBinding`] follows the selected layer of a [`pp_data::LayerList`]
//! - [`AxisSeriesModel`] owns the x column and the y-series slots
//! - [`RenderReconciler`] turns model events into primitive edits
//! - [`RangeSelector`] maps a dragged x-interval back to row selections
//!
//! [`PropertyPlotter`] wires the four together.

pub mod aggregate;
mod binding;
mod model;
mod plotter;
mod range_selector;
mod reconciler;

pub use binding::{SourceBinding, SourceError};
pub use model::{
    valid_styles, AxisSeriesModel, ModelError, ModelEvent, PlotMode, SeriesSlot, SeriesStyle,
    SeriesUpdate, SlotId,
};
pub use plotter::PropertyPlotter;
pub use range_selector::{rows_in_range, RangeSelector};
pub use reconciler::RenderReconciler;
