//! Axis/series model: which column is x, which columns are plotted as
//! y-series, and how each series is drawn.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use pp_core::{MarkerSymbol, Palette, PlotterSettings, Rgb, Signal};
use pp_data::{AttributeTable, Column, ColumnKind, INDEX_COLUMN};

/// Errors reported by model operations. The model is unchanged after any
/// of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Column '{0}' is not in the current table")]
    InvalidColumn(String),

    #[error("Series slot {position} is out of range ({len} slots)")]
    OutOfRange { position: usize, len: usize },

    #[error("Style {style:?} is not valid for {kind:?} column '{column}'")]
    IncompatibleStyle {
        column: String,
        kind: ColumnKind,
        style: SeriesStyle,
    },

    #[error("Cannot add a series: {0}")]
    NoCapacity(&'static str),
}

/// How a y-series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesStyle {
    Scatter,
    Line,
    Bar,
}

impl SeriesStyle {
    pub fn label(&self) -> &'static str {
        match self {
            SeriesStyle::Scatter => "scatter",
            SeriesStyle::Line => "line",
            SeriesStyle::Bar => "bar",
        }
    }
}

const CONTINUOUS_STYLES: &[SeriesStyle] = &[SeriesStyle::Scatter, SeriesStyle::Line, SeriesStyle::Bar];
const CATEGORICAL_STYLES: &[SeriesStyle] = &[SeriesStyle::Bar];

/// Styles a column of the given kind may use; the first one is the default
pub fn valid_styles(kind: ColumnKind) -> &'static [SeriesStyle] {
    match kind {
        ColumnKind::Continuous => CONTINUOUS_STYLES,
        ColumnKind::Categorical => CATEGORICAL_STYLES,
    }
}

/// What the plot shows, derived from the x column and the series count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// No table bound
    Empty,
    /// Bar-of-counts over the distinct values of a categorical x
    AggregateCategorical,
    /// Binned histogram of a continuous x with no series
    AggregateContinuous,
    /// One primitive per series against a continuous x
    Series,
}

/// Stable identity of a series row, unaffected by removals of other rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

/// One configured y-series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSlot {
    pub id: SlotId,
    pub column: String,
    pub style: SeriesStyle,
    /// Position of `column` in the table; selects color and symbol
    pub identity: usize,
    pub color: Rgb,
    pub symbol: MarkerSymbol,
}

/// Everything a renderer needs to (re)draw one series
#[derive(Debug, Clone)]
pub struct SeriesUpdate {
    pub position: usize,
    pub slot: SlotId,
    pub x: Arc<Column>,
    pub y: Arc<Column>,
    pub style: SeriesStyle,
    pub color: Rgb,
    pub symbol: MarkerSymbol,
}

/// Notifications published by [`AxisSeriesModel`].
///
/// Positions refer to the series list at the moment the event is emitted.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    /// Every series was dropped; any drawn state is stale
    Reset,
    /// The x column changed or its data was replaced; `None` when unbound
    XChanged(Option<Arc<Column>>),
    /// The series at `position` was added or must be redrawn
    SeriesChanged(SeriesUpdate),
    /// The series at `position` is gone; later series shift down by one
    SeriesRemoved { position: usize },
}

/// Holds the current table, the x assignment and the series slots
pub struct AxisSeriesModel {
    table: Option<Arc<AttributeTable>>,
    x: Option<String>,
    slots: Vec<SeriesSlot>,
    next_slot: u64,
    palette: Palette,
    max_series: Option<usize>,
    events: Signal<ModelEvent>,
}

impl AxisSeriesModel {
    pub fn new(settings: &PlotterSettings) -> Self {
        Self {
            table: None,
            x: None,
            slots: Vec::new(),
            next_slot: 0,
            palette: settings.palette.clone(),
            max_series: settings.max_series,
            events: Signal::new(),
        }
    }

    /// Where model events are published
    pub fn events(&self) -> &Signal<ModelEvent> {
        &self.events
    }

    pub fn table(&self) -> Option<&Arc<AttributeTable>> {
        self.table.as_ref()
    }

    /// Every column of the current table, each a valid x choice
    pub fn columns(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|t| t.column_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn current_x(&self) -> Option<&str> {
        self.x.as_deref()
    }

    pub fn x_column(&self) -> Option<&Arc<Column>> {
        let table = self.table.as_ref()?;
        table.column(self.x.as_deref()?)
    }

    pub fn x_kind(&self) -> Option<ColumnKind> {
        self.x_column().map(|c| c.kind())
    }

    pub fn series(&self) -> &[SeriesSlot] {
        &self.slots
    }

    pub fn plot_mode(&self) -> PlotMode {
        match self.x_kind() {
            None => PlotMode::Empty,
            Some(ColumnKind::Categorical) => PlotMode::AggregateCategorical,
            Some(ColumnKind::Continuous) if self.slots.is_empty() => PlotMode::AggregateContinuous,
            Some(ColumnKind::Continuous) => PlotMode::Series,
        }
    }

    /// Styles available to a series plotting `column`
    pub fn valid_styles(&self, column: &str) -> Result<&'static [SeriesStyle], ModelError> {
        Ok(valid_styles(self.column(column)?.kind()))
    }

    /// Replace the table wholesale.
    ///
    /// The x selection survives when its column still exists, otherwise it
    /// falls back to the index column. Series whose column vanished are
    /// dropped, as are all series when x is now categorical; the rest get
    /// their style revalidated. Emits `XChanged`, then `SeriesChanged` for
    /// each survivor, then `SeriesRemoved` for each dropped slot from the
    /// tail down.
    pub fn set_table(&mut self, table: Option<Arc<AttributeTable>>) {
        let previous = self.slots.len();
        self.table = table;

        let Some(table) = self.table.clone() else {
            info!("Attribute table cleared, dropping {} series", previous);
            self.x = None;
            self.slots.clear();
            self.events.emit(&ModelEvent::XChanged(None));
            for position in (0..previous).rev() {
                self.events.emit(&ModelEvent::SeriesRemoved { position });
            }
            return;
        };

        let x = match self.x.take() {
            Some(name) if table.contains(&name) => name,
            _ => INDEX_COLUMN.to_string(),
        };
        let x_column = table.column(&x).cloned();
        let x_categorical = table.kind(&x) == Some(ColumnKind::Categorical);
        self.x = Some(x);

        let palette = &self.palette;
        let survivors: Vec<SeriesSlot> = std::mem::take(&mut self.slots)
            .into_iter()
            .filter(|_| !x_categorical)
            .filter_map(|mut slot| {
                let kind = table.kind(&slot.column)?;
                let identity = table.position(&slot.column)?;
                if !valid_styles(kind).contains(&slot.style) {
                    slot.style = valid_styles(kind)[0];
                }
                slot.identity = identity;
                slot.color = palette.color(identity);
                slot.symbol = palette.symbol(identity);
                Some(slot)
            })
            .collect();
        self.slots = survivors;

        info!(
            "Attribute table replaced: {} columns, {} rows, x = '{}', {} of {} series kept",
            table.num_columns(),
            table.num_rows(),
            self.x.as_deref().unwrap_or_default(),
            self.slots.len(),
            previous
        );

        self.events.emit(&ModelEvent::XChanged(x_column));
        for position in 0..self.slots.len() {
            self.emit_series_changed(position);
        }
        for position in (self.slots.len()..previous).rev() {
            self.events.emit(&ModelEvent::SeriesRemoved { position });
        }
    }

    /// Choose the x column. Switching between a continuous and a
    /// categorical column drops every series and emits `Reset` first.
    pub fn set_x(&mut self, name: &str) -> Result<(), ModelError> {
        let column = self.column(name)?.clone();
        if self.x.as_deref() == Some(name) {
            return Ok(());
        }

        let kind_changed = self.x_kind() != Some(column.kind());
        self.x = Some(name.to_string());
        debug!("x set to '{}' ({:?})", name, column.kind());

        if kind_changed {
            self.slots.clear();
            self.events.emit(&ModelEvent::Reset);
            self.events.emit(&ModelEvent::XChanged(Some(column)));
        } else {
            self.events.emit(&ModelEvent::XChanged(Some(column)));
            for position in 0..self.slots.len() {
                self.emit_series_changed(position);
            }
        }
        Ok(())
    }

    /// Append a series plotting `name`; returns its position
    pub fn add_series(&mut self, name: &str) -> Result<usize, ModelError> {
        let column = self.column(name)?;
        let kind = column.kind();

        if self.x_kind() == Some(ColumnKind::Categorical) {
            return Err(ModelError::NoCapacity("a categorical x-axis shows counts only"));
        }
        if let Some(max) = self.max_series {
            if self.slots.len() >= max {
                return Err(ModelError::NoCapacity("series limit reached"));
            }
        }

        let identity = self.identity_of(name)?;
        let slot = SeriesSlot {
            id: SlotId(self.next_slot),
            column: name.to_string(),
            style: valid_styles(kind)[0],
            identity,
            color: self.palette.color(identity),
            symbol: self.palette.symbol(identity),
        };
        self.next_slot += 1;
        self.slots.push(slot);

        let position = self.slots.len() - 1;
        debug!("Series '{}' added at position {}", name, position);
        self.emit_series_changed(position);
        Ok(position)
    }

    /// Remove the series at `position`; later series keep their colors
    pub fn remove_series(&mut self, position: usize) -> Result<(), ModelError> {
        self.check_position(position)?;
        let slot = self.slots.remove(position);
        debug!("Series '{}' removed from position {}", slot.column, position);
        self.events.emit(&ModelEvent::SeriesRemoved { position });
        Ok(())
    }

    pub fn set_series_style(&mut self, position: usize, style: SeriesStyle) -> Result<(), ModelError> {
        self.check_position(position)?;
        let column = self.slots[position].column.clone();
        let kind = self.column(&column)?.kind();
        if !valid_styles(kind).contains(&style) {
            return Err(ModelError::IncompatibleStyle { column, kind, style });
        }

        self.slots[position].style = style;
        self.emit_series_changed(position);
        Ok(())
    }

    /// Point an existing series at another column. Identity, color and
    /// symbol follow the new column; the style is kept when still valid.
    pub fn set_series_column(&mut self, position: usize, name: &str) -> Result<(), ModelError> {
        self.check_position(position)?;
        let kind = self.column(name)?.kind();
        let identity = self.identity_of(name)?;

        let slot = &mut self.slots[position];
        slot.column = name.to_string();
        slot.identity = identity;
        slot.color = self.palette.color(identity);
        slot.symbol = self.palette.symbol(identity);
        if !valid_styles(kind).contains(&slot.style) {
            slot.style = valid_styles(kind)[0];
        }

        self.emit_series_changed(position);
        Ok(())
    }

    fn column(&self, name: &str) -> Result<&Arc<Column>, ModelError> {
        self.table
            .as_ref()
            .and_then(|t| t.column(name))
            .ok_or_else(|| ModelError::InvalidColumn(name.to_string()))
    }

    fn identity_of(&self, name: &str) -> Result<usize, ModelError> {
        self.table
            .as_ref()
            .and_then(|t| t.position(name))
            .ok_or_else(|| ModelError::InvalidColumn(name.to_string()))
    }

    fn check_position(&self, position: usize) -> Result<(), ModelError> {
        if position >= self.slots.len() {
            return Err(ModelError::OutOfRange {
                position,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    fn emit_series_changed(&self, position: usize) {
        let Some(update) = self.series_update(position) else {
            return;
        };
        self.events.emit(&ModelEvent::SeriesChanged(update));
    }

    fn series_update(&self, position: usize) -> Option<SeriesUpdate> {
        let slot = self.slots.get(position)?;
        let table = self.table.as_ref()?;
        Some(SeriesUpdate {
            position,
            slot: slot.id,
            x: self.x_column()?.clone(),
            y: table.column(&slot.column)?.clone(),
            style: slot.style,
            color: slot.color,
            symbol: slot.symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn scenario_table() -> Arc<AttributeTable> {
        Arc::new(
            AttributeTable::builder()
                .continuous("a", vec![1.0, 2.0, 3.0])
                .categorical("b", ["x", "y", "x"])
                .continuous("c", vec![0.5, 0.25, 0.125])
                .build()
                .unwrap(),
        )
    }

    /// Model plus a log of compact event descriptions
    fn recorded_model() -> (AxisSeriesModel, Arc<Mutex<Vec<String>>>) {
        let model = AxisSeriesModel::new(&PlotterSettings::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        model.events().subscribe(move |event: &ModelEvent| {
            let entry = match event {
                ModelEvent::Reset => "reset".to_string(),
                ModelEvent::XChanged(Some(x)) => format!("x:{}", x.name()),
                ModelEvent::XChanged(None) => "x:-".to_string(),
                ModelEvent::SeriesChanged(u) => format!("changed:{}:{}", u.position, u.y.name()),
                ModelEvent::SeriesRemoved { position } => format!("removed:{}", position),
            };
            sink.lock().push(entry);
        });
        (model, log)
    }

    #[test]
    fn test_set_table_defaults_x_to_index() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));

        assert_eq!(model.current_x(), Some(INDEX_COLUMN));
        assert_eq!(model.columns(), vec!["index", "a", "b", "c"]);
        assert_eq!(model.plot_mode(), PlotMode::AggregateContinuous);
        assert_eq!(*log.lock(), vec!["x:index"]);
    }

    #[test]
    fn test_set_x_to_every_column() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));

        for column in model.columns() {
            model.set_x(&column).unwrap();
            assert_eq!(model.current_x(), Some(column.as_str()));
        }
    }

    #[test]
    fn test_set_x_unknown_column_fails() {
        let (mut model, log) = recorded_model();
        assert_eq!(model.set_x("a"), Err(ModelError::InvalidColumn("a".to_string())));

        model.set_table(Some(scenario_table()));
        assert!(matches!(model.set_x("zzz"), Err(ModelError::InvalidColumn(_))));
        assert_eq!(model.current_x(), Some(INDEX_COLUMN));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_set_x_same_value_is_silent() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.set_x("a").unwrap();
        model.set_x("a").unwrap();

        assert_eq!(*log.lock(), vec!["x:index", "x:a"]);
    }

    #[test]
    fn test_same_kind_x_change_redraws_series() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("c").unwrap();
        log.lock().clear();

        model.set_x("a").unwrap();
        assert_eq!(*log.lock(), vec!["x:a", "changed:0:c"]);
        assert_eq!(model.series().len(), 1);
    }

    #[test]
    fn test_categorical_x_clears_series_with_reset_first() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.set_x("a").unwrap();
        model.add_series("c").unwrap();
        log.lock().clear();

        model.set_x("b").unwrap();
        assert_eq!(*log.lock(), vec!["reset", "x:b"]);
        assert!(model.series().is_empty());
        assert_eq!(model.plot_mode(), PlotMode::AggregateCategorical);
    }

    #[test]
    fn test_add_series_blocked_on_categorical_x() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.set_x("b").unwrap();

        assert!(matches!(model.add_series("a"), Err(ModelError::NoCapacity(_))));
        assert!(model.series().is_empty());
    }

    #[test]
    fn test_add_series_respects_limit() {
        let settings = PlotterSettings {
            max_series: Some(1),
            ..PlotterSettings::default()
        };
        let mut model = AxisSeriesModel::new(&settings);
        model.set_table(Some(scenario_table()));

        model.add_series("a").unwrap();
        assert!(matches!(model.add_series("c"), Err(ModelError::NoCapacity(_))));
    }

    #[test]
    fn test_add_series_defaults() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));
        let palette = Palette::default();

        assert_eq!(model.add_series("a"), Ok(0));
        assert_eq!(model.add_series("b"), Ok(1));

        let a = &model.series()[0];
        assert_eq!(a.style, SeriesStyle::Scatter);
        assert_eq!(a.identity, 1);
        assert_eq!(a.color, palette.color(1));
        assert_eq!(a.symbol, palette.symbol(1));

        let b = &model.series()[1];
        assert_eq!(b.style, SeriesStyle::Bar);
        assert_eq!(b.identity, 2);
        assert_eq!(model.valid_styles("b").unwrap(), &[SeriesStyle::Bar]);
        assert_eq!(model.plot_mode(), PlotMode::Series);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("a").unwrap();
        model.add_series("c").unwrap();
        let before = model.series().to_vec();

        let position = model.add_series("b").unwrap();
        model.remove_series(position).unwrap();
        assert_eq!(model.series(), &before[..]);

        model.remove_series(0).unwrap();
        assert_eq!(model.series()[0], before[1]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("a").unwrap();
        let before = model.series().to_vec();
        let events = log.lock().len();

        assert_eq!(
            model.remove_series(3),
            Err(ModelError::OutOfRange { position: 3, len: 1 })
        );
        assert_eq!(model.series(), &before[..]);
        assert_eq!(log.lock().len(), events);
    }

    #[test]
    fn test_incompatible_style_keeps_previous() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("b").unwrap();
        model.add_series("a").unwrap();

        assert!(matches!(
            model.set_series_style(0, SeriesStyle::Line),
            Err(ModelError::IncompatibleStyle { .. })
        ));
        assert_eq!(model.series()[0].style, SeriesStyle::Bar);

        model.set_series_style(1, SeriesStyle::Line).unwrap();
        assert_eq!(model.series()[1].style, SeriesStyle::Line);
    }

    #[test]
    fn test_set_series_column_updates_identity() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("a").unwrap();
        model.set_series_style(0, SeriesStyle::Line).unwrap();
        let id = model.series()[0].id;

        model.set_series_column(0, "b").unwrap();
        let slot = &model.series()[0];
        assert_eq!(slot.id, id);
        assert_eq!(slot.identity, 2);
        assert_eq!(slot.style, SeriesStyle::Bar);
        assert_eq!(log.lock().last().map(String::as_str), Some("changed:0:b"));
    }

    #[test]
    fn test_set_table_prunes_and_revalidates() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.set_x("a").unwrap();
        model.add_series("a").unwrap();
        model.add_series("b").unwrap();
        model.add_series("c").unwrap();
        model.set_series_style(0, SeriesStyle::Line).unwrap();
        log.lock().clear();

        // `b` disappears and `a` turns categorical
        let replacement = Arc::new(
            AttributeTable::builder()
                .continuous("c", vec![1.0, 2.0])
                .categorical("a", ["p", "q"])
                .build()
                .unwrap(),
        );
        model.set_table(Some(replacement));

        // x was `a`, which is now categorical: every series goes
        assert_eq!(model.current_x(), Some("a"));
        assert!(model.series().is_empty());
        assert_eq!(*log.lock(), vec!["x:a", "removed:2", "removed:1", "removed:0"]);
    }

    #[test]
    fn test_set_table_keeps_surviving_series_in_order() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("a").unwrap();
        model.add_series("b").unwrap();
        model.add_series("c").unwrap();
        model.set_series_style(0, SeriesStyle::Line).unwrap();
        log.lock().clear();

        let replacement = Arc::new(
            AttributeTable::builder()
                .continuous("c", vec![1.0, 2.0])
                .categorical("a", ["p", "q"])
                .build()
                .unwrap(),
        );
        model.set_table(Some(replacement));

        let columns: Vec<_> = model.series().iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "c"]);
        // `a` is categorical now, so line is no longer allowed
        assert_eq!(model.series()[0].style, SeriesStyle::Bar);
        assert_eq!(model.series()[0].identity, 2);
        assert_eq!(model.series()[1].identity, 1);
        assert_eq!(
            *log.lock(),
            vec!["x:index", "changed:0:a", "changed:1:c", "removed:2"]
        );
    }

    #[test]
    fn test_set_table_twice_is_stable() {
        let (mut model, _) = recorded_model();
        let table = scenario_table();
        model.set_table(Some(table.clone()));
        model.set_x("c").unwrap();
        model.add_series("a").unwrap();
        model.add_series("b").unwrap();

        model.set_table(Some(table.clone()));
        let once = (model.current_x().map(str::to_string), model.series().to_vec());
        model.set_table(Some(table));
        let twice = (model.current_x().map(str::to_string), model.series().to_vec());

        assert_eq!(once, twice);
        assert_eq!(once.1.len(), 2);
    }

    #[test]
    fn test_set_table_missing_x_falls_back_to_index() {
        let (mut model, _) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.set_x("a").unwrap();

        let replacement = Arc::new(
            AttributeTable::builder()
                .continuous("z", vec![1.0])
                .build()
                .unwrap(),
        );
        model.set_table(Some(replacement));
        assert_eq!(model.current_x(), Some(INDEX_COLUMN));
    }

    #[test]
    fn test_clearing_table_drops_everything() {
        let (mut model, log) = recorded_model();
        model.set_table(Some(scenario_table()));
        model.add_series("a").unwrap();
        model.add_series("c").unwrap();
        log.lock().clear();

        model.set_table(None);
        assert_eq!(model.current_x(), None);
        assert_eq!(model.plot_mode(), PlotMode::Empty);
        assert_eq!(*log.lock(), vec!["x:-", "removed:1", "removed:0"]);
        assert!(matches!(model.add_series("a"), Err(ModelError::InvalidColumn(_))));
    }

    #[test]
    fn test_style_labels() {
        let labels: Vec<_> = valid_styles(ColumnKind::Continuous).iter().map(SeriesStyle::label).collect();
        assert_eq!(labels, vec!["scatter", "line", "bar"]);
        assert_eq!(valid_styles(ColumnKind::Categorical), &[SeriesStyle::Bar]);
    }
}
