//! Layers and the observable layer collection of the host viewer

use std::collections::BTreeSet;
use std::sync::Arc;
use parking_lot::RwLock;
use pp_core::Signal;

use crate::table::AttributeTable;
use crate::DataError;

/// A displayed data object carrying an optional attribute table and a
/// row-selection state
#[derive(Debug)]
pub struct Layer {
    name: String,
    table: RwLock<Option<Arc<AttributeTable>>>,
    selected_rows: RwLock<BTreeSet<usize>>,
    data_changed: Signal<()>,
}

impl Layer {
    /// Create a layer; layers without a table cannot be plotted
    pub fn new(name: impl Into<String>, table: Option<AttributeTable>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            table: RwLock::new(table.map(Arc::new)),
            selected_rows: RwLock::new(BTreeSet::new()),
            data_changed: Signal::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current table, if any
    pub fn table(&self) -> Option<Arc<AttributeTable>> {
        self.table.read().clone()
    }

    pub fn has_table(&self) -> bool {
        self.table.read().is_some()
    }

    /// Replace the layer's data wholesale and notify observers. Observers
    /// are notified even when the new table has the same columns.
    pub fn set_table(&self, table: Option<AttributeTable>) {
        *self.table.write() = table.map(Arc::new);
        self.data_changed.emit(&());
    }

    /// Fired after every [`Layer::set_table`]
    pub fn data_changed(&self) -> &Signal<()> {
        &self.data_changed
    }

    pub fn selected_rows(&self) -> BTreeSet<usize> {
        self.selected_rows.read().clone()
    }

    pub fn set_selected_rows(&self, rows: BTreeSet<usize>) {
        tracing::debug!("Layer '{}' selection set to {} rows", self.name, rows.len());
        *self.selected_rows.write() = rows;
    }
}

/// Ordered collection of uniquely named layers with insert/remove events
#[derive(Debug, Default)]
pub struct LayerList {
    layers: RwLock<Vec<Arc<Layer>>>,
    inserted: Signal<Arc<Layer>>,
    removed: Signal<Arc<Layer>>,
}

impl LayerList {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Append a layer; names must be unique
    pub fn insert(&self, layer: Arc<Layer>) -> Result<(), DataError> {
        {
            let mut layers = self.layers.write();
            if layers.iter().any(|l| l.name() == layer.name()) {
                return Err(DataError::DuplicateLayer(layer.name().to_string()));
            }
            layers.push(layer.clone());
        }
        self.inserted.emit(&layer);
        Ok(())
    }

    /// Remove a layer by name, returning it if it existed
    pub fn remove(&self, name: &str) -> Option<Arc<Layer>> {
        let layer = {
            let mut layers = self.layers.write();
            let position = layers.iter().position(|l| l.name() == name)?;
            layers.remove(position)
        };
        self.removed.emit(&layer);
        Some(layer)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Layer>> {
        self.layers.read().iter().find(|l| l.name() == name).cloned()
    }

    /// Snapshot of the layers in collection order
    pub fn layers(&self) -> Vec<Arc<Layer>> {
        self.layers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }

    pub fn inserted(&self) -> &Signal<Arc<Layer>> {
        &self.inserted
    }

    pub fn removed(&self) -> &Signal<Arc<Layer>> {
        &self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn table() -> AttributeTable {
        AttributeTable::builder()
            .continuous("a", vec![1.0, 2.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_table_notifies() {
        let layer = Layer::new("points", Some(table()));
        let hits = Arc::new(Mutex::new(0));

        let counter = hits.clone();
        layer.data_changed().subscribe(move |_| *counter.lock() += 1);
        layer.set_table(Some(table()));
        layer.set_table(None);

        assert_eq!(*hits.lock(), 2);
        assert!(!layer.has_table());
    }

    #[test]
    fn test_insert_and_remove_emit_layers() {
        let list = LayerList::new();
        let names = Arc::new(Mutex::new(Vec::new()));

        let inserted = names.clone();
        list.inserted().subscribe(move |l: &Arc<Layer>| inserted.lock().push(format!("+{}", l.name())));
        let removed = names.clone();
        list.removed().subscribe(move |l: &Arc<Layer>| removed.lock().push(format!("-{}", l.name())));

        list.insert(Layer::new("points", Some(table()))).unwrap();
        list.insert(Layer::new("image", None)).unwrap();
        assert!(matches!(
            list.insert(Layer::new("points", None)),
            Err(DataError::DuplicateLayer(_))
        ));
        assert!(list.remove("points").is_some());
        assert!(list.remove("missing").is_none());

        assert_eq!(*names.lock(), vec!["+points", "+image", "-points"]);
        assert_eq!(list.len(), 1);
    }
}
