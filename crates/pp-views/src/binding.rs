//! Tracks which layer feeds the plotter and relays its data changes

use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use pp_core::{Signal, SubscriptionId};
use pp_data::{AttributeTable, Layer, LayerList};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("No layer named '{0}'")]
    UnknownLayer(String),

    #[error("Layer '{0}' has no attribute table")]
    NotSelectable(String),
}

#[derive(Default)]
struct BindingState {
    current: Option<Arc<Layer>>,
    data_subscription: Option<SubscriptionId>,
}

/// Binds the plotter to at most one layer of a [`LayerList`].
///
/// Holds exactly one `data_changed` subscription, on the selected layer.
/// Every change of selection or of the selected layer's data is published
/// through [`SourceBinding::table_replaced`].
pub struct SourceBinding {
    layers: Arc<LayerList>,
    state: Mutex<BindingState>,
    table_replaced: Signal<Option<Arc<AttributeTable>>>,
    list_subscriptions: [SubscriptionId; 2],
}

impl SourceBinding {
    /// Watch `layers` and select its first selectable layer, if any
    pub fn attach(layers: Arc<LayerList>) -> Arc<Self> {
        let binding = Arc::new_cyclic(|weak: &Weak<SourceBinding>| {
            let on_insert = weak.clone();
            let inserted = layers.inserted().subscribe(move |layer: &Arc<Layer>| {
                if let Some(binding) = on_insert.upgrade() {
                    binding.layer_inserted(layer);
                }
            });

            let on_remove = weak.clone();
            let removed = layers.removed().subscribe(move |layer: &Arc<Layer>| {
                if let Some(binding) = on_remove.upgrade() {
                    binding.layer_removed(layer);
                }
            });

            SourceBinding {
                layers: layers.clone(),
                state: Mutex::new(BindingState::default()),
                table_replaced: Signal::new(),
                list_subscriptions: [inserted, removed],
            }
        });

        let first = binding.layers.layers().into_iter().find(|l| l.has_table());
        if first.is_some() {
            binding.bind(first);
        }
        binding
    }

    /// Bind to the named layer
    pub fn select(&self, name: &str) -> Result<(), SourceError> {
        let layer = self
            .layers
            .get(name)
            .ok_or_else(|| SourceError::UnknownLayer(name.to_string()))?;
        if !layer.has_table() {
            return Err(SourceError::NotSelectable(name.to_string()));
        }
        self.bind(Some(layer));
        Ok(())
    }

    /// Unbind from the current layer
    pub fn clear_selection(&self) {
        self.bind(None);
    }

    pub fn current_layer(&self) -> Option<Arc<Layer>> {
        self.state.lock().current.clone()
    }

    pub fn current_table(&self) -> Option<Arc<AttributeTable>> {
        self.current_layer().and_then(|layer| layer.table())
    }

    /// Names of the layers that carry a table, in collection order
    pub fn selectable_names(&self) -> Vec<String> {
        self.layers
            .layers()
            .iter()
            .filter(|l| l.has_table())
            .map(|l| l.name().to_string())
            .collect()
    }

    pub fn table_replaced(&self) -> &Signal<Option<Arc<AttributeTable>>> {
        &self.table_replaced
    }

    fn layer_inserted(&self, layer: &Arc<Layer>) {
        if layer.has_table() && self.current_layer().is_none() {
            self.bind(Some(layer.clone()));
        }
    }

    fn layer_removed(&self, layer: &Arc<Layer>) {
        let is_current = self
            .current_layer()
            .map(|current| Arc::ptr_eq(&current, layer))
            .unwrap_or(false);
        if is_current {
            info!("Bound layer '{}' was removed", layer.name());
            self.bind(None);
        }
    }

    fn bind(&self, layer: Option<Arc<Layer>>) {
        {
            let mut state = self.state.lock();
            if let (Some(previous), Some(id)) = (state.current.take(), state.data_subscription.take()) {
                previous.data_changed().unsubscribe(id);
            }

            state.data_subscription = layer.as_ref().map(|layer| {
                let source = Arc::downgrade(layer);
                let relay = self.table_replaced.clone();
                layer.data_changed().subscribe(move |_| {
                    if let Some(source) = source.upgrade() {
                        debug!("Data of layer '{}' replaced", source.name());
                        relay.emit(&source.table());
                    }
                })
            });
            state.current = layer.clone();
        }

        match &layer {
            Some(layer) => info!("Plotting layer '{}'", layer.name()),
            None => info!("No layer selected"),
        }
        self.table_replaced.emit(&layer.and_then(|l| l.table()));
    }
}

impl Drop for SourceBinding {
    fn drop(&mut self) {
        let [inserted, removed] = self.list_subscriptions;
        self.layers.inserted().unsubscribe(inserted);
        self.layers.removed().unsubscribe(removed);

        let state = self.state.get_mut();
        if let (Some(layer), Some(id)) = (state.current.take(), state.data_subscription.take()) {
            layer.data_changed().unsubscribe(id);
        }
    }
}
