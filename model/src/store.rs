use std::collections::BTreeMap;

use anyhow::Result;

use crate::{Feature, Layer, LayerName};

/// Where a layer's records come from: a file on disk, an HTTP resource, a
/// test stub.
pub trait LayerSource {
    fn fetch(&self, name: LayerName) -> Result<Vec<Feature>>;
}

/// Session cache of fetched layers. Each layer is fetched at most once; a
/// failed fetch leaves the layer absent, so the next request retries instead
/// of pinning the dashboard to an empty layer for the whole session.
pub struct LayerStore {
    layers: BTreeMap<LayerName, Layer>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
        }
    }

    pub fn is_loaded(&self, name: LayerName) -> bool {
        self.layers.contains_key(&name)
    }

    pub fn get(&self, name: LayerName) -> Option<&Layer> {
        self.layers.get(&name)
    }

    pub fn insert(&mut self, name: LayerName, features: Vec<Feature>) -> &Layer {
        self.layers.insert(name, Layer { name, features });
        &self.layers[&name]
    }

    /// Fetch-once: the first call retrieves from the source, later calls
    /// return the cached layer even if the source would answer differently
    /// now.
    pub fn ensure_loaded(&mut self, source: &dyn LayerSource, name: LayerName) -> Result<&Layer> {
        if self.layers.contains_key(&name) {
            return Ok(&self.layers[&name]);
        }
        match source.fetch(name) {
            Ok(features) => {
                info!("Loaded {} features for {}", features.len(), name);
                Ok(self.insert(name, features))
            }
            Err(err) => {
                error!("Loading {name} failed: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::Result;

    use super::{LayerSource, LayerStore};
    use crate::{Feature, LayerName};

    struct CountingSource {
        fetches: RefCell<usize>,
        fail_first: bool,
    }

    impl LayerSource for CountingSource {
        fn fetch(&self, _: LayerName) -> Result<Vec<Feature>> {
            let mut fetches = self.fetches.borrow_mut();
            *fetches += 1;
            if self.fail_first && *fetches == 1 {
                bail!("resource unavailable");
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn fetches_at_most_once() {
        let source = CountingSource {
            fetches: RefCell::new(0),
            fail_first: false,
        };
        let mut store = LayerStore::new();
        store.ensure_loaded(&source, LayerName::Routes).unwrap();
        store.ensure_loaded(&source, LayerName::Routes).unwrap();
        assert_eq!(*source.fetches.borrow(), 1);
        assert!(store.is_loaded(LayerName::Routes));
    }

    #[test]
    fn failed_fetch_stays_unloaded_and_retries() {
        let source = CountingSource {
            fetches: RefCell::new(0),
            fail_first: true,
        };
        let mut store = LayerStore::new();
        assert!(store.ensure_loaded(&source, LayerName::Routes).is_err());
        assert!(!store.is_loaded(LayerName::Routes));

        store.ensure_loaded(&source, LayerName::Routes).unwrap();
        assert_eq!(*source.fetches.borrow(), 2);
    }
}
