//! # Tensor Store
//!
//! Process-wide mapping from tensor name to [`Tensor`], shared by every tool
//! through a cloneable handle.
//!
//! ## Semantics
//!
//! - Reads are copy-out: `get` returns an owned tensor, so a caller holding a
//!   result is unaffected by later overwrites or deletes.
//! - Writes validate fully before taking the write lock; a rejected request
//!   leaves the store exactly as it was.
//! - Names are kept in a `BTreeMap`, so listings are lexicographically
//!   ordered and identical across repeated calls on the same state.
//!
//! The lock is `parking_lot::RwLock`, never held across `.await`, and
//! non-poisoning: a panicking writer cannot wedge the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::TensorError;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// Thread-safe, cloneable handle to the named tensor registry.
#[derive(Debug, Clone, Default)]
pub struct TensorStore {
    tensors: Arc<RwLock<BTreeMap<String, Tensor>>>,
}

impl TensorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `shape`/`values` and store the tensor under `name`,
    /// overwriting any tensor already stored there.
    pub fn put(&self, name: &str, shape: &[i64], values: Vec<f64>) -> Result<Tensor, TensorError> {
        validate_name(name)?;
        let shape = Shape::new(shape)?;
        let tensor = Tensor::from_flat(shape, values)?;
        self.insert(name, tensor.clone())?;
        Ok(tensor)
    }

    /// Store an already-constructed tensor (typically a computed result).
    pub fn insert(&self, name: &str, tensor: Tensor) -> Result<(), TensorError> {
        validate_name(name)?;
        tracing::debug!(tensor = name, shape = %tensor.shape(), "storing tensor");
        self.tensors.write().insert(name.to_string(), tensor);
        Ok(())
    }

    /// Copy out the tensor stored under `name`.
    pub fn get(&self, name: &str) -> Result<Tensor, TensorError> {
        self.tensors
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TensorError::NotFound(name.to_string()))
    }

    /// Copy out several tensors under a single read lock.
    ///
    /// Either every name resolves or the first missing one is reported.
    pub fn get_many(&self, names: &[&str]) -> Result<Vec<Tensor>, TensorError> {
        let guard = self.tensors.read();
        names
            .iter()
            .map(|name| {
                guard
                    .get(*name)
                    .cloned()
                    .ok_or_else(|| TensorError::NotFound((*name).to_string()))
            })
            .collect()
    }

    /// All stored names in ascending order.
    pub fn list_names(&self) -> Vec<String> {
        self.tensors.read().keys().cloned().collect()
    }

    /// Remove the tensor stored under `name`.
    pub fn delete(&self, name: &str) -> Result<(), TensorError> {
        match self.tensors.write().remove(name) {
            Some(_) => {
                tracing::debug!(tensor = name, "deleted tensor");
                Ok(())
            }
            None => Err(TensorError::NotFound(name.to_string())),
        }
    }

    /// Whether a tensor is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.tensors.read().contains_key(name)
    }

    /// Number of stored tensors.
    pub fn len(&self) -> usize {
        self.tensors.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_name(name: &str) -> Result<(), TensorError> {
    if name.is_empty() || name.contains(['\n', '\r']) {
        return Err(TensorError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn put_then_get_roundtrip() {
        let store = TensorStore::new();
        store
            .put("m", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let t = store.get("m").unwrap();
        assert_eq!(t.dims(), vec![2, 3]);
        assert_eq!(t.values(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn put_mismatch_leaves_store_untouched() {
        let store = TensorStore::new();
        let err = store.put("bad", &[2, 2], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(!store.contains("bad"));
        assert!(store.list_names().is_empty());
    }

    #[test]
    fn put_mismatch_keeps_previous_value() {
        let store = TensorStore::new();
        store.put("v", &[2], vec![1.0, 2.0]).unwrap();
        store.put("v", &[3], vec![1.0]).unwrap_err();
        assert_eq!(store.get("v").unwrap().values(), vec![1.0, 2.0]);
    }

    #[test]
    fn put_invalid_shape_checked_before_count() {
        let store = TensorStore::new();
        let err = store.put("z", &[0, 2], vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);
    }

    #[test]
    fn put_overwrites_existing_name() {
        let store = TensorStore::new();
        store.put("v", &[2], vec![1.0, 2.0]).unwrap();
        store.put("v", &[1, 3], vec![7.0, 8.0, 9.0]).unwrap();
        let t = store.get("v").unwrap();
        assert_eq!(t.dims(), vec![1, 3]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rejects_names_that_break_listing() {
        let store = TensorStore::new();
        for name in ["", "a\nb", "c\r"] {
            let err = store.put(name, &[1], vec![0.0]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = TensorStore::new();
        assert_eq!(store.get("nope").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn get_many_reports_first_missing() {
        let store = TensorStore::new();
        store.put("a", &[1], vec![1.0]).unwrap();
        let err = store.get_many(&["a", "b", "c"]).unwrap_err();
        assert_eq!(err, TensorError::NotFound("b".into()));
    }

    #[test]
    fn reads_are_copies() {
        let store = TensorStore::new();
        store.put("a", &[1], vec![1.0]).unwrap();
        let held = store.get("a").unwrap();
        store.delete("a").unwrap();
        store.put("a", &[1], vec![9.0]).unwrap();
        assert_eq!(held.values(), vec![1.0]);
    }

    #[test]
    fn delete_removes_and_second_delete_fails() {
        let store = TensorStore::new();
        store.put("a", &[1], vec![1.0]).unwrap();
        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(store.delete("a").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn clones_share_state() {
        let store = TensorStore::new();
        let handle = store.clone();
        handle.put("shared", &[1], vec![3.0]).unwrap();
        assert!(store.contains("shared"));
    }

    #[test]
    fn list_names_is_sorted() {
        let store = TensorStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store.put(name, &[1], vec![0.0]).unwrap();
        }
        assert_eq!(store.list_names(), vec!["alpha", "mid", "zeta"]);
    }

    fn shape_and_values() -> impl Strategy<Value = (Vec<i64>, Vec<f64>)> {
        prop::collection::vec(1i64..5, 1..4).prop_flat_map(|dims| {
            let count = dims.iter().product::<i64>() as usize;
            (Just(dims), prop::collection::vec(-1.0e6f64..1.0e6, count))
        })
    }

    proptest! {
        /// Stored values come back unchanged in the requested shape.
        #[test]
        fn put_get_preserves_shape_and_values((dims, values) in shape_and_values()) {
            let store = TensorStore::new();
            store.put("t", &dims, values.clone()).unwrap();
            let t = store.get("t").unwrap();
            let expected: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
            prop_assert_eq!(t.dims(), expected);
            prop_assert_eq!(t.values(), values);
        }

        /// A wrong value count is always rejected without inserting.
        #[test]
        fn wrong_count_never_inserts(
            (dims, mut values) in shape_and_values(),
            extra in 1usize..4,
        ) {
            let store = TensorStore::new();
            values.extend(std::iter::repeat(0.0).take(extra));
            let err = store.put("t", &dims, values).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
            prop_assert!(store.is_empty());
        }

        /// Listing always equals the set of live names, without duplicates.
        #[test]
        fn listing_matches_live_names(
            ops in prop::collection::vec((0u8..6, any::<bool>()), 0..40),
        ) {
            let store = TensorStore::new();
            let mut live = std::collections::BTreeSet::new();
            for (id, insert) in ops {
                let name = format!("t{id}");
                if insert {
                    store.put(&name, &[1], vec![f64::from(id)]).unwrap();
                    live.insert(name);
                } else {
                    let removed = store.delete(&name).is_ok();
                    prop_assert_eq!(removed, live.remove(&name));
                }
            }
            let listed = store.list_names();
            prop_assert_eq!(listed.clone(), store.list_names());
            prop_assert_eq!(listed, live.into_iter().collect::<Vec<_>>());
        }
    }
}
