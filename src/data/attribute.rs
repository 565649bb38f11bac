//! `AttributeCollection<T>`: per-simplex values with write-ahead rollback.
//!
//! A collection is a dense array indexed by simplex id. While a transaction is
//! open, the first write to any slot that existed at
//! [`begin_protect`](AttributeCollection::begin_protect) saves the slot's old
//! value. [`rollback`](AttributeCollection::rollback) puts those values back
//! and restores the original length, so an aborted edit leaves the collection
//! exactly as it was. Slots appended during the transaction have nothing to
//! save; they disappear with the length restore.

use crate::data::storage::{Storage, VecStorage};
use crate::mesh_error::MeshEditError;
use hashbrown::HashMap;
use std::fmt::Debug;
use std::ops::{Index, IndexMut};

/// Element types that can live in an attribute collection.
pub trait AttributeValue: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Debug + Send + Sync + 'static> AttributeValue for T {}

#[derive(Clone, Debug)]
struct Transaction<T> {
    len_at_begin: usize,
    saved: HashMap<usize, T>,
}

/// Dense, resizable attribute storage with a transaction log.
#[derive(Clone, Debug)]
pub struct AttributeCollection<T, St = VecStorage<T>>
where
    St: Storage<T>,
{
    data: St,
    default: T,
    transaction: Option<Transaction<T>>,
}

impl<T: PartialEq, St: Storage<T>> PartialEq for AttributeCollection<T, St> {
    fn eq(&self, other: &Self) -> bool {
        self.default == other.default && self.data.as_slice() == other.data.as_slice()
    }
}

impl<T: AttributeValue, St: Storage<T>> AttributeCollection<T, St> {
    /// A collection of `len` copies of `default`. Growth later fills with
    /// `default` as well.
    pub fn new(len: usize, default: T) -> Self {
        Self {
            data: St::with_len(len, default.clone()),
            default,
            transaction: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value used to fill newly created slots.
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.as_slice().get(i)
    }

    /// Mutable access to slot `i`; records the old value when a transaction
    /// is open.
    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        if i >= self.len() {
            return None;
        }
        self.record(i);
        self.data.as_mut_slice().get_mut(i)
    }

    /// Overwrite slot `i`.
    pub fn assign(&mut self, i: usize, value: T) -> Result<(), MeshEditError> {
        let len = self.len();
        let slot = self
            .get_mut(i)
            .ok_or(MeshEditError::AttributeIndexOutOfRange { index: i, len })?;
        *slot = value;
        Ok(())
    }

    /// Copy the value at `from` into `to`.
    pub fn move_value(&mut self, from: usize, to: usize) -> Result<(), MeshEditError> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(MeshEditError::AttributeIndexOutOfRange { index, len });
            }
        }
        self.record(to);
        self.data.copy_within(from, to);
        Ok(())
    }

    /// Grow (filling with the default) or shrink to `n` slots.
    pub fn resize(&mut self, n: usize) {
        if let Some(tx) = self.transaction.as_mut() {
            let keep = tx.len_at_begin.min(self.data.len());
            let slice = self.data.as_slice();
            for i in n..keep {
                tx.saved.entry(i).or_insert_with(|| slice[i].clone());
            }
        }
        self.data.resize(n, self.default.clone());
    }

    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.as_slice().iter()
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Open a transaction.
    pub fn begin_protect(&mut self) -> Result<(), MeshEditError> {
        if self.transaction.is_some() {
            return Err(MeshEditError::TransactionActive);
        }
        self.start_transaction();
        Ok(())
    }

    /// Open a transaction, discarding any log already open.
    pub(crate) fn start_transaction(&mut self) {
        self.transaction = Some(Transaction {
            len_at_begin: self.len(),
            saved: HashMap::new(),
        });
    }

    /// Undo every write since `begin_protect` and close the transaction.
    pub fn rollback(&mut self) {
        let Some(tx) = self.transaction.take() else {
            return;
        };
        self.data.resize(tx.len_at_begin, self.default.clone());
        let buf = self.data.as_mut_slice();
        for (i, v) in tx.saved {
            buf[i] = v;
        }
    }

    /// Keep every write and close the transaction.
    pub fn end_protect(&mut self) {
        self.transaction = None;
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.transaction.is_some()
    }

    fn record(&mut self, i: usize) {
        if let Some(tx) = self.transaction.as_mut() {
            if i < tx.len_at_begin && !tx.saved.contains_key(&i) {
                tx.saved.insert(i, self.data.as_slice()[i].clone());
            }
        }
    }

    /// Move every kept slot to its new index and shrink to `new_len`.
    ///
    /// `remap` must be monotone on its `Some` entries, which
    /// [`Connectivity::compact`](crate::topology::connectivity::Connectivity::compact)
    /// guarantees.
    pub(crate) fn compact(&mut self, remap: &[Option<usize>], new_len: usize) {
        let len = self.len();
        for (old, new) in remap.iter().enumerate() {
            if let Some(new) = *new {
                if old < len && new < len {
                    self.data.copy_within(old, new);
                }
            }
        }
        self.data.resize(new_len, self.default.clone());
    }
}

impl<T: AttributeValue, St: Storage<T>> Index<usize> for AttributeCollection<T, St> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.data.as_slice()[i]
    }
}

impl<T: AttributeValue, St: Storage<T>> IndexMut<usize> for AttributeCollection<T, St> {
    /// Records the old value when a transaction is open.
    fn index_mut(&mut self, i: usize) -> &mut T {
        self.record(i);
        &mut self.data.as_mut_slice()[i]
    }
}
