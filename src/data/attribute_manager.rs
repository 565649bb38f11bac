//! Registry of attribute collections keyed by simplex dimension.
//!
//! Collections of arbitrary element types are stored type-erased; typed
//! access goes through an [`AttributeHandle<T>`] returned at registration,
//! which remembers the dimension and slot so no lookup by name is needed on
//! hot paths.

use crate::data::attribute::{AttributeCollection, AttributeValue};
use crate::mesh_error::MeshEditError;
use crate::topology::simplex::PrimitiveType;
use std::any::Any;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

const ALL_DIMS: [PrimitiveType; 4] = [
    PrimitiveType::Vertex,
    PrimitiveType::Edge,
    PrimitiveType::Face,
    PrimitiveType::Tetrahedron,
];

/// Typed key of one registered collection.
pub struct AttributeHandle<T> {
    dim: PrimitiveType,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttributeHandle<T> {
    /// Dimension of the simplices the values are attached to.
    #[inline]
    pub fn dim(&self) -> PrimitiveType {
        self.dim
    }
}

impl<T> Clone for AttributeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeHandle<T> {}

impl<T> PartialEq for AttributeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dim == other.dim && self.index == other.index
    }
}

impl<T> Eq for AttributeHandle<T> {}

impl<T> Debug for AttributeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeHandle")
            .field("dim", &self.dim)
            .field("index", &self.index)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Operations the manager applies to every collection regardless of type.
trait ErasedAttribute: Any + Send + Sync + Debug {
    fn len(&self) -> usize;
    fn resize(&mut self, n: usize);
    fn start_transaction(&mut self);
    fn rollback(&mut self);
    fn end_protect(&mut self);
    fn compact(&mut self, remap: &[Option<usize>], new_len: usize);
    fn clone_box(&self) -> Box<dyn ErasedAttribute>;
    /// Same element type and default, `len` default slots.
    fn empty_like(&self, len: usize) -> Box<dyn ErasedAttribute>;
    /// Copy `src[from]` into `self[to]` for every pair; `src` must have the
    /// same element type.
    fn copy_from(&mut self, src: &dyn ErasedAttribute, pairs: &[(usize, usize)]);
    fn eq_dyn(&self, other: &dyn ErasedAttribute) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: AttributeValue> ErasedAttribute for AttributeCollection<T> {
    fn len(&self) -> usize {
        AttributeCollection::len(self)
    }
    fn resize(&mut self, n: usize) {
        AttributeCollection::resize(self, n)
    }
    fn start_transaction(&mut self) {
        AttributeCollection::start_transaction(self)
    }
    fn rollback(&mut self) {
        AttributeCollection::rollback(self)
    }
    fn end_protect(&mut self) {
        AttributeCollection::end_protect(self)
    }
    fn compact(&mut self, remap: &[Option<usize>], new_len: usize) {
        AttributeCollection::compact(self, remap, new_len)
    }
    fn clone_box(&self) -> Box<dyn ErasedAttribute> {
        Box::new(self.clone())
    }
    fn empty_like(&self, len: usize) -> Box<dyn ErasedAttribute> {
        Box::new(AttributeCollection::<T>::new(len, self.default_value().clone()))
    }
    fn copy_from(&mut self, src: &dyn ErasedAttribute, pairs: &[(usize, usize)]) {
        let Some(src) = src.as_any().downcast_ref::<AttributeCollection<T>>() else {
            return;
        };
        for &(from, to) in pairs {
            if let (Some(v), Some(slot)) = (src.get(from), self.get_mut(to)) {
                *slot = v.clone();
            }
        }
    }
    fn eq_dyn(&self, other: &dyn ErasedAttribute) -> bool {
        other
            .as_any()
            .downcast_ref::<AttributeCollection<T>>()
            .is_some_and(|o| o == self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug)]
struct Entry {
    name: String,
    data: Box<dyn ErasedAttribute>,
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            data: self.data.clone_box(),
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data.eq_dyn(other.data.as_ref())
    }
}

/// All attribute collections of one mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeManager {
    per_dim: [Vec<Entry>; 4],
}

impl AttributeManager {
    /// Register a collection of `len` slots filled with `default`.
    pub fn register<T: AttributeValue>(
        &mut self,
        name: &str,
        dim: PrimitiveType,
        default: T,
        len: usize,
    ) -> Result<AttributeHandle<T>, MeshEditError> {
        let entries = &mut self.per_dim[dim.dimension()];
        if entries.iter().any(|e| e.name == name) {
            return Err(MeshEditError::DuplicateAttribute {
                name: name.to_owned(),
                dim,
            });
        }
        entries.push(Entry {
            name: name.to_owned(),
            data: Box::new(AttributeCollection::<T>::new(len, default)),
        });
        Ok(AttributeHandle {
            dim,
            index: entries.len() - 1,
            _marker: PhantomData,
        })
    }

    /// Look up a handle by name; `None` if absent or of another type.
    pub fn find<T: AttributeValue>(&self, name: &str, dim: PrimitiveType) -> Option<AttributeHandle<T>> {
        self.per_dim[dim.dimension()]
            .iter()
            .position(|e| e.name == name && e.data.as_any().is::<AttributeCollection<T>>())
            .map(|index| AttributeHandle {
                dim,
                index,
                _marker: PhantomData,
            })
    }

    /// Names registered on `dim`, in registration order.
    pub fn names(&self, dim: PrimitiveType) -> impl Iterator<Item = &str> + '_ {
        self.per_dim[dim.dimension()].iter().map(|e| e.name.as_str())
    }

    fn entry(&self, dim: PrimitiveType, index: usize) -> Result<&Entry, MeshEditError> {
        self.per_dim[dim.dimension()]
            .get(index)
            .ok_or(MeshEditError::UnknownAttribute { dim, index })
    }

    pub fn get<T: AttributeValue>(&self, h: &AttributeHandle<T>) -> Result<&AttributeCollection<T>, MeshEditError> {
        let e = self.entry(h.dim, h.index)?;
        e.data
            .as_any()
            .downcast_ref::<AttributeCollection<T>>()
            .ok_or_else(|| MeshEditError::AttributeTypeMismatch { name: e.name.clone() })
    }

    pub fn get_mut<T: AttributeValue>(
        &mut self,
        h: &AttributeHandle<T>,
    ) -> Result<&mut AttributeCollection<T>, MeshEditError> {
        let (dim, index) = (h.dim, h.index);
        let e = self.per_dim[dim.dimension()]
            .get_mut(index)
            .ok_or(MeshEditError::UnknownAttribute { dim, index })?;
        let name = &e.name;
        e.data
            .as_any_mut()
            .downcast_mut::<AttributeCollection<T>>()
            .ok_or_else(|| MeshEditError::AttributeTypeMismatch { name: name.clone() })
    }

    /// Resize every collection on `dim` to `n` slots.
    pub fn resize_dim(&mut self, dim: PrimitiveType, n: usize) {
        for e in &mut self.per_dim[dim.dimension()] {
            if e.data.len() != n {
                e.data.resize(n);
            }
        }
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Entry> + '_ {
        self.per_dim.iter_mut().flatten()
    }

    /// Open a transaction on every collection.
    pub(crate) fn begin_protect(&mut self) {
        self.all_mut().for_each(|e| e.data.start_transaction());
    }

    pub(crate) fn rollback(&mut self) {
        self.all_mut().for_each(|e| e.data.rollback());
    }

    pub(crate) fn end_protect(&mut self) {
        self.all_mut().for_each(|e| e.data.end_protect());
    }

    /// Collections with the same names, types and order as `self`, each
    /// sized by `len_of` and filled with its default. Handles of `self`
    /// address the result.
    pub(crate) fn empty_like(&self, len_of: impl Fn(PrimitiveType) -> usize) -> Self {
        let mut out = Self::default();
        for dim in ALL_DIMS {
            out.per_dim[dim.dimension()] = self.per_dim[dim.dimension()]
                .iter()
                .map(|e| Entry {
                    name: e.name.clone(),
                    data: e.data.empty_like(len_of(dim)),
                })
                .collect();
        }
        out
    }

    /// Copy values slot-to-slot from `src`, which must have been built with
    /// [`empty_like`](Self::empty_like) from the same manager (or be it).
    pub(crate) fn copy_dim_from(&mut self, dim: PrimitiveType, src: &AttributeManager, pairs: &[(usize, usize)]) {
        let d = dim.dimension();
        for (dst, from) in self.per_dim[d].iter_mut().zip(&src.per_dim[d]) {
            dst.data.copy_from(from.data.as_ref(), pairs);
        }
    }

    pub(crate) fn compact_dim(&mut self, dim: PrimitiveType, remap: &[Option<usize>], new_len: usize) {
        for e in &mut self.per_dim[dim.dimension()] {
            e.data.compact(remap, new_len);
        }
    }
}
