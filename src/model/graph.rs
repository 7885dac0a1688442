//! The type arena.
//!
//! Types form a graph with cycles, keyed by identity. Where the host
//! environment would use weak identity maps, this implementation assigns
//! every type a stable [`TypeId`] at adaptation time and stores the values
//! in an append-only arena. Per-compilation state then keys plain maps by
//! id and drops them when the compilation ends.
//!
//! Slots come in three states: `Ready` (filled), `Reserved` (being filled
//! eagerly; only observable from inside the adapter's own recursion), and
//! `Deferred` (lazy adaptation; hydrated through the installed [`Hydrate`]
//! hook on first access, O(1) afterwards). A deferred slot is
//! indistinguishable from an eager one to all downstream code.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::types::Type;

/// Stable identity of a type within one [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Slot {
    Ready(Rc<Type>),
    Reserved,
    Deferred,
}

/// Fills a deferred slot on first access. Installed by the adapter when it
/// runs in lazy mode.
pub trait Hydrate {
    fn hydrate(&self, graph: &TypeGraph, id: TypeId) -> Type;
}

/// Append-only arena of types, shared across compilations.
///
/// All methods take `&self`; interior mutability keeps the arena usable
/// from shared references during traversal while the adapter appends to it.
pub struct TypeGraph {
    slots: RefCell<Vec<Slot>>,
    hydrator: RefCell<Option<Weak<dyn Hydrate>>>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            hydrator: RefCell::new(None),
        }
    }

    /// Insert a fully built type.
    pub fn insert(&self, ty: Type) -> TypeId {
        self.push(Slot::Ready(Rc::new(ty)))
    }

    /// Allocate a slot to be filled by the current (eager) adaptation.
    /// The id may be referenced by other types before it is filled.
    pub fn reserve(&self) -> TypeId {
        self.push(Slot::Reserved)
    }

    /// Allocate a slot to be hydrated on first access (lazy adaptation).
    pub fn defer(&self) -> TypeId {
        self.push(Slot::Deferred)
    }

    fn push(&self, slot: Slot) -> TypeId {
        let mut slots = self.slots.borrow_mut();
        let id = TypeId(slots.len() as u32);
        slots.push(slot);
        id
    }

    /// Fill a reserved or deferred slot. Filling an already-ready slot is
    /// a no-op: types never mutate after construction.
    pub fn fill(&self, id: TypeId, ty: Type) {
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots.get_mut(id.index()) {
            if !matches!(slot, Slot::Ready(_)) {
                *slot = Slot::Ready(Rc::new(ty));
            }
        }
    }

    /// Make `id` share `to`'s value (used when simplification collapses a
    /// reserved slot onto an existing type). The two ids stay distinct but
    /// expose identical data.
    pub fn redirect(&self, id: TypeId, to: TypeId) {
        let target = self.get(to);
        let mut slots = self.slots.borrow_mut();
        if let Some(slot) = slots.get_mut(id.index()) {
            if !matches!(slot, Slot::Ready(_)) {
                *slot = Slot::Ready(target);
            }
        }
    }

    /// Look up a type, hydrating a deferred slot if needed.
    pub fn get(&self, id: TypeId) -> Rc<Type> {
        if let Some(ready) = self.ready(id) {
            return ready;
        }
        let hydrator = self
            .hydrator
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade);
        match hydrator {
            Some(hydrator) => {
                let ty = hydrator.hydrate(self, id);
                self.fill(id, ty);
                match self.ready(id) {
                    Some(ready) => ready,
                    None => Rc::new(Type::error("type slot did not survive hydration")),
                }
            }
            None => Rc::new(Type::error(
                "type slot accessed before adaptation completed",
            )),
        }
    }

    /// Look up a type without triggering hydration.
    pub fn try_get(&self, id: TypeId) -> Option<Rc<Type>> {
        self.ready(id)
    }

    fn ready(&self, id: TypeId) -> Option<Rc<Type>> {
        match self.slots.borrow().get(id.index()) {
            Some(Slot::Ready(ty)) => Some(Rc::clone(ty)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_hydrator(&self, hydrator: Weak<dyn Hydrate>) {
        *self.hydrator.borrow_mut() = Some(hydrator);
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeGraph")
            .field("len", &self.len())
            .finish()
    }
}
