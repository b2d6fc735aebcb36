//! Immutable heap items and borrowed item handles.

use std::fmt;

use crate::error::{FormatError, ReferenceError};
use crate::heap::Heap;
use crate::schema::Opcode;

/// Index of an item within its owning heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIndex(pub u32);

impl ItemIndex {
    /// The raw index value.
    pub fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single syntactic node: opcode, ordered operand references, optional raw
/// payload. Immutable once constructed; structural edits go through
/// [`Item::clone_with`], which produces a fresh unallocated item.
///
/// Items are only constructed through a descriptor (see
/// [`Schema::construct`](crate::Schema::construct)), which enforces arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    opcode: Opcode,
    operands: Vec<ItemIndex>,
    payload: Option<Vec<u8>>,
}

impl Item {
    pub(crate) fn new(opcode: Opcode, operands: Vec<ItemIndex>, payload: Option<Vec<u8>>) -> Self {
        Self {
            opcode,
            operands,
            payload,
        }
    }

    /// The opcode selecting this item's shape and semantics.
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Number of operands.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// The operand indices, in order.
    pub fn operands(&self) -> &[ItemIndex] {
        &self.operands
    }

    /// The raw payload, if this item kind carries one.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Copy this item with revised operand indices. The copy has the same
    /// opcode and payload, is not allocated to any heap, and the operand
    /// count must match the original's.
    pub fn clone_with(&self, operands: Vec<ItemIndex>) -> Result<Item, FormatError> {
        if operands.len() != self.operands.len() {
            return Err(FormatError::ArityMismatch {
                name: format!("opcode {}", self.opcode),
                expected: format!("{} operands", self.operands.len()),
                found: format!("{} operands", operands.len()),
            });
        }
        Ok(Item {
            opcode: self.opcode,
            operands,
            payload: self.payload.clone(),
        })
    }
}

/// A borrowed handle to an allocated item: the item together with its owning
/// heap and index, so operands resolve without going back through the heap
/// by hand.
#[derive(Debug, Clone, Copy)]
pub struct ItemRef<'h> {
    heap: &'h Heap,
    index: ItemIndex,
}

impl<'h> ItemRef<'h> {
    pub(crate) fn new(heap: &'h Heap, index: ItemIndex) -> Self {
        Self { heap, index }
    }

    /// This item's index in the owning heap.
    pub fn index(&self) -> ItemIndex {
        self.index
    }

    /// The owning heap.
    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    /// The underlying item.
    pub fn item(&self) -> &'h Item {
        // The handle is only handed out for allocated indices.
        &self.heap.items()[self.index.as_usize()]
    }

    /// The item's opcode.
    pub fn opcode(&self) -> Opcode {
        self.item().opcode()
    }

    /// Number of operands.
    pub fn operand_count(&self) -> usize {
        self.item().operand_count()
    }

    /// The raw payload, if any.
    pub fn payload(&self) -> Option<&'h [u8]> {
        self.item().payload()
    }

    /// The index held at operand position `position`.
    pub fn operand_index(&self, position: usize) -> Result<ItemIndex, ReferenceError> {
        self.item()
            .operands()
            .get(position)
            .copied()
            .ok_or(ReferenceError::IndexOutOfBounds {
                position,
                count: self.item().operand_count(),
            })
    }

    /// Resolve the operand at `position` through the owning heap.
    pub fn get(&self, position: usize) -> Result<ItemRef<'h>, ReferenceError> {
        let index = self.operand_index(position)?;
        self.heap.get(index)
    }
}
