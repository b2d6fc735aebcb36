//! Core data model for syntactic heaps.
//!
//! A syntactic heap is a flat, append-only collection of immutable items.
//! Each item carries an opcode, an ordered list of operand indices referring
//! to earlier items in the same heap, and an optional raw payload. One item
//! is designated the root. Item shapes are described by a [`Schema`]: a
//! frozen table of descriptors, partitioned into named sections so that
//! unrelated node categories can grow without renumbering each other.
//!
//! Cross-references are plain indices rather than pointers, which makes a
//! heap trivially serializable and acyclic by construction: an item may only
//! reference items allocated before it.

pub mod dump;
mod error;
mod heap;
mod item;
mod schema;

pub use error::{Error, FormatError, ReferenceError, Result, SchemaError};
pub use heap::Heap;
pub use item::{Item, ItemIndex, ItemRef};
pub use schema::{
    Descriptor, Opcode, OperandArity, PayloadArity, Schema, SchemaBuilder, Section, OPCODE_SPACE,
};
