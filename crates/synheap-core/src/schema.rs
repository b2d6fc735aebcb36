//! Sectioned opcode schemas.
//!
//! A schema is built in two phases: a mutable [`SchemaBuilder`] registers
//! sections and binds descriptors, then [`SchemaBuilder::freeze`] produces an
//! immutable [`Schema`] that can be shared freely across threads. Sections
//! reserve contiguous opcode ranges up front, so descriptors registered in
//! different sections never collide regardless of registration order, and a
//! decoder can reject opcodes from a revision it does not understand instead
//! of silently corrupting the heap.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{FormatError, SchemaError};
use crate::item::{Item, ItemIndex};

/// Number of representable opcodes.
pub const OPCODE_SPACE: u32 = (u16::MAX as u32) + 1;

/// Small integer discriminator selecting an item's shape and semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// The raw opcode value.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared operand shape of an item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandArity {
    /// Exactly this many operands; the count is implicit on the wire.
    Fixed(usize),
    /// Any number of operands; the count is written explicitly.
    Variable,
}

impl OperandArity {
    /// Whether `count` operands satisfy this arity.
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::Fixed(n) => count == n,
            Self::Variable => true,
        }
    }
}

impl fmt::Display for OperandArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n} operands"),
            Self::Variable => write!(f, "any number of operands"),
        }
    }
}

/// Declared payload shape of an item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadArity {
    /// No payload at all.
    None,
    /// Exactly this many payload bytes; the length is implicit on the wire.
    Fixed(usize),
    /// Arbitrary payload bytes, length-prefixed on the wire.
    Variable,
}

impl PayloadArity {
    /// Whether a payload of the given shape satisfies this arity.
    pub fn admits(self, payload: Option<usize>) -> bool {
        match (self, payload) {
            (Self::None, None) => true,
            (Self::Fixed(n), Some(len)) => len == n,
            (Self::Variable, Some(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PayloadArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no payload"),
            Self::Fixed(n) => write!(f, "{n} payload bytes"),
            Self::Variable => write!(f, "length-prefixed payload"),
        }
    }
}

/// Schema-bound metadata and factory for one opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    name: String,
    operands: OperandArity,
    payload: PayloadArity,
}

impl Descriptor {
    /// Describe an item kind.
    pub fn new(name: impl Into<String>, operands: OperandArity, payload: PayloadArity) -> Self {
        Self {
            name: name.into(),
            operands,
            payload,
        }
    }

    /// Local name of the item kind within its section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared operand arity.
    pub fn operands(&self) -> OperandArity {
        self.operands
    }

    /// Declared payload arity.
    pub fn payload(&self) -> PayloadArity {
        self.payload
    }

    /// Construct an unallocated item of this kind, validating arity.
    pub fn construct(
        &self,
        opcode: Opcode,
        operands: Vec<ItemIndex>,
        payload: Option<Vec<u8>>,
    ) -> Result<Item, FormatError> {
        if !self.operands.admits(operands.len()) {
            return Err(FormatError::ArityMismatch {
                name: self.name.clone(),
                expected: self.operands.to_string(),
                found: format!("{} operands", operands.len()),
            });
        }
        if !self.payload.admits(payload.as_ref().map(Vec::len)) {
            return Err(FormatError::ArityMismatch {
                name: self.name.clone(),
                expected: self.payload.to_string(),
                found: match &payload {
                    Some(p) => format!("{} payload bytes", p.len()),
                    None => "no payload".to_string(),
                },
            });
        }
        Ok(Item::new(opcode, operands, payload))
    }
}

/// A reserved contiguous sub-range of opcode space for one node category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    base: u16,
    width: u16,
}

impl Section {
    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First opcode of the reserved range.
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Number of opcodes reserved for this section.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Whether the opcode falls inside this section's range.
    pub fn contains(&self, opcode: Opcode) -> bool {
        let op = u32::from(opcode.get());
        let base = u32::from(self.base);
        op >= base && op < base + u32::from(self.width)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Builder
// ══════════════════════════════════════════════════════════════════════════════

/// One slot in a section: either a live descriptor or a reserved placeholder
/// kept for forward compatibility with deprecated or future opcodes.
#[derive(Debug, Clone)]
enum Slot {
    Live(Descriptor),
    Reserved(String),
}

impl Slot {
    fn name(&self) -> &str {
        match self {
            Self::Live(d) => d.name(),
            Self::Reserved(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
struct SectionBuilder {
    name: String,
    base: u16,
    width: u16,
    slots: Vec<Slot>,
}

/// Mutable schema under construction. Freeze it before use.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    sections: Vec<SectionBuilder>,
    next_base: u32,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next `width` contiguous opcodes for a new section.
    pub fn register_section(&mut self, name: &str, width: u16) -> Result<(), SchemaError> {
        if self.sections.iter().any(|s| s.name == name) {
            return Err(SchemaError::DuplicateBinding(format!(
                "section `{name}` already registered"
            )));
        }
        let end = self.next_base + u32::from(width);
        if end > OPCODE_SPACE {
            return Err(SchemaError::SectionOverflow(format!(
                "section `{name}` (width {width}) exceeds the opcode space"
            )));
        }
        self.sections.push(SectionBuilder {
            name: name.to_string(),
            base: self.next_base as u16,
            width,
            slots: Vec::new(),
        });
        self.next_base = end;
        Ok(())
    }

    /// Bind a descriptor to the next free slot in the named section.
    pub fn bind(&mut self, section: &str, descriptor: Descriptor) -> Result<Opcode, SchemaError> {
        let slot = Slot::Live(descriptor);
        self.push_slot(section, slot)
    }

    /// Reserve the next free slot in the named section without a live
    /// descriptor. Resolving the resulting opcode fails with
    /// [`SchemaError::UnknownOpcode`].
    pub fn reserve(&mut self, section: &str, name: &str) -> Result<Opcode, SchemaError> {
        self.push_slot(section, Slot::Reserved(name.to_string()))
    }

    fn push_slot(&mut self, section: &str, slot: Slot) -> Result<Opcode, SchemaError> {
        let s = self
            .sections
            .iter_mut()
            .find(|s| s.name == section)
            .ok_or_else(|| SchemaError::UnknownSection(section.to_string()))?;
        if s.slots.iter().any(|existing| existing.name() == slot.name()) {
            return Err(SchemaError::DuplicateBinding(format!(
                "`{}` already bound in section `{}`",
                slot.name(),
                s.name
            )));
        }
        if s.slots.len() >= usize::from(s.width) {
            return Err(SchemaError::SectionOverflow(format!(
                "section `{}` is full (width {})",
                s.name, s.width
            )));
        }
        let opcode = Opcode(s.base + s.slots.len() as u16);
        s.slots.push(slot);
        Ok(opcode)
    }

    /// Freeze the builder into an immutable, shareable schema.
    pub fn freeze(self) -> Schema {
        let fingerprint = fingerprint(&self.sections);
        let mut table = vec![None; self.next_base as usize];
        let mut sections = Vec::with_capacity(self.sections.len());
        for s in self.sections {
            for (i, slot) in s.slots.iter().enumerate() {
                if let Slot::Live(d) = slot {
                    table[usize::from(s.base) + i] = Some(d.clone());
                }
            }
            sections.push(Section {
                name: s.name,
                base: s.base,
                width: s.width,
            });
        }
        Schema {
            sections,
            table,
            fingerprint,
        }
    }
}

/// Digest the section layout and bindings into an 8-byte fingerprint.
///
/// Two builders that register the same sections and bindings in the same
/// order produce identical fingerprints; any change to layout, names, or
/// arity changes the fingerprint and makes old streams unreadable.
fn fingerprint(sections: &[SectionBuilder]) -> [u8; 8] {
    let mut hasher = Sha256::new();
    for s in sections {
        hasher.update(s.name.as_bytes());
        hasher.update([0]);
        hasher.update(s.base.to_le_bytes());
        hasher.update(s.width.to_le_bytes());
        for slot in &s.slots {
            match slot {
                Slot::Live(d) => {
                    hasher.update([1]);
                    hasher.update(d.name().as_bytes());
                    hasher.update([0]);
                    match d.operands() {
                        OperandArity::Fixed(n) => {
                            hasher.update([0]);
                            hasher.update((n as u64).to_le_bytes());
                        }
                        OperandArity::Variable => hasher.update([1]),
                    }
                    match d.payload() {
                        PayloadArity::None => hasher.update([0]),
                        PayloadArity::Fixed(n) => {
                            hasher.update([1]);
                            hasher.update((n as u64).to_le_bytes());
                        }
                        PayloadArity::Variable => hasher.update([2]),
                    }
                }
                Slot::Reserved(name) => {
                    hasher.update([2]);
                    hasher.update(name.as_bytes());
                    hasher.update([0]);
                }
            }
        }
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Frozen schema
// ══════════════════════════════════════════════════════════════════════════════

/// Immutable opcode → descriptor table with its section layout.
#[derive(Debug, Clone)]
pub struct Schema {
    sections: Vec<Section>,
    table: Vec<Option<Descriptor>>,
    fingerprint: [u8; 8],
}

impl Schema {
    /// Resolve an opcode to its bound descriptor.
    pub fn resolve(&self, opcode: Opcode) -> Result<&Descriptor, SchemaError> {
        self.table
            .get(usize::from(opcode.get()))
            .and_then(Option::as_ref)
            .ok_or(SchemaError::UnknownOpcode(opcode))
    }

    /// Construct an unallocated item through the opcode's descriptor.
    pub fn construct(
        &self,
        opcode: Opcode,
        operands: Vec<ItemIndex>,
        payload: Option<Vec<u8>>,
    ) -> crate::Result<Item> {
        let descriptor = self.resolve(opcode)?;
        Ok(descriptor.construct(opcode, operands, payload)?)
    }

    /// The registered sections, in registration order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    /// 8-byte digest of the section layout and bindings, written into the
    /// wire header so a decoder can confirm schema compatibility.
    pub fn fingerprint(&self) -> [u8; 8] {
        self.fingerprint
    }
}
