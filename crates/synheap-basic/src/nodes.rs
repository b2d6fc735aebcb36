//! Typed views over heap items, plus bottom-up allocation helpers.
//!
//! Each wrapper asserts the item's opcode before interpreting operands or
//! payload; using the wrong view fails with
//! [`ReferenceError::TypeMismatch`] instead of misreading bytes.

use synheap_core::{Heap, ItemIndex, ItemRef, ReferenceError, Result};

use crate::schema::{schema, OP_CONST, OP_GOTO, OP_MARKER, OP_PRINT, OP_TUPLE};

const TAG_STR: u8 = 0;
const TAG_INT: u8 = 1;

/// Descriptor name for an item, for error messages.
fn kind_name(item: ItemRef<'_>) -> String {
    schema()
        .resolve(item.opcode())
        .map(|d| d.name().to_string())
        .unwrap_or_else(|_| format!("opcode {}", item.opcode()))
}

fn expect_kind(
    item: ItemRef<'_>,
    opcode: synheap_core::Opcode,
    expected: &'static str,
) -> std::result::Result<(), ReferenceError> {
    if item.opcode() == opcode {
        Ok(())
    } else {
        Err(ReferenceError::TypeMismatch {
            expected,
            found: kind_name(item),
        })
    }
}

/// Read the 4-byte line number payload shared by statement kinds.
fn line_payload(item: ItemRef<'_>) -> std::result::Result<u32, ReferenceError> {
    match item.payload() {
        Some(p) if p.len() == 4 => Ok(u32::from_le_bytes([p[0], p[1], p[2], p[3]])),
        _ => Err(ReferenceError::TypeMismatch {
            expected: "4-byte line number payload",
            found: kind_name(item),
        }),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Typed views
// ══════════════════════════════════════════════════════════════════════════════

/// An ordered sequence of items, used as the program root.
#[derive(Debug, Clone, Copy)]
pub struct Tuple<'h>(ItemRef<'h>);

impl<'h> TryFrom<ItemRef<'h>> for Tuple<'h> {
    type Error = ReferenceError;

    fn try_from(item: ItemRef<'h>) -> std::result::Result<Self, ReferenceError> {
        expect_kind(item, OP_TUPLE, "tuple")?;
        Ok(Self(item))
    }
}

impl<'h> Tuple<'h> {
    pub fn len(&self) -> usize {
        self.0.operand_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The i-th member.
    pub fn get(&self, i: usize) -> std::result::Result<ItemRef<'h>, ReferenceError> {
        self.0.get(i)
    }

    pub fn item(&self) -> ItemRef<'h> {
        self.0
    }
}

/// `PRINT <expr>` on some source line.
#[derive(Debug, Clone, Copy)]
pub struct Print<'h>(ItemRef<'h>);

impl<'h> TryFrom<ItemRef<'h>> for Print<'h> {
    type Error = ReferenceError;

    fn try_from(item: ItemRef<'h>) -> std::result::Result<Self, ReferenceError> {
        expect_kind(item, OP_PRINT, "print")?;
        Ok(Self(item))
    }
}

impl<'h> Print<'h> {
    /// Source line number this statement sits on.
    pub fn line_number(&self) -> std::result::Result<u32, ReferenceError> {
        line_payload(self.0)
    }

    /// The printed expression.
    pub fn expr(&self) -> std::result::Result<ItemRef<'h>, ReferenceError> {
        self.0.get(0)
    }

    pub fn item(&self) -> ItemRef<'h> {
        self.0
    }
}

/// `GOTO` on some source line; operand 0 is the branch target.
#[derive(Debug, Clone, Copy)]
pub struct Goto<'h>(ItemRef<'h>);

impl<'h> TryFrom<ItemRef<'h>> for Goto<'h> {
    type Error = ReferenceError;

    fn try_from(item: ItemRef<'h>) -> std::result::Result<Self, ReferenceError> {
        expect_kind(item, OP_GOTO, "goto")?;
        Ok(Self(item))
    }
}

impl<'h> Goto<'h> {
    pub fn line_number(&self) -> std::result::Result<u32, ReferenceError> {
        line_payload(self.0)
    }

    /// The item control transfers to.
    pub fn target(&self) -> std::result::Result<ItemRef<'h>, ReferenceError> {
        self.0.get(0)
    }

    pub fn item(&self) -> ItemRef<'h> {
        self.0
    }
}

/// A constant value decoded from a tagged payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue<'h> {
    Str(&'h str),
    Int(i64),
}

/// A literal expression.
#[derive(Debug, Clone, Copy)]
pub struct Constant<'h>(ItemRef<'h>);

impl<'h> TryFrom<ItemRef<'h>> for Constant<'h> {
    type Error = ReferenceError;

    fn try_from(item: ItemRef<'h>) -> std::result::Result<Self, ReferenceError> {
        expect_kind(item, OP_CONST, "const")?;
        Ok(Self(item))
    }
}

impl<'h> Constant<'h> {
    /// Decode the tagged payload.
    pub fn value(&self) -> std::result::Result<ConstValue<'h>, ReferenceError> {
        let payload = self.0.payload().unwrap_or(&[]);
        match payload.split_first() {
            Some((&TAG_STR, rest)) => match std::str::from_utf8(rest) {
                Ok(s) => Ok(ConstValue::Str(s)),
                Err(_) => Err(ReferenceError::TypeMismatch {
                    expected: "UTF-8 string constant",
                    found: "invalid UTF-8 payload".to_string(),
                }),
            },
            Some((&TAG_INT, rest)) if rest.len() == 8 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(rest);
                Ok(ConstValue::Int(i64::from_le_bytes(bytes)))
            }
            _ => Err(ReferenceError::TypeMismatch {
                expected: "tagged constant payload",
                found: "malformed payload".to_string(),
            }),
        }
    }

    /// The constant as a string, or `TypeMismatch` for any other kind.
    pub fn as_str(&self) -> std::result::Result<&'h str, ReferenceError> {
        match self.value()? {
            ConstValue::Str(s) => Ok(s),
            ConstValue::Int(_) => Err(ReferenceError::TypeMismatch {
                expected: "string constant",
                found: "integer constant".to_string(),
            }),
        }
    }

    /// The constant as an integer, or `TypeMismatch` for any other kind.
    pub fn as_int(&self) -> std::result::Result<i64, ReferenceError> {
        match self.value()? {
            ConstValue::Int(v) => Ok(v),
            ConstValue::Str(_) => Err(ReferenceError::TypeMismatch {
                expected: "integer constant",
                found: "string constant".to_string(),
            }),
        }
    }

    pub fn item(&self) -> ItemRef<'h> {
        self.0
    }
}

/// A diagnostic marker item: message payload, one target operand.
#[derive(Debug, Clone, Copy)]
pub struct MarkerItem<'h>(ItemRef<'h>);

impl<'h> TryFrom<ItemRef<'h>> for MarkerItem<'h> {
    type Error = ReferenceError;

    fn try_from(item: ItemRef<'h>) -> std::result::Result<Self, ReferenceError> {
        expect_kind(item, OP_MARKER, "marker")?;
        Ok(Self(item))
    }
}

impl<'h> MarkerItem<'h> {
    /// The marker message.
    pub fn message(&self) -> std::result::Result<&'h str, ReferenceError> {
        let payload = self.0.payload().unwrap_or(&[]);
        std::str::from_utf8(payload).map_err(|_| ReferenceError::TypeMismatch {
            expected: "UTF-8 marker message",
            found: "invalid UTF-8 payload".to_string(),
        })
    }

    /// The item the marker is attached to.
    pub fn target(&self) -> std::result::Result<ItemRef<'h>, ReferenceError> {
        self.0.get(0)
    }

    /// Index of the item the marker is attached to.
    pub fn target_index(&self) -> std::result::Result<ItemIndex, ReferenceError> {
        self.0.operand_index(0)
    }

    pub fn item(&self) -> ItemRef<'h> {
        self.0
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Allocation helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Allocate a string constant.
pub fn alloc_const_str(heap: &mut Heap, value: &str) -> Result<ItemIndex> {
    let mut payload = Vec::with_capacity(value.len() + 1);
    payload.push(TAG_STR);
    payload.extend_from_slice(value.as_bytes());
    let item = schema().construct(OP_CONST, Vec::new(), Some(payload))?;
    Ok(heap.allocate(item)?)
}

/// Allocate an integer constant.
pub fn alloc_const_int(heap: &mut Heap, value: i64) -> Result<ItemIndex> {
    let mut payload = Vec::with_capacity(9);
    payload.push(TAG_INT);
    payload.extend_from_slice(&value.to_le_bytes());
    let item = schema().construct(OP_CONST, Vec::new(), Some(payload))?;
    Ok(heap.allocate(item)?)
}

/// Allocate a print statement for `line`, printing the already-allocated
/// expression `expr`.
pub fn alloc_print(heap: &mut Heap, line: u32, expr: ItemIndex) -> Result<ItemIndex> {
    let item = schema().construct(OP_PRINT, vec![expr], Some(line.to_le_bytes().to_vec()))?;
    Ok(heap.allocate(item)?)
}

/// Allocate a goto statement for `line`, branching to the already-allocated
/// `target`.
pub fn alloc_goto(heap: &mut Heap, line: u32, target: ItemIndex) -> Result<ItemIndex> {
    let item = schema().construct(OP_GOTO, vec![target], Some(line.to_le_bytes().to_vec()))?;
    Ok(heap.allocate(item)?)
}

/// Allocate a tuple over already-allocated members.
pub fn alloc_tuple(heap: &mut Heap, members: Vec<ItemIndex>) -> Result<ItemIndex> {
    let item = schema().construct(OP_TUPLE, members, None)?;
    Ok(heap.allocate(item)?)
}

/// Allocate a diagnostic marker attached to `target`.
pub fn alloc_marker(heap: &mut Heap, message: &str, target: ItemIndex) -> Result<ItemIndex> {
    let item = schema().construct(
        OP_MARKER,
        vec![target],
        Some(message.as_bytes().to_vec()),
    )?;
    Ok(heap.allocate(item)?)
}
