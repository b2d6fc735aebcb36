//! Structured JSON rendering of a heap for inspection and tooling.
//!
//! Downstream diagnostics consume this instead of parsing `Debug` output.

use std::fmt::Write as _;

use serde::Serialize;

use crate::heap::Heap;
use crate::schema::Schema;

/// Serializable snapshot of one item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDump {
    pub index: u32,
    pub opcode: u16,
    /// Descriptor name, or `"?"` if the opcode is unbound in the schema the
    /// dump was taken under.
    pub name: String,
    pub operands: Vec<u32>,
    /// Payload bytes as lowercase hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// Serializable snapshot of a whole heap.
#[derive(Debug, Clone, Serialize)]
pub struct HeapDump {
    pub items: Vec<ItemDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<u32>,
}

impl HeapDump {
    /// Snapshot `heap`, resolving opcode names through `schema`.
    pub fn new(heap: &Heap, schema: &Schema) -> Self {
        let items = heap
            .iter()
            .map(|item| ItemDump {
                index: item.index().get(),
                opcode: item.opcode().get(),
                name: schema
                    .resolve(item.opcode())
                    .map(|d| d.name().to_string())
                    .unwrap_or_else(|_| "?".to_string()),
                operands: item.item().operands().iter().map(|ix| ix.get()).collect(),
                payload: item.payload().map(hex),
            })
            .collect();
        Self {
            items,
            root: heap.root_index().map(|ix| ix.get()),
        }
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(s, "{byte:02x}");
    }
    s
}
