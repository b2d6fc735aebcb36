//! Heap serialization.

use std::io::Write;

use synheap_core::{Heap, OperandArity, PayloadArity, ReferenceError, Schema};

use crate::error::CodecResult;
use crate::varint::write_u32;
use crate::{FORMAT_VERSION, MAGIC};

/// Serialize `heap` under `schema` into a byte vector.
pub fn encode(heap: &Heap, schema: &Schema) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    encode_to(&mut buf, heap, schema)?;
    Ok(buf)
}

/// Serialize `heap` under `schema` to a writer.
///
/// The heap must be sealed: encoding an unrooted heap fails with
/// [`ReferenceError::RootUnset`]. Beyond that this is a pure linear pass:
/// arity and reference invariants were already enforced at construction, so
/// nothing is re-validated here.
pub fn encode_to<W: Write>(writer: &mut W, heap: &Heap, schema: &Schema) -> CodecResult<()> {
    let root = heap.root_index().ok_or(ReferenceError::RootUnset)?;

    // 1. Header
    writer.write_all(&MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    writer.write_all(&schema.fingerprint())?;

    // 2. Item stream, in heap order
    write_u32(writer, heap.len() as u32)?;
    for item in heap.items() {
        let descriptor = schema.resolve(item.opcode())?;
        write_u32(writer, u32::from(item.opcode().get()))?;
        if descriptor.operands() == OperandArity::Variable {
            write_u32(writer, item.operand_count() as u32)?;
        }
        for &operand in item.operands() {
            write_u32(writer, operand.get())?;
        }
        match descriptor.payload() {
            PayloadArity::None => {}
            PayloadArity::Fixed(_) => {
                if let Some(payload) = item.payload() {
                    writer.write_all(payload)?;
                }
            }
            PayloadArity::Variable => {
                let payload = item.payload().unwrap_or(&[]);
                write_u32(writer, payload.len() as u32)?;
                writer.write_all(payload)?;
            }
        }
    }

    // 3. Trailer
    write_u32(writer, root.get())?;
    Ok(())
}
