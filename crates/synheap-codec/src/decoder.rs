//! Heap reconstruction.

use std::io::Read;

use synheap_core::{
    FormatError, Heap, ItemIndex, Opcode, OperandArity, PayloadArity, ReferenceError, Schema,
};

use crate::error::CodecResult;
use crate::varint::ByteReader;
use crate::{FORMAT_VERSION, MAGIC};

/// Reconstruct a heap from a fully-buffered stream under `schema`.
///
/// One linear pass: items are allocated strictly in stream order, so every
/// operand reference is checked against the items decoded so far and forward
/// references fail immediately. All errors are terminal for the call; no
/// partially-decoded heap is ever returned.
pub fn decode(bytes: &[u8], schema: &Schema) -> CodecResult<Heap> {
    let mut reader = ByteReader::new(bytes);

    read_header(&mut reader, schema)?;

    let count = reader.read_varint()?;
    let mut heap = Heap::new();
    for next in 0..count {
        let opcode = Opcode(reader.read_varint_u16()?);
        let descriptor = schema.resolve(opcode)?;

        let operand_count = match descriptor.operands() {
            OperandArity::Fixed(n) => n,
            OperandArity::Variable => reader.read_varint()? as usize,
        };
        let mut operands = Vec::with_capacity(operand_count);
        for _ in 0..operand_count {
            let index = reader.read_varint()?;
            if index >= next {
                return Err(ReferenceError::DanglingReference { index, bound: next }.into());
            }
            operands.push(ItemIndex(index));
        }

        let payload = match descriptor.payload() {
            PayloadArity::None => None,
            PayloadArity::Fixed(n) => Some(reader.read_exact(n)?.to_vec()),
            PayloadArity::Variable => {
                let len = reader.read_varint()? as usize;
                Some(reader.read_exact(len)?.to_vec())
            }
        };

        let item = schema.construct(opcode, operands, payload)?;
        heap.allocate(item)?;
    }

    let root = reader.read_varint()?;
    if root >= count {
        return Err(ReferenceError::DanglingReference {
            index: root,
            bound: count,
        }
        .into());
    }
    heap.set_root(ItemIndex(root))?;

    if reader.remaining() > 0 {
        return Err(FormatError::TrailingData {
            remaining: reader.remaining(),
        }
        .into());
    }
    Ok(heap)
}

/// Read a heap from a reader. The stream is buffered to the end first;
/// partial/streaming decode is deliberately unsupported.
pub fn decode_from<R: Read>(reader: &mut R, schema: &Schema) -> CodecResult<Heap> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    decode(&buf, schema)
}

/// Validate magic, format version, and schema fingerprint.
fn read_header(reader: &mut ByteReader<'_>, schema: &Schema) -> CodecResult<()> {
    let magic = reader.read_exact(MAGIC.len())?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic {
            expected: MAGIC,
            found: [magic[0], magic[1], magic[2], magic[3]],
        }
        .into());
    }

    let version = reader.read_u16_le()?;
    if version != FORMAT_VERSION {
        return Err(FormatError::VersionMismatch(format!(
            "stream has format version {version}, this build reads {FORMAT_VERSION}"
        ))
        .into());
    }

    let fingerprint = reader.read_exact(8)?;
    if fingerprint != schema.fingerprint() {
        return Err(FormatError::VersionMismatch(
            "stream was written under a different schema fingerprint".to_string(),
        )
        .into());
    }
    Ok(())
}
