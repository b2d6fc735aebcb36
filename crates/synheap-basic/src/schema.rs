//! The program schema: three sections with room to grow independently.

use std::sync::OnceLock;

use synheap_core::{Descriptor, Opcode, OperandArity, PayloadArity, Schema, SchemaBuilder};

/// Ordered sequence of items; programs use one as their root.
pub const OP_TUPLE: Opcode = Opcode(0);
/// Diagnostic marker: one target operand, UTF-8 message payload.
pub const OP_MARKER: Opcode = Opcode(1);
/// Statement: print an expression. Operand 0 is the expression, payload is
/// the 4-byte line number.
pub const OP_PRINT: Opcode = Opcode(16);
/// Statement: unconditional branch. Operand 0 is the target, payload is the
/// 4-byte line number.
pub const OP_GOTO: Opcode = Opcode(17);
/// Expression: tagged constant (string or integer) in the payload.
pub const OP_CONST: Opcode = Opcode(32);

/// The frozen program schema. Built once, shared for the process lifetime.
pub fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(build)
}

fn build() -> Schema {
    let mut b = SchemaBuilder::new();
    b.register_section("item", 16).expect("item section");
    b.register_section("stmt", 16).expect("stmt section");
    b.register_section("expr", 32).expect("expr section");

    b.bind(
        "item",
        Descriptor::new("tuple", OperandArity::Variable, PayloadArity::None),
    )
    .expect("tuple");
    b.bind(
        "item",
        Descriptor::new("marker", OperandArity::Fixed(1), PayloadArity::Variable),
    )
    .expect("marker");
    // Slot 2 once carried a source-span kind; the opcode stays reserved so
    // old streams keep failing loudly instead of decoding as something else.
    b.reserve("item", "span").expect("span placeholder");

    b.bind(
        "stmt",
        Descriptor::new("print", OperandArity::Fixed(1), PayloadArity::Fixed(4)),
    )
    .expect("print");
    b.bind(
        "stmt",
        Descriptor::new("goto", OperandArity::Fixed(1), PayloadArity::Fixed(4)),
    )
    .expect("goto");

    b.bind(
        "expr",
        Descriptor::new("const", OperandArity::Fixed(0), PayloadArity::Variable),
    )
    .expect("const");

    b.freeze()
}
