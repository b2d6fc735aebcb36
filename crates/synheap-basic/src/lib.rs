//! Reference node set for the heap codec.
//!
//! Models a line-numbered toy language (statements like `10 PRINT "hello"`
//! and `20 GOTO 10` over constant expressions) as a worked example of how a
//! consumer defines a schema, allocates items bottom-up, and reads them back
//! through typed accessors. The compiler and interpreter for the language
//! live elsewhere; this crate only owns the node shapes and the `.bil`
//! content type.

mod file;
mod nodes;
mod schema;

pub use file::{BasicContentType, BasicFile, BasicMarker, SUFFIX};
pub use nodes::{
    alloc_const_int, alloc_const_str, alloc_goto, alloc_marker, alloc_print, alloc_tuple,
    ConstValue, Constant, Goto, MarkerItem, Print, Tuple,
};
pub use schema::{schema, OP_CONST, OP_GOTO, OP_MARKER, OP_PRINT, OP_TUPLE};
