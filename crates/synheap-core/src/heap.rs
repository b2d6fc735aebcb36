//! Append-only, index-addressed item arena.

use crate::error::ReferenceError;
use crate::item::{Item, ItemIndex, ItemRef};

/// An ordered, append-only collection of items plus a distinguished root.
///
/// Indices are assigned on allocation and never reused; items are never
/// removed. An item may only reference items allocated before it, so every
/// heap is acyclic by construction. The root may designate any allocated
/// index and is the one reference exempt from the strictly-less-than rule.
///
/// A heap with no root is valid only transiently during construction; the
/// encoder refuses to serialize it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heap {
    items: Vec<Item>,
    root: Option<ItemIndex>,
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item, assigning it the next index.
    ///
    /// Every operand must reference an already-allocated item; a forward or
    /// out-of-range operand is a [`ReferenceError::DanglingReference`] and
    /// allocates nothing.
    pub fn allocate(&mut self, item: Item) -> Result<ItemIndex, ReferenceError> {
        let bound = self.items.len() as u32;
        for &operand in item.operands() {
            if operand.get() >= bound {
                return Err(ReferenceError::DanglingReference {
                    index: operand.get(),
                    bound,
                });
            }
        }
        self.items.push(item);
        Ok(ItemIndex(bound))
    }

    /// Borrow the item at `index`.
    pub fn get(&self, index: ItemIndex) -> Result<ItemRef<'_>, ReferenceError> {
        if index.as_usize() >= self.items.len() {
            return Err(ReferenceError::DanglingReference {
                index: index.get(),
                bound: self.items.len() as u32,
            });
        }
        Ok(ItemRef::new(self, index))
    }

    /// Designate the entry item. The target must already be allocated; the
    /// root may be reassigned while the heap is under construction, and only
    /// the final value is serialized.
    pub fn set_root(&mut self, index: ItemIndex) -> Result<(), ReferenceError> {
        if index.as_usize() >= self.items.len() {
            return Err(ReferenceError::DanglingReference {
                index: index.get(),
                bound: self.items.len() as u32,
            });
        }
        self.root = Some(index);
        Ok(())
    }

    /// The root index, if one has been set.
    pub fn root_index(&self) -> Option<ItemIndex> {
        self.root
    }

    /// The root item, if one has been set.
    pub fn root(&self) -> Option<ItemRef<'_>> {
        self.root.map(|index| ItemRef::new(self, index))
    }

    /// All items in allocation order. The encoder's linear pass runs over
    /// this slice.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterate over all items in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = ItemRef<'_>> {
        (0..self.items.len() as u32).map(|i| ItemRef::new(self, ItemIndex(i)))
    }

    /// First item satisfying the predicate, scanning in allocation order.
    pub fn match_first<P>(&self, predicate: P) -> Option<ItemRef<'_>>
    where
        P: Fn(ItemRef<'_>) -> bool,
    {
        self.iter().find(|item| predicate(*item))
    }

    /// All items satisfying the predicate, in allocation order.
    pub fn match_all<P>(&self, predicate: P) -> Vec<ItemRef<'_>>
    where
        P: Fn(ItemRef<'_>) -> bool,
    {
        self.iter().filter(|item| predicate(*item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Descriptor, OperandArity, PayloadArity, Schema, SchemaBuilder};

    fn test_schema() -> Schema {
        let mut b = SchemaBuilder::new();
        b.register_section("node", 8).unwrap();
        b.bind(
            "node",
            Descriptor::new("leaf", OperandArity::Fixed(0), PayloadArity::Variable),
        )
        .unwrap();
        b.bind(
            "node",
            Descriptor::new("pair", OperandArity::Fixed(2), PayloadArity::None),
        )
        .unwrap();
        b.freeze()
    }

    use crate::schema::Opcode;

    const LEAF: Opcode = Opcode(0);
    const PAIR: Opcode = Opcode(1);

    #[test]
    fn test_allocate_assigns_sequential_indices() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"a".to_vec())).unwrap())
            .unwrap();
        let b = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"b".to_vec())).unwrap())
            .unwrap();
        assert_eq!(a, ItemIndex(0));
        assert_eq!(b, ItemIndex(1));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_allocate_rejects_forward_reference() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        // Operand 5 does not exist yet.
        let item = schema
            .construct(PAIR, vec![a, ItemIndex(5)], None)
            .unwrap();
        let err = heap.allocate(item).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::DanglingReference { index: 5, bound: 1 }
        );
        // Nothing was allocated.
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_allocate_rejects_self_reference() {
        let schema = test_schema();
        let mut heap = Heap::new();
        heap.allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        // An item referencing its own would-be index is a forward reference.
        let item = schema
            .construct(PAIR, vec![ItemIndex(0), ItemIndex(1)], None)
            .unwrap();
        let err = heap.allocate(item).unwrap_err();
        assert!(matches!(err, ReferenceError::DanglingReference { .. }));
    }

    #[test]
    fn test_operand_resolution() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"left".to_vec())).unwrap())
            .unwrap();
        let b = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"right".to_vec())).unwrap())
            .unwrap();
        let pair = heap
            .allocate(schema.construct(PAIR, vec![a, b], None).unwrap())
            .unwrap();

        let pair = heap.get(pair).unwrap();
        assert_eq!(pair.get(0).unwrap().payload(), Some(&b"left"[..]));
        assert_eq!(pair.get(1).unwrap().payload(), Some(&b"right"[..]));
        let err = pair.get(2).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::IndexOutOfBounds {
                position: 2,
                count: 2
            }
        );
    }

    #[test]
    fn test_get_out_of_bounds() {
        let heap = Heap::new();
        let err = heap.get(ItemIndex(0)).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::DanglingReference { index: 0, bound: 0 }
        );
    }

    #[test]
    fn test_set_root_requires_allocated_target() {
        let schema = test_schema();
        let mut heap = Heap::new();
        assert!(matches!(
            heap.set_root(ItemIndex(0)),
            Err(ReferenceError::DanglingReference { .. })
        ));
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        heap.set_root(a).unwrap();
        assert_eq!(heap.root_index(), Some(a));
        assert_eq!(heap.root().unwrap().index(), a);
    }

    #[test]
    fn test_root_may_be_reassigned() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"a".to_vec())).unwrap())
            .unwrap();
        heap.set_root(a).unwrap();
        let b = heap
            .allocate(schema.construct(LEAF, vec![], Some(b"b".to_vec())).unwrap())
            .unwrap();
        heap.set_root(b).unwrap();
        assert_eq!(heap.root_index(), Some(b));
    }

    #[test]
    fn test_match_first_and_match_all() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        let b = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        heap.allocate(schema.construct(PAIR, vec![a, b], None).unwrap())
            .unwrap();

        let leaves = heap.match_all(|item| item.opcode() == LEAF);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].index(), a);
        assert_eq!(leaves[1].index(), b);

        let first_pair = heap.match_first(|item| item.opcode() == PAIR).unwrap();
        assert_eq!(first_pair.index(), ItemIndex(2));
        assert!(heap.match_first(|item| item.opcode() == Opcode(7)).is_none());
    }

    #[test]
    fn test_clone_with_leaves_original_unchanged() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        let b = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        let pair = heap
            .allocate(schema.construct(PAIR, vec![a, a], None).unwrap())
            .unwrap();

        let original = heap.get(pair).unwrap().item().clone();
        let revised = original.clone_with(vec![a, b]).unwrap();
        assert_eq!(revised.opcode(), PAIR);
        assert_eq!(revised.operands(), &[a, b]);
        // The original keeps its operands.
        assert_eq!(heap.get(pair).unwrap().item().operands(), &[a, a]);

        // The clone is unallocated until explicitly re-allocated.
        assert_eq!(heap.len(), 3);
        let reallocated = heap.allocate(revised).unwrap();
        assert_eq!(reallocated, ItemIndex(3));
    }

    #[test]
    fn test_clone_with_wrong_count() {
        let schema = test_schema();
        let mut heap = Heap::new();
        let a = heap
            .allocate(schema.construct(LEAF, vec![], Some(vec![])).unwrap())
            .unwrap();
        let pair = heap
            .allocate(schema.construct(PAIR, vec![a, a], None).unwrap())
            .unwrap();
        let err = heap
            .get(pair)
            .unwrap()
            .item()
            .clone_with(vec![a])
            .unwrap_err();
        assert!(matches!(err, crate::FormatError::ArityMismatch { .. }));
    }

    #[test]
    fn test_structural_equality() {
        let schema = test_schema();
        let build = || {
            let mut heap = Heap::new();
            let a = heap
                .allocate(schema.construct(LEAF, vec![], Some(b"x".to_vec())).unwrap())
                .unwrap();
            heap.set_root(a).unwrap();
            heap
        };
        assert_eq!(build(), build());

        let mut other = build();
        let b = other
            .allocate(schema.construct(LEAF, vec![], Some(b"y".to_vec())).unwrap())
            .unwrap();
        other.set_root(b).unwrap();
        assert_ne!(build(), other);
    }
}
