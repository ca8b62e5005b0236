//! Parent/child structure derived from a flat, indent-tagged sequence.
//!
//! Nothing here holds references into the records. Every relation is a
//! position in the sequence the hierarchy was built from, so a hierarchy is
//! only meaningful until that sequence changes shape.

use std::ops::Range;

use crate::model::record::Record;

/// Derived relations for one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    /// Nearest preceding position with a strictly smaller indent
    parent: Option<usize>,
    /// The next record is indented deeper than this one
    is_parent: bool,
    /// One past the last position of this record's child run
    children_end: usize,
}

/// Parent/children/is-parent relations for every position of a sequence.
///
/// Children of position `i` are the contiguous run `i+1..children_end`: every
/// following record indented deeper than `i`, up to the first one that is
/// not. The run is transitive, so it includes grandchildren.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    links: Vec<Link>,
}

impl Hierarchy {
    pub fn build<T: Record>(records: &[T]) -> Self {
        let indents: Vec<i32> = records.iter().map(|r| r.indent()).collect();
        Self::from_indents(&indents)
    }

    /// Derive the hierarchy from indents alone.
    ///
    /// Each position scans forward over its child run and claims every
    /// record in it. Later (deeper, closer) positions claim again, so the
    /// last claim is the nearest ancestor. Cost is O(n·d) for nesting
    /// depth d.
    pub fn from_indents(indents: &[i32]) -> Self {
        let n = indents.len();
        let mut links: Vec<Link> = (0..n)
            .map(|i| Link {
                parent: None,
                is_parent: false,
                children_end: i + 1,
            })
            .collect();

        for i in 0..n {
            if i + 1 < n && indents[i + 1] > indents[i] {
                links[i].is_parent = true;
                let mut j = i + 1;
                while j < n && indents[j] > indents[i] {
                    links[j].parent = Some(i);
                    j += 1;
                }
                links[i].children_end = j;
            }
        }

        Hierarchy { links }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.links.get(idx).and_then(|l| l.parent)
    }

    pub fn is_parent(&self, idx: usize) -> bool {
        self.links.get(idx).is_some_and(|l| l.is_parent)
    }

    /// Positions of every (transitive) child of `idx`. Empty when `idx` is
    /// out of range or has no children.
    pub fn children(&self, idx: usize) -> Range<usize> {
        match self.links.get(idx) {
            Some(link) => idx + 1..link.children_end,
            None => 0..0,
        }
    }

    /// Children whose nearest ancestor is `idx` itself
    pub fn direct_children(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.children(idx)
            .filter(move |&c| self.links[c].parent == Some(idx))
    }

    /// Ancestors of `idx`, nearest first
    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parent(idx), move |&p| self.parent(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Reference implementation of the child-set rule, checked against the
    /// builder on every fixture.
    fn expected_children(indents: &[i32], i: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for (j, &indent) in indents.iter().enumerate().skip(i + 1) {
            if indent <= indents[i] {
                break;
            }
            out.push(j);
        }
        out
    }

    fn check_invariants(indents: &[i32]) {
        let h = Hierarchy::from_indents(indents);
        assert_eq!(h.len(), indents.len());
        for i in 0..indents.len() {
            let next_deeper = i + 1 < indents.len() && indents[i + 1] > indents[i];
            assert_eq!(h.is_parent(i), next_deeper, "is_parent at {} in {:?}", i, indents);
            assert_eq!(
                h.children(i).collect::<Vec<_>>(),
                expected_children(indents, i),
                "children at {} in {:?}",
                i,
                indents
            );
            let nearest = (0..i).rev().find(|&p| indents[p] < indents[i]);
            assert_eq!(h.parent(i), nearest, "parent at {} in {:?}", i, indents);
        }
    }

    #[test]
    fn invariants_hold_on_assorted_shapes() {
        let fixtures: &[&[i32]] = &[
            &[],
            &[1],
            &[1, 1, 1],
            &[1, 2, 2, 1],
            &[1, 2, 3, 2, 3, 3, 1, 2],
            &[1, 4, 2, 1],
            &[2, 3, 1, 2],
            &[3, 2, 1],
            &[1, 2, 3, 4, 4, 3, 2, 1],
        ];
        for indents in fixtures {
            check_invariants(indents);
        }
    }

    #[test]
    fn two_level_example() {
        // [1:1, 2:2, 3:2, 4:1]
        let h = Hierarchy::from_indents(&[1, 2, 2, 1]);
        assert!(h.is_parent(0));
        assert_eq!(h.children(0), 1..3);
        assert_eq!(h.parent(1), Some(0));
        assert_eq!(h.parent(2), Some(0));
        assert!(!h.is_parent(3));
        assert_eq!(h.parent(3), None);
        assert!(h.children(3).is_empty());
    }

    #[test]
    fn top_level_never_has_parent() {
        let h = Hierarchy::from_indents(&[1, 2, 1, 2, 3]);
        assert_eq!(h.parent(0), None);
        assert_eq!(h.parent(2), None);
    }

    #[test]
    fn indent_jump_is_still_a_child() {
        let h = Hierarchy::from_indents(&[1, 4, 2]);
        assert_eq!(h.parent(1), Some(0));
        // 2 is shallower than 4 but deeper than 1
        assert_eq!(h.parent(2), Some(0));
        assert!(!h.is_parent(1));
        assert_eq!(h.children(0), 1..3);
    }

    #[test]
    fn siblings_at_top_level() {
        let h = Hierarchy::from_indents(&[1, 1]);
        assert!(!h.is_parent(0));
        assert_eq!(h.parent(1), None);
    }

    #[test]
    fn direct_children_and_ancestors() {
        let h = Hierarchy::from_indents(&[1, 2, 3, 2, 1]);
        assert_eq!(h.direct_children(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(h.direct_children(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(h.ancestors(2).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(h.ancestors(4).count(), 0);
    }

    #[test]
    fn out_of_range_lookups_are_empty() {
        let h = Hierarchy::from_indents(&[1, 2]);
        assert_eq!(h.parent(9), None);
        assert!(!h.is_parent(9));
        assert!(h.children(9).is_empty());
    }
}
