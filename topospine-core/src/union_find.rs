//! Union-find (disjoint set union) over dense indices.
//!
//! Used for connected components of the neighbourhood graph, for the link
//! components inspected by the classifier, and for basin merging in the
//! extremum graph. Each set additionally carries a caller-managed
//! `representative` slot so the merge loop can track the surviving extremum
//! of a basin independently of the union-by-rank root.

#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    pub(crate) representative: Vec<usize>,
}

impl DisjointSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            representative: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    /// Returns the representative of the set containing `node`.
    pub(crate) fn representative_of(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.representative[root]
    }

    /// Merges the sets of `left` and `right` and returns the new root.
    ///
    /// The representative of the merged set is left to the caller.
    pub(crate) fn union(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return left;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        left
    }

    /// Merges `absorbed` into `survivor`, keeping the survivor's
    /// representative for the combined set.
    pub(crate) fn absorb(&mut self, absorbed: usize, survivor: usize) -> usize {
        let keep = self.representative_of(survivor);
        let root = self.union(absorbed, survivor);
        self.representative[root] = keep;
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_survivor_representative() {
        let mut set = DisjointSet::new(4);
        set.absorb(0, 1);
        set.absorb(1, 2);
        assert_eq!(set.representative_of(0), 2);
        assert_eq!(set.representative_of(1), 2);
        assert_eq!(set.representative_of(3), 3);
        assert_eq!(set.find(0), set.find(2));
    }

    #[test]
    fn union_of_same_set_is_idempotent() {
        let mut set = DisjointSet::new(3);
        let root = set.union(0, 1);
        assert_eq!(set.union(1, 0), root);
        assert_ne!(set.find(2), root);
    }
}
