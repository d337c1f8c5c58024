// Copyright 2026 the bailiwick authors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! The ordered tree of domain names underlying a zone.
//!
//! Unlike a plain label-per-level trie, this tree stores *label
//! sequences*: a node's key is the run of labels between it and its
//! parent, and nodes exist only for names that were inserted or that
//! are branch points between inserted names. Sibling keys therefore
//! never share their rightmost label. The payoff is that a failed
//! search carries precise information about *why* it failed (the
//! [`NameComparison`] against the node that stopped it), which the
//! lookup process uses to distinguish empty non-terminals, cancelled
//! wildcards, and plain NXDOMAIN, and which NSEC/NSEC3 witness
//! selection uses to seed in-order navigation.
//!
//! Children hold arena indices and each node points back to its parent
//! by index, so the parent/child cycle involves no ownership cycle.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::name::{Label, LabelBuf, Name, NameComparison, NameRelation};
use crate::rr::RrsetList;

////////////////////////////////////////////////////////////////////////
// NODES                                                              //
////////////////////////////////////////////////////////////////////////

/// An index identifying a [`TreeNode`] within its [`NameTree`]'s arena.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct NodeId(usize);

/// A node of a [`NameTree`].
#[derive(Debug)]
pub(crate) struct TreeNode {
    /// The labels between this node and its parent, leftmost first.
    /// Never empty (except at the root, where it holds the origin's
    /// absolute labels and is not consulted).
    key: Vec<LabelBuf>,

    /// The absolute owner name of this node.
    name: Name,

    parent: Option<NodeId>,

    /// Children, keyed by the rightmost label of the child's key and
    /// ordered canonically. Sibling keys never share their rightmost
    /// label, so the key is unique.
    children: BTreeMap<LabelBuf, NodeId>,

    /// The RRsets owned by this node. A node with no RRsets is an
    /// empty non-terminal (or a freshly created branch node).
    pub(crate) rrsets: RrsetList,

    /// This node has a child labelled `*`.
    pub(crate) wildcard_parent: bool,

    /// This node is a zone-cut or DNAME candidate; the search callback
    /// fires when descending through it.
    pub(crate) callback: bool,
}

impl TreeNode {
    /// Returns the absolute owner name of this node.
    pub(crate) fn name(&self) -> &Name {
        &self.name
    }

    /// Returns whether the node owns no RRsets.
    pub(crate) fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////
// SEARCH PATHS                                                       //
////////////////////////////////////////////////////////////////////////

/// Records the context of a [`NameTree::find_with`] search: the chain
/// of fully matched ancestors, the node the search last compared the
/// target against, and the result of that comparison. This is what
/// NSEC witness selection consumes through
/// [`NameTree::previous_node`].
#[derive(Debug, Default)]
pub(crate) struct SearchPath {
    chain: Vec<NodeId>,
    last_compared: Option<(NodeId, NameComparison)>,
    cursor: PrevCursor,
}

#[derive(Debug, Default)]
enum PrevCursor {
    #[default]
    Unset,
    At(NodeId),
    Done,
}

impl SearchPath {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resets the path so that it can be reused for another search.
    pub(crate) fn clear(&mut self) {
        self.chain.clear();
        self.last_compared = None;
        self.cursor = PrevCursor::Unset;
    }

    /// Returns the comparison between the search target and the node
    /// that terminated the search.
    pub(crate) fn last_comparison(&self) -> Option<NameComparison> {
        self.last_compared.map(|(_, cmp)| cmp)
    }

    /// Returns the node that terminated the search.
    pub(crate) fn last_compared(&self) -> Option<NodeId> {
        self.last_compared.map(|(id, _)| id)
    }

    fn set_last(&mut self, id: NodeId, cmp: NameComparison) {
        self.last_compared = Some((id, cmp));
    }
}

////////////////////////////////////////////////////////////////////////
// THE TREE                                                           //
////////////////////////////////////////////////////////////////////////

/// The result of [`NameTree::find_with`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TreeFindResult {
    /// The exact name was found.
    Exact(NodeId),

    /// The search stopped at the deepest existing ancestor of the
    /// target (or at a node whose callback stopped the descent).
    Partial(NodeId),

    /// The target is outside the tree's bailiwick.
    NotFound,
}

/// A tree of domain names rooted at a zone's origin.
#[derive(Debug)]
pub(crate) struct NameTree {
    nodes: Vec<TreeNode>,
}

impl NameTree {
    /// Creates a tree containing only its origin node.
    pub(crate) fn new(origin: Name) -> Self {
        let root = TreeNode {
            key: origin.as_label_slice().to_vec(),
            name: origin,
            parent: None,
            children: BTreeMap::new(),
            rrsets: RrsetList::new(),
            wildcard_parent: false,
            callback: false,
        };
        Self { nodes: vec![root] }
    }

    /// Returns the origin node's id.
    pub(crate) fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    fn push_node(&mut self, key: Vec<LabelBuf>, name: Name, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            key,
            name,
            parent: Some(parent),
            children: BTreeMap::new(),
            rrsets: RrsetList::new(),
            wildcard_parent: false,
            callback: false,
        });
        id
    }

    ////////////////////////////////////////////////////////////////////
    // INSERTION                                                      //
    ////////////////////////////////////////////////////////////////////

    /// Finds or creates the node for `name`, which must be within the
    /// origin's bailiwick. Keys are split at branch points so that the
    /// sibling-key invariant is maintained.
    pub(crate) fn insert(&mut self, name: &Name) -> NodeId {
        let origin_len = self.node(self.root()).name.len();
        assert!(name.eq_or_subdomain_of(&self.node(self.root()).name));

        let mut cur = self.root();
        let mut remainder_len = name.len() - origin_len;
        loop {
            if remainder_len == 0 {
                return cur;
            }
            let remainder = &name.as_label_slice()[..remainder_len];
            let next_label = remainder[remainder_len - 1].clone();
            let existing = self.node(cur).children.get(&next_label).copied();
            match existing {
                None => {
                    let id = self.push_node(remainder.to_vec(), name.clone(), cur);
                    self.node_mut(cur).children.insert(next_label, id);
                    return id;
                }
                Some(child_id) => {
                    let cmp = compare_sequences(remainder, &self.node(child_id).key);
                    match cmp.relation {
                        NameRelation::Equal => return child_id,
                        NameRelation::Subdomain => {
                            remainder_len -= self.node(child_id).key.len();
                            cur = child_id;
                        }
                        NameRelation::Superdomain => {
                            // The new name sits between cur and child.
                            return self.split_child(child_id, remainder_len);
                        }
                        NameRelation::CommonAncestor => {
                            let mid = self.split_child(child_id, cmp.common_labels);
                            let new_key = remainder[..remainder_len - cmp.common_labels].to_vec();
                            let new_last = new_key[new_key.len() - 1].clone();
                            let id = self.push_node(new_key, name.clone(), mid);
                            self.node_mut(mid).children.insert(new_last, id);
                            return id;
                        }
                    }
                }
            }
        }
    }

    /// Splits `child`'s key, interposing a new branch node that keeps
    /// the rightmost `keep` labels of the key. The branch node takes
    /// `child`'s place under its parent; `child` becomes the branch
    /// node's child with the remaining labels. Returns the branch
    /// node's id.
    fn split_child(&mut self, child: NodeId, keep: usize) -> NodeId {
        let parent = self.node(child).parent.expect("cannot split the root");
        let child_key_len = self.node(child).key.len();
        assert!(keep > 0 && keep < child_key_len);

        let mid_key = self.node(child).key[child_key_len - keep..].to_vec();
        let mid_name = self
            .node(child)
            .name
            .superdomain(child_key_len - keep)
            .expect("branch name within child name");
        let mid = self.push_node(mid_key, mid_name, parent);

        let child_node = &mut self.nodes[child.0];
        child_node.key.truncate(child_key_len - keep);
        child_node.parent = Some(mid);
        let child_last = child_node.key[child_node.key.len() - 1].clone();

        self.node_mut(mid).children.insert(child_last, child);
        let mid_last = self.node(mid).key[keep - 1].clone();
        self.node_mut(parent).children.insert(mid_last, mid);
        mid
    }

    ////////////////////////////////////////////////////////////////////
    // SEARCH                                                         //
    ////////////////////////////////////////////////////////////////////

    /// Searches the tree for `name`.
    ///
    /// The search path receives every fully matched ancestor and the
    /// final comparison. `callback` is invoked on every
    /// callback-flagged node the search descends *through* (never on
    /// an exact-match node); returning `true` stops the descent with a
    /// partial match at that node.
    pub(crate) fn find_with<F>(
        &self,
        name: &Name,
        path: &mut SearchPath,
        mut callback: F,
    ) -> TreeFindResult
    where
        F: FnMut(NodeId, &TreeNode) -> bool,
    {
        path.clear();
        let origin = &self.node(self.root()).name;
        if !name.eq_or_subdomain_of(origin) {
            return TreeFindResult::NotFound;
        }

        let mut cur = self.root();
        let mut remainder_len = name.len() - origin.len();
        loop {
            if remainder_len == 0 {
                path.set_last(cur, equal_comparison(self.node(cur).key.len()));
                return TreeFindResult::Exact(cur);
            }
            if self.node(cur).callback && callback(cur, self.node(cur)) {
                return TreeFindResult::Partial(cur);
            }
            path.chain.push(cur);

            let remainder = &name.as_label_slice()[..remainder_len];
            let next_label: &Label = &remainder[remainder_len - 1];
            match self.node(cur).children.get(next_label) {
                None => {
                    self.record_missed_child(cur, next_label, path);
                    return TreeFindResult::Partial(cur);
                }
                Some(&child_id) => {
                    let cmp = compare_sequences(remainder, &self.node(child_id).key);
                    path.set_last(child_id, cmp);
                    match cmp.relation {
                        NameRelation::Equal => return TreeFindResult::Exact(child_id),
                        NameRelation::Subdomain => {
                            remainder_len -= self.node(child_id).key.len();
                            cur = child_id;
                        }
                        // Superdomain: the target stops above an
                        // existing node, i.e. it is an empty
                        // non-terminal. CommonAncestor: the target
                        // diverges from the child's key below a shared
                        // (empty non-terminal) label run.
                        NameRelation::Superdomain | NameRelation::CommonAncestor => {
                            return TreeFindResult::Partial(cur)
                        }
                    }
                }
            }
        }
    }

    /// Records the search context when no child of `cur` matches the
    /// target's next label: the in-order neighbour among the children
    /// (the smallest greater sibling if one exists, else the greatest
    /// smaller one), or `cur` itself for a childless node.
    fn record_missed_child(&self, cur: NodeId, next_label: &Label, path: &mut SearchPath) {
        use std::cmp::Ordering;
        let children = &self.node(cur).children;
        let above = children
            .range::<Label, _>((Bound::Excluded(next_label), Bound::Unbounded))
            .next();
        if let Some((_, &sib)) = above {
            path.set_last(sib, diverging_comparison(Ordering::Less));
        } else if let Some((_, &sib)) = children
            .range::<Label, _>((Bound::Unbounded, Bound::Excluded(next_label)))
            .next_back()
        {
            path.set_last(sib, diverging_comparison(Ordering::Greater));
        } else {
            path.set_last(
                cur,
                NameComparison {
                    relation: NameRelation::Subdomain,
                    order: Ordering::Greater,
                    common_labels: self.node(cur).key.len(),
                },
            );
        }
    }

    ////////////////////////////////////////////////////////////////////
    // IN-ORDER NAVIGATION                                            //
    ////////////////////////////////////////////////////////////////////

    /// Steps backward through the tree in canonical name order,
    /// starting from the position recorded in `path` by the previous
    /// search. Each call returns the next-smaller existing name's
    /// node, or `None` once the origin has been passed.
    pub(crate) fn previous_node(&self, path: &mut SearchPath) -> Option<NodeId> {
        use std::cmp::Ordering;
        let prev = match path.cursor {
            PrevCursor::Unset => {
                let (stop, cmp) = path.last_compared.expect("previous_node before find");
                if cmp.order == Ordering::Greater {
                    // The target sorts after everything in the stop
                    // node's subtree.
                    Some(self.last_in_subtree(stop))
                } else {
                    self.preorder_predecessor(stop)
                }
            }
            PrevCursor::At(id) => self.preorder_predecessor(id),
            PrevCursor::Done => None,
        };
        path.cursor = match prev {
            Some(id) => PrevCursor::At(id),
            None => PrevCursor::Done,
        };
        prev
    }

    /// Returns the node preceding `id` in canonical name order, or
    /// `None` at the root. A node's predecessor is the deepest last
    /// descendant of its previous sibling, or its parent if it is the
    /// first sibling.
    pub(crate) fn preorder_predecessor(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        match self.previous_sibling(id) {
            Some(sib) => Some(self.last_in_subtree(sib)),
            None => Some(parent),
        }
    }

    /// Returns the largest (canonically last) node in the subtree
    /// rooted at `id`.
    pub(crate) fn last_in_subtree(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some((_, &child)) = self.node(cur).children.iter().next_back() {
            cur = child;
        }
        cur
    }

    /// Returns the previous sibling of `id` under its parent, if any.
    pub(crate) fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let last: &Label = self.node(id).key.last().expect("non-root node has a key");
        self.node(parent)
            .children
            .range::<Label, _>((Bound::Unbounded, Bound::Excluded(last)))
            .next_back()
            .map(|(_, &sib)| sib)
    }

    /// Returns the next sibling of `id` under its parent, if any.
    pub(crate) fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        let last: &Label = self.node(id).key.last().expect("non-root node has a key");
        self.node(parent)
            .children
            .range::<Label, _>((Bound::Excluded(last), Bound::Unbounded))
            .next()
            .map(|(_, &sib)| sib)
    }
}

////////////////////////////////////////////////////////////////////////
// LABEL-SEQUENCE COMPARISON                                          //
////////////////////////////////////////////////////////////////////////

/// Compares two relative label sequences hierarchically (rightmost
/// label first), reporting the relation of `a` to `b`.
fn compare_sequences(a: &[LabelBuf], b: &[LabelBuf]) -> NameComparison {
    use std::cmp::Ordering;
    let mut common_labels = 0;
    for (la, lb) in a.iter().rev().zip(b.iter().rev()) {
        match la.cmp(lb) {
            Ordering::Equal => common_labels += 1,
            order => {
                return NameComparison {
                    relation: NameRelation::CommonAncestor,
                    order,
                    common_labels,
                }
            }
        }
    }
    let order = a.len().cmp(&b.len());
    let relation = match order {
        Ordering::Equal => NameRelation::Equal,
        Ordering::Less => NameRelation::Superdomain,
        Ordering::Greater => NameRelation::Subdomain,
    };
    NameComparison {
        relation,
        order,
        common_labels,
    }
}

fn equal_comparison(common_labels: usize) -> NameComparison {
    NameComparison {
        relation: NameRelation::Equal,
        order: std::cmp::Ordering::Equal,
        common_labels,
    }
}

fn diverging_comparison(order: std::cmp::Ordering) -> NameComparison {
    NameComparison {
        relation: NameRelation::CommonAncestor,
        order,
        common_labels: 0,
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
