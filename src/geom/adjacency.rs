//! Edge extraction from element connectivity.

use std::collections::{BTreeMap, BTreeSet};
use std::iter::{Chain, Peekable};
use std::option;

use serde::{Deserialize, Serialize};

use super::mesh::NodeId;

/// Undirected edge stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge(NodeId, NodeId);

impl Edge {
    #[must_use]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    #[must_use]
    pub fn lo(self) -> NodeId {
        self.0
    }

    #[must_use]
    pub fn hi(self) -> NodeId {
        self.1
    }

    #[must_use]
    pub fn nodes(self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

impl From<(NodeId, NodeId)> for Edge {
    fn from((a, b): (NodeId, NodeId)) -> Self {
        Self::new(a, b)
    }
}

/// Lazy consecutive pairs `(x0, x1), (x1, x2), ...`.
pub struct Pairwise<I: Iterator> {
    iter: Peekable<I>,
}

impl<I> Iterator for Pairwise<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let a = self.iter.next()?;
        let b = self.iter.peek()?.clone();
        Some((a, b))
    }
}

pub fn pairwise<I>(items: I) -> Pairwise<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Clone,
{
    Pairwise {
        iter: items.into_iter().peekable(),
    }
}

/// [`pairwise`] closed with a final `(last, first)` pair.
pub type PairwiseCircular<I> = Pairwise<Chain<I, option::IntoIter<<I as Iterator>::Item>>>;

/// Consecutive pairs plus the wrap-around pair `(last, first)`. Empty input
/// yields nothing; a single item pairs with itself.
pub fn pairwise_circular<I>(items: I) -> PairwiseCircular<I::IntoIter>
where
    I: IntoIterator,
    I::IntoIter: Clone,
    I::Item: Clone,
{
    let iter = items.into_iter();
    let first = iter.clone().next();
    pairwise(iter.chain(first))
}

#[must_use]
pub fn upper_diagonal(pair: (NodeId, NodeId)) -> Edge {
    Edge::from(pair)
}

/// Canonical edges around one element, in traversal order.
pub fn adjacency_upper_diagonal(element: &[NodeId]) -> impl Iterator<Item = Edge> + '_ {
    pairwise_circular(element.iter().copied()).map(upper_diagonal)
}

/// Deduplicated undirected edges of every element, independent of winding.
pub fn adjacencies_upper_diagonal<'a, I>(elements: I) -> BTreeSet<Edge>
where
    I: IntoIterator<Item = &'a [NodeId]>,
{
    elements
        .into_iter()
        .flat_map(adjacency_upper_diagonal)
        .filter(|edge| edge.lo() != edge.hi())
        .collect()
}

/// Neighbor sets keyed by node.
#[must_use]
pub fn neighbors(edges: &BTreeSet<Edge>) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    let mut map: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for edge in edges {
        let (a, b) = edge.nodes();
        map.entry(a).or_default().insert(b);
        map.entry(b).or_default().insert(a);
    }
    map
}
