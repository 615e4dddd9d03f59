//! Hash-addressed quad cells.
//!
//! A cell's hash spells its path from the root: the root is `"0"`, and each
//! subdivision appends the child index as two binary digits (`00`..`11`).
//! Children of the root drop the root's `"0"` prefix, so they are `"00"`,
//! `"01"`, `"10"` and `"11"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{GeomError, GeomResult};
use super::quadtree::SpatialCell;

pub const ROOT_HASH: &str = "0";

/// A hashed quad cell; a leaf when `children` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zell {
    pub level: usize,
    pub parent: Option<String>,
    pub children: Option<[String; 4]>,
    pub hash: String,
}

impl Zell {
    #[must_use]
    pub fn root() -> Self {
        Self {
            level: 0,
            parent: None,
            children: None,
            hash: ROOT_HASH.to_owned(),
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    fn child_hash(&self, index: usize) -> String {
        let id = format!("{index:02b}");
        if self.hash == ROOT_HASH {
            id
        } else {
            format!("{}{id}", self.hash)
        }
    }
}

/// Splits a leaf into four leaf children.
///
/// Returns the input as a parent carrying the children's hashes, together
/// with the children themselves.
pub fn subdivide(cell: &Zell) -> GeomResult<(Zell, [Zell; 4])> {
    if !cell.is_leaf() {
        return Err(GeomError::parameter(format!(
            "cell {} is already subdivided",
            cell.hash
        )));
    }

    let children = [0, 1, 2, 3].map(|index| Zell {
        level: cell.level + 1,
        parent: Some(cell.hash.clone()),
        children: None,
        hash: cell.child_hash(index),
    });
    let parent = Zell {
        children: Some(children.clone().map(|child| child.hash)),
        ..cell.clone()
    };
    Ok((parent, children))
}

/// Child indices encoded by a hash, root first. `None` for malformed hashes.
fn path(hash: &str) -> Option<Vec<u8>> {
    if hash == ROOT_HASH {
        return Some(Vec::new());
    }
    if hash.is_empty() || hash.len() % 2 != 0 {
        return None;
    }
    hash.as_bytes()
        .chunks(2)
        .map(|pair| match pair {
            [b'0', b'0'] => Some(0),
            [b'0', b'1'] => Some(1),
            [b'1', b'0'] => Some(2),
            [b'1', b'1'] => Some(3),
            _ => None,
        })
        .collect()
}

/// Arena of cells keyed by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZellTree {
    cells: BTreeMap<String, Zell>,
}

impl Default for ZellTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ZellTree {
    /// A tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        let root = Zell::root();
        let mut cells = BTreeMap::new();
        cells.insert(root.hash.clone(), root);
        Self { cells }
    }

    #[must_use]
    pub fn root(&self) -> Option<&Zell> {
        self.cells.get(ROOT_HASH)
    }

    #[must_use]
    pub fn get(&self, hash: &str) -> Option<&Zell> {
        self.cells.get(hash)
    }

    #[must_use]
    pub fn contains(&self, hash: &str) -> bool {
        self.cells.contains_key(hash)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Subdivides the leaf `hash`, returning the new children's hashes.
    pub fn subdivide(&mut self, hash: &str) -> GeomResult<[String; 4]> {
        let cell = self
            .cells
            .get(hash)
            .ok_or_else(|| GeomError::parameter(format!("unknown cell {hash}")))?;
        let (parent, children) = subdivide(cell)?;
        let hashes = children.clone().map(|child| child.hash);

        self.cells.insert(parent.hash.clone(), parent);
        for child in children {
            self.cells.insert(child.hash.clone(), child);
        }
        Ok(hashes)
    }

    /// Subdivides every current leaf once.
    pub fn subdivide_leaves(&mut self) -> GeomResult<usize> {
        let leaves: Vec<String> = self.leaves().map(|cell| cell.hash.clone()).collect();
        for hash in &leaves {
            self.subdivide(hash)?;
        }
        Ok(leaves.len())
    }

    #[must_use]
    pub fn parent(&self, hash: &str) -> Option<&Zell> {
        let parent = self.cells.get(hash)?.parent.as_deref()?;
        self.cells.get(parent)
    }

    /// Children in index order; empty for leaves and unknown hashes.
    #[must_use]
    pub fn children(&self, hash: &str) -> Vec<&Zell> {
        self.cells
            .get(hash)
            .and_then(|cell| cell.children.as_ref())
            .map(|hashes| hashes.iter().filter_map(|h| self.cells.get(h)).collect())
            .unwrap_or_default()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Zell> {
        self.cells.values().filter(|cell| cell.is_leaf())
    }

    /// Ancestors of `hash`, nearest first, ending at the root.
    #[must_use]
    pub fn ancestors(&self, hash: &str) -> Vec<&Zell> {
        let mut out = Vec::new();
        let mut current = self.parent(hash);
        while let Some(cell) = current {
            out.push(cell);
            current = cell.parent.as_deref().and_then(|p| self.cells.get(p));
        }
        out
    }

    /// Geometry of the cell `hash` when the root covers `root`.
    ///
    /// Child indices follow [`SpatialCell::divide`]: sw, nw, se, ne.
    #[must_use]
    pub fn cell_bounds(&self, hash: &str, root: SpatialCell) -> Option<SpatialCell> {
        if !self.contains(hash) {
            return None;
        }
        let mut cell = root;
        for index in path(hash)? {
            cell = *cell.divide().get(usize::from(index))?;
        }
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdivide_root() {
        let (parent, children) = subdivide(&Zell::root()).unwrap();
        assert_eq!(parent.level, 0);
        assert!(!parent.is_leaf());
        let hashes: Vec<&str> = children.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, ["00", "01", "10", "11"]);
        assert!(children.iter().all(|c| c.level == 1 && c.is_leaf()));
        assert!(children.iter().all(|c| c.parent.as_deref() == Some("0")));
    }

    #[test]
    fn subdivide_parent_fails() {
        let (parent, _) = subdivide(&Zell::root()).unwrap();
        assert!(matches!(subdivide(&parent), Err(GeomError::InvalidParameter(_))));
    }

    #[test]
    fn path_decoding() {
        assert_eq!(path("0"), Some(vec![]));
        assert_eq!(path("1101"), Some(vec![3, 1]));
        assert_eq!(path("012"), None);
        assert_eq!(path("0a"), None);
    }
}
