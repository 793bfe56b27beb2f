//! Item taxonomy: a read-only forest over item ids.
//!
//! `parents[item]` is the parent of `item`, with 0 meaning "no parent". Item 0
//! itself is the sentinel and never a real item. The taxonomy is validated
//! once on construction (parents in range, no cycles) and never mutated
//! afterwards, so mining code can walk ancestor chains without checks.

use super::error::MiningError;
use super::Item;

/// Something that can hand out a parent array, e.g. an external dictionary
/// loader. The array is indexed by item id and must have `parents[0] == 0`.
pub trait ParentSource {
    fn load_parents(&self) -> Result<Vec<Item>, MiningError>;
}

impl ParentSource for [Item] {
    fn load_parents(&self) -> Result<Vec<Item>, MiningError> {
        Ok(self.to_vec())
    }
}

impl ParentSource for Vec<Item> {
    fn load_parents(&self) -> Result<Vec<Item>, MiningError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    parents: Vec<Item>,
    depths: Vec<u32>,
    max_depth: u32,
}

impl Taxonomy {
    pub const MAX_FLAT_ITEM: Item = 1 << 24;

    /// Builds a taxonomy from a raw parent array.
    pub fn from_parents(mut parents: Vec<Item>) -> Result<Self, MiningError> {
        if parents.is_empty() {
            parents.push(0);
        }
        if parents[0] != 0 {
            return Err(MiningError::InvalidParent {
                item: 0,
                parent: parents[0],
            });
        }

        let len = parents.len();
        for (item, &parent) in parents.iter().enumerate() {
            if parent as usize >= len {
                return Err(MiningError::InvalidParent {
                    item: item as Item,
                    parent,
                });
            }
        }

        let depths = compute_depths(&parents)?;
        let max_depth = depths.iter().copied().max().unwrap_or(0);
        Ok(Self {
            parents,
            depths,
            max_depth,
        })
    }

    /// A taxonomy in which items `1..=max_item` are all roots.
    pub fn flat(max_item: Item) -> Self {
        let len = max_item as usize + 1;
        Self {
            parents: vec![0; len],
            depths: vec![0; len],
            max_depth: 0,
        }
    }

    /// Like [`Taxonomy::flat`], but refuses sizes above [`Taxonomy::MAX_FLAT_ITEM`]
    /// instead of allocating for them.
    pub fn try_flat(max_item: Item) -> Result<Self, MiningError> {
        if max_item > Self::MAX_FLAT_ITEM {
            return Err(MiningError::InvalidParameter {
                name: "max_item",
                value: i64::from(max_item),
                reason: "flat taxonomies are limited to 2^24 items",
            });
        }
        Ok(Self::flat(max_item))
    }

    /// Builds a taxonomy through a delegated loader.
    pub fn load<S: ParentSource + ?Sized>(source: &S) -> Result<Self, MiningError> {
        Self::from_parents(source.load_parents()?)
    }

    pub fn max_item(&self) -> Item {
        (self.parents.len() - 1) as Item
    }

    /// True when `item` is a real item of this taxonomy (not the sentinel).
    pub fn contains(&self, item: Item) -> bool {
        item != 0 && (item as usize) < self.parents.len()
    }

    pub fn has_parent(&self, item: Item) -> bool {
        self.parent_entry(item) != 0
    }

    pub fn parent(&self, item: Item) -> Option<Item> {
        match self.parent_entry(item) {
            0 => None,
            parent => Some(parent),
        }
    }

    pub fn root(&self, mut item: Item) -> Item {
        while let Some(parent) = self.parent(item) {
            item = parent;
        }
        item
    }

    /// True when `ancestor` is a strict ancestor of `item`.
    pub fn is_parent(&self, ancestor: Item, item: Item) -> bool {
        self.ancestors(item).any(|a| a == ancestor)
    }

    /// True when `general` equals `specific` or is one of its ancestors.
    pub fn is_generalization_of(&self, general: Item, specific: Item) -> bool {
        general == specific || self.is_parent(general, specific)
    }

    /// Number of edges between `item` and its root.
    pub fn depth(&self, item: Item) -> u32 {
        match self.depths.get(item as usize) {
            Some(&depth) => depth,
            None => self.out_of_range(item),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Deepest item that generalizes both `a` and `b`, if they share a tree.
    pub fn common_ancestor(&self, mut a: Item, mut b: Item) -> Option<Item> {
        while self.depth(a) > self.depth(b) {
            a = self.parent_entry(a);
        }
        while self.depth(b) > self.depth(a) {
            b = self.parent_entry(b);
        }
        while a != b {
            a = self.parent_entry(a);
            b = self.parent_entry(b);
        }
        (a != 0).then_some(a)
    }

    /// Strict ancestors of `item`, nearest first.
    pub fn ancestors(&self, item: Item) -> Ancestors<'_> {
        Ancestors {
            taxonomy: self,
            current: item,
        }
    }

    /// `item` followed by all of its ancestors.
    pub fn generalizations(&self, item: Item) -> impl Iterator<Item = Item> + '_ {
        std::iter::once(item).chain(self.ancestors(item))
    }

    /// Generalizations of `item` not above `bound`. Ancestor ids are not
    /// ordered, so the whole chain is walked.
    pub fn generalizations_up_to(&self, item: Item, bound: Item) -> impl Iterator<Item = Item> + '_ {
        self.generalizations(item).filter(move |&g| g <= bound)
    }

    pub fn parents(&self) -> &[Item] {
        &self.parents
    }

    fn parent_entry(&self, item: Item) -> Item {
        match self.parents.get(item as usize) {
            Some(&parent) => parent,
            None => self.out_of_range(item),
        }
    }

    fn out_of_range(&self, item: Item) -> ! {
        panic!(
            "item {} is outside the taxonomy (largest item is {})",
            item,
            self.max_item()
        )
    }
}

pub struct Ancestors<'a> {
    taxonomy: &'a Taxonomy,
    current: Item,
}

impl Iterator for Ancestors<'_> {
    type Item = Item;

    fn next(&mut self) -> Option<Item> {
        let parent = self.taxonomy.parent(self.current)?;
        self.current = parent;
        Some(parent)
    }
}

fn compute_depths(parents: &[Item]) -> Result<Vec<u32>, MiningError> {
    let mut depths: Vec<Option<u32>> = vec![None; parents.len()];
    depths[0] = Some(0);
    let mut path = Vec::new();

    for start in 1..parents.len() {
        if depths[start].is_some() {
            continue;
        }
        path.clear();
        let mut item = start;
        // walk up until a root or an item of known depth
        let base = loop {
            if let Some(depth) = depths[item] {
                break Some(depth);
            }
            if path.len() > parents.len() {
                return Err(MiningError::TaxonomyCycle(start as Item));
            }
            path.push(item);
            let parent = parents[item] as usize;
            if parent == 0 {
                break None;
            }
            item = parent;
        };

        let mut depth = base.map_or(0, |d| d + 1);
        for &node in path.iter().rev() {
            depths[node] = Some(depth);
            depth += 1;
        }
    }

    Ok(depths.into_iter().map(|d| d.unwrap_or(0)).collect())
}
