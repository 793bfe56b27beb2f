use std::collections::HashSet;

use crate::seq::Item;

#[derive(Debug, Default)]
struct LevelMemo {
    /// Per right depth: last items of patterns that had a right extension.
    extended: Vec<HashSet<Item>>,
    /// Per right depth: items confirmed frequent as the next right item.
    confirmed: Vec<HashSet<Item>>,
}

impl LevelMemo {
    fn is_empty(&self) -> bool {
        self.extended.iter().all(HashSet::is_empty) && self.confirmed.iter().all(HashSet::is_empty)
    }

    fn clear(&mut self) {
        self.extended.iter_mut().for_each(HashSet::clear);
        self.confirmed.iter_mut().for_each(HashSet::clear);
    }
}

fn slot(sets: &mut Vec<HashSet<Item>>, depth: usize) -> &mut HashSet<Item> {
    if sets.len() <= depth {
        sets.resize_with(depth + 1, HashSet::new);
    }
    &mut sets[depth]
}

/// Right-extension memo of the indexed pivot miner, one entry per left level.
///
/// Only the levels of the left branch currently being explored hold data: a
/// level is cleared before each of its sibling branches starts and again when
/// the recursion leaves it.
#[derive(Debug, Default)]
pub struct MemoTables {
    levels: Vec<LevelMemo>,
}

impl MemoTables {
    pub fn new() -> Self {
        Self::default()
    }

    fn level_mut(&mut self, level: usize) -> &mut LevelMemo {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, LevelMemo::default);
        }
        &mut self.levels[level]
    }

    pub fn confirm_right(&mut self, level: usize, depth: usize, item: Item) {
        slot(&mut self.level_mut(level).confirmed, depth).insert(item);
    }

    pub fn is_confirmed(&self, level: usize, depth: usize, item: Item) -> bool {
        self.levels
            .get(level)
            .and_then(|memo| memo.confirmed.get(depth))
            .is_some_and(|set| set.contains(&item))
    }

    pub fn mark_extended(&mut self, level: usize, depth: usize, last: Item) {
        slot(&mut self.level_mut(level).extended, depth).insert(last);
    }

    pub fn was_extended(&self, level: usize, depth: usize, last: Item) -> bool {
        self.levels
            .get(level)
            .and_then(|memo| memo.extended.get(depth))
            .is_some_and(|set| set.contains(&last))
    }

    pub fn clear_level(&mut self, level: usize) {
        if let Some(memo) = self.levels.get_mut(level) {
            memo.clear();
        }
    }

    /// True when `level` and every deeper level hold no data.
    pub fn is_clear_from(&self, level: usize) -> bool {
        self.levels.iter().skip(level).all(LevelMemo::is_empty)
    }

    pub fn clear(&mut self) {
        self.levels.iter_mut().for_each(LevelMemo::clear);
    }
}
