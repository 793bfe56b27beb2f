use crate::seq::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

/// Items reachable from a position within the gap constraint.
///
/// Walks away from the start position and yields `(index, item)` for every
/// item whose distance to the start leaves at most `gamma` irrelevant items in
/// between. Gap entries (`-g`) widen the distance by `g` without being
/// yielded.
#[derive(Debug, Clone)]
pub struct Window<'a> {
    entries: &'a [i32],
    next: Option<usize>,
    direction: Direction,
    skipped: u64,
    gamma: u64,
}

/// Window to the right of `position`.
pub fn right_of(entries: &[i32], position: usize, gamma: u32) -> Window<'_> {
    Window {
        entries,
        next: Some(position + 1).filter(|&index| index < entries.len()),
        direction: Direction::Right,
        skipped: 0,
        gamma: u64::from(gamma),
    }
}

/// Window to the left of `position`.
pub fn left_of(entries: &[i32], position: usize, gamma: u32) -> Window<'_> {
    Window {
        entries,
        next: position.checked_sub(1),
        direction: Direction::Left,
        skipped: 0,
        gamma: u64::from(gamma),
    }
}

impl Iterator for Window<'_> {
    type Item = (usize, Item);

    fn next(&mut self) -> Option<(usize, Item)> {
        loop {
            if self.skipped > self.gamma {
                return None;
            }
            let index = self.next?;
            self.next = match self.direction {
                Direction::Right => Some(index + 1).filter(|&i| i < self.entries.len()),
                Direction::Left => index.checked_sub(1),
            };

            let entry = self.entries[index];
            if entry < 0 {
                self.skipped += u64::from(entry.unsigned_abs());
                continue;
            }
            self.skipped += 1;
            return Some((index, entry as Item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_window_respects_gamma() {
        let entries = [1, 2, 3, 4];
        let got: Vec<_> = right_of(&entries, 0, 0).collect();
        assert_eq!(got, vec![(1, 2)]);
        let got: Vec<_> = right_of(&entries, 0, 1).collect();
        assert_eq!(got, vec![(1, 2), (2, 3)]);
        assert_eq!(right_of(&entries, 3, 5).count(), 0);
    }

    #[test]
    fn gap_entries_consume_width() {
        let entries = [1, -1, 2, -3, 5];
        assert_eq!(right_of(&entries, 0, 0).count(), 0);
        assert_eq!(right_of(&entries, 0, 1).collect::<Vec<_>>(), vec![(2, 2)]);
        assert_eq!(right_of(&entries, 0, 4).collect::<Vec<_>>(), vec![(2, 2)]);
        assert_eq!(
            right_of(&entries, 0, 5).collect::<Vec<_>>(),
            vec![(2, 2), (4, 5)]
        );
    }

    #[test]
    fn left_window_walks_backwards() {
        let entries = [7, -2, 8, 9];
        assert_eq!(left_of(&entries, 3, 0).collect::<Vec<_>>(), vec![(2, 8)]);
        assert_eq!(left_of(&entries, 2, 1).count(), 0);
        assert_eq!(left_of(&entries, 2, 2).collect::<Vec<_>>(), vec![(0, 7)]);
        assert_eq!(left_of(&entries, 0, 9).count(), 0);
    }
}
