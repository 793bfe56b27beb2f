use std::collections::BTreeMap;
use std::mem;

use crate::seq::error::CodecError;
use crate::seq::utils::{PostingCursor, PostingList, SequenceLevel, TransactionStore};
use crate::seq::Item;

/// Joins the start positions of a length-k sequence `s` (left) with those of
/// a length-k sequence `t` (right) whose first k-1 items equal the last k-1
/// items of `s`.
///
/// A left start `l` survives if some right start `r` satisfies
/// `l < r <= l + gamma + 1`, i.e. `t` can begin right after the first item of
/// `s` within the gap constraint. Surviving starts are written to `out`; the
/// returned support is the summed weight of transactions with at least one
/// survivor.
pub fn join_postings(
    left: &PostingList,
    right: &PostingList,
    gamma: u32,
    transactions: &TransactionStore,
    out: &mut PostingList,
) -> Result<u64, CodecError> {
    if left.is_empty() || right.is_empty() {
        return Ok(0);
    }
    let reach = u64::from(gamma) + 1;
    let mut support = 0;
    let mut lc = left.cursor();
    let mut rc = right.cursor();
    let mut lt = lc.next_value()?;
    let mut rt = rc.next_value()?;

    loop {
        if lt < rt {
            if !lc.next_posting()? {
                break;
            }
            lt = lc.next_value()?;
        } else if rt < lt {
            if !rc.next_posting()? {
                break;
            }
            rt = rc.next_value()?;
        } else {
            if join_transaction(lt, &mut lc, &mut rc, reach, out)? {
                support += transactions.weight(lt);
            }
            if !lc.next_posting()? || !rc.next_posting()? {
                break;
            }
            lt = lc.next_value()?;
            rt = rc.next_value()?;
        }
    }
    Ok(support)
}

/// Merges the positions of one transaction present on both sides.
fn join_transaction(
    transaction: u32,
    lc: &mut PostingCursor<'_>,
    rc: &mut PostingCursor<'_>,
    reach: u64,
    out: &mut PostingList,
) -> Result<bool, CodecError> {
    let mut matched = false;
    let mut right_pos: Option<u64> = None;

    while lc.has_next_value() {
        let left_pos = lc.next_value()?;
        // smallest right start after the left start
        while right_pos.map_or(true, |r| r <= u64::from(left_pos)) {
            if !rc.has_next_value() {
                return Ok(matched);
            }
            right_pos = Some(u64::from(rc.next_value()?));
        }
        let within = right_pos.is_some_and(|r| r - u64::from(left_pos) <= reach);
        if within {
            if !matched {
                out.begin_posting(transaction);
                matched = true;
            }
            out.push_value(left_pos);
        }
    }
    Ok(matched)
}

/// Builds level k+1 from level k.
///
/// Sequences are indexed by their (k-1)-prefix and (k-1)-suffix; every pair
/// (left, right) where the suffix of left equals the prefix of right is
/// joined. Join keys are visited in ascending order, left and right
/// sequences in level order.
pub fn extend_level(
    level: &SequenceLevel,
    gamma: u32,
    sigma: u64,
    transactions: &TransactionStore,
) -> Result<SequenceLevel, CodecError> {
    let k = level.sequence_len;
    let mut by_prefix: BTreeMap<Vec<Item>, Vec<usize>> = BTreeMap::new();
    let mut by_suffix: BTreeMap<Vec<Item>, Vec<usize>> = BTreeMap::new();
    let mut buffer = Vec::with_capacity(k + 1);
    for idx in 0..level.len() {
        level.write_sequence(idx, &mut buffer);
        by_prefix.entry(buffer[..k - 1].to_vec()).or_default().push(idx);
        by_suffix.entry(buffer[1..].to_vec()).or_default().push(idx);
    }

    let mut next = SequenceLevel::new(k + 1);
    let mut joined = PostingList::new();
    for (key, lefts) in &by_suffix {
        let Some(rights) = by_prefix.get(key) else {
            continue;
        };
        for &left in lefts {
            let mut head = None;
            for &right in rights {
                joined.clear();
                let support = join_postings(
                    level.postings(left),
                    level.postings(right),
                    gamma,
                    transactions,
                    &mut joined,
                )?;
                if support < sigma {
                    continue;
                }
                let suffix = level.last_item(right);
                let postings = mem::take(&mut joined);
                head = Some(match head {
                    None => {
                        level.write_sequence(left, &mut buffer);
                        buffer.push(suffix);
                        next.push_full(&buffer, support, postings)
                    }
                    Some(head) => {
                        next.push_shared(head, suffix, support, postings);
                        head
                    }
                });
            }
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::utils::posting::{encode, Posting};

    fn store(weights: &[u32]) -> TransactionStore {
        let mut store = TransactionStore::new();
        for &weight in weights {
            store.push(&[], weight);
        }
        store
    }

    fn list(postings: &[(u32, &[u32])]) -> PostingList {
        let postings: Vec<Posting> = postings
            .iter()
            .map(|&(transaction, positions)| Posting {
                transaction,
                positions: positions.to_vec(),
            })
            .collect();
        encode(&postings)
    }

    #[test]
    fn join_keeps_left_starts_within_reach() {
        let transactions = store(&[1, 2, 4]);
        let left = list(&[(0, &[0, 5]), (1, &[3]), (2, &[1])]);
        let right = list(&[(0, &[1, 9]), (2, &[2])]);

        let mut out = PostingList::new();
        let support = join_postings(&left, &right, 0, &transactions, &mut out).unwrap();
        assert_eq!(support, 1 + 4);
        assert_eq!(
            out.decode().unwrap(),
            vec![
                Posting { transaction: 0, positions: vec![0] },
                Posting { transaction: 2, positions: vec![1] },
            ]
        );
    }

    #[test]
    fn gap_widens_reach() {
        let transactions = store(&[1]);
        let left = list(&[(0, &[0])]);
        let right = list(&[(0, &[3])]);

        let mut out = PostingList::new();
        assert_eq!(join_postings(&left, &right, 1, &transactions, &mut out).unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(join_postings(&left, &right, 2, &transactions, &mut out).unwrap(), 1);
    }

    #[test]
    fn extension_shares_heads() {
        let transactions = store(&[1]);
        // [1,2,3] and [1,2,4] at position 0
        let mut level = SequenceLevel::new(2);
        level.push_full(&[1, 2], 1, list(&[(0, &[0])]));
        level.push_full(&[2, 3], 1, list(&[(0, &[1])]));
        level.push_full(&[2, 4], 1, list(&[(0, &[1])]));

        let next = extend_level(&level, 1, 1, &transactions).unwrap();
        assert_eq!(next.iter_sequences().collect::<Vec<_>>(), vec![vec![1, 2, 3], vec![1, 2, 4]]);
        assert!(!next.is_shared(0));
        assert!(next.is_shared(1));
    }
}
