//! Matching of two sorted sequences at their points of closest approach.
//!
//! The walk is a single merge pass: for every element of `one` the cursor
//! into `other` only moves forward, stopping as soon as the distance starts
//! to grow again. Consecutive elements of `one` that share the same closest
//! partner compete for it and only the strictly closest one survives (the
//! first wins on ties). A pair is emitted once the partner moves on, and the
//! pair pending when `one` runs out is always emitted, whatever its distance.

use serde::{Deserialize, Serialize};

/// `(i, j, distance)` with `distance = |one[i] - other[j]|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
}

impl MatchedPair {
    pub fn new(i: usize, j: usize, distance: f64) -> Self {
        Self { i, j, distance }
    }

    /// The same match seen from the other sequence.
    pub fn swapped(self) -> Self {
        Self::new(self.j, self.i, self.distance)
    }
}

/// Restartable handle over two sorted sequences.
///
/// Every call to [`MinimalPairs::iter`] starts a fresh walk, so a consumer
/// can never resume a half-consumed one.
#[derive(Debug, Clone, Copy)]
pub struct MinimalPairs<'a> {
    one: &'a [f64],
    other: &'a [f64],
}

impl<'a> MinimalPairs<'a> {
    /// Both slices must be sorted in the same (non-decreasing) direction.
    pub fn new(one: &'a [f64], other: &'a [f64]) -> Self {
        Self { one, other }
    }

    pub fn iter(&self) -> PairWalk<'a> {
        PairWalk {
            one: self.one,
            other: self.other,
            next_i: 0,
            pending: None,
        }
    }
}

impl<'a> IntoIterator for MinimalPairs<'a> {
    type Item = MatchedPair;
    type IntoIter = PairWalk<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass of the merge walk.
#[derive(Debug)]
pub struct PairWalk<'a> {
    one: &'a [f64],
    other: &'a [f64],
    next_i: usize,
    pending: Option<MatchedPair>,
}

impl Iterator for PairWalk<'_> {
    type Item = MatchedPair;

    fn next(&mut self) -> Option<MatchedPair> {
        if self.other.is_empty() {
            return None;
        }

        while self.next_i < self.one.len() {
            let i = self.next_i;
            self.next_i += 1;

            let from = self.pending.map_or(0, |p| p.j);
            let (j, distance) = closest_from(self.other, from, self.one[i]);
            let candidate = MatchedPair::new(i, j, distance);

            match self.pending {
                Some(pending) if pending.j != j => {
                    self.pending = Some(candidate);
                    return Some(pending);
                }
                Some(pending) if distance < pending.distance => self.pending = Some(candidate),
                Some(_) => {}
                None => self.pending = Some(candidate),
            }
        }

        self.pending.take()
    }
}

/// Closest element of `other[from..]` to `value`; stops at the first
/// increase in distance and keeps the earliest index on ties.
fn closest_from(other: &[f64], from: usize, value: f64) -> (usize, f64) {
    let mut best = (from, (value - other[from]).abs());
    for (j, candidate) in other.iter().enumerate().skip(from + 1) {
        let distance = (value - candidate).abs();
        if distance > best.1 {
            break;
        }
        if distance < best.1 {
            best = (j, distance);
        }
    }
    best
}

/// Eager form of [`MinimalPairs`].
pub fn minimal_pairs(one: &[f64], other: &[f64]) -> Vec<MatchedPair> {
    MinimalPairs::new(one, other).into_iter().collect()
}
