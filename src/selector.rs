//! Bounded subset-selection oracle.
//!
//! The assigner hands a small candidate list to a [`BoundedSelector`] and
//! asks for the cheapest subset whose aggregate weight falls inside an
//! inclusive window. The trait keeps the combinatorial engine injectable:
//! tests can substitute a brute-force oracle, callers can plug in an
//! external solver. [`DpSelector`] is the exact implementation shipped with
//! the crate.

use std::fmt;

/// One selectable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Caller-side identifier, carried through untouched.
    pub item: usize,
    /// Capacity consumed when selected.
    pub weight: u64,
    /// Cost incurred when selected.
    pub score: f64,
}

/// A chosen subset with its aggregate weight and score.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected `Candidate::item` values, in candidate order.
    pub items: Vec<usize>,
    pub weight: u64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// No candidates were offered.
    EmptyCandidates,
    /// No subset of the candidates has aggregate weight inside the window.
    WindowUnreachable { lo: u64, hi: u64 },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::EmptyCandidates => write!(f, "no candidates to select from"),
            SelectorError::WindowUnreachable { lo, hi } => {
                write!(f, "no subset reaches the weight window [{}, {}]", lo, hi)
            }
        }
    }
}

impl std::error::Error for SelectorError {}

/// Capacity-windowed minimum-score subset selection.
pub trait BoundedSelector {
    /// Return the subset of `candidates` whose summed weight lies in
    /// `[lo, hi]` and whose summed score is minimal.
    ///
    /// If the window cannot be reached because the candidates' total usable
    /// weight is below `lo`, the best feasible subset (all usable
    /// candidates) is returned instead. Ties must be broken
    /// deterministically, preferring lower-index candidates.
    fn select(&self, candidates: &[Candidate], lo: u64, hi: u64)
        -> Result<Selection, SelectorError>;
}

/// Exact selector: dynamic programming over the aggregate weight.
///
/// Runs in `O(candidates × hi)` time and memory: the choice table keeps one
/// row of `hi + 1` booleans per candidate, so memory grows with the
/// capacity ceiling, not just the candidate count. That is fine for the
/// capped candidate lists and the capacities (up to the low millions) this
/// crate hands it; for much larger ceilings, inject a different
/// [`BoundedSelector`] implementation instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpSelector;

impl BoundedSelector for DpSelector {
    fn select(
        &self,
        candidates: &[Candidate],
        lo: u64,
        hi: u64,
    ) -> Result<Selection, SelectorError> {
        if candidates.is_empty() {
            return Err(SelectorError::EmptyCandidates);
        }
        if lo > hi {
            return Err(SelectorError::WindowUnreachable { lo, hi });
        }

        let cap = hi as usize;
        // best[w] = minimum score of a subset of the items seen so far with
        // aggregate weight exactly w; taken[i][w] records the choice for
        // reconstruction.
        let mut best = vec![f64::INFINITY; cap + 1];
        best[0] = 0.0;
        let mut taken: Vec<Vec<bool>> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let mut row = vec![false; cap + 1];
            let w = candidate.weight as usize;
            if candidate.weight > 0 && candidate.weight <= hi {
                for weight in (w..=cap).rev() {
                    let with = best[weight - w] + candidate.score;
                    if with < best[weight] {
                        best[weight] = with;
                        row[weight] = true;
                    }
                }
            }
            taken.push(row);
        }

        let window_lo = lo as usize;
        let mut chosen: Option<usize> = None;
        for weight in window_lo..=cap {
            if best[weight].is_finite()
                && chosen.is_none_or(|current| best[weight] < best[current])
            {
                chosen = Some(weight);
            }
        }

        match chosen {
            Some(weight) => Ok(reconstruct(candidates, &taken, &best, weight)),
            None => {
                let usable: Vec<&Candidate> = candidates
                    .iter()
                    .filter(|c| c.weight > 0 && c.weight <= hi)
                    .collect();
                let total: u64 = usable.iter().map(|c| c.weight).sum();
                if total < lo && !usable.is_empty() {
                    // Window unreachable from below: everything usable is
                    // the closest feasible subset.
                    Ok(Selection {
                        items: usable.iter().map(|c| c.item).collect(),
                        weight: total,
                        score: usable.iter().map(|c| c.score).sum(),
                    })
                } else {
                    Err(SelectorError::WindowUnreachable { lo, hi })
                }
            }
        }
    }
}

fn reconstruct(
    candidates: &[Candidate],
    taken: &[Vec<bool>],
    best: &[f64],
    weight: usize,
) -> Selection {
    let score = best[weight];
    let mut items = Vec::new();
    let mut remaining = weight;
    for (i, candidate) in candidates.iter().enumerate().rev() {
        if taken[i][remaining] {
            items.push(candidate.item);
            remaining -= candidate.weight as usize;
        }
    }
    items.reverse();
    Selection {
        items,
        weight: weight as u64,
        score,
    }
}
