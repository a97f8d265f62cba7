/*!
Single-winner instant-runoff tabulation.

Ballots are ranked lists of candidate identifiers, most preferred first. Every
round credits each ballot to its highest-ranked candidate still running. A
candidate holding a majority of all the original ballots wins; otherwise the
weakest candidate is eliminated and the ballots are counted again.

```
use ranked_choice::RankedChoice;

let ballots = vec![
    vec!["A", "B", "C"],
    vec!["B", "A", "C"],
    vec!["C", "B", "A"],
    vec!["A", "B", "C"],
    vec!["B", "A", "C"],
];
let winner = RankedChoice::new(ballots).get_winning_proposal()?;
assert_eq!(winner, "B");
# Ok::<(), ranked_choice::TabulationError>(())
```

See the [manual] for the exact rules.
*/

pub mod builder;
mod config;
pub mod manual;

use log::{debug, info};

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    ops::AddAssign,
};

pub use crate::config::*;

// **** Private structures ****

type RoundId = u32;

// Index of a candidate in the sorted list of candidates. The order of the ids is
// the order of the candidate identifiers.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

// Invariant: count is never zero.
#[derive(Eq, PartialEq, Debug, Clone)]
struct VoteInternal {
    ranks: Vec<CandidateId>,
    count: VoteCount,
}

/// The candidates still running and the number of ballots they hold in the
/// current round.
type CandidatePool = BTreeMap<CandidateId, VoteCount>;

/// A ranked-choice tabulator for one election.
///
/// All the derived data (threshold, Borda scores) is computed once at
/// construction. Running the tabulation consumes the tabulator: a new one
/// must be built for every ballot set.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedChoice<C> {
    // Sorted and deduplicated. CandidateId(i) refers to candidates[i].
    candidates: Vec<C>,
    votes: Vec<VoteInternal>,
    // Wider than the counts: a weighted ballot of length L scores up to L * count.
    borda_scores: Vec<u128>,
    total_ballots: VoteCount,
    threshold: VoteCount,
}

impl<C: Clone + Ord + Debug> RankedChoice<C> {
    /// Creates a tabulator where every ballot counts once.
    pub fn new(ballots: Vec<Vec<C>>) -> RankedChoice<C> {
        let total_ballots = VoteCount(ballots.len() as u64);
        RankedChoice::from_parts(
            ballots.into_iter().map(|b| (b, 1)).collect(),
            total_ballots,
        )
    }

    /// Creates a tabulator from ballots that each stand for `count` identical
    /// ballots. Ballots with a count of zero are ignored.
    ///
    /// [VotingErrors::TooManyBallots] is returned if the counts add up to
    /// more than `u64::MAX`.
    pub fn from_weighted(ballots: Vec<(Vec<C>, u64)>) -> Result<RankedChoice<C>, VotingErrors> {
        let total = ballots
            .iter()
            .try_fold(0u64, |acc, (_, count)| acc.checked_add(*count))
            .ok_or(VotingErrors::TooManyBallots)?;
        Ok(RankedChoice::from_parts(ballots, VoteCount(total)))
    }

    // total_ballots is the sum of the counts, already checked by the caller.
    fn from_parts(ballots: Vec<(Vec<C>, u64)>, total_ballots: VoteCount) -> RankedChoice<C> {
        let candidates: Vec<C> = ballots
            .iter()
            .flat_map(|(ranks, _)| ranks.iter())
            .cloned()
            .collect::<BTreeSet<C>>()
            .into_iter()
            .collect();
        let ids: BTreeMap<&C, CandidateId> = candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| (c, CandidateId(idx as u32)))
            .collect();

        let mut votes: Vec<VoteInternal> = Vec::with_capacity(ballots.len());
        for (ranks, count) in ballots.iter() {
            if *count == 0 {
                debug!("from_parts: skipping ballot with zero count: {:?}", ranks);
                continue;
            }
            votes.push(VoteInternal {
                ranks: ranks.iter().filter_map(|c| ids.get(c).cloned()).collect(),
                count: VoteCount(*count),
            });
        }

        let borda_scores = compute_borda_scores(&votes, candidates.len());
        let threshold = get_threshold(total_ballots);
        debug!(
            "from_parts: {} candidates, {:?} ballots, threshold {:?}",
            candidates.len(),
            total_ballots,
            threshold
        );

        RankedChoice {
            candidates,
            votes,
            borda_scores,
            total_ballots,
            threshold,
        }
    }

    pub fn total_ballots(&self) -> u64 {
        self.total_ballots.0
    }

    /// The number of ballots a candidate must hold to win.
    pub fn threshold(&self) -> u64 {
        self.threshold.0
    }

    /// All the candidates appearing on at least one ballot, sorted.
    pub fn candidates(&self) -> &[C] {
        &self.candidates
    }

    /// The positional score of a candidate, computed from the original ballots.
    pub fn borda_score(&self, candidate: &C) -> Option<u128> {
        self.candidates
            .binary_search(candidate)
            .ok()
            .map(|idx| self.borda_scores[idx])
    }

    /// Runs the elimination rounds and returns the winner.
    ///
    /// [TabulationError::WinnerNotFound] is returned if no candidate ever
    /// reaches the majority of the original ballots.
    pub fn get_winning_proposal(self) -> Result<C, TabulationError> {
        self.tabulate().into_winner()
    }

    /// Runs the elimination rounds and returns the outcome along with the
    /// statistics of every round.
    pub fn tabulate(self) -> Tabulation<C> {
        info!(
            "Processing {:?} ballots ({:?} distinct), candidates: {:?}",
            self.total_ballots.0,
            self.votes.len(),
            self.candidates
        );

        let mut pool: CandidatePool = (0..self.candidates.len())
            .map(|idx| (CandidateId(idx as u32), VoteCount::EMPTY))
            .collect();
        let mut round_stats: Vec<RoundStats<C>> = Vec::new();
        let mut winner: Option<CandidateId> = None;
        let mut round_id: RoundId = 1;

        loop {
            let exhausted = self.tally_votes(&mut pool);
            let elected = self.find_winner(&pool);
            let mut stats = RoundStats {
                round: round_id,
                tally: pool
                    .iter()
                    .map(|(cid, vc)| (self.candidate(*cid), vc.0))
                    .collect(),
                exhausted: exhausted.0,
                elected: elected.map(|cid| self.candidate(cid)),
                eliminated: None,
            };
            self.log_round(&stats);

            if let Some(cid) = elected {
                winner = Some(cid);
                round_stats.push(stats);
                break;
            }

            let eliminated = if pool.len() > 1 {
                self.find_eliminated_candidate(&pool)
            } else {
                None
            };
            let (cid, tiebreak, tied) = match eliminated {
                Some(x) => x,
                None => {
                    debug!(
                        "tabulate: round {}: {} candidate(s) left without a majority, stopping",
                        round_id,
                        pool.len()
                    );
                    round_stats.push(stats);
                    break;
                }
            };
            debug!(
                "tabulate: round {}: eliminating {:?} ({:?} among {:?})",
                round_id, cid, tiebreak, tied
            );
            pool.remove(&cid);
            for count in pool.values_mut() {
                *count = VoteCount::EMPTY;
            }

            stats.eliminated = Some(EliminationStats {
                candidate: self.candidate(cid),
                tiebreak,
                tied_with: tied.iter().map(|c| self.candidate(*c)).collect(),
            });
            round_stats.push(stats);
            round_id += 1;
        }

        let winner = winner.map(|cid| self.candidate(cid));
        match &winner {
            Some(w) => info!("Winner: {:?} after {} round(s)", w, round_stats.len()),
            None => info!("No winner after {} round(s)", round_stats.len()),
        }
        Tabulation {
            winner,
            threshold: self.threshold.0,
            total_ballots: self.total_ballots.0,
            round_stats,
        }
    }

    fn candidate(&self, cid: CandidateId) -> C {
        self.candidates[cid.0 as usize].clone()
    }

    /// Credits every ballot to its first candidate still in the pool.
    /// Returns the number of exhausted ballots.
    fn tally_votes(&self, pool: &mut CandidatePool) -> VoteCount {
        let mut exhausted = VoteCount::EMPTY;
        for v in self.votes.iter() {
            match v.ranks.iter().find(|cid| pool.contains_key(*cid)) {
                Some(cid) => {
                    if let Some(vc) = pool.get_mut(cid) {
                        *vc += v.count;
                    }
                }
                None => exhausted += v.count,
            }
        }
        debug_assert!(pool.values().cloned().sum::<VoteCount>() <= self.total_ballots);
        exhausted
    }

    fn find_winner(&self, pool: &CandidatePool) -> Option<CandidateId> {
        pool.iter()
            .find(|(_, vc)| **vc >= self.threshold)
            .map(|(cid, _)| *cid)
    }

    /// Picks the weakest candidate of the round: the lowest tally, then the
    /// lowest Borda score, then the greatest identifier.
    fn find_eliminated_candidate(
        &self,
        pool: &CandidatePool,
    ) -> Option<(CandidateId, TiebreakSituation, Vec<CandidateId>)> {
        let min_count: VoteCount = pool.values().min().cloned()?;
        let all_smallest: Vec<CandidateId> = pool
            .iter()
            .filter(|(_, vc)| **vc == min_count)
            .map(|(cid, _)| *cid)
            .collect();
        debug!(
            "find_eliminated_candidate: all_smallest: {:?} with {:?}",
            all_smallest, min_count
        );

        if let [cid] = all_smallest.as_slice() {
            return Some((*cid, TiebreakSituation::Clean, all_smallest.clone()));
        }

        let borda = |cid: &CandidateId| self.borda_scores[cid.0 as usize];
        let min_borda = all_smallest.iter().map(borda).min()?;
        let lowest_borda: Vec<CandidateId> = all_smallest
            .iter()
            .filter(|cid| borda(*cid) == min_borda)
            .cloned()
            .collect();
        debug!(
            "find_eliminated_candidate: lowest borda score {}: {:?}",
            min_borda, lowest_borda
        );

        let tiebreak = if lowest_borda.len() == 1 {
            TiebreakSituation::Borda
        } else {
            TiebreakSituation::CandidateOrder
        };
        // Ids are sorted, the last one is the greatest identifier.
        let eliminated = *lowest_borda.last()?;
        Some((eliminated, tiebreak, all_smallest))
    }

    fn log_round(&self, stats: &RoundStats<C>) {
        info!(
            "Round {} (winning threshold: {})",
            stats.round, self.threshold.0
        );
        for (c, count) in stats.tally.iter() {
            if stats.elected.as_ref() == Some(c) {
                info!("{:>8} {:?} -> elected", count, c);
            } else {
                info!("{:>8} {:?}", count, c);
            }
        }
        if stats.exhausted > 0 {
            info!("{:>8} exhausted", stats.exhausted);
        }
    }
}

fn get_threshold(total_count: VoteCount) -> VoteCount {
    VoteCount((total_count.0 / 2) + 1)
}

/// A ballot of length L gives L - p points to the candidate at position p.
///
/// The scores cannot overflow: the counts add up to at most `u64::MAX` and a
/// ballot has at most `u32::MAX` candidates.
fn compute_borda_scores(votes: &[VoteInternal], num_candidates: usize) -> Vec<u128> {
    let mut scores: Vec<u128> = vec![0; num_candidates];
    for v in votes.iter() {
        let len = v.ranks.len() as u128;
        for (pos, cid) in v.ranks.iter().enumerate() {
            scores[cid.0 as usize] += (len - pos as u128) * v.count.0 as u128;
        }
    }
    scores
}
