use std::collections::BTreeSet;
use std::fmt::{Debug, Display};

use log::debug;

pub use crate::config::*;
use crate::RankedChoice;

/// A builder for collecting the ballots of an election.
///
/// The builder checks the ballots before they reach the tabulator: a ballot
/// may not rank the same candidate twice, and if candidates were declared, it
/// may only rank declared candidates. An election without ballots is refused.
///
/// ```
/// use ranked_choice::builder::Builder;
/// # use ranked_choice::VotingErrors;
///
/// let mut builder: Builder<String> = Builder::new()
///     .candidates(&["Anna".to_string(), "Bob".to_string()]);
///
/// builder.add_ballot(&["Anna".to_string(), "Bob".to_string()])?;
/// builder.add_weighted_ballot(&["Bob".to_string()], 2)?;
///
/// let winner = builder.build()?.get_winning_proposal();
/// assert_eq!(winner, Ok("Bob".to_string()));
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder<C> {
    candidates: Option<BTreeSet<C>>,
    ballots: Vec<(Vec<C>, u64)>,
    total: u64,
}

impl<C: Clone + Ord + Debug + Display> Default for Builder<C> {
    fn default() -> Self {
        Builder::new()
    }
}

impl<C: Clone + Ord + Debug + Display> Builder<C> {
    pub fn new() -> Builder<C> {
        Builder {
            candidates: None,
            ballots: Vec::new(),
            total: 0,
        }
    }

    /// Declares the candidates of the election. Ballots ranking any other
    /// candidate will be rejected.
    pub fn candidates(self, cands: &[C]) -> Builder<C> {
        Builder {
            candidates: Some(cands.iter().cloned().collect()),
            ballots: self.ballots,
            total: self.total,
        }
    }

    /// The number of ballots added so far, counting weights.
    pub fn num_ballots(&self) -> u64 {
        self.total
    }

    /// Adds a single ballot.
    pub fn add_ballot(&mut self, ranks: &[C]) -> Result<(), VotingErrors> {
        self.add_weighted_ballot(ranks, 1)
    }

    /// Adds a ballot standing for `count` identical ballots.
    ///
    /// The counts of all the ballots may not add up to more than `u64::MAX`.
    pub fn add_weighted_ballot(&mut self, ranks: &[C], count: u64) -> Result<(), VotingErrors> {
        if count == 0 {
            return Err(VotingErrors::ZeroCount);
        }
        let mut seen: BTreeSet<&C> = BTreeSet::new();
        for c in ranks.iter() {
            if let Some(valid_candidates) = &self.candidates {
                if !valid_candidates.contains(c) {
                    return Err(VotingErrors::UnknownCandidate(c.to_string()));
                }
            }
            if !seen.insert(c) {
                return Err(VotingErrors::DuplicateCandidate(c.to_string()));
            }
        }
        self.total = self
            .total
            .checked_add(count)
            .ok_or(VotingErrors::TooManyBallots)?;
        self.ballots.push((ranks.to_vec(), count));
        Ok(())
    }

    /// Creates the tabulator for the ballots collected so far.
    pub fn build(self) -> Result<RankedChoice<C>, VotingErrors> {
        if self.ballots.is_empty() {
            return Err(VotingErrors::NoBallots);
        }
        debug!("build: {} ballot lines", self.ballots.len());
        RankedChoice::from_weighted(self.ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_election_is_refused() {
        let builder: Builder<String> = Builder::new();
        assert_eq!(builder.build().err(), Some(VotingErrors::NoBallots));
    }

    #[test]
    fn duplicate_candidate_is_refused() {
        let mut builder: Builder<String> = Builder::new();
        let res = builder.add_ballot(&names(&["A", "B", "A"]));
        assert_eq!(
            res,
            Err(VotingErrors::DuplicateCandidate("A".to_string()))
        );
        assert_eq!(builder.num_ballots(), 0);
    }

    #[test]
    fn undeclared_candidate_is_refused() {
        let mut builder: Builder<String> = Builder::new().candidates(&names(&["A", "B"]));
        assert!(builder.add_ballot(&names(&["B", "A"])).is_ok());
        assert_eq!(
            builder.add_ballot(&names(&["A", "C"])),
            Err(VotingErrors::UnknownCandidate("C".to_string()))
        );
        assert_eq!(
            builder.add_ballot(&names(&["C"])).unwrap_err().to_string(),
            "candidate C is not part of the election"
        );
    }

    #[test]
    fn any_candidate_without_declaration() {
        let mut builder: Builder<String> = Builder::new();
        assert!(builder.add_ballot(&names(&["Z", "Y"])).is_ok());
        assert!(builder.add_ballot(&[]).is_ok());
        assert_eq!(builder.num_ballots(), 2);
    }

    #[test]
    fn zero_count_is_refused() {
        let mut builder: Builder<String> = Builder::new();
        assert_eq!(
            builder.add_weighted_ballot(&names(&["A"]), 0),
            Err(VotingErrors::ZeroCount)
        );
    }

    #[test]
    fn total_beyond_u64_is_refused() {
        let mut builder: Builder<String> = Builder::new();
        builder.add_weighted_ballot(&names(&["A"]), u64::MAX).unwrap();
        assert_eq!(
            builder.add_ballot(&names(&["B"])),
            Err(VotingErrors::TooManyBallots)
        );
        assert_eq!(builder.num_ballots(), u64::MAX);

        let tc = builder.build().unwrap();
        assert_eq!(tc.candidates(), &["A".to_string()]);
        assert_eq!(tc.get_winning_proposal(), Ok("A".to_string()));
    }

    #[test]
    fn weights_add_to_the_total() {
        let mut builder: Builder<String> = Builder::new();
        builder.add_weighted_ballot(&names(&["A"]), 4).unwrap();
        builder.add_weighted_ballot(&names(&["B"]), 3).unwrap();
        builder.add_ballot(&names(&["C", "A"])).unwrap();
        assert_eq!(builder.num_ballots(), 8);

        let tc = builder.build().unwrap();
        assert_eq!(tc.total_ballots(), 8);
        assert_eq!(tc.threshold(), 5);
        assert_eq!(tc.get_winning_proposal(), Ok("A".to_string()));
    }
}
