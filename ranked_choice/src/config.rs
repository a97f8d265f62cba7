// ******** Output data structures *********

use std::error::Error;
use std::fmt::{Debug, Display};

/// How the eliminated candidate of a round was chosen.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TiebreakSituation {
    /// A single candidate had the lowest tally.
    Clean,
    /// Several candidates shared the lowest tally and the lowest Borda score
    /// picked one of them.
    Borda,
    /// The lowest tally and the lowest Borda score were both shared. The
    /// candidate with the greatest identifier was eliminated.
    CandidateOrder,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats<C> {
    pub candidate: C,
    pub tiebreak: TiebreakSituation,
    /// The candidates that shared the lowest tally, including the
    /// eliminated one. Sorted by identifier.
    pub tied_with: Vec<C>,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats<C> {
    pub round: u32,
    /// The tally of every candidate still running, sorted by identifier.
    pub tally: Vec<(C, u64)>,
    /// Ballots with no remaining candidate in this round.
    pub exhausted: u64,
    pub elected: Option<C>,
    pub eliminated: Option<EliminationStats<C>>,
}

impl<C> RoundStats<C> {
    /// The number of ballots credited to a candidate during this round.
    pub fn active_ballots(&self) -> u64 {
        self.tally.iter().map(|(_, count)| *count).sum()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tabulation<C> {
    pub winner: Option<C>,
    pub threshold: u64,
    pub total_ballots: u64,
    pub round_stats: Vec<RoundStats<C>>,
}

impl<C> Tabulation<C> {
    pub fn winner(&self) -> Result<&C, TabulationError> {
        self.winner.as_ref().ok_or(TabulationError::WinnerNotFound)
    }

    pub fn into_winner(self) -> Result<C, TabulationError> {
        self.winner.ok_or(TabulationError::WinnerNotFound)
    }
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TabulationError {
    /// No candidate reached the majority of the original ballots, even after
    /// every elimination round.
    WinnerNotFound,
}

impl Error for TabulationError {}

impl Display for TabulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabulationError::WinnerNotFound => write!(f, "winner not found"),
        }
    }
}

// ********* Input validation **********

/// Errors raised while assembling the ballots of an election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// The election has no ballot at all.
    NoBallots,
    /// A weighted ballot was given a count of zero.
    ZeroCount,
    /// The ballot ranks the same candidate more than once.
    DuplicateCandidate(String),
    /// The ballot ranks a candidate that was not declared for this election.
    UnknownCandidate(String),
    /// The counts of the ballots add up to more than `u64::MAX`.
    TooManyBallots,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::NoBallots => write!(f, "no ballots found for election"),
            VotingErrors::ZeroCount => write!(f, "ballot count must be at least 1"),
            VotingErrors::DuplicateCandidate(c) => {
                write!(f, "candidate {} is ranked more than once", c)
            }
            VotingErrors::UnknownCandidate(c) => {
                write!(f, "candidate {} is not part of the election", c)
            }
            VotingErrors::TooManyBallots => {
                write!(f, "the ballot counts exceed {}", u64::MAX)
            }
        }
    }
}
