// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Things that can go wrong.
//!
//! There are two quite different kinds of failure.
//! * A [CommandError] is returned by something that changes the store, such as casting a ballot.
//!   The change is then not made at all.
//! * A [TabulationError] is returned as the value of a derived computation, such as a round
//!   outcome, that could not be determined. These are cached like any other value, and anything
//!   derived from them fails with a [TabulationError] saying why.

use thiserror::Error;
use crate::ballot_metadata::{CandidateId, ElectionId, VoterId};

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum ConfigError {
    #[error("An election must fill at least one seat")]
    NoSeats,
    #[error("An election must allow at least one preference tier")]
    NoTiers,
    #[error("Preference tier {0} has a capacity of zero")]
    ZeroCapacityTier(usize),
    #[error("Could not read election configuration : {0}")]
    Json(String),
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum CommandError {
    #[error("Election \"{0}\" not found")]
    UnknownElection(ElectionId),
    #[error("Election \"{0}\" already exists")]
    ElectionAlreadyExists(ElectionId),
    #[error("Tried to {attempted} for election \"{election}\" but this election is in the \"{phase}\" phase, not the \"{required}\" phase")]
    PhaseViolation{ election:ElectionId, attempted:&'static str, phase:&'static str, required:&'static str },
    #[error("Tried to register voter \"{voter}\" but voter registration is closed for election \"{election}\"")]
    VoterRegistrationClosed{ election:ElectionId, voter:VoterId },
    #[error("Voter \"{voter}\" not registered in election \"{election}\"")]
    UnregisteredVoter{ election:ElectionId, voter:VoterId },
    #[error("Candidate \"{candidate}\" at tier {tier} is not registered in election \"{election}\"")]
    UnregisteredCandidate{ election:ElectionId, candidate:CandidateId, tier:usize },
    #[error("Candidate \"{0}\" is already registered")]
    CandidateAlreadyRegistered(CandidateId),
    #[error("Ballot from voter \"{voter}\" submitted too many tiers; wanted a maximum of {max}, got {got}")]
    TooManyTiers{ voter:VoterId, max:usize, got:usize },
    #[error("Ballot from voter \"{voter}\" submitted too many votes for tier {tier}; wanted a maximum of {max}, got {got}")]
    TierCapacityExceeded{ voter:VoterId, tier:usize, max:usize, got:usize },
    #[error("Counting for election \"{0}\" is finished; no more rounds can be spawned")]
    CountingFinished(ElectionId),
    #[error("Counting for election \"{election}\" cannot continue : {source}")]
    CountingHalted{ election:ElectionId, source:TabulationError },
    #[error("Invalid election configuration : {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum TabulationError {
    #[error("Election \"{0}\" was not found")]
    UnknownElection(ElectionId),
    #[error("Candidate \"{candidate}\" is not standing in election \"{election}\"")]
    UnknownCandidate{ election:ElectionId, candidate:CandidateId },
    #[error("Round {round} of election \"{election}\" has not been spawned")]
    RoundNotSpawned{ election:ElectionId, round:usize },
    #[error("Droop quota calculation failed: {0}")]
    QuotaUnavailable(Box<TabulationError>),
    #[error("The outcome of round {round} could not be determined: {source}")]
    UpstreamRound{ round:usize, source:Box<TabulationError> },
}

impl TabulationError {
    /// Wrap a failure to determine the outcome of an earlier round.
    pub fn upstream(round:usize,source:TabulationError) -> Self {
        // don't nest the same round repeatedly.
        match source {
            TabulationError::UpstreamRound{..} => source,
            _ => TabulationError::UpstreamRound{round,source:Box::new(source)},
        }
    }
}
