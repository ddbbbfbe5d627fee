//! Addressing the rounds of a count.

use serde::Serialize;
use serde::Deserialize;
use std::fmt;
use crate::ballot_metadata::ElectionId;

/// A particular round of a particular election. Round 0 is the first.
#[derive(Clone,Debug,Serialize,Deserialize,Ord, PartialOrd, Eq, PartialEq,Hash)]
pub struct RoundKey {
    pub election : ElectionId,
    pub round : usize,
}

impl RoundKey {
    pub fn new(election:ElectionId,round:usize) -> Self { RoundKey{election,round} }
    pub fn first(election:ElectionId) -> Self { RoundKey{election,round:0} }

    /// The round before this one, None for round 0.
    pub fn previous(&self) -> Option<RoundKey> {
        if self.round==0 { None } else { Some(RoundKey{election:self.election.clone(),round:self.round-1}) }
    }
    pub fn next(&self) -> RoundKey { RoundKey{election:self.election.clone(),round:self.round+1} }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "round {} of election {}", self.round, self.election) }
}
