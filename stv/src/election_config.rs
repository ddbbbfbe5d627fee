// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The fixed parameters of an election, and the phases it passes through.

use std::fmt;
use serde::{Serialize,Deserialize};
use crate::error::ConfigError;

/// How many people are to be elected, and how ballots may be filled in.
#[derive(Debug,Serialize,Deserialize,Clone,PartialEq,Eq)]
pub struct ElectionConfig {
    /// The number of candidates to elect. At least 1.
    pub seats_to_fill : usize,
    /// tier_capacities[i] is the maximum number of candidates a ballot may mark at preference tier i.
    /// The length is the maximum number of tiers on a ballot.
    pub tier_capacities : Vec<usize>,
}

impl Default for ElectionConfig {
    fn default() -> Self { ElectionConfig{ seats_to_fill: 1, tier_capacities: vec![1] } }
}

impl ElectionConfig {
    pub fn new(seats_to_fill:usize,tier_capacities:Vec<usize>) -> Result<Self,ConfigError> {
        let res = ElectionConfig{seats_to_fill,tier_capacities};
        res.validate()?;
        Ok(res)
    }

    pub fn validate(&self) -> Result<(),ConfigError> {
        if self.seats_to_fill==0 { return Err(ConfigError::NoSeats); }
        if self.tier_capacities.is_empty() { return Err(ConfigError::NoTiers); }
        if let Some(tier) = self.tier_capacities.iter().position(|&c|c==0) { return Err(ConfigError::ZeroCapacityTier(tier)); }
        Ok(())
    }

    /// Read and validate a configuration such as `{"seats_to_fill":2,"tier_capacities":[3,3,3]}`
    pub fn from_json(json:&str) -> Result<Self,ConfigError> {
        let res : ElectionConfig = serde_json::from_str(json).map_err(|e|ConfigError::Json(e.to_string()))?;
        res.validate()?;
        Ok(res)
    }

    /// The maximum number of tiers a ballot may have.
    pub fn max_tiers(&self) -> usize { self.tier_capacities.len() }
    /// The maximum number of candidates at a given tier, None if the tier is beyond the last one.
    pub fn capacity_of_tier(&self,tier:usize) -> Option<usize> { self.tier_capacities.get(tier).cloned() }
}

/// Where an election is in its life. Phases only move forward.
#[derive(Debug,Serialize,Deserialize,Clone,Copy,PartialEq,Eq)]
pub enum ElectionPhase {
    /// Candidates and voters may register.
    Registration,
    /// Ballots may be cast. Voters may still register until registration is closed.
    Voting{registration_open:bool},
    /// Counting has started. round_index is the number of rounds spawned so far, which is also
    /// the index of the next round to be spawned.
    Counting{round_index:usize},
}

impl Default for ElectionPhase {
    fn default() -> Self { ElectionPhase::Registration }
}

impl ElectionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            ElectionPhase::Registration => "registration",
            ElectionPhase::Voting{..} => "voting",
            ElectionPhase::Counting{..} => "counting",
        }
    }
    pub fn voter_registration_is_open(&self) -> bool {
        match self {
            ElectionPhase::Registration => true,
            ElectionPhase::Voting{registration_open} => *registration_open,
            ElectionPhase::Counting{..} => false,
        }
    }
    pub fn is_voting(&self) -> bool { matches!(self,ElectionPhase::Voting{..}) }
    pub fn is_counting(&self) -> bool { matches!(self,ElectionPhase::Counting{..}) }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.name()) }
}
