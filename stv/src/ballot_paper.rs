// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.


//! Information about a vote. That is, something written on a ballot paper.
//! A ballot is a list of preference tiers, each a set of candidates the voter likes equally.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use serde::{Deserialize,Serialize};
use crate::ballot_metadata::{CandidateId, ElectionId, VoterId};
use crate::election_config::ElectionConfig;
use crate::error::CommandError;

/// A ballot as submitted. tiers[0] is the most preferred.
#[derive(Clone,Debug,Serialize,Deserialize,PartialEq,Eq)]
pub struct Ballot {
    pub voter : VoterId,
    pub tiers : Vec<Vec<CandidateId>>,
}

/// The preferences actually recorded for a valid ballot : candidate -> tier.
pub type RecordedPreferences = BTreeMap<CandidateId,usize>;

impl Ballot {
    pub fn new(voter:impl Into<VoterId>,tiers:Vec<Vec<CandidateId>>) -> Self {
        Ballot{ voter: voter.into(), tiers }
    }

    /// Convenience for tests and demos. `Ballot::from_strs("v",&[&["a","b"],&["c"]])`
    pub fn from_strs(voter:&str,tiers:&[&[&str]]) -> Self {
        Ballot{ voter: VoterId::from(voter), tiers: tiers.iter().map(|tier|tier.iter().map(|&c|CandidateId::from(c)).collect()).collect() }
    }

    /// Check the ballot is acceptable for the election, and work out the tier each candidate is recorded at.
    /// This does not change anything, so a failure leaves nothing partially recorded.
    ///
    /// Checks are done in order : number of tiers, then the number of candidates in each tier,
    /// then that every candidate is standing (`is_standing`).
    /// A candidate listed more than once is recorded at the most preferred tier it appears in.
    pub fn validate(&self,election:&ElectionId,config:&ElectionConfig,is_standing:impl Fn(&CandidateId)->bool) -> Result<RecordedPreferences,CommandError> {
        if self.tiers.len()>config.max_tiers() {
            return Err(CommandError::TooManyTiers{voter:self.voter.clone(),max:config.max_tiers(),got:self.tiers.len()});
        }
        for (tier,candidates) in self.tiers.iter().enumerate() {
            let max = config.capacity_of_tier(tier).unwrap_or(0);
            if candidates.len()>max {
                return Err(CommandError::TierCapacityExceeded{voter:self.voter.clone(),tier,max,got:candidates.len()});
            }
        }
        let mut res = RecordedPreferences::new();
        for (tier,candidates) in self.tiers.iter().enumerate() {
            for candidate in candidates {
                if !is_standing(candidate) {
                    return Err(CommandError::UnregisteredCandidate{election:election.clone(),candidate:candidate.clone(),tier});
                }
                res.entry(candidate.clone()).or_insert(tier);
            }
        }
        Ok(res)
    }

    /// The total number of candidate markings on the ballot.
    pub fn num_markings(&self) -> usize { self.tiers.iter().map(|t|t.len()).sum() }
}

impl Display for Ballot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{} :",self.voter)?;
        for tier in &self.tiers {
            write!(f," [{}]",tier.iter().map(|c|c.to_string()).collect::<Vec<_>>().join(","))?;
        }
        Ok(())
    }
}
