// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.


//! The facts about elections : who is standing, who may vote, how they voted, and how far the count has got.
//!
//! Everything that changes the store is a command returning `Result<_,CommandError>`. A command
//! checks everything it needs to before changing anything, so a failed command leaves the store
//! exactly as it was. Derived values (vote totals, outcomes...) are computed elsewhere from these facts.

use std::collections::BTreeMap;
use log::{info, warn};
use crate::ballot_metadata::{Candidate, CandidateId, ElectionId, VoterId};
use crate::ballot_paper::Ballot;
use crate::droop::droop_quota;
use crate::election_config::{ElectionConfig, ElectionPhase};
use crate::error::{CommandError, TabulationError};
use crate::history::RoundKey;
use crate::memo::Memo;
use crate::rational::Rational;
use crate::relation::Join;

/// A round that has been spawned.
#[derive(Debug,Clone)]
pub struct RoundRecord {
    pub key : RoundKey,
    /// The candidates still running when the round was spawned. These are the candidates the round's totals are for.
    pub candidates : Vec<CandidateId>,
}

#[derive(Debug,Clone)]
pub struct ElectionRecord {
    pub config : ElectionConfig,
    pub phase : ElectionPhase,
    /// rounds[i] is round i.
    pub rounds : Vec<RoundRecord>,
    /// The quota fixed when counting began.
    pub pinned_quota : Option<Rational>,
}

/// Holds any number of elections, and caches values derived from them.
#[derive(Default)]
pub struct ElectionStore {
    pub(crate) elections : BTreeMap<ElectionId,ElectionRecord>,
    pub(crate) candidates : BTreeMap<CandidateId,Candidate>,
    /// election -> candidates standing in it. Each candidate is in exactly one election.
    pub(crate) election_candidates : Join<ElectionId,CandidateId>,
    pub(crate) registered_voters : Join<VoterId,ElectionId>,
    /// voter -> candidate, with the tier (0 is most preferred).
    pub(crate) votes : Join<VoterId,CandidateId,usize>,
    pub(crate) memo : Memo,
}

impl ElectionStore {
    pub fn new() -> Self { ElectionStore::default() }

    pub fn create_election(&mut self,election:impl Into<ElectionId>,config:ElectionConfig) -> Result<ElectionId,CommandError> {
        let election = election.into();
        config.validate()?;
        if self.elections.contains_key(&election) { return Err(CommandError::ElectionAlreadyExists(election)); }
        self.elections.insert(election.clone(),ElectionRecord{ config, phase: ElectionPhase::Registration, rounds: vec![], pinned_quota: None });
        Ok(election)
    }

    /// Remove an election and everything belonging to it : its candidates, the votes for them, voter registrations and rounds.
    /// Voters themselves are not removed, as they may be registered in other elections.
    pub fn remove_election(&mut self,election:&ElectionId) -> Result<(),CommandError> {
        self.record(election)?;
        let candidates : Vec<CandidateId> = self.election_candidates.keys_of_left(election).cloned().collect();
        for candidate in &candidates {
            self.votes.remove_right(candidate);
            self.candidates.remove(candidate);
        }
        self.election_candidates.remove_left(election);
        self.registered_voters.remove_right(election);
        self.elections.remove(election);
        self.memo.invalidate(election);
        Ok(())
    }

    pub(crate) fn record(&self,election:&ElectionId) -> Result<&ElectionRecord,CommandError> {
        self.elections.get(election).ok_or_else(||CommandError::UnknownElection(election.clone()))
    }

    fn record_mut(&mut self,election:&ElectionId) -> Result<&mut ElectionRecord,CommandError> {
        self.elections.get_mut(election).ok_or_else(||CommandError::UnknownElection(election.clone()))
    }

    /// The election record, as needed by a derived computation.
    pub(crate) fn tabulation_record(&self,election:&ElectionId) -> Result<&ElectionRecord,TabulationError> {
        self.elections.get(election).ok_or_else(||TabulationError::UnknownElection(election.clone()))
    }

    fn require_phase(&self,election:&ElectionId,attempted:&'static str,required:&'static str,ok:impl Fn(&ElectionPhase)->bool) -> Result<ElectionPhase,CommandError> {
        let phase = self.record(election)?.phase;
        if ok(&phase) { Ok(phase) } else {
            Err(CommandError::PhaseViolation{ election:election.clone(), attempted, phase:phase.name(), required })
        }
    }

    pub fn register_voter(&mut self,election:&ElectionId,voter:impl Into<VoterId>) -> Result<(),CommandError> {
        let voter = voter.into();
        if !self.record(election)?.phase.voter_registration_is_open() {
            return Err(CommandError::VoterRegistrationClosed{election:election.clone(),voter});
        }
        self.registered_voters.set(voter,election.clone(),());
        self.memo.invalidate(election);
        Ok(())
    }

    /// Register a candidate. If no name is given, it is [crate::ballot_metadata::NO_NAME].
    pub fn register_candidate(&mut self,election:&ElectionId,candidate:impl Into<CandidateId>,name:Option<&str>) -> Result<(),CommandError> {
        let candidate = candidate.into();
        self.require_phase(election,"register a candidate","registration",|p|*p==ElectionPhase::Registration)?;
        if self.candidates.contains_key(&candidate) { return Err(CommandError::CandidateAlreadyRegistered(candidate)); }
        self.election_candidates.set(election.clone(),candidate.clone(),());
        self.candidates.insert(candidate.clone(),Candidate::new(candidate,name));
        self.memo.invalidate(election);
        Ok(())
    }

    /// Record a ballot. If the voter has already voted in this election, the new ballot replaces the old one.
    pub fn cast_ballot(&mut self,election:&ElectionId,ballot:&Ballot) -> Result<(),CommandError> {
        self.require_phase(election,"cast a ballot","voting",ElectionPhase::is_voting)?;
        if !self.registered_voters.contains(&ballot.voter,election) {
            return Err(CommandError::UnregisteredVoter{election:election.clone(),voter:ballot.voter.clone()});
        }
        let config = &self.record(election)?.config;
        let recorded = ballot.validate(election,config,|c|self.election_candidates.contains(election,c))?;
        // all checks passed.
        let previous : Vec<CandidateId> = self.votes.keys_of_left(&ballot.voter).filter(|c|self.election_candidates.contains(election,c)).cloned().collect();
        for candidate in &previous { self.votes.remove(&ballot.voter,candidate); }
        for (candidate,tier) in recorded {
            self.votes.set(ballot.voter.clone(),candidate,tier);
        }
        self.memo.invalidate(election);
        Ok(())
    }

    pub fn begin_voting(&mut self,election:&ElectionId) -> Result<(),CommandError> {
        self.require_phase(election,"begin voting","registration",|p|*p==ElectionPhase::Registration)?;
        self.record_mut(election)?.phase = ElectionPhase::Voting{registration_open:true};
        Ok(())
    }

    pub fn close_voter_registration(&mut self,election:&ElectionId) -> Result<(),CommandError> {
        self.require_phase(election,"close voter registration","voting",ElectionPhase::is_voting)?;
        self.record_mut(election)?.phase = ElectionPhase::Voting{registration_open:false};
        Ok(())
    }

    /// Start counting. This fixes the quota used for every round from the number of voters now registered.
    pub fn begin_counting(&mut self,election:&ElectionId) -> Result<(),CommandError> {
        self.require_phase(election,"begin counting","voting",ElectionPhase::is_voting)?;
        let voters = self.number_of_voters(election);
        let record = self.record_mut(election)?;
        let quota = droop_quota(voters,record.config.seats_to_fill);
        info!("Counting election {} for {} seats with {} voters, quota {}",election,record.config.seats_to_fill,voters,quota);
        record.phase = ElectionPhase::Counting{round_index:0};
        record.pinned_quota = Some(quota);
        self.memo.invalidate(election);
        Ok(())
    }

    /// Spawn the next round of the count and determine its outcome.
    ///
    /// The round is spawned even if its outcome cannot be determined; in that case the error is the
    /// outcome of the round, and the next call fails with [CommandError::CountingHalted].
    pub fn spawn_round(&mut self,election:&ElectionId) -> Result<RoundKey,CommandError> {
        let phase = self.require_phase(election,"spawn a round","counting",ElectionPhase::is_counting)?;
        let halted = |source:TabulationError| CommandError::CountingHalted{election:election.clone(),source};
        if self.is_count_complete(election).map_err(halted)? { return Err(CommandError::CountingFinished(election.clone())); }
        let key = RoundKey::new(election.clone(),self.record(election)?.rounds.len());
        let candidates = self.running_candidates(&key).map_err(halted)?;
        let record = self.record_mut(election)?;
        record.rounds.push(RoundRecord{ key: key.clone(), candidates });
        if let ElectionPhase::Counting{round_index} = phase { record.phase = ElectionPhase::Counting{round_index:round_index+1}; }
        self.memo.forget_rounds_from(&key);
        match self.round_outcome(&key) {
            Ok(outcome) => info!("{} : {}",key,outcome),
            Err(e) => warn!("The outcome of {} could not be determined : {}",key,e),
        }
        Ok(key)
    }

    /// Spawn rounds until enough candidates are elected or nobody is left running. Returns the rounds spawned.
    pub fn run_to_completion(&mut self,election:&ElectionId) -> Result<Vec<RoundKey>,CommandError> {
        let mut res = vec![];
        loop {
            match self.spawn_round(election) {
                Ok(key) => res.push(key),
                Err(CommandError::CountingFinished(_)) => return Ok(res),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn phase(&self,election:&ElectionId) -> Result<ElectionPhase,CommandError> { Ok(self.record(election)?.phase) }
    pub fn config(&self,election:&ElectionId) -> Result<&ElectionConfig,CommandError> { Ok(&self.record(election)?.config) }
    pub fn candidate(&self,candidate:&CandidateId) -> Option<&Candidate> { self.candidates.get(candidate) }
    pub fn elections(&self) -> impl Iterator<Item=&ElectionId> { self.elections.keys() }

    /// The candidates standing in an election, in order of id.
    pub fn candidates_of(&self,election:&ElectionId) -> Vec<CandidateId> { self.election_candidates.keys_of_left(election).cloned().collect() }
    /// The voters registered in an election, in order of id.
    pub fn voters_of(&self,election:&ElectionId) -> Vec<VoterId> { self.registered_voters.keys_of_right(election).cloned().collect() }
    pub fn number_of_voters(&self,election:&ElectionId) -> usize { self.registered_voters.count_of_right(election) }

    /// The tiers the voter's ballot in the election is recorded with; tier -> candidates.
    pub fn recorded_ballot(&self,election:&ElectionId,voter:&VoterId) -> BTreeMap<usize,Vec<CandidateId>> {
        let mut res : BTreeMap<usize,Vec<CandidateId>> = BTreeMap::new();
        for (candidate,&tier) in self.votes.entries_of_left(voter) {
            if self.election_candidates.contains(election,candidate) { res.entry(tier).or_default().push(candidate.clone()); }
        }
        res
    }

    pub fn rounds(&self,election:&ElectionId) -> Result<&[RoundRecord],CommandError> { Ok(&self.record(election)?.rounds) }
    pub fn rounds_spawned(&self,election:&ElectionId) -> usize { self.elections.get(election).map(|r|r.rounds.len()).unwrap_or(0) }

    /// The number of derived values currently cached.
    pub fn cached_values(&self) -> usize { self.memo.len() }
}
