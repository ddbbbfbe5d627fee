// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.


//! Counting the votes in a round, and deciding who is elected or eliminated.
//!
//! Each round's values are pure functions of the ballots and the outcomes of earlier rounds.
//! They are computed on demand and remembered until the store changes.
//!
//! * The status of a candidate in round r is determined by the outcomes of rounds 0..r.
//! * A voter's favorites in round r are the two most preferred tiers still containing running candidates.
//! * A voter's remaining energy in round r (see [crate::transfer_value]) depends on round r-1.
//! * The vote totals of round r share each voter's energy equally between their top tier.
//! * The outcome of round r elects everyone at or above quota, or else eliminates everyone tied for last.

use std::collections::BTreeMap;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::ballot_metadata::{CandidateId, ElectionId, VoterId};
use crate::distribution_of_preferences_transcript::{CandidateStatus, ElectedCandidate, RoundOutcome, RoundResult, RoundTranscript, Transcript, VoteTotal};
use crate::droop;
use crate::election_data::{ElectionRecord, ElectionStore};
use crate::error::TabulationError;
use crate::history::RoundKey;
use crate::rational::Rational;

/// The voter's most preferred running candidates, and the ones after them.
#[derive(Clone,Debug,Default,PartialEq,Eq,Serialize,Deserialize)]
pub struct Favorites {
    /// Everyone at the most preferred tier with a running candidate. These share the vote.
    pub top : Vec<CandidateId>,
    /// Everyone at the next such tier.
    pub next : Vec<CandidateId>,
}

impl Favorites {
    /// true if the voter has no running candidates left to support.
    pub fn is_exhausted(&self) -> bool { self.top.is_empty() }
}

/// Decide what happens in a round given the totals, sorted highest first.
///
/// Everyone with at least a quota is elected, all at once. Otherwise everyone tied for the lowest total is eliminated.
pub fn decide_outcome(totals:&[VoteTotal],quota:&Rational) -> RoundOutcome {
    let winners : Vec<ElectedCandidate> = totals.iter().filter(|t|t.total>=*quota).map(|t|ElectedCandidate{
        candidate: t.candidate.clone(),
        total: t.total.clone(),
        surplus: (&t.total-quota).reduced(),
    }).collect();
    if !winners.is_empty() { return RoundOutcome::Elected{candidates:winners}; }
    let losers = match totals.last() {
        Some(lowest) => totals.iter().filter(|t|t.total==lowest.total).map(|t|t.candidate.clone()).collect(),
        None => vec![],
    };
    RoundOutcome::Eliminated{candidates:losers}
}

impl ElectionStore {
    /// Check the round could meaningfully be asked about.
    /// `vote_totals` and `round_outcome` need the round to have been spawned. Status, favorites and
    /// energy are also defined for the round about to be spawned.
    pub(crate) fn check_round(&self,round:&RoundKey,allow_next:bool) -> Result<&ElectionRecord,TabulationError> {
        let record = self.tabulation_record(&round.election)?;
        let spawned = record.rounds.len();
        if round.round<spawned || (allow_next && round.round==spawned) { Ok(record) }
        else { Err(TabulationError::RoundNotSpawned{election:round.election.clone(),round:round.round}) }
    }

    /// The quota for the election. Once counting has started this is the quota fixed then;
    /// before that it reflects the voters currently registered.
    pub fn droop_quota(&self,election:&ElectionId) -> Result<Rational,TabulationError> {
        let record = self.tabulation_record(election)?;
        Ok(match &record.pinned_quota {
            Some(quota) => quota.clone(),
            None => droop::droop_quota(self.number_of_voters(election),record.config.seats_to_fill),
        })
    }

    pub fn candidate_status(&self,round:&RoundKey,candidate:&CandidateId) -> Result<CandidateStatus,TabulationError> {
        self.memo.status.get(&(round.clone(),candidate.clone()),||self.compute_candidate_status(round,candidate))
    }

    /// status(r) is status(r-1), updated by the outcome of round r-1.
    fn compute_candidate_status(&self,round:&RoundKey,candidate:&CandidateId) -> Result<CandidateStatus,TabulationError> {
        self.check_round(round,true)?;
        if !self.election_candidates.contains(&round.election,candidate) {
            return Err(TabulationError::UnknownCandidate{election:round.election.clone(),candidate:candidate.clone()});
        }
        let Some(previous) = round.previous() else { return Ok(CandidateStatus::Running) };
        let status = self.candidate_status(&previous,candidate)?;
        // an earlier failure is reported even if this candidate's status is already final.
        let outcome = self.round_outcome(&previous).map_err(|e|TabulationError::upstream(previous.round,e))?;
        if status!=CandidateStatus::Running { Ok(status) }
        else if outcome.involves(candidate) { Ok(outcome.resulting_status()) }
        else { Ok(CandidateStatus::Running) }
    }

    fn candidates_with_status(&self,round:&RoundKey,wanted:CandidateStatus) -> Result<Vec<CandidateId>,TabulationError> {
        let mut res = vec![];
        for candidate in self.election_candidates.keys_of_left(&round.election) {
            if self.candidate_status(round,candidate)?==wanted { res.push(candidate.clone()); }
        }
        Ok(res)
    }

    pub fn running_candidates(&self,round:&RoundKey) -> Result<Vec<CandidateId>,TabulationError> {
        self.candidates_with_status(round,CandidateStatus::Running)
    }

    /// Candidates elected before the given round, in order of id.
    pub fn elected_candidates(&self,round:&RoundKey) -> Result<Vec<CandidateId>,TabulationError> {
        self.candidates_with_status(round,CandidateStatus::Elected)
    }

    pub fn current_favorites(&self,round:&RoundKey,voter:&VoterId) -> Result<Favorites,TabulationError> {
        self.memo.favorites.get(&(round.clone(),voter.clone()),||self.compute_current_favorites(round,voter))
    }

    fn compute_current_favorites(&self,round:&RoundKey,voter:&VoterId) -> Result<Favorites,TabulationError> {
        self.check_round(round,true)?;
        let mut by_tier : BTreeMap<usize,Vec<CandidateId>> = BTreeMap::new();
        for (candidate,&tier) in self.votes.entries_of_left(voter) {
            if !self.election_candidates.contains(&round.election,candidate) { continue; } // a different election
            if self.candidate_status(round,candidate)?==CandidateStatus::Running {
                by_tier.entry(tier).or_default().push(candidate.clone());
            }
        }
        let mut tiers = by_tier.into_values();
        Ok(Favorites{ top: tiers.next().unwrap_or_default(), next: tiers.next().unwrap_or_default() })
    }

    /// The total for each candidate running when the round was spawned, highest first. Equal totals are in order of candidate id.
    pub fn vote_totals(&self,round:&RoundKey) -> Result<Vec<VoteTotal>,TabulationError> {
        self.memo.vote_totals.get(round,||self.compute_vote_totals(round))
    }

    fn compute_vote_totals(&self,round:&RoundKey) -> Result<Vec<VoteTotal>,TabulationError> {
        let record = self.check_round(round,false)?;
        let mut totals : BTreeMap<CandidateId,Rational> = record.rounds[round.round].candidates.iter().map(|c|(c.clone(),Rational::zero())).collect();
        for voter in self.registered_voters.keys_of_right(&round.election) {
            let favorites = self.current_favorites(round,voter)?;
            if favorites.is_exhausted() { continue; }
            let mut share = self.remaining_energy(round,voter)?;
            share.div_fraction(favorites.top.len(),1);
            for candidate in &favorites.top {
                if let Some(total) = totals.get_mut(candidate) { *total+=&share; }
            }
        }
        let mut res : Vec<VoteTotal> = totals.into_iter().map(|(candidate,total)|VoteTotal{candidate,total:total.reduced()}).collect();
        res.sort_by(|a,b|b.total.cmp(&a.total)); // stable
        debug!("Totals for {} : {}",round,res.iter().map(|t|format!("{} {}",t.candidate,t.total)).collect::<Vec<_>>().join(", "));
        Ok(res)
    }

    /// What happens in a spawned round. If the quota cannot be determined, neither can the outcome.
    pub fn round_outcome(&self,round:&RoundKey) -> Result<RoundOutcome,TabulationError> {
        self.memo.outcome.get(round,||{
            let quota = self.droop_quota(&round.election).map_err(|e|TabulationError::QuotaUnavailable(Box::new(e)))?;
            let totals = self.vote_totals(round)?;
            Ok(decide_outcome(&totals,&quota))
        })
    }

    /// For each voter whose top tier includes the candidate, who they would fall back on if the candidate
    /// were removed : the rest of the top tier if shared, otherwise the next tier. Each such voter's vote
    /// is spread evenly over those alternatives, as a fraction of the share the candidate currently gets.
    pub fn alternative_consensus(&self,round:&RoundKey,candidate:&CandidateId) -> Result<BTreeMap<CandidateId,Rational>,TabulationError> {
        self.check_round(round,true)?;
        if !self.election_candidates.contains(&round.election,candidate) {
            return Err(TabulationError::UnknownCandidate{election:round.election.clone(),candidate:candidate.clone()});
        }
        let mut res : BTreeMap<CandidateId,Rational> = BTreeMap::new();
        for voter in self.votes.keys_of_right(candidate) {
            let favorites = self.current_favorites(round,voter)?;
            if !favorites.top.contains(candidate) { continue; }
            let alternatives : Vec<&CandidateId> = if favorites.top.len()==1 { favorites.next.iter().collect() } else { favorites.top.iter().filter(|&c|c!=candidate).collect() };
            let divisor = favorites.top.len()*alternatives.len();
            for alternative in alternatives {
                res.entry(alternative.clone()).or_default().add_fraction(1,divisor);
            }
        }
        Ok(res)
    }

    /// true if no more rounds are needed : enough candidates are elected, or nobody is left running.
    /// An error if an outcome so far could not be determined.
    pub fn is_count_complete(&self,election:&ElectionId) -> Result<bool,TabulationError> {
        let record = self.tabulation_record(election)?;
        let next = RoundKey::new(election.clone(),record.rounds.len());
        let elected = self.elected_candidates(&next)?.len();
        Ok(elected>=record.config.seats_to_fill || self.running_candidates(&next)?.is_empty())
    }

    /// A summary of the count so far. Failures are shown in place of the values that could not be determined.
    pub fn transcript(&self,election:&ElectionId) -> Result<Transcript,TabulationError> {
        let record = self.tabulation_record(election)?;
        let mut rounds = vec![];
        let mut elected = vec![];
        for round in &record.rounds {
            let outcome = self.round_outcome(&round.key);
            if let Ok(RoundOutcome::Elected{candidates}) = &outcome {
                elected.extend(candidates.iter().map(|e|e.candidate.clone()));
            }
            rounds.push(RoundTranscript{
                round: round.key.round,
                vote_totals: self.vote_totals(&round.key).unwrap_or_default(),
                result: RoundResult::from(outcome),
            });
        }
        Ok(Transcript{
            election: election.clone(),
            seats_to_fill: record.config.seats_to_fill,
            quota: self.droop_quota(election).map_err(|e|e.to_string()),
            rounds,
            elected,
        })
    }
}
