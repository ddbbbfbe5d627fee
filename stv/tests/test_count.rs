// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Run small elections all the way through the count.

use tiered_stv::ballot_metadata::{CandidateId, ElectionId, VoterId};
use tiered_stv::ballot_paper::Ballot;
use tiered_stv::distribution_of_preferences_transcript::{CandidateStatus, RoundOutcome, RoundResult};
use tiered_stv::election_config::{ElectionConfig, ElectionPhase};
use tiered_stv::election_data::ElectionStore;
use tiered_stv::error::{CommandError, TabulationError};
use tiered_stv::history::RoundKey;
use tiered_stv::rational::Rational;

fn candidate(i:usize) -> CandidateId { CandidateId::from(format!("candidate{}",i)) }

/// 2 seats, 100 voters, 10 candidates. 34 voters put candidate0 first and candidate2 second.
fn thirty_four_for_candidate0() -> anyhow::Result<(ElectionStore,ElectionId)> {
    let mut store = ElectionStore::new();
    let election = store.create_election("council",ElectionConfig::new(2,vec![3,3,3])?)?;
    for i in 0..10 { store.register_candidate(&election,candidate(i),None)?; }
    for i in 0..100 { store.register_voter(&election,format!("voter{}",i))?; }
    store.begin_voting(&election)?;
    for i in 0..34 {
        store.cast_ballot(&election,&Ballot::from_strs(&format!("voter{}",i),&[&["candidate0"],&["candidate2"],&["candidate2"]]))?;
    }
    store.close_voter_registration(&election)?;
    store.begin_counting(&election)?;
    Ok((store,election))
}

#[test]
fn test_surplus_flows_to_second_preference() -> anyhow::Result<()> {
    let (mut store,election) = thirty_four_for_candidate0()?;
    assert_eq!(store.droop_quota(&election)?,Rational::new(100,3));

    let round0 = store.spawn_round(&election)?;
    assert_eq!(round0,RoundKey::first(election.clone()));
    let totals = store.vote_totals(&round0)?;
    assert_eq!(totals.len(),10);
    assert_eq!(totals[0].candidate,candidate(0));
    assert_eq!(totals[0].total,Rational::from_integer(34));
    match store.round_outcome(&round0)? {
        RoundOutcome::Elected{candidates} => {
            assert_eq!(candidates.len(),1);
            assert_eq!(candidates[0].candidate,candidate(0));
            assert_eq!(candidates[0].surplus,Rational::new(2,3));
        }
        other => panic!("Expected candidate0 elected, got {}",other),
    }
    let alternatives = store.alternative_consensus(&round0,&candidate(0))?;
    assert_eq!(alternatives.get(&candidate(2)),Some(&Rational::from_integer(34)));

    let round1 = store.spawn_round(&election)?;
    assert_eq!(store.candidate_status(&round1,&candidate(0))?,CandidateStatus::Elected);
    let voter = VoterId::from("voter0");
    assert_eq!(store.remaining_energy(&round1,&voter)?,Rational::new(1,51));
    let favorites = store.current_favorites(&round1,&voter)?;
    assert_eq!(favorites.top,vec![candidate(2)]);
    assert!(favorites.next.is_empty());
    let totals = store.vote_totals(&round1)?;
    assert_eq!(totals.len(),9); // candidate0 no longer counted.
    let mut counted : Vec<CandidateId> = totals.iter().map(|t|t.candidate.clone()).collect();
    counted.sort();
    assert_eq!(store.rounds(&election)?[1].candidates,counted);
    assert!(totals.iter().all(|t|t.candidate!=candidate(0)));
    assert_eq!(totals[0].candidate,candidate(2));
    assert_eq!(totals[0].total,Rational::new(2,3));
    match store.round_outcome(&round1)? {
        RoundOutcome::Eliminated{candidates} => {
            // everyone on zero goes at once.
            assert_eq!(candidates.len(),8);
            assert!(!candidates.contains(&candidate(2)));
        }
        other => panic!("Expected eliminations, got {}",other),
    }

    let rest = store.run_to_completion(&election)?;
    assert_eq!(rest.len(),1);
    assert_eq!(store.round_outcome(&rest[0])?,RoundOutcome::Eliminated{candidates:vec![candidate(2)]});
    assert!(store.is_count_complete(&election)?);
    assert_eq!(store.spawn_round(&election),Err(CommandError::CountingFinished(election.clone())));
    assert_eq!(store.phase(&election)?,ElectionPhase::Counting{round_index:3});

    let transcript = store.transcript(&election)?;
    assert_eq!(transcript.elected,vec![candidate(0)]);
    assert_eq!(transcript.rounds.len(),3);
    assert_eq!(transcript.quota,Ok(Rational::new(100,3)));
    let json = serde_json::to_string(&transcript)?;
    assert!(json.contains("\"100/3\""));
    Ok(())
}

#[test]
fn test_tied_for_last_are_eliminated_together() -> anyhow::Result<()> {
    let mut store = ElectionStore::new();
    let election = store.create_election("e",ElectionConfig::new(1,vec![1,1])?)?;
    for c in ["a","b","c"] { store.register_candidate(&election,c,None)?; }
    for i in 0..7 { store.register_voter(&election,format!("v{}",i))?; }
    store.begin_voting(&election)?;
    for v in ["v0","v1","v2"] { store.cast_ballot(&election,&Ballot::from_strs(v,&[&["a"]]))?; }
    for v in ["v3","v4"] { store.cast_ballot(&election,&Ballot::from_strs(v,&[&["b"],&["a"]]))?; }
    for v in ["v5","v6"] { store.cast_ballot(&election,&Ballot::from_strs(v,&[&["c"],&["a"]]))?; }
    store.begin_counting(&election)?;
    let rounds = store.run_to_completion(&election)?;
    assert_eq!(rounds.len(),2);
    assert_eq!(store.round_outcome(&rounds[0])?,RoundOutcome::Eliminated{candidates:vec![CandidateId::from("b"),CandidateId::from("c")]});
    match store.round_outcome(&rounds[1])? {
        RoundOutcome::Elected{candidates} => {
            assert_eq!(candidates[0].candidate,CandidateId::from("a"));
            assert_eq!(candidates[0].total,Rational::from_integer(7));
            assert_eq!(candidates[0].surplus,Rational::new(7,2));
        }
        other => panic!("Expected a elected, got {}",other),
    }
    assert_eq!(store.elected_candidates(&RoundKey::new(election.clone(),2))?,vec![CandidateId::from("a")]);
    Ok(())
}

#[test]
fn test_shared_top_tier_splits_the_vote() -> anyhow::Result<()> {
    let mut store = ElectionStore::new();
    let election = store.create_election("e",ElectionConfig::new(1,vec![2,2])?)?;
    for c in ["a","b","c"] { store.register_candidate(&election,c,None)?; }
    for v in ["v0","v1","v2"] { store.register_voter(&election,v)?; }
    store.begin_voting(&election)?;
    store.cast_ballot(&election,&Ballot::from_strs("v0",&[&["a","b"]]))?;
    store.cast_ballot(&election,&Ballot::from_strs("v1",&[&["a"],&["c"]]))?;
    store.begin_counting(&election)?;
    let round0 = store.spawn_round(&election)?;
    let totals = store.vote_totals(&round0)?;
    let total_of = |c:&str| totals.iter().find(|t|t.candidate.as_str()==c).map(|t|t.total.clone());
    assert_eq!(total_of("a"),Some(Rational::new(3,2)));
    assert_eq!(total_of("b"),Some(Rational::new(1,2)));
    assert_eq!(total_of("c"),Some(Rational::zero()));
    // quota 3/2, a is elected exactly.
    assert!(matches!(store.round_outcome(&round0)?,RoundOutcome::Elected{..}));
    let consensus = store.alternative_consensus(&round0,&CandidateId::from("a"))?;
    assert_eq!(consensus.get(&CandidateId::from("b")),Some(&Rational::new(1,2)));
    assert_eq!(consensus.get(&CandidateId::from("c")),Some(&Rational::one()));
    Ok(())
}

#[test]
fn test_over_capacity_ballot_records_nothing() -> anyhow::Result<()> {
    let mut store = ElectionStore::new();
    let election = store.create_election("e",ElectionConfig::new(2,vec![3,3,3])?)?;
    for i in 0..5 { store.register_candidate(&election,candidate(i),None)?; }
    store.register_voter(&election,"v")?;
    store.begin_voting(&election)?;
    let ballot = Ballot::from_strs("v",&[&["candidate0"],&["candidate1","candidate2","candidate3","candidate4"]]);
    assert_eq!(store.cast_ballot(&election,&ballot),Err(CommandError::TierCapacityExceeded{voter:VoterId::from("v"),tier:1,max:3,got:4}));
    assert!(store.recorded_ballot(&election,&VoterId::from("v")).is_empty());
    let ballot = Ballot::from_strs("v",&[&["candidate0"],&["candidate1"],&["candidate2"],&["candidate3"]]);
    assert!(matches!(store.cast_ballot(&election,&ballot),Err(CommandError::TooManyTiers{max:3,got:4,..})));
    assert!(store.recorded_ballot(&election,&VoterId::from("v")).is_empty());
    Ok(())
}

#[test]
fn test_derived_values_follow_ballot_changes() -> anyhow::Result<()> {
    let mut store = ElectionStore::new();
    let election = store.create_election("e",ElectionConfig::new(1,vec![1,1])?)?;
    for c in ["a","b"] { store.register_candidate(&election,c,None)?; }
    store.register_voter(&election,"v")?;
    assert_eq!(store.droop_quota(&election)?,Rational::new(1,2));
    store.begin_voting(&election)?;
    let voter = VoterId::from("v");
    let round0 = RoundKey::first(election.clone());
    store.cast_ballot(&election,&Ballot::from_strs("v",&[&["a"],&["b"]]))?;
    assert_eq!(store.current_favorites(&round0,&voter)?.top,vec![CandidateId::from("a")]);
    assert!(store.cached_values()>0);
    store.cast_ballot(&election,&Ballot::from_strs("v",&[&["b"]]))?;
    let favorites = store.current_favorites(&round0,&voter)?;
    assert_eq!(favorites.top,vec![CandidateId::from("b")]);
    assert!(favorites.next.is_empty());
    store.register_voter(&election,"w")?;
    assert_eq!(store.droop_quota(&election)?,Rational::from_integer(1));
    Ok(())
}

#[test]
fn test_rounds_must_be_spawned() -> anyhow::Result<()> {
    let (mut store,election) = thirty_four_for_candidate0()?;
    let round0 = RoundKey::first(election.clone());
    assert_eq!(store.vote_totals(&round0),Err(TabulationError::RoundNotSpawned{election:election.clone(),round:0}));
    assert_eq!(store.candidate_status(&round0,&candidate(0))?,CandidateStatus::Running);
    assert!(store.candidate_status(&round0.next(),&candidate(0)).is_err());
    assert_eq!(store.candidate_status(&round0,&CandidateId::from("nobody")),
        Err(TabulationError::UnknownCandidate{election:election.clone(),candidate:CandidateId::from("nobody")}));
    store.spawn_round(&election)?;
    assert!(store.vote_totals(&round0).is_ok());
    assert_eq!(store.candidate_status(&round0.next(),&candidate(0))?,CandidateStatus::Elected);
    Ok(())
}

#[test]
fn test_removed_election_cannot_be_tabulated() -> anyhow::Result<()> {
    let (mut store,election) = thirty_four_for_candidate0()?;
    let round0 = store.spawn_round(&election)?;
    store.remove_election(&election)?;
    assert_eq!(store.cached_values(),0);
    let no_quota = TabulationError::QuotaUnavailable(Box::new(TabulationError::UnknownElection(election.clone())));
    assert_eq!(store.round_outcome(&round0),Err(no_quota.clone()));
    // the quota is needed before any round is looked at.
    assert_eq!(store.round_outcome(&RoundKey::new(election.clone(),5)),Err(no_quota));
    assert_eq!(store.droop_quota(&election),Err(TabulationError::UnknownElection(election.clone())));
    assert!(store.transcript(&election).is_err());
    assert_eq!(store.spawn_round(&election),Err(CommandError::UnknownElection(election.clone())));
    let shown : RoundResult = store.round_outcome(&round0).into();
    assert_eq!(shown.to_string(),"could not be determined: Droop quota calculation failed: Election \"council\" was not found");
    Ok(())
}

/// Energy left after being elected twice is a fraction of what was left after the first time.
#[test]
fn test_energy_after_two_successive_elections() -> anyhow::Result<()> {
    let mut store = ElectionStore::new();
    let election = store.create_election("board",ElectionConfig::new(2,vec![1,1])?)?;
    for c in ["a","b","c"] { store.register_candidate(&election,c,None)?; }
    for i in 0..9 { store.register_voter(&election,format!("v{}",i))?; }
    store.begin_voting(&election)?;
    for i in 0..6 { store.cast_ballot(&election,&Ballot::from_strs(&format!("v{}",i),&[&["a"],&["b"]]))?; }
    for i in 6..8 { store.cast_ballot(&election,&Ballot::from_strs(&format!("v{}",i),&[&["b"]]))?; }
    store.begin_counting(&election)?;
    assert_eq!(store.droop_quota(&election)?,Rational::from_integer(3));

    let rounds = store.run_to_completion(&election)?;
    assert_eq!(rounds.len(),2);
    match store.round_outcome(&rounds[0])? {
        RoundOutcome::Elected{candidates} => {
            assert_eq!(candidates.len(),1);
            assert_eq!(candidates[0].candidate,CandidateId::from("a"));
            assert_eq!(candidates[0].total,Rational::from_integer(6));
            assert_eq!(candidates[0].surplus,Rational::from_integer(3));
        }
        other => panic!("Expected a elected, got {}",other),
    }
    let (v0,v6) = (VoterId::from("v0"),VoterId::from("v6"));
    assert_eq!(store.remaining_energy(&rounds[1],&v0)?,Rational::new(1,2));
    assert_eq!(store.remaining_energy(&rounds[1],&v6)?,Rational::one());
    match store.round_outcome(&rounds[1])? {
        RoundOutcome::Elected{candidates} => {
            assert_eq!(candidates.len(),1);
            assert_eq!(candidates[0].candidate,CandidateId::from("b"));
            assert_eq!(candidates[0].total,Rational::from_integer(5));
            assert_eq!(candidates[0].surplus,Rational::from_integer(2));
        }
        other => panic!("Expected b elected, got {}",other),
    }
    // 1/2 - 1/2 + (1/2)(2/5). Never negative.
    let round2 = rounds[1].next();
    assert_eq!(store.remaining_energy(&round2,&v0)?,Rational::new(1,5));
    assert_eq!(store.remaining_energy(&round2,&v6)?,Rational::new(2,5));
    assert_eq!(store.remaining_energy(&round2,&VoterId::from("v8"))?,Rational::one());
    assert_eq!(store.elected_candidates(&round2)?,vec![CandidateId::from("a"),CandidateId::from("b")]);
    assert_eq!(store.spawn_round(&election),Err(CommandError::CountingFinished(election.clone())));
    Ok(())
}
