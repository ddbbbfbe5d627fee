//! The results of each round of the count, and a record of the whole count.

use std::fmt;
use serde::{Serialize,Deserialize};
use crate::ballot_metadata::{CandidateId, ElectionId};
use crate::error::TabulationError;
use crate::rational::Rational;

/// Where a candidate is at, as of the start of a given round.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub enum CandidateStatus {
    Running,
    Elected,
    Eliminated,
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            CandidateStatus::Running => "running",
            CandidateStatus::Elected => "elected",
            CandidateStatus::Eliminated => "eliminated",
        })
    }
}

/// The weighted votes a running candidate has in a round.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct VoteTotal {
    pub candidate : CandidateId,
    pub total : Rational,
}

/// A candidate who reached quota.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct ElectedCandidate {
    pub candidate : CandidateId,
    pub total : Rational,
    /// total minus quota. Never negative.
    pub surplus : Rational,
}

/// What happened in a round. Every round either elects or eliminates someone.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(tag = "type")]
pub enum RoundOutcome {
    /// Everyone at or above quota, all at once.
    Elected{ candidates : Vec<ElectedCandidate> },
    /// Nobody reached quota, so everyone tied for the lowest total is eliminated.
    Eliminated{ candidates : Vec<CandidateId> },
}

impl RoundOutcome {
    /// The status the candidates mentioned in this outcome have after it.
    pub fn resulting_status(&self) -> CandidateStatus {
        match self {
            RoundOutcome::Elected{..} => CandidateStatus::Elected,
            RoundOutcome::Eliminated{..} => CandidateStatus::Eliminated,
        }
    }

    pub fn involves(&self,candidate:&CandidateId) -> bool {
        match self {
            RoundOutcome::Elected{candidates} => candidates.iter().any(|e|&e.candidate==candidate),
            RoundOutcome::Eliminated{candidates} => candidates.contains(candidate),
        }
    }

    pub fn candidates(&self) -> Vec<CandidateId> {
        match self {
            RoundOutcome::Elected{candidates} => candidates.iter().map(|e|e.candidate.clone()).collect(),
            RoundOutcome::Eliminated{candidates} => candidates.clone(),
        }
    }

    /// If elected, the details for a given candidate.
    pub fn elected(&self,candidate:&CandidateId) -> Option<&ElectedCandidate> {
        match self {
            RoundOutcome::Elected{candidates} => candidates.iter().find(|e|&e.candidate==candidate),
            RoundOutcome::Eliminated{..} => None,
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self.candidates().iter().map(|c|c.to_string()).collect::<Vec<_>>().join(", ");
        write!(f,"{} {}",self.resulting_status(),names)
    }
}

/// The outcome of a round for presentation, where a failure is a value to be shown rather than an error.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub enum RoundResult {
    Determined(RoundOutcome),
    Undetermined{ reason : String },
}

impl From<Result<RoundOutcome,TabulationError>> for RoundResult {
    fn from(r: Result<RoundOutcome,TabulationError>) -> Self {
        match r {
            Ok(outcome) => RoundResult::Determined(outcome),
            Err(e) => RoundResult::Undetermined{ reason: e.to_string() },
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoundResult::Determined(outcome) => write!(f,"{}",outcome),
            RoundResult::Undetermined{reason} => write!(f,"could not be determined: {}",reason),
        }
    }
}

#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct RoundTranscript {
    pub round : usize,
    /// Sorted highest first. Empty if they could not be determined.
    pub vote_totals : Vec<VoteTotal>,
    pub result : RoundResult,
}

#[derive(Clone,Debug,Serialize,Deserialize)]
pub struct Transcript {
    pub election : ElectionId,
    pub seats_to_fill : usize,
    /// The quota used, or why it could not be computed.
    pub quota : Result<Rational,String>,
    pub rounds : Vec<RoundTranscript>,
    /// in the order elected.
    pub elected : Vec<CandidateId>,
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.quota {
            Ok(quota) => writeln!(f,"Election {} for {} seats, quota {}",self.election,self.seats_to_fill,quota)?,
            Err(reason) => writeln!(f,"Election {} for {} seats, quota could not be determined: {}",self.election,self.seats_to_fill,reason)?,
        }
        for round in &self.rounds {
            let totals = round.vote_totals.iter().map(|t|format!("{} {}",t.candidate,t.total)).collect::<Vec<_>>().join("\t");
            writeln!(f,"Round {}\t{}\t: {}",round.round,totals,round.result)?;
        }
        write!(f,"Elected : {}",self.elected.iter().map(|c|c.to_string()).collect::<Vec<_>>().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use crate::ballot_metadata::{CandidateId, ElectionId};
    use crate::distribution_of_preferences_transcript::{CandidateStatus, ElectedCandidate, RoundOutcome, RoundResult};
    use crate::error::TabulationError;
    use crate::rational::Rational;

    #[test]
    fn test_outcome_queries() {
        let a = CandidateId::from("a");
        let b = CandidateId::from("b");
        let elected = RoundOutcome::Elected{candidates:vec![ElectedCandidate{candidate:a.clone(),total:Rational::from_integer(34),surplus:Rational::new(2,3)}]};
        assert!(elected.involves(&a));
        assert!(!elected.involves(&b));
        assert_eq!(elected.resulting_status(),CandidateStatus::Elected);
        assert_eq!(elected.elected(&a).map(|e|e.surplus.clone()),Some(Rational::new(2,3)));
        let eliminated = RoundOutcome::Eliminated{candidates:vec![a.clone(),b.clone()]};
        assert_eq!(eliminated.candidates(),vec![a,b]);
        assert_eq!(eliminated.to_string(),"eliminated a, b");
    }

    #[test]
    fn test_undetermined_result_is_shown() {
        let failed : RoundResult = Err(TabulationError::QuotaUnavailable(Box::new(TabulationError::UnknownElection(ElectionId::from("e"))))).into();
        assert_eq!(failed.to_string(),"could not be determined: Droop quota calculation failed: Election \"e\" was not found");
    }

    #[test]
    fn test_outcome_json() {
        let outcome = RoundOutcome::Eliminated{candidates:vec![CandidateId::from("c")]};
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json,r#"{"type":"Eliminated","candidates":["c"]}"#);
    }
}
