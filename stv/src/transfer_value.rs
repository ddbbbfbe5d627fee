// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! How much of a vote is left to transfer.
//!
//! Every voter starts with an energy of 1. In a round where some of the voter's top tier are elected,
//! the part of the voter's energy given to each such candidate is spent, except that the fraction
//! surplus/total of it is given back to be used on later preferences.
//!
//! The share is the voter's current energy divided by the size of their top tier, not `1/k` of a
//! whole vote. So a voter who has already had part of their vote spent can never go below zero:
//! after a second election the energy is `e - e/k + (e/k)*surplus/total`, not `e - 1/k + ...`.

use crate::ballot_metadata::VoterId;
use crate::distribution_of_preferences_transcript::{ElectedCandidate, RoundOutcome};
use crate::election_data::ElectionStore;
use crate::error::TabulationError;
use crate::history::RoundKey;
use crate::rational::Rational;

/// The energy left after a candidate the voter was supporting with `share` of it is elected.
pub fn energy_after_election(energy:&Rational,share:&Rational,elected:&ElectedCandidate) -> Rational {
    let mut res = energy-share;
    if !elected.total.is_zero() {
        let mut refund = share*&elected.surplus;
        refund/=&elected.total;
        res+=&refund;
    }
    res.reduced()
}

impl ElectionStore {
    /// The fraction of the voter's vote still available as of the start of the given round.
    pub fn remaining_energy(&self,round:&RoundKey,voter:&VoterId) -> Result<Rational,TabulationError> {
        self.memo.remaining_energy.get(&(round.clone(),voter.clone()),||self.compute_remaining_energy(round,voter))
    }

    fn compute_remaining_energy(&self,round:&RoundKey,voter:&VoterId) -> Result<Rational,TabulationError> {
        self.check_round(round,true)?;
        let Some(previous) = round.previous() else { return Ok(Rational::one()) };
        let energy = self.remaining_energy(&previous,voter)?;
        let outcome = self.round_outcome(&previous).map_err(|e|TabulationError::upstream(previous.round,e))?;
        let RoundOutcome::Elected{candidates} = outcome else { return Ok(energy) };
        let favorites = self.current_favorites(&previous,voter)?;
        if favorites.is_exhausted() { return Ok(energy); }
        let mut share = energy.clone();
        share.div_fraction(favorites.top.len(),1);
        let mut res = energy;
        for elected in candidates.iter().filter(|e|favorites.top.contains(&e.candidate)) {
            res = energy_after_election(&res,&share,elected);
        }
        Ok(res)
    }
}
