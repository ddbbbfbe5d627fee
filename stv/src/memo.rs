// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Caches for derived values, so that each is computed at most once between writes.
//!
//! Derived values (round outcomes, candidate status, voter energy...) depend on each other
//! recursively through earlier rounds. Each is a pure function of its key and the store, so
//! the result can be remembered until something is written that could change it.
//!
//! Everything is single threaded; reads go through a shared reference to the store.



use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use crate::ballot_metadata::{CandidateId, ElectionId, VoterId};
use crate::distribution_of_preferences_transcript::{CandidateStatus, RoundOutcome, VoteTotal};
use crate::error::TabulationError;
use crate::history::RoundKey;
use crate::preference_distribution::Favorites;
use crate::rational::Rational;

/// Remembers the value computed for each key.
pub struct MemoTable<K,V> {
    map : RefCell<HashMap<K,V>>
}

impl <K,V> Default for MemoTable<K,V> {
    fn default() -> Self {
        MemoTable{ map: RefCell::new(HashMap::new()) }
    }
}

impl<K,V> MemoTable<K,V>
    where
        K: Eq+Hash+Clone,
        V: Clone,
{
    /// Get the value for the key, computing it if it is not already known.
    ///
    /// The cache is not borrowed while `calculation` runs, so the calculation may itself
    /// use this or other tables, as long as it does not recursively need its own key.
    ///
    ///# Example
    ///
    ///```
    /// use tiered_stv::memo::MemoTable;
    /// let table : MemoTable<u32,u32> = MemoTable::default();
    /// assert_eq!(table.get(&7,||1),1);
    /// assert_eq!(table.get(&7,||2),1); // remembered
    /// table.clear();
    /// assert_eq!(table.get(&7,||2),2);
    ///```
    pub fn get<F:FnOnce()->V>(&self,argument:&K,calculation : F) -> V {
        let cached = self.map.borrow().get(argument).cloned();
        if let Some(res) = cached { return res; }
        let res = calculation();
        self.map.borrow_mut().insert(argument.clone(),res.clone());
        res
    }

    /// Remember a value without computing it, replacing anything already known.
    pub fn insert(&self,argument:K,value:V) { self.map.borrow_mut().insert(argument,value); }

    pub fn contains(&self,argument:&K) -> bool { self.map.borrow().contains_key(argument) }

    /// Forget the keys for which `keep` returns false.
    pub fn retain<F:FnMut(&K)->bool>(&self,mut keep:F) { self.map.borrow_mut().retain(|k,_|keep(k)); }

    pub fn clear(&self) { self.map.borrow_mut().clear(); }

    pub fn len(&self) -> usize { self.map.borrow().len() }
    pub fn is_empty(&self) -> bool { self.map.borrow().is_empty() }
}

/// All the derived values of a store, keyed by what they were computed from.
#[derive(Default)]
pub(crate) struct Memo {
    pub(crate) favorites : MemoTable<(RoundKey,VoterId),Result<Favorites,TabulationError>>,
    pub(crate) remaining_energy : MemoTable<(RoundKey,VoterId),Result<Rational,TabulationError>>,
    pub(crate) status : MemoTable<(RoundKey,CandidateId),Result<CandidateStatus,TabulationError>>,
    pub(crate) vote_totals : MemoTable<RoundKey,Result<Vec<VoteTotal>,TabulationError>>,
    pub(crate) outcome : MemoTable<RoundKey,Result<RoundOutcome,TabulationError>>,
}

impl Memo {
    /// Forget everything derived for a given election, as something it depends on has changed.
    pub(crate) fn invalidate(&self,election:&ElectionId) {
        self.favorites.retain(|(r,_)|&r.election!=election);
        self.remaining_energy.retain(|(r,_)|&r.election!=election);
        self.status.retain(|(r,_)|&r.election!=election);
        self.vote_totals.retain(|r|&r.election!=election);
        self.outcome.retain(|r|&r.election!=election);
    }

    /// Forget everything derived for rounds `from.round` and later of the same election.
    /// Used when a round is spawned, as earlier rounds cannot depend on later ones.
    pub(crate) fn forget_rounds_from(&self,from:&RoundKey) {
        let stale = |r:&RoundKey| r.election==from.election && r.round>=from.round;
        self.favorites.retain(|(r,_)|!stale(r));
        self.remaining_energy.retain(|(r,_)|!stale(r));
        self.status.retain(|(r,_)|!stale(r));
        self.vote_totals.retain(|r|!stale(r));
        self.outcome.retain(|r|!stale(r));
    }

    /// The number of values currently remembered.
    pub(crate) fn len(&self) -> usize {
        self.favorites.len()+self.remaining_energy.len()+self.status.len()+self.vote_totals.len()+self.outcome.len()
    }
}
