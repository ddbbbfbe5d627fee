// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! A relation between two kinds of things, indexed so it can be looked up from either side.
//! Used for voter↔election registration, election↔candidate and voter↔candidate votes.

use std::collections::{BTreeMap, BTreeSet};

/// Pairs (left,right), each carrying some content, looked up efficiently from either side.
/// Iteration orders are sorted, so anything computed from a relation is deterministic.
#[derive(Debug,Clone)]
pub struct Join<L,R,C=()> {
    forward : BTreeMap<L,BTreeMap<R,C>>,
    backward : BTreeMap<R,BTreeSet<L>>,
}

impl <L,R,C> Default for Join<L,R,C> {
    fn default() -> Self { Join{ forward: BTreeMap::new(), backward: BTreeMap::new() } }
}

impl <L:Ord+Clone,R:Ord+Clone,C> Join<L,R,C> {
    /// Relate left and right, replacing any existing content for the pair.
    pub fn set(&mut self,left:L,right:R,content:C) {
        self.backward.entry(right.clone()).or_default().insert(left.clone());
        self.forward.entry(left).or_default().insert(right,content);
    }

    /// Remove the pair, returning its content if it was present.
    pub fn remove(&mut self,left:&L,right:&R) -> Option<C> {
        let res = self.forward.get_mut(left).and_then(|m|m.remove(right));
        if self.forward.get(left).is_some_and(|m|m.is_empty()) { self.forward.remove(left); }
        if let Some(lefts) = self.backward.get_mut(right) {
            lefts.remove(left);
            if lefts.is_empty() { self.backward.remove(right); }
        }
        res
    }

    /// Remove everything related to a given right hand side.
    pub fn remove_right(&mut self,right:&R) {
        for left in self.backward.remove(right).unwrap_or_default() {
            if let Some(m) = self.forward.get_mut(&left) {
                m.remove(right);
                if m.is_empty() { self.forward.remove(&left); }
            }
        }
    }

    /// Remove everything related to a given left hand side.
    pub fn remove_left(&mut self,left:&L) {
        for right in self.forward.remove(left).map(|m|m.into_keys().collect::<Vec<_>>()).unwrap_or_default() {
            if let Some(lefts) = self.backward.get_mut(&right) {
                lefts.remove(left);
                if lefts.is_empty() { self.backward.remove(&right); }
            }
        }
    }

    pub fn contains(&self,left:&L,right:&R) -> bool { self.content(left,right).is_some() }

    pub fn content(&self,left:&L,right:&R) -> Option<&C> { self.forward.get(left).and_then(|m|m.get(right)) }

    /// The right hand sides related to a given left, with the content of each pair.
    pub fn entries_of_left<'a>(&'a self,left:&L) -> impl Iterator<Item=(&'a R,&'a C)> + use<'a,L,R,C> {
        self.forward.get(left).into_iter().flat_map(|m|m.iter())
    }

    /// The right hand sides related to a given left.
    pub fn keys_of_left<'a>(&'a self,left:&L) -> impl Iterator<Item=&'a R> + use<'a,L,R,C> {
        self.entries_of_left(left).map(|(r,_)|r)
    }

    /// The left hand sides related to a given right.
    pub fn keys_of_right<'a>(&'a self,right:&R) -> impl Iterator<Item=&'a L> + use<'a,L,R,C> {
        self.backward.get(right).into_iter().flat_map(|s|s.iter())
    }

    pub fn count_of_right(&self,right:&R) -> usize { self.backward.get(right).map(|s|s.len()).unwrap_or(0) }

    /// true if there is any pair with the given right hand side.
    pub fn has_right(&self,right:&R) -> bool { self.backward.contains_key(right) }
}
