// Copyright 2021-2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Exact Single Transferable Vote counting for elections where voters rank candidates in tiers.
//!
//! An [election_data::ElectionStore] holds elections, candidates, voters and ballots. Once counting
//! begins, rounds are spawned one at a time; each elects everyone who reaches the Droop quota, or
//! eliminates whoever is last. All arithmetic is exact, using [rational::Rational].

pub mod prime_factorization;
pub mod rational;
pub mod droop;
pub mod ballot_metadata;
pub mod ballot_paper;
pub mod election_config;
pub mod error;
pub mod relation;
pub mod history;
pub mod memo;
pub mod election_data;
pub mod transfer_value;
pub mod preference_distribution;
pub mod distribution_of_preferences_transcript;
