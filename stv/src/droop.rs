// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! The threshold for election.

use num::BigInt;
use crate::rational::Rational;

/// The exact, unrounded Droop quota `voters/(seats+1)`. A candidate with a total at least this is elected.
///
/// Note that this is not the classical `floor(voters/(seats+1))+1`. With fractional vote totals there
/// is no need to round, and `>=` against the exact value is used everywhere.
pub fn droop_quota(num_voters:usize,num_seats:usize) -> Rational {
    Rational::new(num_voters,BigInt::from(num_seats)+1)
}
