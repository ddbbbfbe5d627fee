// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Identities of the things taking part in an election.

use serde::{Serialize,Deserialize};
use std::fmt;

macro_rules! string_identity {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str { &self.0 }
        }
        impl From<&str> for $name {
            fn from(s: &str) -> Self { $name(s.to_string()) }
        }
        impl From<String> for $name {
            fn from(s: String) -> Self { $name(s) }
        }
        // type alias really, don't want long display
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.0) }
        }
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "#{}", self.0) }
        }
    };
}

string_identity!(
    /// An election. One store may hold many.
    ElectionId
);
string_identity!(
    /// A candidate. A candidate stands in exactly one election.
    CandidateId
);
string_identity!(
    /// A voter. A voter may be registered in many elections.
    VoterId
);

/// The name used for a candidate registered without one.
pub const NO_NAME : &str = "NO_NAME";

/// information about a candidate in the contest. Note that there is deliberately no status;
/// whether a candidate is running, elected or eliminated is derived from the round outcomes.
#[derive(Debug,Serialize,Deserialize,Clone,PartialEq,Eq)]
pub struct Candidate {
    pub id : CandidateId,
    pub name : String,
}

impl Candidate {
    pub fn new(id:CandidateId,name:Option<&str>) -> Self {
        Candidate{ id, name: name.unwrap_or(NO_NAME).to_string() }
    }
}
