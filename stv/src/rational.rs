// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! A lossless number, stored as a sum of fractions.
//!
//! Vote totals are sums of many small fractions `energy/|tier|`, most sharing a handful of
//! denominators. Rather than reduce after every addition, a [Rational] keeps a map from
//! denominator to the sum of the numerators over that denominator, and only turns that into a
//! single fraction when asked ([Rational::consolidate], [Rational::simplify]) or compared.
//!
//! Nothing here ever goes through floating point.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use num::{BigInt, BigRational, One, Signed, Zero};
use serde::{Deserialize, Serialize};
use crate::prime_factorization::{lcm, PrimeFactorization};

#[derive(Clone,Default,Serialize,Deserialize)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct Rational {
    /// denominator -> numerator. Denominators are always positive, numerators are never zero.
    terms : BTreeMap<BigInt,BigInt>,
}

impl Rational {
    /// numerator/denominator.
    /// # Panics
    /// If the denominator is zero.
    pub fn new(numerator:impl Into<BigInt>,denominator:impl Into<BigInt>) -> Self {
        let mut res = Rational::default();
        res.add_fraction(numerator,denominator);
        res
    }
    pub fn zero() -> Self { Rational::default() }
    pub fn one() -> Self { Rational::new(1,1) }
    pub fn from_integer(n:impl Into<BigInt>) -> Self { Rational::new(n,1) }

    /// Add numerator/denominator to this number. No reduction is done.
    /// # Panics
    /// If the denominator is zero.
    pub fn add_fraction(&mut self,numerator:impl Into<BigInt>,denominator:impl Into<BigInt>) -> &mut Self {
        let mut numerator = numerator.into();
        let mut denominator = denominator.into();
        assert!(!denominator.is_zero(),"Rational with zero denominator");
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        self.add_term(denominator,numerator);
        self
    }

    /// accumulate a term with a positive denominator.
    fn add_term(&mut self,denominator:BigInt,numerator:BigInt) {
        if numerator.is_zero() { return; }
        let sum = match self.terms.remove(&denominator) {
            Some(existing) => existing+numerator,
            None => numerator,
        };
        if !sum.is_zero() { self.terms.insert(denominator,sum); }
    }

    /// Subtract numerator/denominator from this number.
    pub fn sub_fraction(&mut self,numerator:impl Into<BigInt>,denominator:impl Into<BigInt>) -> &mut Self {
        let numerator : BigInt = numerator.into();
        self.add_fraction(-numerator,denominator)
    }

    /// Multiply every term by numerator/denominator.
    /// # Panics
    /// If the denominator is zero.
    pub fn mul_fraction(&mut self,numerator:impl Into<BigInt>,denominator:impl Into<BigInt>) -> &mut Self {
        let mut numerator = numerator.into();
        let mut denominator = denominator.into();
        assert!(!denominator.is_zero(),"Rational with zero denominator");
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        if numerator.is_zero() {
            self.terms.clear();
            return self;
        }
        // scaling every denominator by the same positive factor keeps them distinct.
        let previous = std::mem::take(&mut self.terms);
        for (d,n) in previous {
            self.terms.insert(d*&denominator,n*&numerator);
        }
        self
    }

    /// Divide every term by numerator/denominator.
    /// # Panics
    /// If numerator is zero.
    pub fn div_fraction(&mut self,numerator:impl Into<BigInt>,denominator:impl Into<BigInt>) -> &mut Self {
        let numerator = numerator.into();
        assert!(!numerator.is_zero(),"Division of a Rational by zero");
        self.mul_fraction(denominator,numerator)
    }

    /// Put all terms over their least common denominator, and return (numerator,denominator).
    /// The denominator is always positive. The result is not necessarily in lowest terms.
    pub fn consolidate(&self) -> (BigInt,BigInt) {
        if self.terms.len()==1 {
            if let Some((d,n)) = self.terms.iter().next() { return (n.clone(),d.clone()); }
        }
        let common_denominator = lcm(self.terms.keys());
        let mut numerator = BigInt::zero();
        for (d,n) in &self.terms {
            numerator+=n*(&common_denominator/d);
        }
        (numerator,common_denominator)
    }

    /// Consolidate, then reduce to lowest terms. Zero is (0,1).
    ///
    /// The gcd comes from the same prime factorization machinery as consolidation. With
    /// `l=lcm(n,d)`, the reduced fraction is `(l/d)/(l/n)`.
    pub fn simplify(&self) -> (BigInt,BigInt) {
        let (numerator,denominator) = self.consolidate();
        if numerator.is_zero() { return (BigInt::zero(),BigInt::one()); }
        let magnitude = numerator.abs();
        let mut combined = PrimeFactorization::of(&denominator);
        combined.and(&magnitude);
        let l = combined.compute();
        let reduced_numerator = &l/&denominator;
        let reduced_denominator = &l/&magnitude;
        (if numerator.is_negative() { -reduced_numerator } else { reduced_numerator },reduced_denominator)
    }

    /// The same value as a single fraction in lowest terms.
    pub fn reduced(&self) -> Rational {
        let (numerator,denominator) = self.simplify();
        Rational::new(numerator,denominator)
    }

    /// Exact comparison by cross multiplication.
    pub fn is_greater_than(&self,other:&Rational) -> bool {
        self.cmp(other)==Ordering::Greater
    }

    pub fn is_zero(&self) -> bool { self.consolidate().0.is_zero() }
    pub fn is_negative(&self) -> bool { self.consolidate().0.is_negative() }

    /// The number of distinct denominators currently held. Mainly of interest for testing.
    pub fn num_terms(&self) -> usize { self.terms.len() }

    /// The (denominator,numerator) terms of the unconsolidated sum.
    pub fn terms(&self) -> impl Iterator<Item=(&BigInt,&BigInt)> { self.terms.iter() }

    pub fn to_big_rational(&self) -> BigRational {
        let (numerator,denominator) = self.simplify();
        BigRational::new(numerator,denominator)
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool { self.cmp(other)==Ordering::Equal }
}
impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Rational {
    /// a/b vs c/d with b,d positive is a*d vs c*b.
    fn cmp(&self, other: &Self) -> Ordering {
        let (a,b) = self.consolidate();
        let (c,d) = other.consolidate();
        (a*d).cmp(&(c*b))
    }
}

impl From<BigRational> for Rational {
    fn from(r: BigRational) -> Self { Rational::new(r.numer().clone(),r.denom().clone()) }
}

impl From<usize> for Rational {
    fn from(n: usize) -> Self { Rational::from_integer(n) }
}

impl AddAssign<&Rational> for Rational {
    /// Add all the terms of rhs to this. Still no reduction.
    fn add_assign(&mut self, rhs: &Rational) {
        for (denominator,numerator) in &rhs.terms {
            self.add_term(denominator.clone(),numerator.clone());
        }
    }
}
impl SubAssign<&Rational> for Rational {
    fn sub_assign(&mut self, rhs: &Rational) {
        for (denominator,numerator) in &rhs.terms {
            self.add_term(denominator.clone(),-numerator);
        }
    }
}
impl MulAssign<&Rational> for Rational {
    /// Multiply by the simplified form of rhs.
    fn mul_assign(&mut self, rhs: &Rational) {
        let (numerator,denominator) = rhs.simplify();
        self.mul_fraction(numerator,denominator);
    }
}
impl DivAssign<&Rational> for Rational {
    /// Divide by the simplified form of rhs. Panics if rhs is zero.
    fn div_assign(&mut self, rhs: &Rational) {
        let (numerator,denominator) = rhs.simplify();
        self.div_fraction(numerator,denominator);
    }
}

impl Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: Self) -> Rational { let mut res = self.clone(); res+=rhs; res }
}
impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: Self) -> Rational { let mut res = self.clone(); res-=rhs; res }
}
impl Mul for &Rational {
    type Output = Rational;
    fn mul(self, rhs: Self) -> Rational { let mut res = self.clone(); res*=rhs; res }
}
impl Div for &Rational {
    type Output = Rational;
    fn div(self, rhs: Self) -> Rational { let mut res = self.clone(); res/=rhs; res }
}
impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational { let mut res = Rational::zero(); res-=self; res }
}

impl <'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item=&'a Rational>>(iter: I) -> Self {
        let mut res = Rational::zero();
        for v in iter { res+=v; }
        res
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (numerator,denominator) = self.simplify();
        if denominator.is_one() { write!(f,"{}",numerator) } else { write!(f,"{}/{}",numerator,denominator) }
    }
}

// don't want the internal terms in the debug output.
impl Debug for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f,"{}",self) }
}

#[derive(thiserror::Error,Debug,Clone,PartialEq,Eq)]
pub enum ParseRationalError {
    #[error("Could not parse {0} as an integer")]
    NotAnInteger(String),
    #[error("Zero denominator in {0}")]
    ZeroDenominator(String),
}

impl FromStr for Rational {
    type Err = ParseRationalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part:&str| part.trim().parse::<BigInt>().map_err(|_|ParseRationalError::NotAnInteger(part.to_string()));
        match s.split_once('/') {
            None => Ok(Rational::from_integer(parse(s)?)),
            Some((numerator,denominator)) => {
                let denominator = parse(denominator)?;
                if denominator.is_zero() { return Err(ParseRationalError::ZeroDenominator(s.to_string())); }
                Ok(Rational::new(parse(numerator)?,denominator))
            }
        }
    }
}

impl From<Rational> for String {
    fn from(r: Rational) -> Self { r.to_string() }
}

impl TryFrom<String> for Rational {
    type Error = ParseRationalError;
    fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}
