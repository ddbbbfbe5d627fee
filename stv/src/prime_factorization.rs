// Copyright 2024 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.

//! Prime factorization by trial division.
//!
//! This is the one piece of number theory used by [crate::rational::Rational]. Merging
//! factorizations by taking the maximum exponent of each prime gives the least common multiple,
//! which is used both to put fractions over a common denominator and, via `gcd(a,b)=a*b/lcm(a,b)`,
//! to reduce a fraction to lowest terms.
//!
//! The numbers factorized are denominators built from small counts of candidates and voters, so
//! trial division is fast enough. Do not feed it cryptographic sized numbers.

use std::collections::BTreeMap;
use num::{BigInt, One, Signed, Zero};

/// The prime factors of a positive integer, as prime -> exponent. The factorization of 1 is empty.
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct PrimeFactorization {
    factors : BTreeMap<BigInt,u32>
}

impl PrimeFactorization {
    /// Factorize a positive integer.
    ///
    /// ```
    /// use num::BigInt;
    /// use tiered_stv::prime_factorization::PrimeFactorization;
    /// let f = PrimeFactorization::of(&BigInt::from(12));
    /// assert_eq!(f.exponent(&BigInt::from(2)),2);
    /// assert_eq!(f.exponent(&BigInt::from(3)),1);
    /// assert_eq!(f.compute(),BigInt::from(12));
    /// ```
    ///
    /// # Panics
    /// If n is zero or negative. Factorizing those is meaningless, and callers must check first.
    pub fn of(n:&BigInt) -> Self {
        assert!(n.is_positive(),"Can only factorize positive integers, not {}",n);
        let mut res = PrimeFactorization::default();
        res.add_factors_of(n.clone());
        res
    }

    /// Trial division from 2 upwards. After finding a factor, keep going with the cofactor,
    /// which can have no prime factors smaller than the one just found.
    fn add_factors_of(&mut self,mut n:BigInt) {
        let mut divisor = BigInt::from(2);
        while &divisor*&divisor <= n {
            if (&n % &divisor).is_zero() {
                n /= &divisor;
                *self.factors.entry(divisor.clone()).or_insert(0)+=1;
            } else {
                divisor+=1;
            }
        }
        if n>BigInt::one() { *self.factors.entry(n).or_insert(0)+=1; }
    }

    /// The power of the given prime in this factorization, 0 if it is not a factor.
    pub fn exponent(&self,prime:&BigInt) -> u32 { self.factors.get(prime).cloned().unwrap_or(0) }

    /// The (prime,exponent) pairs in increasing order of prime.
    pub fn iter(&self) -> impl Iterator<Item=(&BigInt,u32)> { self.factors.iter().map(|(p,e)|(p,*e)) }

    /// true for the factorization of 1.
    pub fn is_empty(&self) -> bool { self.factors.is_empty() }

    /// Merge in another factorization, keeping the larger exponent of each prime.
    /// The result is the factorization of the least common multiple.
    pub fn merge_max(&mut self,other:&PrimeFactorization) -> &mut Self {
        for (prime,&exponent) in &other.factors {
            let existing = self.factors.entry(prime.clone()).or_insert(0);
            if *existing<exponent { *existing=exponent; }
        }
        self
    }

    /// Merge in the factorization of a positive integer, as [Self::merge_max].
    pub fn and(&mut self,n:&BigInt) -> &mut Self {
        self.merge_max(&PrimeFactorization::of(n))
    }

    /// Multiply the factors back together.
    pub fn compute(&self) -> BigInt {
        let mut res = BigInt::one();
        for (prime,&exponent) in &self.factors {
            res*=num::pow(prime.clone(),exponent as usize);
        }
        res
    }
}

/// The least common multiple of some positive integers. The lcm of nothing is 1.
pub fn lcm<'a>(values:impl IntoIterator<Item=&'a BigInt>) -> BigInt {
    let mut combined = PrimeFactorization::default();
    for v in values { combined.and(v); }
    combined.compute()
}

/// The greatest common divisor of two positive integers, computed as `a*b/lcm(a,b)`.
pub fn gcd(a:&BigInt,b:&BigInt) -> BigInt {
    (a*b)/lcm([a,b])
}

/// The least common multiple of all the integers 1..=n. Sometimes called a compactorial, as it
/// is like a factorial with the redundant factors removed.
/// ```
/// use num::BigInt;
/// use tiered_stv::prime_factorization::compactorial;
/// assert_eq!(compactorial(9),BigInt::from(2520));
/// ```
pub fn compactorial(n:u64) -> BigInt {
    let mut combined = PrimeFactorization::default();
    for i in 2..=n { combined.and(&BigInt::from(i)); }
    combined.compute()
}

#[cfg(test)]
mod tests {
    use num::BigInt;
    use crate::prime_factorization::{PrimeFactorization, compactorial, gcd, lcm};

    fn factors(n:i64) -> Vec<(i64,u32)> {
        PrimeFactorization::of(&BigInt::from(n)).iter().map(|(p,e)|(i64::try_from(p).unwrap(),e)).collect()
    }

    #[test]
    fn test_small_factorizations() {
        assert!(PrimeFactorization::of(&BigInt::from(1)).is_empty());
        assert_eq!(factors(2),vec![(2,1)]);
        assert_eq!(factors(3),vec![(3,1)]);
        assert_eq!(factors(4),vec![(2,2)]);
        assert_eq!(factors(5),vec![(5,1)]);
        assert_eq!(factors(6),vec![(2,1),(3,1)]);
        assert_eq!(factors(360),vec![(2,3),(3,2),(5,1)]);
        assert_eq!(factors(7919),vec![(7919,1)]);
    }

    #[test]
    fn test_recombination() {
        for n in 1..500 {
            let n = BigInt::from(n);
            assert_eq!(PrimeFactorization::of(&n).compute(),n);
        }
    }

    #[test]
    fn test_lcm_and_gcd() {
        let b = |n:i64|BigInt::from(n);
        assert_eq!(lcm([&b(4),&b(6)]),b(12));
        assert_eq!(lcm([&b(3),&b(5),&b(7)]),b(105));
        assert_eq!(lcm(std::iter::empty::<&BigInt>()),b(1));
        assert_eq!(gcd(&b(12),&b(18)),b(6));
        assert_eq!(gcd(&b(35),&b(64)),b(1));
        assert_eq!(gcd(&b(7),&b(7)),b(7));
    }

    #[test]
    fn test_compactorial() {
        let expected = [1,1,2,6,12,60,60,420,840,2520];
        for (n,e) in expected.iter().enumerate() {
            assert_eq!(compactorial(n as u64),BigInt::from(*e),"compactorial({})",n);
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_is_not_factorizable() {
        PrimeFactorization::of(&BigInt::from(0));
    }
}
