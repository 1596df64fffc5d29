// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, ONE_MINUS_EPSILON};

pub const PRIME_TABLE_SIZE: usize = 1024;

/// The first `PRIME_TABLE_SIZE` primes, one Halton base per dimension.
pub static PRIMES: [u64; PRIME_TABLE_SIZE] = generate_primes();

const fn generate_primes() -> [u64; PRIME_TABLE_SIZE] {
    let mut primes = [0u64; PRIME_TABLE_SIZE];
    let mut count = 0;
    let mut candidate = 2u64;
    while count < PRIME_TABLE_SIZE {
        let mut is_prime = true;
        let mut i = 0;
        while i < count {
            let p = primes[i];
            if p * p > candidate {
                break;
            }
            if candidate % p == 0 {
                is_prime = false;
                break;
            }
            i += 1;
        }
        if is_prime {
            primes[count] = candidate;
            count += 1;
        }
        candidate += 1;
    }
    primes
}

/// Radical inverse of `index` in the prime base assigned to `dimension`,
/// i.e. component `dimension` of the `index`-th Halton point. Dimensions
/// past the prime table wrap around.
pub fn radical_inverse(dimension: usize, index: u64) -> Float {
    let base = PRIMES[dimension % PRIME_TABLE_SIZE];
    let inv_base = 1.0f64 / base as f64;
    let mut factor = inv_base;
    let mut result = 0.0f64;
    let mut i = index;
    while i > 0 {
        let next = i / base;
        let digit = i - next * base;
        result += digit as f64 * factor;
        factor *= inv_base;
        i = next;
    }
    (result as Float).min(ONE_MINUS_EPSILON)
}

/// Cursor over the dimensions of one Halton point. Each light path owns
/// its own stream, so sampling never touches shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QmcSampleStream {
    index: u64,
    dimension: usize,
}

impl QmcSampleStream {
    pub fn new(index: u64) -> Self {
        Self { index, dimension: 0 }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn next_1d(&mut self) -> Float {
        let value = radical_inverse(self.dimension, self.index);
        self.dimension += 1;
        value
    }

    pub fn next_2d(&mut self) -> Vector2f {
        let u = self.next_1d();
        let v = self.next_1d();
        Vector2f::new(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_table() {
        assert_eq!(&PRIMES[..6], &[2, 3, 5, 7, 11, 13]);
        assert_eq!(PRIMES[PRIME_TABLE_SIZE - 1], 8161);
    }

    #[test]
    fn test_radical_inverse_known_values() {
        assert_eq!(radical_inverse(0, 0), 0.0);
        assert_eq!(radical_inverse(0, 1), 0.5);
        assert_eq!(radical_inverse(0, 2), 0.25);
        assert_eq!(radical_inverse(0, 3), 0.75);
        assert!((radical_inverse(1, 1) - 1.0 / 3.0).abs() < 1e-6);
        assert!((radical_inverse(1, 5) - (2.0 / 3.0 + 1.0 / 9.0)).abs() < 1e-6);
    }

    #[test]
    fn test_radical_inverse_range() {
        for dim in [0usize, 1, 17, 1023, 5000].iter() {
            for index in [1u64, 12345, u64::MAX / 3, u64::MAX].iter() {
                let v = radical_inverse(*dim, *index);
                assert!(v >= 0.0 && v < 1.0);
            }
        }
    }

    #[test]
    fn test_stream_is_deterministic() {
        let mut a = QmcSampleStream::new(42);
        let mut b = QmcSampleStream::new(42);
        let first = a.next_2d();
        assert_eq!(first, b.next_2d());
        assert_eq!(a.dimension(), 2);
        assert_eq!(a.next_1d(), radical_inverse(2, 42));
        assert_eq!(first.x, radical_inverse(0, 42));
    }
}
