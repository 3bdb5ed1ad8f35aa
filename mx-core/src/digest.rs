//! Non-cryptographic 32-bit digests
//!
//! Every function has the same shape, [`DigestFn`], so callers can pick one at
//! runtime through [`Algorithm`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Uniform digest signature
pub type DigestFn = fn(&[u8]) -> u32;

const ADLER_MODULO: u32 = 65521;
const FNV_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Adler-32
pub fn adler32(src: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in src {
        a = (a + byte as u32) % ADLER_MODULO;
        b = (b + a) % ADLER_MODULO;
    }
    (b << 16) | a
}

/// FNV-0: FNV-1 with a zero offset basis
pub fn fnv0(src: &[u8]) -> u32 {
    src.iter()
        .fold(0u32, |hash, &byte| hash.wrapping_mul(FNV_PRIME) ^ byte as u32)
}

/// FNV-1: multiply, then xor
pub fn fnv1(src: &[u8]) -> u32 {
    src.iter()
        .fold(FNV_BASIS, |hash, &byte| hash.wrapping_mul(FNV_PRIME) ^ byte as u32)
}

/// FNV-1a: xor, then multiply
pub fn fnv1a(src: &[u8]) -> u32 {
    src.iter()
        .fold(FNV_BASIS, |hash, &byte| (hash ^ byte as u32).wrapping_mul(FNV_PRIME))
}

/// Byte-wise comparison of two digests, `memcmp` style
pub fn compare_digest(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Digest algorithm selectable by name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Adler32,
    Fnv0,
    Fnv1,
    Fnv1a,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Adler32,
        Algorithm::Fnv0,
        Algorithm::Fnv1,
        Algorithm::Fnv1a,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Adler32 => "adler32",
            Algorithm::Fnv0 => "fnv0",
            Algorithm::Fnv1 => "fnv1",
            Algorithm::Fnv1a => "fnv1a",
        }
    }

    pub fn function(self) -> DigestFn {
        match self {
            Algorithm::Adler32 => adler32,
            Algorithm::Fnv0 => fnv0,
            Algorithm::Fnv1 => fnv1,
            Algorithm::Fnv1a => fnv1a,
        }
    }

    pub fn digest(self, src: &[u8]) -> u32 {
        (self.function())(src)
    }

    /// Running state for digesting data that arrives in pieces
    pub fn hasher(self) -> Hasher {
        Hasher::new(self)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown algorithm name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest algorithm '{0}'")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

/// Incremental digest state. Feeding the input in any number of pieces gives
/// the same result as digesting it in one call.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    algorithm: Algorithm,
    a: u32,
    b: u32,
}

impl Hasher {
    pub fn new(algorithm: Algorithm) -> Self {
        let a = match algorithm {
            Algorithm::Adler32 => 1,
            Algorithm::Fnv0 => 0,
            Algorithm::Fnv1 | Algorithm::Fnv1a => FNV_BASIS,
        };
        Hasher { algorithm, a, b: 0 }
    }

    pub fn update(&mut self, src: &[u8]) {
        for &byte in src {
            let byte = byte as u32;
            match self.algorithm {
                Algorithm::Adler32 => {
                    self.a = (self.a + byte) % ADLER_MODULO;
                    self.b = (self.b + self.a) % ADLER_MODULO;
                }
                Algorithm::Fnv0 | Algorithm::Fnv1 => {
                    self.a = self.a.wrapping_mul(FNV_PRIME) ^ byte;
                }
                Algorithm::Fnv1a => {
                    self.a = (self.a ^ byte).wrapping_mul(FNV_PRIME);
                }
            }
        }
    }

    pub fn finish(&self) -> u32 {
        match self.algorithm {
            Algorithm::Adler32 => (self.b << 16) | self.a,
            _ => self.a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32_known_values() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn test_adler32_high_bytes_are_unsigned() {
        // a = 1 + 255, b = 256
        assert_eq!(adler32(&[0xff]), (256 << 16) | 256);
    }

    #[test]
    fn test_fnv_known_values() {
        assert_eq!(fnv1(b""), FNV_BASIS);
        assert_eq!(fnv1a(b""), FNV_BASIS);
        assert_eq!(fnv0(b""), 0);
        assert_eq!(fnv1(b"a"), 0x050c_5d7e);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
        assert_eq!(fnv0(b"a"), 0x61);
    }

    #[test]
    fn test_algorithm_by_name() {
        assert_eq!("FNV1A".parse::<Algorithm>(), Ok(Algorithm::Fnv1a));
        assert_eq!("adler32".parse::<Algorithm>(), Ok(Algorithm::Adler32));
        let err = "md5".parse::<Algorithm>().unwrap_err();
        assert_eq!(err.to_string(), "unknown digest algorithm 'md5'");
    }

    #[test]
    fn test_hasher_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for algorithm in Algorithm::ALL {
            let mut hasher = algorithm.hasher();
            for chunk in data.chunks(7) {
                hasher.update(chunk);
            }
            assert_eq!(hasher.finish(), algorithm.digest(data), "{}", algorithm);
        }
    }

    #[test]
    fn test_compare_digest() {
        let x = fnv1a(b"x").to_be_bytes();
        let y = fnv1a(b"y").to_be_bytes();
        assert_eq!(compare_digest(&x, &x), Ordering::Equal);
        assert_ne!(compare_digest(&x, &y), Ordering::Equal);
        assert_eq!(compare_digest(&[1, 2], &[1, 3]), Ordering::Less);
    }
}
