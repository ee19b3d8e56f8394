//! Compact probabilistic phrase table.
//!
//! Bit array with `k` probes derived by double hashing. Both hash halves
//! come from the key's CRC-32 run through a 64-bit mixer, never from the
//! std hasher, so compiled files stay valid across builds.
//!
//! File layout: `BDPT`, version byte, bincode body, CRC-32 of the body
//! (little-endian).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{PhraseTable, PhraseTableError};

pub(super) const MAGIC: &[u8; 4] = b"BDPT";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 5;
const MAX_HASHES: u32 = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloomPhraseTable {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
    items: u64,
}

/// splitmix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl BloomPhraseTable {
    /// Size the filter for `capacity` items at false-positive rate `fp_rate`.
    pub fn with_capacity(capacity: usize, fp_rate: f64) -> Result<Self, PhraseTableError> {
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(PhraseTableError::InvalidParameter(format!(
                "false-positive rate must be in (0, 1), got {fp_rate}"
            )));
        }
        let n = capacity.max(1) as f64;
        let ln2 = std::f64::consts::LN_2;
        let num_bits = (-(n * fp_rate.ln()) / (ln2 * ln2)).ceil().max(64.0) as u64;
        let num_hashes = ((num_bits as f64 / n) * ln2).round().clamp(1.0, MAX_HASHES as f64) as u32;
        let words = num_bits.div_ceil(64) as usize;
        Ok(Self {
            bits: vec![0; words],
            num_bits,
            num_hashes,
            items: 0,
        })
    }

    /// Build a filter holding every pair in `pairs`.
    pub fn from_pairs<'a, I>(pairs: I, fp_rate: f64) -> Result<Self, PhraseTableError>
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: ExactSizeIterator,
    {
        let iter = pairs.into_iter();
        let mut table = Self::with_capacity(iter.len(), fp_rate)?;
        for pair in iter {
            table.insert(pair);
        }
        Ok(table)
    }

    fn probes(&self, pair: &str) -> impl Iterator<Item = u64> {
        let crc = crc32fast::hash(pair.as_bytes()) as u64;
        let a = mix64(crc ^ ((pair.len() as u64) << 32));
        let b = mix64(a) | 1;
        let m = self.num_bits;
        (0..self.num_hashes as u64).map(move |i| a.wrapping_add(i.wrapping_mul(b)) % m)
    }

    pub fn insert(&mut self, pair: &str) {
        let probes: Vec<u64> = self.probes(pair).collect();
        for bit in probes {
            self.bits[(bit / 64) as usize] |= 1u64 << (bit % 64);
        }
        self.items += 1;
    }

    pub fn item_count(&self) -> u64 {
        self.items
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PhraseTableError> {
        let body = bincode::serialize(self).map_err(PhraseTableError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_SIZE + body.len() + 4);
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        Ok(buf)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, PhraseTableError> {
        if data.len() < HEADER_SIZE + 4 {
            return Err(PhraseTableError::InvalidHeader);
        }
        if &data[..4] != MAGIC {
            return Err(PhraseTableError::InvalidMagic);
        }
        if data[4] != VERSION {
            return Err(PhraseTableError::UnsupportedVersion(data[4]));
        }
        let (body, crc) = data[HEADER_SIZE..].split_at(data.len() - HEADER_SIZE - 4);
        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(crc);
        if crc32fast::hash(body) != u32::from_le_bytes(crc_bytes) {
            return Err(PhraseTableError::Checksum);
        }
        let table: Self = bincode::deserialize(body).map_err(PhraseTableError::Deserialize)?;
        if table.num_bits == 0
            || table.num_hashes == 0
            || table.bits.len() as u64 != table.num_bits.div_ceil(64)
        {
            return Err(PhraseTableError::InvalidHeader);
        }
        Ok(table)
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), PhraseTableError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, PhraseTableError> {
        Self::from_bytes(&fs::read(path)?)
    }
}

impl PhraseTable for BloomPhraseTable {
    fn includes(&self, pair: &str) -> bool {
        self.probes(pair)
            .all(|bit| self.bits[(bit / 64) as usize] & (1u64 << (bit % 64)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("src{i} ||| tgt{i}")).collect()
    }

    #[test]
    fn test_no_false_negatives() {
        let all = pairs(2000);
        let table = BloomPhraseTable::from_pairs(all.iter().map(String::as_str), 0.01).unwrap();
        assert!(all.iter().all(|p| table.includes(p)));
        assert_eq!(table.item_count(), 2000);
    }

    #[test]
    fn test_false_positive_rate_is_bounded() {
        let table =
            BloomPhraseTable::from_pairs(pairs(2000).iter().map(String::as_str), 0.01).unwrap();
        let hits = (0..10_000)
            .filter(|i| table.includes(&format!("other{i} ||| x{i}")))
            .count();
        // 1% target; allow generous slack.
        assert!(hits < 500, "too many false positives: {hits}");
    }

    #[test]
    fn test_bytes_roundtrip_and_corruption() {
        let mut table = BloomPhraseTable::with_capacity(4, 0.05).unwrap();
        table.insert("the cat ||| le chat");
        let mut bytes = table.to_bytes().unwrap();
        let back = BloomPhraseTable::from_bytes(&bytes).unwrap();
        assert!(back.includes("the cat ||| le chat"));
        assert_eq!(back.num_hashes(), table.num_hashes());

        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        assert!(matches!(
            BloomPhraseTable::from_bytes(&bytes),
            Err(PhraseTableError::Checksum)
        ));
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(
            BloomPhraseTable::from_bytes(b"BD"),
            Err(PhraseTableError::InvalidHeader)
        ));
        assert!(matches!(
            BloomPhraseTable::from_bytes(b"XXXX\x01\0\0\0\0"),
            Err(PhraseTableError::InvalidMagic)
        ));
        assert!(matches!(
            BloomPhraseTable::from_bytes(b"BDPT\x09\0\0\0\0"),
            Err(PhraseTableError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_invalid_rate() {
        assert!(BloomPhraseTable::with_capacity(10, 0.0).is_err());
        assert!(BloomPhraseTable::with_capacity(10, 1.0).is_err());
    }
}
