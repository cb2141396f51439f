//! Nucleotide helpers.

/// Complement a single base, preserving case. Unknown bases map to `N`/`n`.
#[must_use]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' | b'u' => b'a',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'S' => b'S',
        b'W' => b'W',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b if b.is_ascii_lowercase() => b'n',
        _ => b'N',
    }
}

/// Reverse complement in place
pub fn reverse_complement_in_place(seq: &mut [u8]) {
    seq.reverse();
    for b in seq.iter_mut() {
        *b = complement(*b);
    }
}

/// Encode an ACGT base (either case) as 2 bits, `None` for anything else
#[must_use]
pub fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reverse_complement(seq: &[u8]) -> Vec<u8> {
        let mut rc = seq.to_vec();
        reverse_complement_in_place(&mut rc);
        rc
    }

    #[test]
    fn test_reverse_complement_in_place() {
        assert_eq!(reverse_complement(b"ACGTN"), b"NACGT".to_vec());
        assert_eq!(reverse_complement(b"AAAC"), b"GTTT".to_vec());
        assert_eq!(reverse_complement(b"acgt"), b"acgt".to_vec());
        assert_eq!(reverse_complement(b"GATTACAnRY"), b"RYnTGTAATC".to_vec());
        assert!(reverse_complement(b"").is_empty());
    }

    #[test]
    fn test_encode_base() {
        assert_eq!(encode_base(b'A'), Some(0));
        assert_eq!(encode_base(b't'), Some(3));
        assert_eq!(encode_base(b'N'), None);
    }
}
