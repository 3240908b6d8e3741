//! Greedy LZF encoder producing the token stream `yxdb_wire::lzf` reads.

/// Longest back-reference distance the format can express.
const MAX_DISTANCE: usize = 1 << 13;
/// Longest back-reference run: 7 + 255 extension, plus the implied 2.
const MAX_RUN: usize = 264;
/// Longest literal run.
const MAX_LITERAL: usize = 32;
const HASH_BITS: u32 = 14;

/// Compress `input` into LZF tokens.
///
/// Matches are found through a hash of the next three bytes, so repeated
/// runs within a record and similar records close together both turn into
/// back-references. Overlapping references (distance shorter than the
/// run) are emitted freely.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_LITERAL + 1);
    let mut table = vec![usize::MAX; 1 << HASH_BITS];
    let mut literal_start = 0;
    let mut i = 0;

    while i + 2 < input.len() {
        let slot = hash(&input[i..i + 3]);
        let candidate = table[slot];
        table[slot] = i;

        let matched = candidate != usize::MAX
            && i - candidate <= MAX_DISTANCE
            && input[candidate..candidate + 3] == input[i..i + 3];
        if !matched {
            i += 1;
            continue;
        }

        let limit = (input.len() - i).min(MAX_RUN);
        let mut run = 3;
        while run < limit && input[candidate + run] == input[i + run] {
            run += 1;
        }

        push_literals(&mut out, &input[literal_start..i]);

        let offset = i - candidate - 1;
        let len = run - 2;
        if len < 7 {
            out.push(((len << 5) | (offset >> 8)) as u8);
        } else {
            out.push(((7 << 5) | (offset >> 8)) as u8);
            out.push((len - 7) as u8);
        }
        out.push((offset & 0xFF) as u8);

        i += run;
        literal_start = i;
    }

    push_literals(&mut out, &input[literal_start..]);
    out
}

#[allow(clippy::cast_possible_truncation)]
fn push_literals(out: &mut Vec<u8>, bytes: &[u8]) {
    for chunk in bytes.chunks(MAX_LITERAL) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
}

fn hash(bytes: &[u8]) -> usize {
    let v = (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2]);
    (v.wrapping_mul(2_654_435_761) >> (32 - HASH_BITS)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use yxdb_wire::lzf::decompress;

    fn round_trip(input: &[u8]) -> Vec<u8> {
        let packed = compress(input);
        let mut out = vec![0u8; input.len()];
        let n = decompress(&packed, &mut out).unwrap();
        out.truncate(n);
        out
    }

    #[test]
    fn repeated_bytes_shrink() {
        let input = vec![b'z'; 10_000];
        let packed = compress(&input);
        assert!(packed.len() < 200);
        assert_eq!(round_trip(&input), input);
    }

    #[test]
    fn short_inputs_are_literals() {
        assert_eq!(compress(b""), Vec::<u8>::new());
        assert_eq!(compress(b"ab"), vec![1, b'a', b'b']);
        assert_eq!(round_trip(b"abc"), b"abc");
    }

    #[test]
    fn mixed_content_round_trips() {
        let mut input = Vec::new();
        for i in 0..2_000u32 {
            input.extend_from_slice(&i.to_le_bytes());
            input.extend_from_slice(b"Customer-Name;");
        }
        assert_eq!(round_trip(&input), input);
        assert!(compress(&input).len() < input.len());
    }
}
