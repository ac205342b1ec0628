//! Reversible practice codes.
//! Code format: L<LEVEL>-<WORD><NN>, e.g., L2-COMET42, L4-ABACUS07

use crate::random::derive_stream_seed;

const PRACTICE_CODE_TAG: &[u8] = b"practice-code";

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for practice codes
pub const WORD_LIST: [&str; 64] = [
    "ABACUS", "ANGLE", "APEX", "ARC", "AXIS", "BASE", "BINARY", "CARRY", "CHORD", "CIRCLE",
    "COMET", "CONE", "COUNT", "CUBE", "DECIMAL", "DIGIT", "DIVIDE", "DOZEN", "EDGE", "EQUAL",
    "EVEN", "FACTOR", "FRACTION", "GRAPH", "GRID", "HALF", "HEXAGON", "INTEGER", "LADDER",
    "LATTICE", "LEMMA", "LIMIT", "MATRIX", "MEDIAN", "MINUS", "MODULO", "NUMBER", "OCTAGON",
    "ODD", "ORBIT", "PARITY", "PENCIL", "PLUS", "PRIME", "PRISM", "PROOF", "QUOTIENT", "RADIUS",
    "RATIO", "ROUND", "RULER", "SCALE", "SLATE", "SPHERE", "SQUARE", "SUM", "TALLY", "TENS",
    "THIRD", "TOTAL", "TRIANGLE", "UNIT", "VECTOR", "ZERO",
];

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    let nn = u8::try_from((packed >> 9) & 0x7F).unwrap_or(0);
    (packed & 0x01FF, nn)
}

fn compose_seed(level: u8, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    let material = (u64::from(level) << 16) | u64::from(packed);
    let h = derive_stream_seed(material, PRACTICE_CODE_TAG);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render the code for `level` and `seed`. Only the low 16 bits of the seed
/// pick the word and number.
#[must_use]
pub fn encode_practice_code(level: u8, seed: u64) -> String {
    let packed = u16::try_from(seed & 0xFFFF).unwrap_or(0);
    let (wi, nn) = unpack(packed);
    let word = WORD_LIST[usize::from(wi) % WORD_LIST.len()];
    format!("L{level}-{word}{:02}", nn % 100)
}

/// Parse a code into its starting level and seed. Case and stray punctuation
/// in the word are ignored.
#[must_use]
pub fn decode_practice_code(code: &str) -> Option<(u8, u64)> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    let level_part = prefix.strip_prefix(['L', 'l'])?;
    let level: u8 = level_part.parse().ok().filter(|level| *level >= 1)?;
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| *w == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some((level, compose_seed(level, wi, nn)))
}

#[must_use]
pub fn generate_code_from_entropy(level: u8, entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_practice_code(level, compose_seed(level, wi, nn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_then_encode_is_stable() {
        let (level, seed) = decode_practice_code("L2-COMET42").unwrap();
        assert_eq!(level, 2);
        assert_eq!(encode_practice_code(level, seed), "L2-COMET42");
    }

    #[test]
    fn decoding_is_case_insensitive_and_level_scoped() {
        let (_, upper) = decode_practice_code("L3-PRIME07").unwrap();
        let (_, lower) = decode_practice_code(" l3-prime07 ").unwrap();
        assert_eq!(upper, lower);
        let (_, other_level) = decode_practice_code("L1-PRIME07").unwrap();
        assert_ne!(upper, other_level);
    }

    #[test]
    fn rejects_malformed_codes() {
        for bad in ["", "COMET42", "L0-COMET42", "X2-COMET42", "L2-NOPE42", "L2-COMETxx", "L2-C"] {
            assert!(decode_practice_code(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn entropy_codes_decode() {
        for entropy in [0_u64, 1, 0xDEAD_BEEF, u64::MAX] {
            let code = generate_code_from_entropy(4, entropy);
            let (level, seed) = decode_practice_code(&code).unwrap();
            assert_eq!(level, 4);
            assert_eq!(encode_practice_code(4, seed), code);
        }
    }
}
