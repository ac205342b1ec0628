use anyhow::{Result, bail};
use longdiv_game::{decode_practice_code, encode_practice_code};
use std::collections::HashMap;

fn looks_like_practice_code(token: &str) -> bool {
    regex::Regex::new(r"(?i)^L\d+-[A-Z]+\d{2}$")
        .map(|re| re.is_match(token.trim()))
        .unwrap_or(false)
}

/// Seed metadata resolved from a CLI token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    /// Starting level named by a practice code.
    pub level: Option<u8>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            level: None,
        }
    }

    #[must_use]
    pub const fn from_practice_code(seed: u64, level: u8, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            level: Some(level),
        }
    }

    /// The code as typed, or a code synthesized for level 1.
    #[must_use]
    pub fn display_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_practice_code(self.level.unwrap_or(1), self.seed))
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers and practice codes such as `L2-COMET42`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some((level, seed)) = decode_practice_code(token) {
            pending.push(SeedInfo::from_practice_code(seed, level, token.to_uppercase()));
            continue;
        }

        if looks_like_practice_code(token) {
            bail!("Invalid practice code {token}: unknown word or level");
        }
        bail!("Unrecognized seed token: {token}");
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, Option<u8>), usize> = HashMap::new();

    for info in pending {
        if let Some(existing) = index.get(&(info.seed, info.level)) {
            if let Some(entry) = deduped.get_mut(*existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert((info.seed, info.level), deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_and_practice_code() {
        let raw = vec!["42".to_string(), "-7".to_string(), "l2-comet42".to_string()];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert!(seeds.iter().any(|s| s.seed == 42 && s.code.is_none()));
        assert!(seeds.iter().any(|s| s.seed == 7 && s.code.is_none()));
        assert!(seeds.iter().any(|s| {
            s.code.as_deref() == Some("L2-COMET42") && s.level == Some(2)
        }));
    }

    #[test]
    fn duplicates_collapse_and_empty_defaults() {
        let seeds = resolve_seed_inputs(&["5".to_string(), "5".to_string()]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(5)]);
        let seeds = resolve_seed_inputs(&[]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(1337)]);
    }

    #[test]
    fn unknown_words_and_garbage_are_rejected() {
        let err = resolve_seed_inputs(&["L2-BANANA42".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid practice code"));
        let err = resolve_seed_inputs(&["seven".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unrecognized"));
    }

    #[test]
    fn display_code_round_trips() {
        let info = SeedInfo::from_numeric(0xBEEF);
        let (level, seed) = decode_practice_code(&info.display_code()).unwrap();
        assert_eq!(level, 1);
        assert_eq!(encode_practice_code(1, seed), info.display_code());
    }
}
