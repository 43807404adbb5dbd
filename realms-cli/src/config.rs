use std::{env, path::PathBuf};

use anyhow::{bail, Result};
use realms_core::constants::{DEFAULT_WORD_BITS, MAX_WORD_BITS};
use realms_core::Word;

pub const DEFAULT_STATE_PATH: &str = "realms-state.json";

pub const STATE_ENV: &str = "REALMS_STATE";
pub const WORD_BITS_ENV: &str = "REALMS_WORD_BITS";
pub const CALLER_ENV: &str = "REALMS_CALLER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub state_path: PathBuf,
    pub word_bits: u32,
    /// Identity every state-changing call is attributed to.
    pub caller: Word,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            word_bits: DEFAULT_WORD_BITS,
            caller: Word::ZERO,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut word_bits = read_env_u32(WORD_BITS_ENV, DEFAULT_WORD_BITS);
        if word_bits > MAX_WORD_BITS {
            tracing::warn!(
                "{WORD_BITS_ENV} ({}) exceeds {MAX_WORD_BITS}. Falling back to {DEFAULT_WORD_BITS}.",
                word_bits
            );
            word_bits = DEFAULT_WORD_BITS;
        }

        Self {
            state_path: env::var(STATE_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            word_bits,
            caller: read_env_word(CALLER_ENV, Word::ZERO),
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_overrides(
        mut self,
        state_path: Option<PathBuf>,
        caller: Option<Word>,
        word_bits: Option<u32>,
    ) -> Result<Self> {
        if let Some(path) = state_path {
            self.state_path = path;
        }
        if let Some(caller) = caller {
            self.caller = caller;
        }
        if let Some(bits) = word_bits {
            if bits == 0 || bits > MAX_WORD_BITS {
                bail!("--word-bits must be between 1 and {MAX_WORD_BITS}, got {bits}");
            }
            self.word_bits = bits;
        }
        Ok(self)
    }
}

pub(crate) fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_word(name: &str, default: Word) -> Word {
    match env::var(name) {
        Ok(value) => match value.parse::<Word>() {
            Ok(word) => word,
            Err(err) => {
                tracing::warn!("ignoring {name}: {err}");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_defaults() {
        let config = CliConfig::default()
            .with_overrides(
                Some(PathBuf::from("/tmp/lore.json")),
                Some(Word::from(7u64)),
                Some(64),
            )
            .unwrap();
        assert_eq!(config.state_path, PathBuf::from("/tmp/lore.json"));
        assert_eq!(config.caller, Word::from(7u64));
        assert_eq!(config.word_bits, 64);
    }

    #[test]
    fn out_of_range_word_bits_flag_is_an_error() {
        assert!(CliConfig::default()
            .with_overrides(None, None, Some(0))
            .is_err());
        assert!(CliConfig::default()
            .with_overrides(None, None, Some(257))
            .is_err());
    }

    #[test]
    fn unset_env_falls_back_to_defaults() {
        assert_eq!(read_env_u32("REALMS_TEST_UNSET_U32", 251), 251);
        assert_eq!(
            read_env_word("REALMS_TEST_UNSET_WORD", Word::ONE),
            Word::ONE
        );
    }
}
