//! Password hashing and strength policy configuration.

use serde::{Deserialize, Serialize};

/// Argon2 cost parameters and the strong-password policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Minimum password length in code points.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Maximum password length in code points.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Require at least one uppercase letter.
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    /// Require at least one lowercase letter.
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    /// Require at least one decimal digit.
    #[serde(default = "default_true")]
    pub require_digit: bool,
    /// Require at least one punctuation or symbol character.
    #[serde(default = "default_true")]
    pub require_symbol: bool,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub argon2_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
            argon2_memory_kib: default_memory(),
            argon2_iterations: default_iterations(),
            argon2_parallelism: default_parallelism(),
        }
    }
}

fn default_min_length() -> usize {
    8
}

fn default_max_length() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_memory() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}
