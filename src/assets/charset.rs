use rand::{Rng, RngCore};

/// Upper case, lower case and digits.
const FULL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
/// Upper case and digits without glyphs that read alike under distortion.
const CLEAN: &str = "ACDEFGHJKLMNPQRSTUVWXYZ2345679";

/// Alphabet an answer is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charset {
    /// `A-Z`, `a-z`, `0-9`.
    #[default]
    Full,
    /// Confusable characters removed; compare answers case-insensitively.
    Clean,
}

impl Charset {
    /// Characters of this set.
    pub fn chars(self) -> &'static str {
        match self {
            Self::Full => FULL,
            Self::Clean => CLEAN,
        }
    }

    /// `true` if `c` belongs to this set.
    pub fn contains(self, c: char) -> bool {
        self.chars().contains(c)
    }
}

/// Random string of exactly `len` characters from `charset`.
pub fn random_text(rng: &mut dyn RngCore, len: usize, charset: Charset) -> String {
    let chars = charset.chars().as_bytes();
    (0..len)
        .map(|_| char::from(chars[rng.random_range(0..chars.len())]))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/charset.rs"]
mod tests;
