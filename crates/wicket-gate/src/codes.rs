//! Activation code whitelist.
//!
//! Codes are never persisted. They are regenerated identically on every run
//! from `(count, step, prefix, year)`:
//!
//! ```text
//! code(i) = prefix + "-" + year + "-" + zero_pad(i × step, 3)    for i in 1..=count
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// Default code step (codes are multiples of 3).
pub const DEFAULT_STEP: u32 = 3;

/// Default code prefix.
pub const DEFAULT_PREFIX: &str = "PFM";

/// Default code year.
pub const DEFAULT_YEAR: &str = "2025";

/// Width the numeric suffix is zero-padded to.
pub const SUFFIX_WIDTH: usize = 3;

/// A single activation code, already in canonical (uppercase) form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix after the last `-`, if it parses.
    pub fn suffix(&self) -> Option<u64> {
        self.0.rsplit('-').next()?.parse().ok()
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate the ordered code list.
///
/// Pure and deterministic. Suffixes wider than three digits are not
/// truncated (`i × step = 1200` yields `-1200`).
///
/// # Examples
///
/// ```
/// use wicket_gate::generate_codes;
///
/// let codes = generate_codes(50, 3, "PFM", "2025");
/// assert_eq!(codes.len(), 50);
/// assert_eq!(codes[0].as_str(), "PFM-2025-003");
/// assert_eq!(codes[49].as_str(), "PFM-2025-150");
/// ```
pub fn generate_codes(count: u32, step: u32, prefix: &str, year: &str) -> Vec<ActivationCode> {
    (1..=u64::from(count))
        .map(|i| {
            let n = i * u64::from(step);
            ActivationCode(format!(
                "{}-{}-{:0width$}",
                prefix,
                year,
                n,
                width = SUFFIX_WIDTH
            ))
        })
        .collect()
}

/// The set of valid codes, kept in generation order for listing.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    ordered: Vec<ActivationCode>,
    lookup: BTreeSet<String>,
}

impl Whitelist {
    /// Build the whitelist from generator parameters.
    pub fn generate(count: u32, step: u32, prefix: &str, year: &str) -> Self {
        Self::from_codes(
            generate_codes(count, step, prefix, year)
                .into_iter()
                .map(|code| code.0),
        )
    }

    /// Build a whitelist from explicit codes (canonicalized to uppercase).
    pub fn from_codes<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut lookup = BTreeSet::new();
        for code in codes {
            let code: String = code.into();
            let code = code.trim().to_uppercase();
            if lookup.insert(code.clone()) {
                ordered.push(ActivationCode(code));
            }
        }
        Self { ordered, lookup }
    }

    /// Check whether a normalized code is valid.
    pub fn contains(&self, code: &str) -> bool {
        self.lookup.contains(code)
    }

    /// Codes in generation order.
    pub fn codes(&self) -> &[ActivationCode] {
        &self.ordered
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_deployment_bounds() {
        let codes = generate_codes(50, DEFAULT_STEP, DEFAULT_PREFIX, DEFAULT_YEAR);
        assert_eq!(codes.len(), 50);
        assert!(codes[0].as_str().ends_with("-003"));
        assert!(codes[49].as_str().ends_with("-150"));
        assert_eq!(codes[1].as_str(), "PFM-2025-006");
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generate_codes(0, 3, "PFM", "2025").is_empty());
    }

    #[test]
    fn wide_suffix_not_truncated() {
        let codes = generate_codes(400, 3, "PFM", "2025");
        assert_eq!(codes[399].as_str(), "PFM-2025-1200");
    }

    #[test]
    fn generated_whitelist_keeps_order() {
        let whitelist = Whitelist::generate(4, 3, "PFM", "2025");
        let codes: Vec<&str> = whitelist.codes().iter().map(ActivationCode::as_str).collect();
        assert_eq!(
            codes,
            vec!["PFM-2025-003", "PFM-2025-006", "PFM-2025-009", "PFM-2025-012"]
        );
    }

    #[test]
    fn whitelist_lookup() {
        let whitelist = Whitelist::generate(50, 3, "PFM", "2025");
        assert!(whitelist.contains("PFM-2025-003"));
        assert!(whitelist.contains("PFM-2025-150"));
        assert!(!whitelist.contains("PFM-2025-004"));
        assert!(!whitelist.contains("PFM-2025-153"));
        assert!(!whitelist.contains("pfm-2025-003"));
    }

    #[test]
    fn whitelist_from_codes_dedups_and_canonicalizes() {
        let whitelist = Whitelist::from_codes(["pfm-2025-003", "PFM-2025-003 ", "X-1"]);
        assert_eq!(whitelist.len(), 2);
        assert!(whitelist.contains("PFM-2025-003"));
        assert!(whitelist.contains("X-1"));
    }

    proptest! {
        #[test]
        fn generated_codes_are_strictly_increasing(count in 0u32..500, step in 1u32..50) {
            let codes = generate_codes(count, step, "PFM", "2025");
            prop_assert_eq!(codes.len(), count as usize);

            let suffixes: Vec<u64> = codes.iter().filter_map(ActivationCode::suffix).collect();
            prop_assert_eq!(suffixes.len(), codes.len());
            for (i, n) in suffixes.iter().enumerate() {
                prop_assert_eq!(*n, (i as u64 + 1) * u64::from(step));
            }
            prop_assert!(suffixes.windows(2).all(|w| w[0] < w[1]));

            let unique: BTreeSet<_> = codes.iter().collect();
            prop_assert_eq!(unique.len(), codes.len());
        }

        #[test]
        fn suffix_is_at_least_three_digits(count in 1u32..100, step in 1u32..10) {
            for code in generate_codes(count, step, "PFM", "2025") {
                let suffix = code.as_str().rsplit('-').next().unwrap_or_default();
                prop_assert!(suffix.len() >= SUFFIX_WIDTH);
            }
        }
    }
}
