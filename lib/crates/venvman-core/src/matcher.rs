//! Partial-quintuplet alias matching.

/// A parsed alias, ready to test against runtime names.
///
/// A dash-split alias of 1–5 parts expands into the canonical
/// four-parts-plus-hash shape:
///
/// * 1 part — an implementation or a version (`cpython`, `3.11`)
/// * 2 parts — implementation + version (`cpython-3.11`)
/// * 3 parts — implementation + version + platform (`cpython-3.11-x86_64`)
/// * 4 parts — the full identity minus the hash
/// * 5 parts — a complete quintuplet including the hash
///
/// Empty parts are wildcards; the hash, when present, must match exactly.
/// All comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuintupletMatcher {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    /// One-part alias: compared against both the implementation and the
    /// version slot, since a single token cannot say which it names.
    Single(String),
    /// Two to five parts laid out in quintuplet order.
    Slotted { parts: [String; 4], hash: String },
}

impl QuintupletMatcher {
    /// Parse an alias into a matcher. `None` if the part count is not 1–5.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        let split: Vec<&str> = alias.split('-').collect();
        let repr = match *split.as_slice() {
            [single] => Repr::Single(single.to_lowercase()),
            [implementation, version] => slotted([implementation, version, "", ""], ""),
            [implementation, version, platform] => {
                slotted([implementation, version, "", platform], "")
            }
            [implementation, version, system, platform] => {
                slotted([implementation, version, system, platform], "")
            }
            [implementation, version, system, platform, hash] => {
                slotted([implementation, version, system, platform], hash)
            }
            _ => return None,
        };
        Some(Self { repr })
    }

    /// Whether a runtime name satisfies this matcher.
    ///
    /// Only five-part names are ever matchable; anything else is not a
    /// runtime this tool manages.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let mut split: Vec<&str> = name.split('-').collect();
        if split.len() != 5 {
            return false;
        }
        let Some(candidate_hash) = split.pop() else {
            return false;
        };
        match &self.repr {
            Repr::Single(value) => {
                value.is_empty()
                    || split[..2].iter().any(|part| value.eq_ignore_ascii_case(part))
            }
            Repr::Slotted { parts, hash } => {
                if !hash.is_empty() && !hash.eq_ignore_ascii_case(candidate_hash) {
                    return false;
                }
                split.iter().zip(parts).all(|(have, want)| {
                    have.is_empty() || want.is_empty() || want.eq_ignore_ascii_case(have)
                })
            }
        }
    }
}

fn slotted(parts: [&str; 4], hash: &str) -> Repr {
    Repr::Slotted {
        parts: parts.map(str::to_lowercase),
        hash: hash.to_lowercase(),
    }
}
