//! # Content Selector
//!
//! Deterministic, seeded selection for the synchronous pay-per-call flow.
//! One seed drives three pool picks through the divisors 1, 7, and 17 —
//! the differing divisors decorrelate the picks so a single seed does not
//! move all three pools in lockstep. An anti-repeat guard compares the
//! composed text's lead and tail segments against the most recently
//! published item and perturbs the seed a bounded number of times before
//! accepting a possible duplicate rather than blocking.

pub mod pools;

use sha2::{Digest, Sha256};

use crate::constants::{
    ANTI_REPEAT_MAX_ATTEMPTS, ANTI_REPEAT_STEP, PICK_DIVISOR_B, PICK_DIVISOR_C,
};
use crate::models::{Fortune, Style};

use pools::{pools_for, INTROS, VIBES};

/// Delimiter between a fortune's lead (intro) and tail segments.
const SEGMENT_DELIMITER: char = ':';

/// Derive a bounded integer seed from a stable hash of
/// (question, style, wall-clock instant).
pub fn derive_seed(question: &str, style: Style, now_ms: i64) -> u32 {
    let digest = Sha256::digest(format!("{question}|{style}|{now_ms}").as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Compose a fortune from the style pools at the given seed.
pub fn pick_fortune(question: &str, style: Style, seed: u32) -> Fortune {
    let pools = pools_for(style);
    let seed = seed as usize;
    let intro = INTROS[seed % INTROS.len()];
    let line_a = pools.a[seed % pools.a.len()];
    let line_b = pools.b[(seed / PICK_DIVISOR_B as usize) % pools.b.len()];
    let line_c = pools.c[(seed / PICK_DIVISOR_C as usize) % pools.c.len()];
    let vibe = VIBES[seed % VIBES.len()];

    Fortune {
        title: format!("The oracle says {vibe}"),
        style,
        question: question.to_string(),
        fortune: format!("{intro}: {line_a} {line_b}. {line_c}"),
        lucky_number: (seed % 77) as u32 + 1,
    }
}

/// Lead segment: text before the delimiter, or the whole string when the
/// delimiter is absent or leading.
pub fn lead_segment(fortune: &str) -> &str {
    match fortune.find(SEGMENT_DELIMITER) {
        Some(i) if i > 0 => fortune[..i].trim(),
        _ => fortune,
    }
}

/// Tail segment: text after the delimiter, or the whole trimmed string.
pub fn tail_segment(fortune: &str) -> &str {
    match fortune.find(SEGMENT_DELIMITER) {
        Some(i) => fortune[i + 1..].trim(),
        None => fortune.trim(),
    }
}

/// Select a fortune, retrying against the previous fortune's segments.
///
/// Collision on either segment perturbs the seed by a fixed step and
/// reselects, bounded to [`ANTI_REPEAT_MAX_ATTEMPTS`]; after that a
/// possible duplicate is accepted.
pub fn select_with_anti_repeat(
    question: &str,
    style: Style,
    seed: u32,
    previous_fortune: Option<&str>,
) -> Fortune {
    let mut seed = seed;
    let mut result = pick_fortune(question, style, seed);

    let (last_lead, last_tail) = match previous_fortune {
        Some(last) => (lead_segment(last), tail_segment(last)),
        None => return result,
    };

    let mut guard = 0;
    while guard < ANTI_REPEAT_MAX_ATTEMPTS {
        let lead = lead_segment(&result.fortune);
        let tail = tail_segment(&result.fortune);
        let collides = (!last_lead.is_empty() && lead == last_lead)
            || (!last_tail.is_empty() && tail == last_tail);
        if !collides {
            break;
        }
        seed = seed.wrapping_add(ANTI_REPEAT_STEP);
        result = pick_fortune(question, style, seed);
        guard += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_stable_for_fixed_inputs() {
        let a = derive_seed("will it ship?", Style::Chaotic, 1_700_000_000_000);
        let b = derive_seed("will it ship?", Style::Chaotic, 1_700_000_000_000);
        assert_eq!(a, b);
        let c = derive_seed("will it ship?", Style::Chaotic, 1_700_000_000_001);
        assert_ne!(a, c);
    }

    #[test]
    fn selection_is_deterministic_for_fixed_seed() {
        let a = pick_fortune("q", Style::Funny, 123_456);
        let b = pick_fortune("q", Style::Funny, 123_456);
        assert_eq!(a, b);
    }

    #[test]
    fn fortune_has_lead_and_tail_segments() {
        let fortune = pick_fortune("q", Style::Wholesome, 42);
        let lead = lead_segment(&fortune.fortune);
        let tail = tail_segment(&fortune.fortune);
        assert!(!lead.is_empty());
        assert!(!tail.is_empty());
        assert!(fortune.fortune.starts_with(lead));
        assert!(fortune.fortune.ends_with(tail));
    }

    #[test]
    fn lucky_number_is_bounded() {
        for seed in [0u32, 1, 76, 77, 1_000_000, u32::MAX] {
            let fortune = pick_fortune("q", Style::Funny, seed);
            assert!((1..=77).contains(&fortune.lucky_number));
        }
    }

    #[test]
    fn anti_repeat_avoids_identical_predecessor() {
        let seed = 9_000;
        let first = pick_fortune("q", Style::Funny, seed);
        let second = select_with_anti_repeat("q", Style::Funny, seed, Some(&first.fortune));
        // same seed would reproduce the same text; the guard must move it
        assert_ne!(second.fortune, first.fortune);
        assert_ne!(lead_segment(&second.fortune), lead_segment(&first.fortune));
    }

    #[test]
    fn no_previous_item_selects_at_the_original_seed() {
        let seed = 777;
        let direct = pick_fortune("q", Style::Chaotic, seed);
        let selected = select_with_anti_repeat("q", Style::Chaotic, seed, None);
        assert_eq!(direct, selected);
    }

    #[test]
    fn segments_split_on_first_delimiter_only() {
        assert_eq!(lead_segment("intro: a b. c: d"), "intro");
        assert_eq!(tail_segment("intro: a b. c: d"), "a b. c: d");
        assert_eq!(lead_segment("no delimiter"), "no delimiter");
        assert_eq!(tail_segment("no delimiter"), "no delimiter");
    }
}
