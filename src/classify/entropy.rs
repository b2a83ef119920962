//! Shannon entropy heuristics for high-randomness string detection.
//!
//! Entropy alone is a noisy signal: UUIDs, sequential runs, and encoded
//! padding all score high without being secrets. `is_likely_secret` layers
//! length, character diversity, and common-pattern filters on top of the
//! raw entropy threshold to keep recall without drowning in false positives.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Calibrated default: natural-language text sits well below this,
/// random alphanumeric material well above.
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 3.5;

/// Minimum candidate length before entropy is even considered.
pub const MIN_SECRET_LENGTH: usize = 20;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("valid regex")
});

/// Shannon entropy in bits per character.
pub fn shannon_entropy(data: &str) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut frequency: HashMap<char, usize> = HashMap::new();
    for ch in data.chars() {
        *frequency.entry(ch).or_insert(0) += 1;
    }

    let len = data.chars().count() as f64;
    frequency
        .values()
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

pub fn is_high_entropy(data: &str, threshold: f64) -> bool {
    shannon_entropy(data) > threshold
}

/// Entropy check plus length, diversity, and common-pattern filtering.
pub fn is_likely_secret(data: &str, min_length: usize, threshold: f64) -> bool {
    if data.chars().count() < min_length {
        return false;
    }
    if is_common_pattern(data) {
        return false;
    }
    if !has_sufficient_diversity(data) {
        return false;
    }
    is_high_entropy(data, threshold)
}

/// Patterns that score high on entropy but are typically not secrets:
/// UUIDs, padding-heavy base64, repeated or sequential runs, and obvious
/// placeholder words.
fn is_common_pattern(data: &str) -> bool {
    if UUID_RE.is_match(data) {
        return true;
    }

    // Padding-dominated base64 fragments
    if (data.ends_with("==") || data.ends_with('=')) && data.len() % 4 == 0 {
        let pad_count = data.chars().filter(|&c| c == '=').count();
        if pad_count as f64 > data.len() as f64 * 0.3 {
            return true;
        }
    }

    let unique: std::collections::HashSet<char> = data.chars().collect();
    let all_digits = data.chars().all(|c| c.is_ascii_digit());
    let all_alpha = data.chars().all(|c| c.is_alphabetic());
    if unique.len() < 8 || all_digits || all_alpha {
        return true;
    }

    if is_placeholder(data) {
        return true;
    }

    is_sequential(data)
}

/// Known placeholder/example values that should never be reported by the
/// generic heuristics.
pub fn is_placeholder(data: &str) -> bool {
    const PLACEHOLDER_WORDS: &[&str] = &[
        "test",
        "example",
        "demo",
        "sample",
        "placeholder",
        "changeme",
        "password",
        "secret",
        "dummy",
        "xxxx",
    ];
    let lower = data.to_lowercase();
    PLACEHOLDER_WORDS.iter().any(|w| lower.contains(w))
}

fn has_sufficient_diversity(data: &str) -> bool {
    let len = data.chars().count();
    if len < 10 {
        return true;
    }
    let unique: std::collections::HashSet<char> = data.chars().collect();
    unique.len() as f64 / len as f64 >= 0.4
}

fn is_sequential(data: &str) -> bool {
    let chars: Vec<char> = data.to_lowercase().chars().collect();
    if chars.len() < 2 {
        return false;
    }
    if !chars.iter().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    chars
        .windows(2)
        .all(|w| (w[1] as i32) - (w[0] as i32) == 1)
}

/// Character-class diversity: how many of {lower, upper, digit, symbol}
/// appear in the candidate. Generic entropy rules require at least two.
pub fn char_class_count(data: &str) -> usize {
    let mut lower = false;
    let mut upper = false;
    let mut digit = false;
    let mut symbol = false;
    for c in data.chars() {
        if c.is_ascii_lowercase() {
            lower = true;
        } else if c.is_ascii_uppercase() {
            upper = true;
        } else if c.is_ascii_digit() {
            digit = true;
        } else {
            symbol = true;
        }
    }
    [lower, upper, digit, symbol].iter().filter(|b| **b).count()
}

/// Map raw entropy into the [0.5, 0.65] confidence band used by the
/// generic high-entropy rule. Exact provider matches stay well above this.
pub fn entropy_confidence(data: &str) -> f64 {
    let entropy = shannon_entropy(data);
    let scaled = 0.5 + (entropy - DEFAULT_ENTROPY_THRESHOLD) * 0.06;
    scaled.clamp(0.5, 0.65)
}
