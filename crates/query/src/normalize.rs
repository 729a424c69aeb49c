//! Filter-key naming normalization.
//!
//! Callers supply snake_case keys; the backing store names its columns in
//! camelCase. `normalize` bridges the two.

/// Convert a snake_case filter key to the store's camelCase column name.
///
/// Pure, total, deterministic: `price_subunit` → `priceSubunit`. Leading
/// underscores are preserved; interior underscore runs collapse into a single
/// word boundary; a trailing underscore is dropped.
///
/// The function is injective over the expected filter-key vocabulary
/// (lowercase snake_case words). Keys outside that vocabulary, say `a_b`
/// alongside `aB`, can collide after normalization; that is a contract
/// violation by the caller, not a condition this function detects.
pub fn normalize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_boundary = false;
    let mut seen_word = false;

    for ch in key.chars() {
        if ch == '_' {
            if seen_word {
                at_boundary = true;
            } else {
                out.push('_');
            }
        } else if at_boundary {
            out.extend(ch.to_uppercase());
            at_boundary = false;
        } else {
            out.push(ch);
            seen_word = true;
        }
    }

    out
}
