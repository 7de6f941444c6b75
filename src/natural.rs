//! Natural ("human") string ordering.
//!
//! Runs of ASCII digits are compared by numeric value, everything else byte by
//! byte, so `item2` sorts before `item10`.

use std::cmp::Ordering;

/// Compares two strings in natural order.
///
/// Strings that compare equal chunk by chunk (e.g. `a01` and `a1`) fall back
/// to length and then to plain byte order, which keeps the ordering total.
///
/// # Examples
///
/// ```
/// use dql_lang::natural::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
/// assert_eq!(natural_cmp("b", "a100"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_bytes, b_bytes) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);

    while i < a_bytes.len() && j < b_bytes.len() {
        let (c1, c2) = (a_bytes[i], b_bytes[j]);

        if c1.is_ascii_digit() && c2.is_ascii_digit() {
            let end_i = digit_run_end(a_bytes, i);
            let end_j = digit_run_end(b_bytes, j);
            match compare_digit_runs(&a_bytes[i..end_i], &b_bytes[j..end_j]) {
                Ordering::Equal => {
                    i = end_i;
                    j = end_j;
                }
                ord => return ord,
            }
        } else {
            match c1.cmp(&c2) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                ord => return ord,
            }
        }
    }

    let remaining = (a_bytes.len() - i).cmp(&(b_bytes.len() - j));
    remaining
        .then_with(|| a_bytes.len().cmp(&b_bytes.len()))
        .then_with(|| a_bytes.cmp(b_bytes))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset)
}

/// Numeric comparison of two digit runs of any length.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = strip_leading_zeros(a);
    let b = strip_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(run: &[u8]) -> &[u8] {
    let zeros = run.iter().take_while(|&&b| b == b'0').count();
    &run[zeros..]
}
