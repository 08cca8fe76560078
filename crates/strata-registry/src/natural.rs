//! Natural ordering for display strings.

use core::cmp::Ordering;
use core::iter::Peekable;
use core::str::Chars;

/// Compares two strings the way a person would sort them.
///
/// Letters compare case-insensitively and runs of ASCII digits compare by
/// numeric value, so `"Filter 2"` sorts before `"Filter 10"`. Strings that
/// are equal under these rules fall back to a plain byte comparison to keep
/// the order total.
///
/// ```rust
/// use core::cmp::Ordering;
/// use strata_registry::natural_cmp;
///
/// assert_eq!(natural_cmp("delay 2", "Delay 10"), Ordering::Less);
/// assert_eq!(natural_cmp("alpha", "Beta"), Ordering::Less);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut x = a.chars().peekable();
    let mut y = b.chars().peekable();
    loop {
        match (x.peek().copied(), y.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) if cx.is_ascii_digit() && cy.is_ascii_digit() => {
                let ord = cmp_digit_runs(&mut x, &mut y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(cx), Some(cy)) => {
                let ord = fold(cx).cmp(&fold(cy));
                if ord != Ordering::Equal {
                    return ord;
                }
                x.next();
                y.next();
            }
        }
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> (usize, u64) {
    let (mut len, mut value) = (0usize, 0u64);
    while let Some(d) = it.peek().and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(u64::from(d));
        len += 1;
        it.next();
    }
    (len, value)
}

fn cmp_digit_runs(x: &mut Peekable<Chars<'_>>, y: &mut Peekable<Chars<'_>>) -> Ordering {
    let (len_x, vx) = take_digits(x);
    let (len_y, vy) = take_digits(y);
    // equal values: shorter run first ("7" < "007")
    vx.cmp(&vy).then(len_x.cmp(&len_y))
}
