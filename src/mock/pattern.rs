//! Pattern-directed string generation
//!
//! Walks the parsed regex and emits one string it matches. Unbounded
//! repetition is capped at `MAX_REPEAT` extra iterations and classes prefer
//! printable ASCII. Anchors and word boundaries emit nothing, so patterns
//! built around `\b` may produce non-matching output; callers fall back to
//! plain words when generation fails.

use rand::seq::SliceRandom;
use rand::Rng;
use regex_syntax::hir::{Class, Hir, HirKind};
use regex_syntax::Parser;

/// Extra iterations allowed past a repetition's minimum
const MAX_REPEAT: u32 = 8;

/// Longest string the walker will build
const MAX_OUTPUT: usize = 256;

const PRINTABLE: (u32, u32) = (0x20, 0x7e);

/// Generates a string matching `pattern`, or `None` if the pattern cannot
/// be parsed or would need more than `MAX_OUTPUT` bytes.
pub fn generate<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> Option<String> {
    let hir = Parser::new().parse(pattern).ok()?;
    let mut out = Vec::new();
    walk(&hir, rng, &mut out)?;
    String::from_utf8(out).ok()
}

fn walk<R: Rng + ?Sized>(hir: &Hir, rng: &mut R, out: &mut Vec<u8>) -> Option<()> {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(literal) => out.extend_from_slice(&literal.0),
        HirKind::Class(Class::Unicode(class)) => {
            let ranges: Vec<(u32, u32)> = class
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect();
            let c = pick_code_point(&ranges, rng)?;
            let c = char::from_u32(c)?;
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        HirKind::Class(Class::Bytes(class)) => {
            let ranges: Vec<(u32, u32)> = class
                .ranges()
                .iter()
                .map(|r| (u32::from(r.start()), u32::from(r.end())))
                .collect();
            let b = pick_code_point(&ranges, rng)?;
            out.push(u8::try_from(b).ok()?);
        }
        HirKind::Repetition(rep) => {
            let high = match rep.max {
                Some(max) => max.min(rep.min.saturating_add(MAX_REPEAT)),
                None => rep.min.saturating_add(MAX_REPEAT),
            };
            let count = rng.gen_range(rep.min..=high.max(rep.min));
            for _ in 0..count {
                walk(&rep.sub, rng, out)?;
            }
        }
        HirKind::Capture(capture) => walk(&capture.sub, rng, out)?,
        HirKind::Concat(parts) => {
            for part in parts {
                walk(part, rng, out)?;
            }
        }
        HirKind::Alternation(branches) => walk(branches.choose(rng)?, rng, out)?,
    }

    (out.len() <= MAX_OUTPUT).then_some(())
}

/// Picks a code point from inclusive ranges, restricted to printable ASCII
/// when any range overlaps it.
fn pick_code_point<R: Rng + ?Sized>(ranges: &[(u32, u32)], rng: &mut R) -> Option<u32> {
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(lo, hi)| {
            let lo = lo.max(PRINTABLE.0);
            let hi = hi.min(PRINTABLE.1);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();

    let pool = if printable.is_empty() { ranges } else { &printable[..] };
    let total: u64 = pool.iter().map(|&(lo, hi)| u64::from(hi - lo) + 1).sum();
    if total == 0 {
        return None;
    }

    let mut index = rng.gen_range(0..total);
    for &(lo, hi) in pool {
        let size = u64::from(hi - lo) + 1;
        if index < size {
            return u32::try_from(u64::from(lo) + index).ok();
        }
        index -= size;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn assert_generates_matches(pattern: &str) {
        let re = Regex::new(pattern).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let s = generate(pattern, &mut rng).unwrap();
            assert!(re.is_match(&s), "{:?} does not match {}", s, pattern);
        }
    }

    #[test]
    fn test_common_patterns() {
        assert_generates_matches("^[a-z]+$");
        assert_generates_matches("^[A-Z]{3}-[0-9]{4}$");
        assert_generates_matches("^(foo|bar|baz)\\d?$");
        assert_generates_matches("^[^0-9]{2,5}$");
        assert_generates_matches("^\\w+@\\w+\\.com$");
        assert_generates_matches("^.{1,3}x$");
    }

    #[test]
    fn test_invalid_pattern_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate("[", &mut rng).is_none());
    }

    #[test]
    fn test_oversized_output_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate("^a{300}$", &mut rng).is_none());
    }

    #[test]
    fn test_prefers_printable() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let s = generate("^.$", &mut rng).unwrap();
            assert!(s.chars().all(|c| (' '..='~').contains(&c)));
        }
    }
}
