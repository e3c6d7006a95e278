//! Word list for synthetic text

use rand::seq::SliceRandom;
use rand::Rng;

pub(crate) const WORDS: &[&str] = &[
    "alpha", "amber", "anchor", "apple", "arrow", "aspen", "atlas", "birch", "breeze", "bronze",
    "canyon", "cedar", "cinder", "cloud", "comet", "coral", "cotton", "crystal", "delta", "dune",
    "echo", "ember", "falcon", "fern", "field", "flint", "forest", "garnet", "glacier", "harbor",
    "hazel", "heron", "island", "ivory", "jasper", "juniper", "lagoon", "lantern", "lemon", "maple",
    "meadow", "mesa", "nectar", "nova", "oasis", "olive", "onyx", "orbit", "pebble", "pine",
    "prairie", "quartz", "raven", "ridge", "river", "saffron", "sage", "shadow", "summit", "thistle",
    "timber", "tundra", "valley", "velvet", "willow", "winter", "zephyr",
];

pub(crate) fn word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

/// One to three words separated by spaces
pub(crate) fn phrase<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(1..=3);
    (0..count).map(|_| word(rng)).collect::<Vec<_>>().join(" ")
}
