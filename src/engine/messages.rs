//! Encouragement labels shown on the walk dashboard

use rand::seq::SliceRandom;
use rand::Rng;

pub const START_LABELS: &[&str] = &[
    "Let's go exploring!",
    "Let's go look for fluffballs",
    "Time to find some friends!",
];

pub const CAUGHT_LABELS: &[&str] = &[
    "Congratulations on your new friend!",
    "Luck is on your side today!",
    "Wow! What a wonderful find!",
    "Yes! Caught the little rascal!",
    "Hooray! A new friend joins us!",
    "There it is, our treasure!",
];

pub const MISSED_LABELS: &[&str] = &[
    "Someone was just here! But ran away..",
    "Only a shadow flickered by..",
    "Oh, little paws vanished around the corner!",
    "A tail flashed and disappeared!",
];

pub const INACTIVE_LABELS: &[&str] = &[
    "Looks like you paused the search, but not every creature has been found!",
    "Our fluffy friends are still hiding somewhere!",
    "Taking a break? The tails are still waiting to meet you!",
    "Lonely little creatures are running around here, time to find them!",
    "So many more tails left to find!",
];

/// Pick one label at random
pub fn pick<R: Rng + ?Sized>(labels: &[&'static str], rng: &mut R) -> &'static str {
    labels.choose(rng).copied().unwrap_or_default()
}
