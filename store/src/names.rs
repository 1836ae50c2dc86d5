//! Human-readable experiment names of the form `adjective-noun`.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: [&str; 40] = [
    "brave", "calm", "eager", "fancy", "glad", "jolly", "kind", "lucky", "mighty", "noble",
    "quick", "silly", "tiny", "witty", "zesty", "shy", "snappy", "quirky", "breezy", "cheery",
    "dizzy", "feisty", "goofy", "grumpy", "jazzy", "lofty", "peppy", "sassy", "spunky", "zany",
    "swift", "gentle", "bold", "chirpy", "dandy", "fuzzy", "happy", "jumpy", "nifty", "plucky",
];

const NOUNS: [&str; 40] = [
    "panda", "cobra", "sunflower", "rocket", "otter", "cactus", "falcon", "lemon", "moon",
    "nimbus", "python", "swan", "wave", "cloud", "eagle", "comet", "giraffe", "hedgehog",
    "iguana", "jaguar", "kitten", "llama", "mango", "nebula", "orca", "pebble", "quokka",
    "raccoon", "sakura", "toucan", "urchin", "violet", "walrus", "xenon", "yak", "zebra",
    "badger", "cherry", "dragon", "ember",
];

/// Pick a name using the caller's RNG so seeded runs are reproducible.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Both word lists are non-empty constants.
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(rng).copied().unwrap_or("run");
    format!("{adjective}-{noun}")
}
