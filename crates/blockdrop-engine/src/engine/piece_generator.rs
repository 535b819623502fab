use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Randomization policy of a [`PieceGenerator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceRule {
    /// Every piece is drawn independently with equal probability.
    #[default]
    Uniform,
    /// Pieces are drawn from shuffled bags containing each kind once.
    Bag7,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the generator's PRNG. The same seed and rule produce the
/// same piece sequence, which makes automated games reproducible.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{PieceGenerator, PieceRule, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let mut a = PieceGenerator::with_seed(PieceRule::Bag7, seed);
/// let mut b = PieceGenerator::with_seed(PieceRule::Bag7, seed);
/// assert_eq!(a.pop_next(), b.pop_next());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex characters")]
pub struct PieceSeedParseError {
    input: String,
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parses a 32 character big-endian hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PieceSeedParseError> {
        let error = || PieceSeedParseError {
            input: hex_str.to_owned(),
        };
        if hex_str.len() != 32 || !hex_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        hex_str
    }
}

/// Supplies piece kinds with a preview of the upcoming ones.
///
/// The queue always holds at least one piece beyond the one returned by
/// [`Self::pop_next`], so [`Self::peek_next`] never fails. With
/// [`PieceRule::Bag7`] a fresh shuffled bag is appended whenever 7 or fewer
/// pieces remain.
///
/// # Example
///
/// ```
/// use blockdrop_engine::{PieceGenerator, PieceRule};
///
/// let mut generator = PieceGenerator::new(PieceRule::Uniform);
/// let next = generator.peek_next();
/// assert_eq!(generator.pop_next(), next);
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    rule: PieceRule,
    queue: VecDeque<PieceKind>,
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    ///
    /// For deterministic sequences, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new(rule: PieceRule) -> Self {
        Self::with_seed(rule, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(rule: PieceRule, seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            rule,
            queue: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_queue();
        this
    }

    #[must_use]
    pub fn rule(&self) -> PieceRule {
        self.rule
    }

    fn fill_queue(&mut self) {
        match self.rule {
            PieceRule::Uniform => {
                while self.queue.len() < 2 {
                    let kind = self.rng.random();
                    self.queue.push_back(kind);
                }
            }
            PieceRule::Bag7 => {
                while self.queue.len() <= PieceKind::LEN {
                    let mut bag = PieceKind::ALL;
                    bag.shuffle(&mut self.rng);
                    self.queue.extend(bag);
                }
            }
        }
    }

    /// Draws the next piece.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self
            .queue
            .pop_front()
            .expect("piece queue should never be empty");
        self.fill_queue();
        kind
    }

    /// Returns the piece the next [`Self::pop_next`] will return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.queue[0]
    }

    /// Iterates the upcoming pieces in draw order.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}
