// Support utilities: perft validation driver and the PRNG behind the
// zobrist tables.

pub mod perft;
pub mod prng;

pub use perft::{perft, perft_bench, perft_divide};
pub use prng::PRNG;
