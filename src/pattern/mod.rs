//! Movement-pattern projection engine.
//!
//! A series is encoded as Up/Down moves, the latest few moves are searched
//! for in the rest of the history, and the moves that followed each repeat
//! are replayed forward from the latest close.

pub mod encoder;
pub mod extractor;
pub mod locator;
pub mod projection;

pub use encoder::{encode, Movement, MovementString};
pub use extractor::{extract, DEFAULT_FORWARD_LENGTH};
pub use locator::{
    locate, locate_in, occurrences, Candidates, DEFAULT_MAX_PATTERN_LEN, DEFAULT_MIN_PATTERN_LEN,
};
pub use projection::{build_projections, compound_path, step_date, ProjectionParams};
