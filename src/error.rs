//! Crate-level error type.

use thiserror::Error;

/// Anything the public entry points can fail with.
///
/// Tree mutation and layout never fail; malformed style values degrade to
/// defaults. The fallible surface is parsing external input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("markup error: {0}")]
    Markup(#[from] crate::markup::ParseError),
}
