//! Room token generation
//!
//! Room identifiers are short random URL-safe tokens. Uniqueness is not
//! enforced here: the entropy makes collisions negligible, and the rooms
//! table uses a conflict-ignoring insert rather than application retry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

use crate::core::config;

/// Generates a fresh room identifier.
///
/// 9 random bytes from the thread RNG, base64url-encoded without padding,
/// which yields a 12-character token safe to embed in URLs and callback
/// data.
pub fn generate_room_id() -> String {
    let mut bytes = [0u8; config::rooms::TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
