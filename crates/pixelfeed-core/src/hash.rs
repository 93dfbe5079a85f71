//! Content hashing for deterministic rendering verification.
//!
//! Produces a SHA-256 digest of frame data so two renders of the same
//! configuration can be compared bit-for-bit without keeping the frames.

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental hash over a stream of frames, fed in write order.
#[derive(Debug, Clone, Default)]
pub struct FrameStreamHasher {
    hasher: Sha256,
    frames: u64,
}

impl FrameStreamHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, frame: &FrameBuffer) {
        // Dimensions are part of the digest so equal bytes at different
        // sizes hash differently.
        self.hasher.update(frame.width.to_le_bytes());
        self.hasher.update(frame.height.to_le_bytes());
        self.hasher.update(&frame.data);
        self.frames += 1;
    }

    /// Number of frames hashed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn finish(self) -> ContentHash {
        let mut hasher = self.hasher;
        hasher.update(self.frames.to_le_bytes());
        ContentHash {
            bytes: hasher.finalize().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(width: u32, height: u32, value: u8) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        fb.data.fill(value);
        fb
    }

    fn hash_of(frames: &[FrameBuffer]) -> ContentHash {
        let mut hasher = FrameStreamHasher::new();
        for frame in frames {
            hasher.update(frame);
        }
        hasher.finish()
    }

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_of(&[filled(10, 10, 7)]), hash_of(&[filled(10, 10, 7)]));
    }

    #[test]
    fn test_hash_different_content() {
        assert_ne!(hash_of(&[filled(10, 10, 7)]), hash_of(&[filled(10, 10, 8)]));
    }

    #[test]
    fn test_hash_different_size() {
        assert_ne!(hash_of(&[filled(10, 10, 0)]), hash_of(&[filled(20, 5, 0)]));
    }

    #[test]
    fn test_stream_hash_is_order_sensitive() {
        let a = filled(2, 2, 1);
        let b = filled(2, 2, 2);

        let mut forward = FrameStreamHasher::new();
        forward.update(&a);
        forward.update(&b);
        assert_eq!(forward.frames(), 2);
        assert_ne!(forward.finish(), hash_of(&[b, a]));
    }

    #[test]
    fn test_hash_hex_format() {
        let hex = hash_of(&[filled(2, 2, 0)]).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
