//! Swappable payload codecs.
//!
//! The analyzer never looks at how a payload is protected. It hands the
//! received bytes to a [`PayloadCodec`] and compares whatever comes back with
//! the reference. Block codes outside this crate (e.g. a BCH library) plug in
//! by implementing the trait and mapping their "negative error count" into
//! [`CodecError::Uncorrectable`].

use crate::error::CodecError;
use crate::hamming;

/// Outcome of decoding one protected payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    /// Recovered payload bytes
    pub payload: Vec<u8>,

    /// Number of corrections the codec applied (codewords or bits, codec-defined)
    pub corrected: usize,
}

/// A forward-error-correcting front end to the matcher.
pub trait PayloadCodec {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Protect a payload for transmission.
    fn encode(&self, payload: &[u8]) -> Vec<u8>;

    /// Recover a payload from its protected form.
    fn decode(&self, protected: &[u8]) -> Result<Decoded, CodecError>;
}

/// No protection: bytes go over the air as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl PayloadCodec for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn encode(&self, payload: &[u8]) -> Vec<u8> {
        payload.to_vec()
    }

    fn decode(&self, protected: &[u8]) -> Result<Decoded, CodecError> {
        Ok(Decoded {
            payload: protected.to_vec(),
            corrected: 0,
        })
    }
}

/// Hamming(7,4), two codewords per payload byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming74;

impl PayloadCodec for Hamming74 {
    fn name(&self) -> &'static str {
        "hamming74"
    }

    fn encode(&self, payload: &[u8]) -> Vec<u8> {
        hamming::encode_bytes(payload)
    }

    fn decode(&self, protected: &[u8]) -> Result<Decoded, CodecError> {
        let decoded = hamming::decode_bytes(protected);
        Ok(Decoded {
            payload: decoded.bytes,
            corrected: decoded.corrected,
        })
    }
}

/// Wraps another codec so the first `prefix` bytes bypass it.
///
/// Used when the length and sequence bytes are sent in the clear and only
/// the rest of the packet is protected.
pub struct Prefixed<C> {
    prefix: usize,
    inner: C,
}

impl<C: PayloadCodec> Prefixed<C> {
    pub fn new(prefix: usize, inner: C) -> Self {
        Self { prefix, inner }
    }
}

impl<C: PayloadCodec> PayloadCodec for Prefixed<C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let split = self.prefix.min(payload.len());
        let mut out = payload[..split].to_vec();
        out.extend(self.inner.encode(&payload[split..]));
        out
    }

    fn decode(&self, protected: &[u8]) -> Result<Decoded, CodecError> {
        if protected.len() < self.prefix {
            return Err(CodecError::TooShort {
                required: self.prefix,
                actual: protected.len(),
            });
        }

        let (clear, rest) = protected.split_at(self.prefix);
        let inner = self.inner.decode(rest)?;

        let mut payload = Vec::with_capacity(clear.len() + inner.payload.len());
        payload.extend_from_slice(clear);
        payload.extend(inner.payload);

        Ok(Decoded {
            payload,
            corrected: inner.corrected,
        })
    }
}

impl<C: PayloadCodec + ?Sized> PayloadCodec for Box<C> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, payload: &[u8]) -> Vec<u8> {
        (**self).encode(payload)
    }

    fn decode(&self, protected: &[u8]) -> Result<Decoded, CodecError> {
        (**self).decode(protected)
    }
}
