use std::convert::TryFrom;
use sha1::Sha1;
use sha2::{
    Digest as _,
    Sha256, Sha512,
};
use blake3;

use crate::crypto::types::CryptoError;

/// External fixed-output hash primitive.
///
/// `result` must not disturb the running state: more bytes may follow.
pub trait HashPrimitive: Send {
    fn update(&mut self, data: &[u8]);
    fn result(&self) -> Vec<u8>;
    fn output_len(&self) -> usize;
}

/// Supported digest algorithms (extensible).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigestAlg {
    Sha1   = 0x0001,
    Sha256 = 0x0002,
    Sha512 = 0x0003,
    Blake3 = 0x0004, // UNKEYED Blake3
}

impl TryFrom<u16> for DigestAlg {
    type Error = CryptoError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(DigestAlg::Sha1),
            0x0002 => Ok(DigestAlg::Sha256),
            0x0003 => Ok(DigestAlg::Sha512),
            0x0004 => Ok(DigestAlg::Blake3),
            _ => Err(CryptoError::UnknownAlgorithm(value)),
        }
    }
}

impl DigestAlg {
    pub fn output_len(self) -> usize {
        match self {
            DigestAlg::Sha1 => 20,
            DigestAlg::Sha256 => 32,
            DigestAlg::Sha512 => 64,
            DigestAlg::Blake3 => 32,
        }
    }
}

/// Internal hashing state.
pub enum DigestState {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Blake3(blake3::Hasher),
    Custom(Box<dyn HashPrimitive>),
}

impl DigestState {
    pub fn new(alg: DigestAlg) -> Self {
        match alg {
            DigestAlg::Sha1 => DigestState::Sha1(Sha1::new()),
            DigestAlg::Sha256 => DigestState::Sha256(Sha256::new()),
            DigestAlg::Sha512 => DigestState::Sha512(Sha512::new()),
            DigestAlg::Blake3 => DigestState::Blake3(blake3::Hasher::new()),
        }
    }

    #[inline]
    fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Sha1(h) => h.update(data),
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
            // Blake3 update returns &mut Hasher, we ignore it here
            DigestState::Blake3(h) => { h.update(data); },
            DigestState::Custom(h) => h.update(data),
        }
    }

    /// Finalize a copy; the live state keeps accepting bytes.
    #[inline]
    fn result(&self) -> Vec<u8> {
        match self {
            DigestState::Sha1(h) => h.clone().finalize().to_vec(),
            DigestState::Sha256(h) => h.clone().finalize().to_vec(),
            DigestState::Sha512(h) => h.clone().finalize().to_vec(),
            DigestState::Blake3(h) => h.finalize().as_bytes().to_vec(),
            DigestState::Custom(h) => h.result(),
        }
    }

    fn output_len(&self) -> usize {
        match self {
            DigestState::Sha1(_) => DigestAlg::Sha1.output_len(),
            DigestState::Sha256(_) => DigestAlg::Sha256.output_len(),
            DigestState::Sha512(_) => DigestAlg::Sha512.output_len(),
            DigestState::Blake3(_) => DigestAlg::Blake3.output_len(),
            DigestState::Custom(h) => h.output_len(),
        }
    }
}

/// Cryptographic hashing stage (the SHA straw/pipe).
///
/// Bytes flowing through are hashed but never altered. While disabled,
/// bytes are not hashed; the digest accumulated so far is kept.
pub struct DigestStage {
    state: DigestState,
    disabled: bool,
    bytes_hashed: u64,
}

impl DigestStage {
    pub fn new(alg: DigestAlg) -> Self {
        Self { state: DigestState::new(alg), disabled: false, bytes_hashed: 0 }
    }

    /// Reference variant: SHA-1, 20-byte digest.
    pub fn sha1() -> Self {
        Self::new(DigestAlg::Sha1)
    }

    pub fn with_primitive(primitive: Box<dyn HashPrimitive>) -> Self {
        Self { state: DigestState::Custom(primitive), disabled: false, bytes_hashed: 0 }
    }

    #[inline]
    pub fn observe(&mut self, data: &[u8]) {
        if self.disabled || data.is_empty() {
            return;
        }
        self.state.update(data);
        self.bytes_hashed += data.len() as u64;
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    pub fn digest(&self) -> Vec<u8> {
        self.state.result()
    }

    pub fn hex_digest(&self) -> String {
        hex::encode(self.digest())
    }

    pub fn digest_len(&self) -> usize {
        self.state.output_len()
    }
}

impl std::fmt::Debug for DigestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestStage")
            .field("digest_len", &self.digest_len())
            .field("disabled", &self.disabled)
            .field("bytes_hashed", &self.bytes_hashed)
            .finish()
    }
}
