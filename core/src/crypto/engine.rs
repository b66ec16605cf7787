use blowfish::Blowfish;
use cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};

use crate::constants::{BLOWFISH_MAX_KEY_LEN, BLOWFISH_MIN_KEY_LEN};
use crate::crypto::types::CryptoError;

/// External block cipher primitive: one fixed-size block, transformed in place.
///
/// Callers always pass exactly `block_len()` bytes.
pub trait BlockCipherEngine: Send {
    fn block_len(&self) -> usize;
    fn encrypt_block(&self, block: &mut [u8]);
    fn decrypt_block(&self, block: &mut [u8]);
}

/// Builds a keyed engine from raw key material.
pub type EngineFactory = fn(&[u8]) -> Result<Box<dyn BlockCipherEngine>, CryptoError>;

/// Adapter over any RustCrypto block cipher.
pub struct RustCryptoEngine<C> {
    cipher: C,
}

impl<C: KeyInit> RustCryptoEngine<C> {
    pub fn new_from_key(key: &[u8]) -> Result<Self, CryptoError> {
        let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLen {
            min: C::key_size(),
            max: C::key_size(),
            actual: key.len(),
        })?;
        Ok(Self { cipher })
    }
}

impl<C> BlockCipherEngine for RustCryptoEngine<C>
where
    C: BlockEncrypt + BlockDecrypt + Send,
{
    fn block_len(&self) -> usize {
        C::block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

pub type BlowfishEngine = RustCryptoEngine<Blowfish>;

/// Reference engine factory: Blowfish, 8-byte blocks, 4..=56 byte keys.
pub fn blowfish_engine(key: &[u8]) -> Result<Box<dyn BlockCipherEngine>, CryptoError> {
    if !(BLOWFISH_MIN_KEY_LEN..=BLOWFISH_MAX_KEY_LEN).contains(&key.len()) {
        return Err(CryptoError::InvalidKeyLen {
            min: BLOWFISH_MIN_KEY_LEN,
            max: BLOWFISH_MAX_KEY_LEN,
            actual: key.len(),
        });
    }
    let engine = BlowfishEngine::new_from_key(key)?;
    Ok(Box::new(engine))
}
