//! AES block cipher keyed by length, shared by key wrap and CBC

use crate::error::{JoseError, JoseResult};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};

pub(super) const BLOCK_LEN: usize = 16;

pub(super) enum AesKey {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesKey {
    /// Key an AES cipher from a 16, 24 or 32 byte key.
    pub(super) fn new(key: &[u8]) -> JoseResult<Self> {
        let cipher = match key.len() {
            16 => Aes128::new_from_slice(key).map(Self::Aes128),
            24 => Aes192::new_from_slice(key).map(Self::Aes192),
            32 => Aes256::new_from_slice(key).map(Self::Aes256),
            len => {
                return Err(JoseError::invalid_key(format!(
                    "AES key must be 16, 24 or 32 bytes, got {len}"
                )));
            }
        };
        cipher.map_err(|_| JoseError::invalid_key("invalid AES key"))
    }

    pub(super) fn encrypt(&self, block: &mut Block) {
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    pub(super) fn decrypt(&self, block: &mut Block) {
        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}
