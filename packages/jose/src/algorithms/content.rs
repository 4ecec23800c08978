//! Content encryption: AES-GCM and AES-CBC with HMAC-SHA2 (RFC 7518 §5)

use super::block::{AesKey, BLOCK_LEN};
use super::hmac::{HmacSha256, HmacSha384, HmacSha512, mac};
use super::utils::{constant_time_eq, random_bytes};
use crate::error::{JoseError, JoseResult};
use crate::jwa::ContentEncryption;
use aes::Block;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

const GCM_IV_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;

/// Output of content encryption
#[derive(Debug)]
pub(crate) struct Sealed {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Encrypt `plaintext` under `cek`, authenticating `aad`.
pub(crate) fn encrypt(
    enc: ContentEncryption,
    cek: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> JoseResult<Sealed> {
    if cek.len() != enc.key_len() {
        return Err(JoseError::invalid_key(format!(
            "{enc} needs a {} byte key, got {}",
            enc.key_len(),
            cek.len()
        )));
    }
    match enc {
        ContentEncryption::A128Gcm => gcm_seal::<Aes128Gcm>(cek, aad, plaintext),
        ContentEncryption::A192Gcm => gcm_seal::<Aes192Gcm>(cek, aad, plaintext),
        ContentEncryption::A256Gcm => gcm_seal::<Aes256Gcm>(cek, aad, plaintext),
        ContentEncryption::A128CbcHs256
        | ContentEncryption::A192CbcHs384
        | ContentEncryption::A256CbcHs512 => cbc_hmac_seal(enc, cek, aad, plaintext),
    }
}

/// Decrypt and authenticate. Every failure is [`JoseError::DecryptionFailed`].
pub(crate) fn decrypt(
    enc: ContentEncryption,
    cek: &[u8],
    aad: &[u8],
    sealed: &Sealed,
) -> JoseResult<Vec<u8>> {
    if cek.len() != enc.key_len() {
        return Err(JoseError::DecryptionFailed);
    }
    match enc {
        ContentEncryption::A128Gcm => gcm_open::<Aes128Gcm>(cek, aad, sealed),
        ContentEncryption::A192Gcm => gcm_open::<Aes192Gcm>(cek, aad, sealed),
        ContentEncryption::A256Gcm => gcm_open::<Aes256Gcm>(cek, aad, sealed),
        ContentEncryption::A128CbcHs256
        | ContentEncryption::A192CbcHs384
        | ContentEncryption::A256CbcHs512 => cbc_hmac_open(enc, cek, aad, sealed),
    }
}

/// AES-GCM with the cipher picked by key length (16, 24 or 32 bytes) and no
/// associated data. Used to encrypt a content key (A*GCMKW).
pub(crate) fn gcm_seal_key(kek: &[u8], cek: &[u8]) -> JoseResult<Sealed> {
    match kek.len() {
        16 => gcm_seal::<Aes128Gcm>(kek, &[], cek),
        24 => gcm_seal::<Aes192Gcm>(kek, &[], cek),
        32 => gcm_seal::<Aes256Gcm>(kek, &[], cek),
        n => Err(JoseError::invalid_key(format!("no AES-GCM cipher for a {n} byte key"))),
    }
}

/// Reverse of [`gcm_seal_key`]; every failure is [`JoseError::DecryptionFailed`].
pub(crate) fn gcm_open_key(kek: &[u8], sealed: &Sealed) -> JoseResult<Vec<u8>> {
    match kek.len() {
        16 => gcm_open::<Aes128Gcm>(kek, &[], sealed),
        24 => gcm_open::<Aes192Gcm>(kek, &[], sealed),
        32 => gcm_open::<Aes256Gcm>(kek, &[], sealed),
        _ => Err(JoseError::DecryptionFailed),
    }
}

fn gcm_seal<C>(cek: &[u8], aad: &[u8], plaintext: &[u8]) -> JoseResult<Sealed>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(cek).map_err(|_| JoseError::invalid_key("invalid AES-GCM key"))?;
    let iv = random_bytes(GCM_IV_LEN).to_vec();
    let mut ciphertext = cipher
        .encrypt(GenericArray::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|_| JoseError::invalid_token("content encryption failed"))?;
    let tag = ciphertext.split_off(ciphertext.len() - GCM_TAG_LEN);
    Ok(Sealed { iv, ciphertext, tag })
}

fn gcm_open<C>(cek: &[u8], aad: &[u8], sealed: &Sealed) -> JoseResult<Vec<u8>>
where
    C: Aead + KeyInit,
{
    if sealed.iv.len() != GCM_IV_LEN || sealed.tag.len() != GCM_TAG_LEN {
        return Err(JoseError::DecryptionFailed);
    }
    let cipher = C::new_from_slice(cek).map_err(|_| JoseError::DecryptionFailed)?;
    let mut msg = Vec::with_capacity(sealed.ciphertext.len() + GCM_TAG_LEN);
    msg.extend_from_slice(&sealed.ciphertext);
    msg.extend_from_slice(&sealed.tag);
    cipher
        .decrypt(GenericArray::from_slice(&sealed.iv), Payload { msg: &msg, aad })
        .map_err(|_| JoseError::DecryptionFailed)
}

/// `aad || iv || ciphertext || AL`, MACed and truncated to half the CEK.
fn cbc_tag(enc: ContentEncryption, mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> JoseResult<Vec<u8>> {
    let al = ((aad.len() as u64) * 8).to_be_bytes();
    let parts: [&[u8]; 4] = [aad, iv, ciphertext, &al];
    let mut tag = match enc {
        ContentEncryption::A128CbcHs256 => mac::<HmacSha256>(mac_key, &parts)?,
        ContentEncryption::A192CbcHs384 => mac::<HmacSha384>(mac_key, &parts)?,
        ContentEncryption::A256CbcHs512 => mac::<HmacSha512>(mac_key, &parts)?,
        other => return Err(JoseError::unsupported_algorithm(other.as_str())),
    };
    tag.truncate(mac_key.len());
    Ok(tag)
}

fn cbc_hmac_seal(enc: ContentEncryption, cek: &[u8], aad: &[u8], plaintext: &[u8]) -> JoseResult<Sealed> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
    let cipher = AesKey::new(enc_key)?;
    let iv = random_bytes(BLOCK_LEN).to_vec();

    let pad = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut ciphertext = Vec::with_capacity(plaintext.len() + pad);
    ciphertext.extend_from_slice(plaintext);
    ciphertext.resize(plaintext.len() + pad, pad as u8);

    let mut chain = Block::clone_from_slice(&iv);
    for chunk in ciphertext.chunks_exact_mut(BLOCK_LEN) {
        for (byte, prev) in chunk.iter_mut().zip(chain.iter()) {
            *byte ^= prev;
        }
        let block = Block::from_mut_slice(chunk);
        cipher.encrypt(block);
        chain.copy_from_slice(block);
    }

    let tag = cbc_tag(enc, mac_key, aad, &iv, &ciphertext)?;
    Ok(Sealed { iv, ciphertext, tag })
}

fn cbc_hmac_open(enc: ContentEncryption, cek: &[u8], aad: &[u8], sealed: &Sealed) -> JoseResult<Vec<u8>> {
    let (mac_key, enc_key) = cek.split_at(cek.len() / 2);
    if sealed.iv.len() != BLOCK_LEN
        || sealed.ciphertext.is_empty()
        || sealed.ciphertext.len() % BLOCK_LEN != 0
    {
        return Err(JoseError::DecryptionFailed);
    }
    let expected = cbc_tag(enc, mac_key, aad, &sealed.iv, &sealed.ciphertext)?;
    if !constant_time_eq(&expected, &sealed.tag) {
        return Err(JoseError::DecryptionFailed);
    }

    let cipher = AesKey::new(enc_key).map_err(|_| JoseError::DecryptionFailed)?;
    let mut plaintext = sealed.ciphertext.clone();
    let mut chain = Block::clone_from_slice(&sealed.iv);
    for chunk in plaintext.chunks_exact_mut(BLOCK_LEN) {
        let saved = Block::clone_from_slice(chunk);
        let block = Block::from_mut_slice(chunk);
        cipher.decrypt(block);
        for (byte, prev) in block.iter_mut().zip(chain.iter()) {
            *byte ^= prev;
        }
        chain = saved;
    }

    let pad = plaintext.last().copied().unwrap_or(0) as usize;
    if pad == 0 || pad > BLOCK_LEN || plaintext[plaintext.len() - pad..].iter().any(|&b| b as usize != pad) {
        return Err(JoseError::DecryptionFailed);
    }
    plaintext.truncate(plaintext.len() - pad);
    Ok(plaintext)
}
