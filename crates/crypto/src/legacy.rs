//! Legacy AES-256-ECB codec (PKCS#7), decode path only
//!
//! No nonce and no tag: the same key and plaintext always give the same
//! ciphertext. Frames that predate the AEAD codec still arrive in this form.

use aes::Aes256;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, block_padding::Pkcs7};

use crate::cipher::{CipherError, PayloadCipher};
use crate::kdf::DerivedKey;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

pub const BLOCK_LEN: usize = 16;

pub struct LegacyCodec {
    encryptor: Aes256EcbEnc,
    decryptor: Aes256EcbDec,
}

impl LegacyCodec {
    pub fn new(key: &DerivedKey) -> Self {
        Self {
            encryptor: Aes256EcbEnc::new(key.as_bytes().into()),
            decryptor: Aes256EcbDec::new(key.as_bytes().into()),
        }
    }
}

impl PayloadCipher for LegacyCodec {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(self
            .encryptor
            .clone()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CipherError> {
        if blob.is_empty() || blob.len() % BLOCK_LEN != 0 {
            return Err(CipherError::MalformedCiphertext(blob.len()));
        }

        self.decryptor
            .clone()
            .decrypt_padded_vec_mut::<Pkcs7>(blob)
            .map_err(|_| CipherError::Padding)
    }
}
