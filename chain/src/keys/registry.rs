// chain/src/keys/registry.rs

//! File-backed actor key registry.
//!
//! Private keys are PKCS8 PEM, mode 0600; public keys are
//! SubjectPublicKeyInfo PEM, world-readable. Signing is RSA-PKCS1v1.5
//! over SHA-256, base64-encoded.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

const KEY_BITS: usize = 2048;

#[derive(Debug)]
pub enum KeyError {
    NotFound(String),
    Io(String),
    Crypto(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::NotFound(actor) => write!(f, "no key on disk for actor {actor}"),
            KeyError::Io(msg) => write!(f, "key registry I/O error: {msg}"),
            KeyError::Crypto(msg) => write!(f, "cryptographic error: {msg}"),
        }
    }
}

impl std::error::Error for KeyError {}

/// File-backed directory of `<actor>_private.pem` / `<actor>_public.pem`,
/// with an in-memory cache of loaded public keys.
pub struct KeyRegistry {
    keys_dir: PathBuf,
    public_cache: Mutex<HashMap<String, RsaPublicKey>>,
}

impl KeyRegistry {
    pub fn new(keys_dir: impl Into<PathBuf>) -> Result<Self, KeyError> {
        let keys_dir = keys_dir.into();
        fs::create_dir_all(&keys_dir).map_err(|e| KeyError::Io(e.to_string()))?;
        Ok(KeyRegistry {
            keys_dir,
            public_cache: Mutex::new(HashMap::new()),
        })
    }

    fn private_path(&self, actor: &str) -> PathBuf {
        self.keys_dir.join(format!("{actor}_private.pem"))
    }

    fn public_path(&self, actor: &str) -> PathBuf {
        self.keys_dir.join(format!("{actor}_public.pem"))
    }

    /// Generates and persists a new RSA-2048 keypair for `actor`, or
    /// loads the existing one if already present. Mirrors
    /// `register_actor`.
    pub fn register_actor(&self, actor: &str) -> Result<String, KeyError> {
        if self.private_path(actor).exists() {
            return self.public_key_pem(actor);
        }
        self.generate_key_pair(actor)
    }

    fn generate_key_pair(&self, actor: &str) -> Result<String, KeyError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        self.save_private_key(actor, &private_key)?;
        self.save_public_key(actor, &public_key)?;

        self.public_cache
            .lock()
            .unwrap()
            .insert(actor.to_string(), public_key);

        self.public_key_pem(actor)
    }

    fn save_private_key(&self, actor: &str, key: &RsaPrivateKey) -> Result<(), KeyError> {
        let pem = key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        let path = self.private_path(actor);
        fs::write(&path, pem.as_bytes()).map_err(|e| KeyError::Io(e.to_string()))?;
        set_owner_only_permissions(&path)?;
        Ok(())
    }

    fn save_public_key(&self, actor: &str, key: &RsaPublicKey) -> Result<(), KeyError> {
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        fs::write(self.public_path(actor), pem.as_bytes())
            .map_err(|e| KeyError::Io(e.to_string()))
    }

    fn load_private_key(&self, actor: &str) -> Result<RsaPrivateKey, KeyError> {
        let path = self.private_path(actor);
        if !path.exists() {
            return Err(KeyError::NotFound(actor.to_string()));
        }
        let pem = fs::read_to_string(&path).map_err(|e| KeyError::Io(e.to_string()))?;
        RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| KeyError::Crypto(e.to_string()))
    }

    fn load_public_key(&self, actor: &str) -> Result<RsaPublicKey, KeyError> {
        if let Some(key) = self.public_cache.lock().unwrap().get(actor) {
            return Ok(key.clone());
        }
        let path = self.public_path(actor);
        if !path.exists() {
            return Err(KeyError::NotFound(actor.to_string()));
        }
        let pem = fs::read_to_string(&path).map_err(|e| KeyError::Io(e.to_string()))?;
        let key = RsaPublicKey::from_public_key_pem(&pem)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        self.public_cache
            .lock()
            .unwrap()
            .insert(actor.to_string(), key.clone());
        Ok(key)
    }

    /// Base64-encoded SubjectPublicKeyInfo PEM, for embedding as the
    /// advisory `public_key` field on a freshly signed transaction.
    pub fn public_key_pem(&self, actor: &str) -> Result<String, KeyError> {
        let key = self.load_public_key(actor)?;
        let pem = key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        Ok(BASE64.encode(pem.as_bytes()))
    }

    /// Signs `message` (already-canonicalized bytes) with `actor`'s
    /// private key. Returns a base64-encoded signature.
    pub fn sign(&self, actor: &str, message: &[u8]) -> Result<String, KeyError> {
        let private_key = self.load_private_key(actor)?;
        let digest = Sha256::digest(message);
        let padding = Pkcs1v15Sign::new::<Sha256>();
        let signature = private_key
            .sign(padding, &digest)
            .map_err(|e| KeyError::Crypto(e.to_string()))?;
        Ok(BASE64.encode(signature))
    }

    /// Verifies `signature_b64` over `message` using `actor`'s on-disk
    /// public key. The caller is responsible for ensuring `message` is
    /// the canonical signed form; this function never consults an
    /// embedded `public_key` field.
    pub fn verify(&self, actor: &str, message: &[u8], signature_b64: &str) -> Result<bool, KeyError> {
        let public_key = self.load_public_key(actor)?;
        let signature = match BASE64.decode(signature_b64) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(false),
        };
        let digest = Sha256::digest(message);
        let padding = Pkcs1v15Sign::new::<Sha256>();
        Ok(public_key.verify(padding, &digest, &signature).is_ok())
    }

    /// Actors with a public key on disk.
    pub fn list_actors(&self) -> Result<Vec<String>, KeyError> {
        let mut actors = Vec::new();
        if !self.keys_dir.exists() {
            return Ok(actors);
        }
        for entry in fs::read_dir(&self.keys_dir).map_err(|e| KeyError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| KeyError::Io(e.to_string()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(actor) = name.strip_suffix("_public.pem") {
                actors.push(actor.to_string());
            }
        }
        actors.sort();
        Ok(actors)
    }

    pub fn has_private_key(&self, actor: &str) -> bool {
        self.private_path(actor).exists()
    }
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), KeyError> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, perms).map_err(|e| KeyError::Io(e.to_string()))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), KeyError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sign_and_verify_round_trip() {
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        registry.register_actor("Supplier_A").unwrap();

        let message = b"{\"batch_id\":\"BATCH_001\"}";
        let sig = registry.sign("Supplier_A", message).unwrap();
        assert!(registry.verify("Supplier_A", message, &sig).unwrap());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        registry.register_actor("Supplier_A").unwrap();

        let sig = registry.sign("Supplier_A", b"original").unwrap();
        assert!(!registry.verify("Supplier_A", b"tampered", &sig).unwrap());
    }

    #[test]
    fn unknown_actor_signature_is_not_found() {
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        let err = registry.sign("Nobody", b"x").unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }

    #[test]
    fn register_actor_is_idempotent() {
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        let first = registry.register_actor("Distributor_B").unwrap();
        let second = registry.register_actor("Distributor_B").unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn private_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        registry.register_actor("Retailer_C").unwrap();
        let meta = fs::metadata(registry.private_path("Retailer_C")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn list_actors_reflects_registered_keys() {
        let dir = tempdir().unwrap();
        let registry = KeyRegistry::new(dir.path()).unwrap();
        registry.register_actor("Supplier_A").unwrap();
        registry.register_actor("Distributor_B").unwrap();
        let actors = registry.list_actors().unwrap();
        assert_eq!(actors, vec!["Distributor_B".to_string(), "Supplier_A".to_string()]);
    }
}
