//! Durable session storage.
//!
//! The store owns where the session record lives between invocations
//! and enforces the two lifetime policies from the configuration
//! surface: the sliding access window and the absolute session
//! ceiling. With a session secret configured the record is sealed at
//! rest; without one it falls back to plaintext JSON.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use chrono::Duration;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::session::SessionToken;

/// Session file name in the application data directory
const SESSION_FILE: &str = "session.json";

/// Salt length for key derivation
const SALT_LEN: usize = 16;

/// XChaCha20 nonce length
const NONCE_LEN: usize = 24;

pub trait SessionStore {
    /// Load the stored session, if one exists and is still inside its
    /// lifetime windows.
    fn load(&self) -> Result<Option<SessionToken>>;

    /// Persist the session record.
    fn save(&self, token: &SessionToken) -> Result<()>;

    /// Drop the stored session. Idempotent.
    fn clear(&self) -> Result<()>;
}

/// Sealed on-disk envelope: Argon2-derived key, XChaCha20-Poly1305 box.
#[derive(Serialize, Deserialize)]
struct SealedRecord {
    salt: String,
    nonce: String,
    ciphertext: String,
}

pub struct FileSessionStore {
    dir: PathBuf,
    secret: Option<String>,
    access_window: Duration,
    max_session: Duration,
}

impl FileSessionStore {
    pub fn new(
        dir: PathBuf,
        secret: Option<String>,
        access_window_secs: i64,
        max_session_secs: i64,
    ) -> Self {
        Self {
            dir,
            secret,
            access_window: Duration::seconds(access_window_secs),
            max_session: Duration::seconds(max_session_secs),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn derive_key(secret: &str, salt: &[u8]) -> Result<[u8; 32]> {
        let mut key = [0u8; 32];
        argon2::Argon2::default()
            .hash_password_into(secret.as_bytes(), salt, &mut key)
            .map_err(|e| anyhow!("session key derivation failed: {}", e))?;
        Ok(key)
    }

    fn seal(secret: &str, plaintext: &[u8]) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        rand::thread_rng().fill_bytes(&mut nonce);

        let key = Self::derive_key(secret, &salt)?;
        let cipher = XChaCha20Poly1305::new((&key).into());
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| anyhow!("failed to seal session record"))?;

        let record = SealedRecord {
            salt: STANDARD.encode(salt),
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }

    fn open(secret: &str, contents: &str) -> Result<SessionToken> {
        let record: SealedRecord =
            serde_json::from_str(contents).context("Failed to parse sealed session record")?;

        let salt = STANDARD
            .decode(&record.salt)
            .context("Bad salt in sealed session record")?;
        let nonce = STANDARD
            .decode(&record.nonce)
            .context("Bad nonce in sealed session record")?;
        let ciphertext = STANDARD
            .decode(&record.ciphertext)
            .context("Bad ciphertext in sealed session record")?;

        let key = Self::derive_key(secret, &salt)?;
        let cipher = XChaCha20Poly1305::new((&key).into());
        let plaintext = cipher
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_slice())
            .map_err(|_| anyhow!("failed to open sealed session record (wrong session secret?)"))?;

        serde_json::from_slice(&plaintext).context("Failed to parse session record")
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionToken>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;

        let token = match &self.secret {
            Some(secret) => Self::open(secret, &contents)?,
            None => serde_json::from_str(&contents).context("Failed to parse session file")?,
        };

        if token.is_beyond_max_age(self.max_session) {
            debug!(sub = %token.sub, "stored session is past the max-session ceiling");
            return Ok(None);
        }
        if token.is_outside_access_window(self.access_window) {
            debug!(sub = %token.sub, "stored session fell out of the access window");
            return Ok(None);
        }

        Ok(Some(token))
    }

    fn save(&self, token: &SessionToken) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = match &self.secret {
            Some(secret) => {
                let plaintext = serde_json::to_vec(token)?;
                Self::seal(secret, &plaintext)?
            }
            None => {
                warn!("no session secret configured, storing session record in plaintext");
                serde_json::to_string_pretty(token)?
            }
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::api::TokenPair;
    use crate::auth::claims::AccessClaims;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("fomento-console-store-{}", rand::random::<u64>()))
    }

    fn sample_token() -> SessionToken {
        SessionToken::issue(
            TokenPair {
                access_token: "a.b.c".to_string(),
                refresh_token: "r1".to_string(),
            },
            AccessClaims {
                sub: "alice".to_string(),
                exp: Utc::now().timestamp() + 3600,
                is_superuser: false,
            },
        )
    }

    fn plaintext_store(dir: PathBuf) -> FileSessionStore {
        FileSessionStore::new(dir, None, 3600, 86_400)
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = plaintext_store(temp_dir());
        assert!(store.load().expect("load failed").is_none());
    }

    #[test]
    fn test_plaintext_round_trip() {
        let dir = temp_dir();
        let store = plaintext_store(dir.clone());
        let token = sample_token();

        store.save(&token).expect("save failed");
        let loaded = store.load().expect("load failed").expect("no session");
        assert_eq!(loaded.sub, token.sub);
        assert_eq!(loaded.access_token, token.access_token);
        assert!(loaded.is_fresh());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_sealed_round_trip() {
        let dir = temp_dir();
        let store = FileSessionStore::new(dir.clone(), Some("s3cret".to_string()), 3600, 86_400);
        let token = sample_token();

        store.save(&token).expect("save failed");

        // The record on disk must not contain the token in the clear.
        let raw = std::fs::read_to_string(dir.join(SESSION_FILE)).expect("read failed");
        assert!(!raw.contains("a.b.c"));
        assert!(!raw.contains("alice"));

        let loaded = store.load().expect("load failed").expect("no session");
        assert_eq!(loaded.sub, token.sub);
        assert_eq!(loaded.refresh_token, "r1");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_wrong_secret_refuses_to_open() {
        let dir = temp_dir();
        let store = FileSessionStore::new(dir.clone(), Some("right".to_string()), 3600, 86_400);
        store.save(&sample_token()).expect("save failed");

        let other = FileSessionStore::new(dir.clone(), Some("wrong".to_string()), 3600, 86_400);
        assert!(other.load().is_err());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_prunes_session_past_max_age() {
        let dir = temp_dir();
        let store = plaintext_store(dir.clone());

        let mut token = sample_token();
        token.created_at = Utc::now() - Duration::seconds(90_000);
        store.save(&token).expect("save failed");

        assert!(store.load().expect("load failed").is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_prunes_session_outside_access_window() {
        let dir = temp_dir();
        let store = plaintext_store(dir.clone());

        let mut token = sample_token();
        token.updated_at = Utc::now() - Duration::seconds(7200);
        store.save(&token).expect("save failed");

        assert!(store.load().expect("load failed").is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = temp_dir();
        let store = plaintext_store(dir.clone());

        store.clear().expect("clear on empty store failed");
        store.save(&sample_token()).expect("save failed");
        store.clear().expect("clear failed");
        assert!(store.load().expect("load failed").is_none());
        store.clear().expect("second clear failed");

        let _ = std::fs::remove_dir_all(dir);
    }
}
