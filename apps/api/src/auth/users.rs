//! Flat-file user store (`users.json`) with PBKDF2-SHA256 password hashes.
//!
//! Hash format: `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`. Records whose password
//! does not carry that prefix are treated as plain text and hashed when the store opens.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use pbkdf2::pbkdf2_hmac;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppError;

const HASH_PREFIX: &str = "pbkdf2:sha256";
/// Iterations assumed for hashes stored without an explicit count.
const LEGACY_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name.
    pub name: String,
    pub password: String,
}

pub fn hash_password(password: &str, iterations: u32) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let digest = derive(password, &salt, iterations);
    format!("{HASH_PREFIX}:{iterations}${salt}${digest}")
}

pub fn verify_password(stored: &str, provided: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let iterations = match method.strip_prefix(HASH_PREFIX) {
        Some("") => LEGACY_ITERATIONS,
        Some(rest) => match rest.strip_prefix(':').and_then(|n| n.parse::<u32>().ok()) {
            Some(n) if n > 0 => n,
            _ => return false,
        },
        None => return false,
    };

    constant_time_eq(derive(provided, salt, iterations).as_bytes(), digest.as_bytes())
}

pub fn is_hashed(password: &str) -> bool {
    password.starts_with(HASH_PREFIX)
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut out = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut out);
    out.iter().map(|b| format!("{b:02x}")).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Usernames double as folder names: 3–32 characters of `[A-Za-z0-9_-]`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !(3..=32).contains(&username.len()) || !valid_chars {
        return Err(AppError::Validation(
            "User names must be 3 to 32 characters of letters, digits, '_' or '-'.".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Passwords must have at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserStore {
    path: PathBuf,
    iterations: u32,
    /// Serializes read-modify-write cycles on the file.
    lock: Arc<Mutex<()>>,
}

impl UserStore {
    /// Opens (or creates) the store and hashes any plain-text passwords in place.
    pub async fn open(path: PathBuf, iterations: u32) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            iterations,
            lock: Arc::new(Mutex::new(())),
        };

        let _guard = store.lock.lock().await;
        let mut users = store.load().await?;
        let mut rehashed = 0;
        for record in users.values_mut() {
            if !is_hashed(&record.password) {
                record.password = hash_blocking(record.password.clone(), iterations).await?;
                rehashed += 1;
            }
        }
        if rehashed > 0 {
            info!("Hashed {rehashed} plain-text password(s) in {}", store.path.display());
            store.save(&users).await?;
        }
        drop(_guard);

        Ok(store)
    }

    async fn load(&self) -> Result<BTreeMap<String, UserRecord>, AppError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Internal(anyhow!("Corrupt user file {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, users: &BTreeMap<String, UserRecord>) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(users)
            .map_err(|e| AppError::Internal(anyhow!("Failed to encode users: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn get(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.load().await?.remove(username))
    }

    /// Adds a user. Existing usernames are a `Conflict`.
    pub async fn register(
        &self,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        validate_username(username)?;
        validate_password(password)?;

        let display_name = match display_name.trim() {
            "" => username.to_string(),
            name => name.to_string(),
        };

        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;
        if users.contains_key(username) {
            return Err(AppError::Conflict(format!(
                "The user name '{username}' is already taken."
            )));
        }

        let record = UserRecord {
            name: display_name,
            password: hash_blocking(password.to_string(), self.iterations).await?,
        };
        users.insert(username.to_string(), record.clone());
        self.save(&users).await?;

        info!("Registered user {username}");
        Ok(record)
    }

    /// Returns the record when `password` matches.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let Some(record) = self.get(username).await? else {
            return Ok(None);
        };

        let stored = record.password.clone();
        let provided = password.to_string();
        let ok = tokio::task::spawn_blocking(move || verify_password(&stored, &provided))
            .await
            .map_err(|e| AppError::Internal(anyhow!("Password check aborted: {e}")))?;

        Ok(ok.then_some(record))
    }
}

async fn hash_blocking(password: String, iterations: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password, iterations))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Password hashing aborted: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse", FAST);
        assert!(hash.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same", FAST), hash_password("same", FAST));
    }

    #[test]
    fn test_verify_rejects_malformed_hashes() {
        assert!(!verify_password("plaintext", "plaintext"));
        assert!(!verify_password("pbkdf2:sha256:abc$salt$00", "x"));
        assert!(!verify_password("scrypt:32768:8:1$salt$00", "x"));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ana_g-1").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("users.json").is_err());
        assert!(validate_username("../root").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UserStore::open(tmp.path().join("users.json"), FAST).await.unwrap();

        let record = store.register("alice", "Alice A.", "s3cret-pass").await.unwrap();
        assert_eq!(record.name, "Alice A.");
        assert!(is_hashed(&record.password));

        assert!(store.authenticate("alice", "s3cret-pass").await.unwrap().is_some());
        assert!(store.authenticate("alice", "nope-nope").await.unwrap().is_none());
        assert!(store.authenticate("bob", "s3cret-pass").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UserStore::open(tmp.path().join("users.json"), FAST).await.unwrap();
        store.register("alice", "", "s3cret-pass").await.unwrap();
        let err = store.register("alice", "", "other-pass").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_blank_display_name_defaults_to_username() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UserStore::open(tmp.path().join("users.json"), FAST).await.unwrap();
        let record = store.register("carol", "  ", "s3cret-pass").await.unwrap();
        assert_eq!(record.name, "carol");
    }

    #[tokio::test]
    async fn test_open_hashes_plain_text_passwords() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("users.json");
        std::fs::write(
            &path,
            r#"{ "admin": { "name": "Admin", "password": "changeme123" } }"#,
        )
        .unwrap();

        let store = UserStore::open(path.clone(), FAST).await.unwrap();

        let on_disk: BTreeMap<String, UserRecord> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(is_hashed(&on_disk["admin"].password));
        assert!(store.authenticate("admin", "changeme123").await.unwrap().is_some());
    }
}
