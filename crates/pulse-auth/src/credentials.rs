//! Device credential minting.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use uuid::Uuid;

/// Secret length in bytes (256 bits before base64 encoding).
const SECRET_LEN: usize = 32;

/// A freshly minted device identity. The secret is returned to the client
/// exactly once at registration and is never retrievable again.
#[derive(Debug, Clone)]
pub struct DeviceCredentials {
    /// Random UUIDv4, safe to log.
    pub device_id: String,
    /// Base64-encoded 256-bit shared secret. Never log this.
    pub secret: String,
}

impl DeviceCredentials {
    pub fn generate() -> Self {
        let mut secret_bytes = [0u8; SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret_bytes);

        Self {
            device_id: Uuid::new_v4().to_string(),
            secret: STANDARD.encode(secret_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shapes() {
        let creds = DeviceCredentials::generate();
        assert_eq!(creds.device_id.len(), 36);
        assert!(Uuid::parse_str(&creds.device_id).is_ok());
        let decoded = STANDARD.decode(&creds.secret).expect("base64");
        assert_eq!(decoded.len(), SECRET_LEN);
    }

    #[test]
    fn test_generate_is_unique() {
        let a = DeviceCredentials::generate();
        let b = DeviceCredentials::generate();
        assert_ne!(a.device_id, b.device_id);
        assert_ne!(a.secret, b.secret);
    }
}
