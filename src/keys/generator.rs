use rand::RngCore;

pub const API_KEY_PREFIX: &str = "git-insight-";
const KEY_BYTES: usize = 16;

/// Issue a fresh secret token: the `git-insight-` prefix followed by 16
/// random bytes in lowercase hex.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_format() {
        let key = generate_api_key();
        let secret = key.strip_prefix(API_KEY_PREFIX).unwrap();
        assert_eq!(secret.len(), KEY_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generated_keys_differ() {
        assert_ne!(generate_api_key(), generate_api_key());
    }
}
