// Mots de passe au format Werkzeug : pbkdf2:sha256:<iterations>$<salt>$<hash>
use base64::{Engine, engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD}};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Hash stocké en base, découpé en ses trois parties
#[derive(Debug, PartialEq)]
struct StoredHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl StoredHash {
    fn parse(stored: &str) -> Result<Self, String> {
        let mut parts = stored.split('$');
        let (Some(header), Some(salt), Some(hash), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err("Invalid hash format".to_string());
        };

        let iterations = match header.split(':').collect::<Vec<_>>().as_slice() {
            ["pbkdf2", "sha256", iterations] => iterations
                .parse::<u32>()
                .map_err(|_| "Invalid iterations".to_string())?,
            _ => return Err("Invalid header".to_string()),
        };

        Ok(Self {
            iterations,
            salt: decode_flexible(salt)?,
            hash: decode_flexible(hash)?,
        })
    }

    fn matches(&self, password: &str) -> Result<bool, String> {
        let mut computed = vec![0u8; self.hash.len()];
        pbkdf2::<HmacSha256>(password.as_bytes(), &self.salt, self.iterations, &mut computed)
            .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

        // ct_eq : longueur différente => faux, sans sortie anticipée sur le contenu
        Ok(computed.ct_eq(&self.hash).into())
    }
}

/// Hash un mot de passe (PBKDF2-HMAC-SHA256, salt aléatoire de 16 octets)
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    Ok(format!(
        "pbkdf2:sha256:{}${}${}",
        ITERATIONS,
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(key)
    ))
}

/// Vérifie un mot de passe contre un hash Werkzeug (base64 récent ou hex ancien)
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    StoredHash::parse(stored_hash)?.matches(password)
}

/// Hex de 64 caractères (hash de 32 octets), sinon les variantes base64, sinon hex
fn decode_flexible(input: &str) -> Result<Vec<u8>, String> {
    if input.len() == 64 && input.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex::decode(input).map_err(|e| format!("Hex decode failed: {}", e));
    }

    let padded = format!("{}{}", input, "=".repeat((4 - input.len() % 4) % 4));
    [STANDARD, URL_SAFE]
        .iter()
        .find_map(|engine| engine.decode(&padded).ok())
        .or_else(|| [URL_SAFE_NO_PAD, STANDARD_NO_PAD].iter().find_map(|engine| engine.decode(input).ok()))
        .or_else(|| hex::decode(input).ok())
        .ok_or_else(|| "Failed to decode".to_string())
}
