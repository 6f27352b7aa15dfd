/// Signing identity management
///
/// The wallet keypair is loaded once at startup and shared read-only for
/// the life of the process. Private key material accepts the two formats
/// wallets commonly export: a base58 string or a JSON byte array.
use crate::configs::Configs;
use crate::errors::SwapError;
use solana_sdk::signature::Keypair;

/// Load the signing keypair from the runtime config
pub fn load_keypair(configs: &Configs) -> Result<Keypair, SwapError> {
    let raw = configs.main_wallet_private.trim();

    let bytes: Vec<u8> = if raw.starts_with('[') && raw.ends_with(']') {
        // JSON array format like [12,34,...]
        raw.trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| SwapError::Config(format!("invalid private key array: {}", e)))?
    } else {
        bs58::decode(raw)
            .into_vec()
            .map_err(|e| SwapError::Config(format!("invalid base58 private key: {}", e)))?
    };

    if bytes.len() != 64 {
        return Err(SwapError::Config(format!(
            "invalid private key length: expected 64 bytes, got {}",
            bytes.len()
        )));
    }

    Keypair::try_from(&bytes[..])
        .map_err(|e| SwapError::Config(format!("cannot build keypair: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    fn configs_with_key(key: String) -> Configs {
        serde_json::from_value(serde_json::json!({
            "main_wallet_private": key,
            "fee_address": "11111111111111111111111111111111",
            "webhook_api_key": "secret"
        }))
        .unwrap()
    }

    #[test]
    fn loads_base58_key() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let loaded = load_keypair(&configs_with_key(encoded)).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn loads_array_key() {
        let keypair = Keypair::new();
        let array = format!(
            "[{}]",
            keypair
                .to_bytes()
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        let loaded = load_keypair(&configs_with_key(array)).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_wrong_length() {
        let result = load_keypair(&configs_with_key(bs58::encode([1u8; 32]).into_string()));
        assert!(matches!(result, Err(SwapError::Config(_))));
    }
}
