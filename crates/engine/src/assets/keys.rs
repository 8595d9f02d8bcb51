use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '-' or '_'")]
    LeadingSeparator,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Character and sound names come from file stems; only lowercase ASCII,
/// digits, '_' and '-' are accepted so names stay usable as config values.
pub(crate) fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with(['-', '_']) {
        return Err(AssetKeyError::LeadingSeparator);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-') {
            continue;
        }
        return Err(AssetKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["warrior_m", "grunt2", "old-man"] {
            assert!(validate_asset_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "_hidden", "Warrior", "a.b", "a/b", "sp ace"] {
            assert!(validate_asset_key(key).is_err(), "key={key}");
        }
    }
}
