use crate::error::KeysError;

/// Generate a fresh 12-word (128-bit entropy) BIP-39 mnemonic.
pub fn generate_mnemonic() -> String {
    let mnemonic = bip39::Mnemonic::generate(12).expect("12 is a valid BIP-39 word count");
    mnemonic.to_string()
}

/// Parse and checksum-validate a mnemonic phrase.
pub fn parse_mnemonic(phrase: &str) -> Result<bip39::Mnemonic, KeysError> {
    bip39::Mnemonic::parse(phrase).map_err(KeysError::MnemonicInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_mnemonic_has_twelve_words() {
        let phrase = generate_mnemonic();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert!(parse_mnemonic(&phrase).is_ok());
    }

    #[test]
    fn rejects_bad_checksum() {
        let bogus = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(parse_mnemonic(bogus).is_err());
    }
}
