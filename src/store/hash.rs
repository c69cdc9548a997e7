use blake3::Hasher;

/// Compute the hex digest of a file's content.
///
/// Used for change detection in the snapshot store and as the result-cache
/// key, so both sides must agree on this one function.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_hashes_identically() {
        assert_eq!(content_hash("let x = 1;"), content_hash("let x = 1;"));
        assert_ne!(content_hash("let x = 1;"), content_hash("let x = 2;"));
    }
}
