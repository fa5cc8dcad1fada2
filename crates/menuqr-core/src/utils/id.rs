// ID generation — nanoid-based unique identifiers.
// The 21-character default is the canonical entity id shape everywhere.

/// Generate a unique ID (21 characters).
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Generate an ID with a custom length.
pub fn generate_id_with_length(len: usize) -> String {
    nanoid::nanoid!(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_length_is_21() {
        assert_eq!(generate_id().len(), 21);
    }

    #[test]
    fn custom_length() {
        assert_eq!(generate_id_with_length(8).len(), 8);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
