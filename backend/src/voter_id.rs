use ring::rand::{SecureRandom, SystemRandom};
use crate::error::ApiError;
use tracing::error;

/// Source of server-side voter identifiers: 64 random bits rendered as
/// unpadded lowercase hex.
pub struct VoterIdGenerator {
    rng: SystemRandom,
}

impl Default for VoterIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VoterIdGenerator {
    pub fn new() -> Self {
        Self { rng: SystemRandom::new() }
    }

    pub fn generate(&self) -> Result<String, ApiError> {
        let mut bytes = [0u8; 8];
        self.rng.fill(&mut bytes).map_err(|_| {
            error!("System random source failed while generating a voter id");
            ApiError::Internal
        })?;
        Ok(format!("{:x}", u64::from_be_bytes(bytes)))
    }

    /// Returns the client's identifier, or a fresh one when none was sent.
    pub fn resolve(&self, supplied: Option<String>) -> Result<String, ApiError> {
        match supplied {
            Some(id) => Ok(id),
            None => self.generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_lowercase_hex() {
        let generator = VoterIdGenerator::new();
        for _ in 0..100 {
            let id = generator.generate().unwrap();
            assert!(!id.is_empty());
            assert!(id.len() <= 16);
            assert!(id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            assert!(u64::from_str_radix(&id, 16).is_ok());
        }
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let generator = VoterIdGenerator::new();
        let ids: HashSet<_> = (0..1000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_supplied_id_is_kept() {
        let generator = VoterIdGenerator::new();
        assert_eq!(generator.resolve(Some("x1".into())).unwrap(), "x1");
        assert!(!generator.resolve(None).unwrap().is_empty());
    }
}
