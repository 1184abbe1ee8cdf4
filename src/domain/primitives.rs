//! Domain primitives: Season, Token, PoolId, AssetClass.

use serde::{Deserialize, Serialize};

/// Discrete protocol epoch counter. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Season(pub u32);

impl Season {
    /// Create a Season from its index.
    pub fn new(index: u32) -> Self {
        Season(index)
    }

    /// Get the underlying season index.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token identifier (symbol or on-chain address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token(pub String);

impl Token {
    /// Create a Token from a string.
    pub fn new(token: impl Into<String>) -> Self {
        Token(token.into())
    }

    /// Get the token as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Liquidity pool identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl PoolId {
    /// Create a PoolId from a string.
    pub fn new(pool: impl Into<String>) -> Self {
        PoolId(pool.into())
    }

    /// Get the pool id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset class participating in the redemption/recapitalization mechanism.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetClass(pub String);

impl AssetClass {
    /// Create an AssetClass from a string.
    pub fn new(class: impl Into<String>) -> Self {
        AssetClass(class.into())
    }

    /// Get the class as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_ordering() {
        let s1 = Season::new(6075);
        let s2 = Season::new(6076);
        assert!(s1 < s2);
        assert_eq!(s1.as_u32(), 6075);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new("BEAN");
        assert_eq!(token.to_string(), "BEAN");
    }

    #[test]
    fn test_pool_id_display() {
        let pool = PoolId::new("BEAN:WETH");
        assert_eq!(pool.to_string(), "BEAN:WETH");
    }

    #[test]
    fn test_token_map_key_serialization() {
        use std::collections::BTreeMap;
        let mut map = BTreeMap::new();
        map.insert(Token::new("BEAN"), 6u32);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, "{\"BEAN\":6}");
    }
}
