// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fs;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::common::parsing::short_address;
use crate::domain::error::AppError;

/// Display metadata for a known token. Decimals here are for rendering only;
/// the planner always fetches authoritative decimals from the ledger.
#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub symbol: String,
    pub label: String,
    pub decimals: u8,
    pub icon: Option<String>,
}

/// Static address → metadata mapping, loaded once at process start.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenMeta>,
}

#[derive(Deserialize)]
struct TokenEntry {
    address: String,
    symbol: String,
    #[serde(default)]
    label: String,
    decimals: u8,
    #[serde(default)]
    icon: Option<String>,
}

impl TokenRegistry {
    pub fn load_from_file(path: &str) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read tokenlist {path}: {e}")))?;
        Self::from_json_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid tokenlist JSON {path}: {e}")))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let entries: Vec<TokenEntry> =
            serde_json::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;

        let mut tokens = HashMap::new();
        for entry in entries {
            let addr = entry
                .address
                .parse::<Address>()
                .map_err(|_| AppError::InvalidAddress(entry.address.clone()))?;
            let label = if entry.label.is_empty() {
                entry.symbol.clone()
            } else {
                entry.label
            };
            tokens.insert(
                addr,
                TokenMeta {
                    symbol: entry.symbol,
                    label,
                    decimals: entry.decimals,
                    icon: entry.icon,
                },
            );
        }
        Ok(Self { tokens })
    }

    pub fn get(&self, addr: Address) -> Option<&TokenMeta> {
        self.tokens.get(&addr)
    }

    /// Symbol for display; unknown addresses fall back to a short hex form.
    pub fn symbol_or_short(&self, addr: Address) -> String {
        self.tokens
            .get(&addr)
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| short_address(addr))
    }

    /// Case-insensitive lookup by symbol.
    pub fn resolve_symbol(&self, symbol: &str) -> Option<Address> {
        self.tokens
            .iter()
            .find(|(_, meta)| meta.symbol.eq_ignore_ascii_case(symbol))
            .map(|(addr, _)| *addr)
    }

    /// All registered token addresses, the universe for path generation.
    pub fn universe(&self) -> Vec<Address> {
        self.tokens.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const SAMPLE: &str = r#"[
        {"address": "0x64BcbDa6d48031FA23B362809B651CD9144cb62d", "symbol": "USDC", "label": "USD Coin", "decimals": 6},
        {"address": "0x5B1fd21df873E66B4Fc83D6FDc62041eC55c07c5", "symbol": "DAI", "decimals": 18, "icon": "https://cryptoicons.org/api/icon/dai/200"}
    ]"#;

    #[test]
    fn loads_entries_and_resolves_symbols() {
        let registry = TokenRegistry::from_json_str(SAMPLE).unwrap();
        assert_eq!(registry.len(), 2);

        let usdc = address!("64BcbDa6d48031FA23B362809B651CD9144cb62d");
        assert_eq!(registry.get(usdc).unwrap().decimals, 6);
        assert_eq!(registry.get(usdc).unwrap().label, "USD Coin");
        assert_eq!(registry.resolve_symbol("dai"), Some(address!("5B1fd21df873E66B4Fc83D6FDc62041eC55c07c5")));
        assert_eq!(registry.resolve_symbol("WETH"), None);
    }

    #[test]
    fn missing_label_falls_back_to_symbol() {
        let registry = TokenRegistry::from_json_str(SAMPLE).unwrap();
        let dai = address!("5B1fd21df873E66B4Fc83D6FDc62041eC55c07c5");
        assert_eq!(registry.get(dai).unwrap().label, "DAI");
    }

    #[test]
    fn unknown_address_renders_short_hex() {
        let registry = TokenRegistry::from_json_str("[]").unwrap();
        let sym = registry.symbol_or_short(address!("4faDa63e1C589fEa33c73f027036d8c01e737c07"));
        assert!(sym.starts_with("0x4fad"));
    }

    #[test]
    fn rejects_bad_addresses() {
        let raw = r#"[{"address": "not-hex", "symbol": "X", "decimals": 18}]"#;
        assert!(TokenRegistry::from_json_str(raw).is_err());
    }
}
