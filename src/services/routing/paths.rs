// SPDX-License-Identifier: MIT

use crate::domain::constants::MAX_PATH_TOKENS;
use crate::domain::error::AppError;
use alloy::primitives::Address;

/// Ordered token sequence describing a multi-hop swap route. First token is
/// the input, last is the output; a token never repeats within a path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path(Vec<Address>);

impl Path {
    pub fn new(tokens: Vec<Address>) -> Result<Self, AppError> {
        if tokens.len() < 2 {
            return Err(AppError::Validation {
                field: "path".into(),
                message: "a path needs at least two tokens".into(),
            });
        }
        for (i, token) in tokens.iter().enumerate() {
            if tokens[i + 1..].contains(token) {
                return Err(AppError::Validation {
                    field: "path".into(),
                    message: format!("token {token:#x} repeats within the path"),
                });
            }
        }
        Ok(Self(tokens))
    }

    pub fn tokens(&self) -> &[Address] {
        &self.0
    }

    pub fn input(&self) -> Address {
        self.0[0]
    }

    pub fn output(&self) -> Address {
        self.0[self.0.len() - 1]
    }

    /// Number of pool hops, one less than the token count.
    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }

    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|a| format!("{a:#x}"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Enumerate candidate routes between two tokens: the direct pair plus one
/// three-token route through every other universe member. Pure; result order
/// carries no meaning, the planner's selection is order-independent.
pub fn generate_paths(from: Address, to: Address, universe: &[Address]) -> Vec<Path> {
    let mut candidates = Vec::new();
    if let Ok(direct) = Path::new(vec![from, to]) {
        candidates.push(direct);
    }
    for intermediate in universe {
        if *intermediate == from || *intermediate == to {
            continue;
        }
        if let Ok(path) = Path::new(vec![from, *intermediate, to]) {
            candidates.push(path);
        }
    }
    debug_assert!(candidates.iter().all(|p| p.tokens().len() <= MAX_PATH_TOKENS));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn rejects_short_and_cyclic_paths() {
        assert!(Path::new(vec![addr(1)]).is_err());
        assert!(Path::new(vec![addr(1), addr(2), addr(1)]).is_err());
        assert!(Path::new(vec![addr(1), addr(2), addr(3)]).is_ok());
    }

    #[test]
    fn direct_and_intermediate_candidates() {
        let universe: Vec<Address> = (1..=5).map(addr).collect();
        let paths = generate_paths(addr(1), addr(2), &universe);

        // 1 direct + (N - 2) three-token routes.
        assert_eq!(paths.len(), 1 + (universe.len() - 2));
        for path in &paths {
            assert_eq!(path.input(), addr(1));
            assert_eq!(path.output(), addr(2));
            let mut seen = path.tokens().to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), path.tokens().len());
        }
        assert!(paths.iter().any(|p| p.hops() == 1));
        assert_eq!(paths.iter().filter(|p| p.hops() == 2).count(), 3);
    }

    #[test]
    fn candidate_count_formula_holds_across_universe_sizes() {
        for n in 2usize..=8 {
            let universe: Vec<Address> = (1..=n as u8).map(addr).collect();
            let paths = generate_paths(addr(1), addr(2), &universe);
            assert_eq!(paths.len(), 1 + n.saturating_sub(2));
        }
    }

    #[test]
    fn endpoints_outside_universe_still_get_all_intermediates() {
        let universe: Vec<Address> = (1..=3).map(addr).collect();
        let paths = generate_paths(addr(10), addr(11), &universe);
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn identical_endpoints_yield_no_candidates() {
        let universe: Vec<Address> = (1..=4).map(addr).collect();
        let paths = generate_paths(addr(1), addr(1), &universe);
        assert!(paths.is_empty());
    }
}
