use std::path::Path;

use anyhow::{Context, Result};
use controller::{BorrowPolicy, NetworkConfig, NetworkRecord, ERROR_UNKNOWN_NETWORK};

/// Network table and borrow policy read from the interactor's toml file.
#[derive(Debug)]
pub struct Config {
    inner: NetworkConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let inner: NetworkConfig = toml::from_str(content)?;
        inner.policy.validate()?;
        Ok(Config { inner })
    }

    pub fn network(&self, name: &str) -> Result<&NetworkRecord> {
        self.inner
            .network(name)
            .with_context(|| format!("{ERROR_UNKNOWN_NETWORK} ({name})"))
    }

    pub fn policy(&self) -> &BorrowPolicy {
        &self.inner.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = include_str!("../config.toml");

    #[test]
    fn bundled_config_parses() {
        let config = Config::parse(CONFIG).unwrap();
        let fork = config.network("mainnet-fork").unwrap();

        assert!(fork.wrap_native);
        assert_eq!(fork.debt_decimals, 18);
        assert_eq!(config.policy().safety_factor.to_string(), "0.95");
        assert_eq!(config.policy().interest_rate_mode, 1);
    }

    #[test]
    fn unknown_network_is_reported_by_name() {
        let config = Config::parse(CONFIG).unwrap();
        let err = config.network("sepolia").unwrap_err();

        assert!(err.to_string().contains("sepolia"));
    }

    #[test]
    fn safety_factor_outside_unit_interval_is_rejected() {
        for raw in ["1", "1.5", "0"] {
            let content = CONFIG.replace(
                "safety_factor = \"0.95\"",
                &format!("safety_factor = \"{raw}\""),
            );
            assert!(Config::parse(&content).is_err(), "safety factor {raw}");
        }
    }

    #[test]
    fn policy_falls_back_to_defaults() {
        let config = Config::parse(
            r#"
            [networks.local]
            rpc_url = "http://127.0.0.1:8545"
            collateral_token = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
            debt_token = "0x6B175474E89094C44Da98b954EedeAC495271d0F"
            price_feed = "0x773616E4d11A78F511299002da57A0a94577F1f4"
            pool_addresses_provider = "0xB53C1a33016B2DC2fF3653530bfF1848a515c8c5"
            "#,
        )
        .unwrap();

        assert_eq!(config.policy(), &BorrowPolicy::default());
        let local = config.network("local").unwrap();
        assert!(!local.wrap_native);
        assert_eq!(local.native_decimals, 18);
    }
}
