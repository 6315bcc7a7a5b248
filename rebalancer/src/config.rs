//! TOML configuration loading and validation.
//!
//! Three files: the policy (plus the CLI-only `[logging]` and `[checks]`
//! sections), the accounts snapshot, and the asset universe with its base
//! target weights. All three are parsed once and validated eagerly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use sleevebook::init::INIT_TARGET_TOLERANCE;
use sleevebook::policy::{AllocationPolicy, GrowthPolicy, RebalancePolicy, RiskPolicy, TaxPolicy};
use sleevebook::{
    Account, AssetBook, AssetMeta, AssetType, Policy, Portfolio, Sleeve, TargetWeights,
    TaxEfficiency, Ticker, check_target_sum,
};

use crate::error::{Error, Result};

pub const DEFAULT_POLICY_PATH: &str = "config/policy.toml";
pub const DEFAULT_ACCOUNTS_PATH: &str = "config/accounts.toml";
pub const DEFAULT_UNIVERSE_PATH: &str = "config/universe.toml";

/// Where the three configuration files live.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub policy: PathBuf,
    pub accounts: PathBuf,
    pub universe: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            policy: DEFAULT_POLICY_PATH.into(),
            accounts: DEFAULT_ACCOUNTS_PATH.into(),
            universe: DEFAULT_UNIVERSE_PATH.into(),
        }
    }
}

/// Fully loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub policy: Policy,
    pub logging: LoggingConfig,
    pub checks: ChecksConfig,
    pub accounts: Vec<Account>,
    pub universe: Universe,
}

/// On-disk shape of the policy file.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    sleeves: AllocationPolicy,
    stabilizer: RiskPolicy,
    growth: GrowthPolicy,
    rebalance: RebalancePolicy,
    taxable: TaxPolicy,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    checks: ChecksConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

/// Thresholds for the post-plan sanity checks.
#[derive(Debug, Clone, Deserialize)]
pub struct ChecksConfig {
    #[serde(default = "default_max_trade")]
    pub max_trade_usd: f64,
    #[serde(default)]
    pub min_trade_usd: f64,
}

fn default_max_trade() -> f64 {
    100_000.0
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            max_trade_usd: default_max_trade(),
            min_trade_usd: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<Account>,
}

/// One `[assets.<TICKER>]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AssetEntry {
    #[serde(default = "default_asset_type")]
    pub asset_type: AssetType,
    #[serde(default = "default_sleeve")]
    pub sleeve: Sleeve,
    #[serde(default = "default_tax_efficiency")]
    pub tax_efficiency: TaxEfficiency,
    #[serde(default)]
    pub stabilizer: bool,
    #[serde(default)]
    pub leveraged: bool,
}

fn default_asset_type() -> AssetType {
    AssetType::Etf
}
fn default_sleeve() -> Sleeve {
    Sleeve::Core
}
fn default_tax_efficiency() -> TaxEfficiency {
    TaxEfficiency::High
}

impl AssetEntry {
    pub fn to_meta(self, ticker: Ticker) -> AssetMeta {
        AssetMeta {
            ticker,
            asset_type: self.asset_type,
            sleeve: self.sleeve,
            tax_efficiency: self.tax_efficiency,
            stabilizer: self.stabilizer,
            leveraged: self.leveraged,
        }
    }
}

impl From<&AssetMeta> for AssetEntry {
    fn from(meta: &AssetMeta) -> Self {
        Self {
            asset_type: meta.asset_type,
            sleeve: meta.sleeve,
            tax_efficiency: meta.tax_efficiency,
            stabilizer: meta.stabilizer,
            leveraged: meta.leveraged,
        }
    }
}

/// Asset universe: per-ticker metadata plus base target weights.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub assets: BTreeMap<Ticker, AssetEntry>,
    #[serde(default)]
    pub targets: TargetWeights,
}

impl Universe {
    pub fn asset_book(&self) -> AssetBook {
        self.assets
            .iter()
            .map(|(&ticker, entry)| (ticker, entry.to_meta(ticker)))
            .collect()
    }
}

impl Config {
    /// Load and validate all three files.
    pub fn load(paths: &ConfigPaths) -> Result<Self> {
        let policy = read(&paths.policy)?;
        let accounts = read(&paths.accounts)?;
        let universe = read(&paths.universe)?;
        Self::from_toml(&policy, &accounts, &universe)
    }

    /// Parse and validate from TOML strings.
    pub fn from_toml(policy: &str, accounts: &str, universe: &str) -> Result<Self> {
        let policy_file: PolicyFile = toml::from_str(policy).map_err(|source| Error::ConfigParse {
            file: "policy",
            source,
        })?;
        let accounts_file: AccountsFile =
            toml::from_str(accounts).map_err(|source| Error::ConfigParse {
                file: "accounts",
                source,
            })?;
        let universe: Universe = toml::from_str(universe).map_err(|source| Error::ConfigParse {
            file: "universe",
            source,
        })?;

        let config = Config {
            policy: Policy {
                sleeves: policy_file.sleeves,
                stabilizer: policy_file.stabilizer,
                growth: policy_file.growth,
                rebalance: policy_file.rebalance,
                taxable: policy_file.taxable,
            },
            logging: policy_file.logging,
            checks: policy_file.checks,
            accounts: accounts_file.accounts,
            universe,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        self.policy.validate()?;

        if !(self.checks.max_trade_usd > 0.0) {
            return Err(Error::Config("checks.max_trade_usd must be > 0".into()));
        }
        if !(self.checks.min_trade_usd >= 0.0) {
            return Err(Error::Config("checks.min_trade_usd must be >= 0".into()));
        }

        if self.accounts.is_empty() {
            return Err(Error::Config("at least one account is required".into()));
        }
        let mut seen = FxHashSet::default();
        for account in &self.accounts {
            if account.id.is_empty() {
                return Err(Error::Config("account id must not be empty".into()));
            }
            if !seen.insert(account.id.as_str()) {
                return Err(Error::Config(format!("duplicate account id: {}", account.id)));
            }
            if !(account.cash >= 0.0) {
                return Err(Error::Config(format!(
                    "account {}: cash must be >= 0, got {}",
                    account.id, account.cash
                )));
            }
            if let Some((ticker, value)) = account.holdings.iter().find(|(_, v)| !(**v >= 0.0)) {
                return Err(Error::Config(format!(
                    "account {}: holding {ticker} must be >= 0, got {value}",
                    account.id
                )));
            }
        }

        if let Some((ticker, w)) = self
            .universe
            .targets
            .iter()
            .find(|(_, w)| !(0.0..=1.0).contains(*w))
        {
            return Err(Error::Config(format!(
                "target weight for {ticker} must be in [0.0, 1.0], got {w}"
            )));
        }
        check_target_sum(&self.universe.targets, INIT_TARGET_TOLERANCE)?;
        Ok(())
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }

    /// Metadata from the universe file.
    pub fn asset_book(&self) -> AssetBook {
        self.universe.asset_book()
    }

    /// Base target weights from the universe file.
    pub fn base_targets(&self) -> &TargetWeights {
        &self.universe.targets
    }

    /// The configured accounts with their cash and holdings cleared.
    pub fn empty_accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|a| Account::new(a.id.clone(), a.kind))
            .collect()
    }

    /// Current account snapshot managed against `targets`.
    pub fn portfolio(&self, asset_meta: AssetBook, targets: TargetWeights) -> Portfolio {
        Portfolio::new(self.accounts.clone(), asset_meta, targets)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sleevebook::AccountKind;

    pub(crate) fn policy_toml() -> &'static str {
        r#"
[sleeves]
core_min = 0.65
growth_max = 0.30

[stabilizer]
min_pct_total = 0.15
stabilizer_tickers = ["BND"]

[growth]
max_single_stock_weight = 0.10
prohibit_leveraged = true

[rebalance]
drift_absolute = 0.05
drift_relative = 0.20

[taxable]
buy_first_sell_last = true
avoid_short_term_days = 365
"#
    }

    pub(crate) fn accounts_toml() -> &'static str {
        r#"
[[accounts]]
id = "401k"
type = "tax_advantaged"
cash = 0.0
holdings = { VTI = 60000.0, BND = 10000.0 }

[[accounts]]
id = "brokerage"
type = "taxable"
cash = 5000.0
holdings = { VTI = 10000.0, QQQ = 15000.0 }
"#
    }

    pub(crate) fn universe_toml() -> &'static str {
        r#"
[assets.VTI]
tax_efficiency = "high"

[assets.BND]
tax_efficiency = "low"
stabilizer = true

[assets.QQQ]
sleeve = "growth"

[assets.TQQQ]
sleeve = "growth"
leveraged = true

[targets]
VTI = 0.60
BND = 0.20
QQQ = 0.20
"#
    }

    fn load() -> Result<Config> {
        Config::from_toml(policy_toml(), accounts_toml(), universe_toml())
    }

    #[test]
    fn parse_example_config() {
        let config = load().unwrap();
        assert_eq!(config.policy.sleeves.growth_max, 0.30);
        assert_eq!(config.policy.rebalance.max_trades, 50);
        assert_eq!(
            config.policy.growth.exclusive_groups,
            vec![vec![Ticker::new("QQQ"), Ticker::new("SPYG")]]
        );
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.accounts[0].kind, AccountKind::TaxAdvantaged);
        assert_eq!(config.accounts[1].cash, 5000.0);
        assert_eq!(config.accounts[0].holding(&Ticker::new("VTI")), 60000.0);
        assert_eq!(config.checks.max_trade_usd, 100_000.0);
        assert_eq!(config.audit_path(), PathBuf::from("./logs/audit.jsonl"));
    }

    #[test]
    fn asset_defaults() {
        let config = load().unwrap();
        let book = config.asset_book();
        let vti = book[&Ticker::new("VTI")];
        assert_eq!(vti.asset_type, AssetType::Etf);
        assert_eq!(vti.sleeve, Sleeve::Core);
        assert!(!vti.stabilizer && !vti.leveraged);
        assert!(book[&Ticker::new("BND")].stabilizer);
        assert!(book[&Ticker::new("TQQQ")].leveraged);
        assert_eq!(book[&Ticker::new("QQQ")].tax_efficiency, TaxEfficiency::High);
    }

    #[test]
    fn missing_required_key_fails_at_load() {
        let policy = policy_toml().replace("core_min = 0.65\n", "");
        let err = Config::from_toml(&policy, accounts_toml(), universe_toml()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { file: "policy", .. }));
    }

    #[test]
    fn invalid_policy_value() {
        let policy = policy_toml().replace("growth_max = 0.30", "growth_max = 1.5");
        let err = Config::from_toml(&policy, accounts_toml(), universe_toml()).unwrap_err();
        assert!(matches!(err, Error::Plan(_)));
    }

    #[test]
    fn duplicate_account_rejected() {
        let accounts = accounts_toml().replace("id = \"brokerage\"", "id = \"401k\"");
        let err = Config::from_toml(policy_toml(), &accounts, universe_toml()).unwrap_err();
        assert!(err.to_string().contains("duplicate account id"));
    }

    #[test]
    fn negative_values_rejected() {
        let accounts = accounts_toml().replace("cash = 5000.0", "cash = -1.0");
        assert!(Config::from_toml(policy_toml(), &accounts, universe_toml()).is_err());
        let accounts = accounts_toml().replace("QQQ = 15000.0", "QQQ = -15000.0");
        assert!(Config::from_toml(policy_toml(), &accounts, universe_toml()).is_err());
    }

    #[test]
    fn unknown_account_type_rejected() {
        let accounts = accounts_toml().replace("\"taxable\"", "\"roth\"");
        assert!(matches!(
            Config::from_toml(policy_toml(), &accounts, universe_toml()),
            Err(Error::ConfigParse { file: "accounts", .. })
        ));
    }

    #[test]
    fn base_targets_must_sum_to_one() {
        let universe = universe_toml().replace("QQQ = 0.20", "QQQ = 0.10");
        assert!(matches!(
            Config::from_toml(policy_toml(), accounts_toml(), &universe),
            Err(Error::Plan(sleevebook::PlanError::TargetSum { .. }))
        ));
    }

    #[test]
    fn empty_accounts_keep_ids_and_kinds() {
        let config = load().unwrap();
        let empty = config.empty_accounts();
        assert_eq!(empty[0].id, "401k");
        assert_eq!(empty[1].kind, AccountKind::Taxable);
        assert!(empty.iter().all(|a| a.total_value() == 0.0));
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths {
            policy: dir.path().join("policy.toml"),
            accounts: dir.path().join("accounts.toml"),
            universe: dir.path().join("universe.toml"),
        };
        std::fs::write(&paths.policy, policy_toml()).unwrap();
        std::fs::write(&paths.accounts, accounts_toml()).unwrap();
        std::fs::write(&paths.universe, universe_toml()).unwrap();
        let config = Config::load(&paths).unwrap();
        assert_eq!(config.base_targets().len(), 3);

        std::fs::remove_file(&paths.universe).unwrap();
        assert!(matches!(Config::load(&paths), Err(Error::ConfigRead { .. })));
    }
}
