use anyhow::{bail, Result};
use frac_config::{BuyerSettings, ContractSettings, FlowConfig};
use frac_gateway::{ChainGateway, ContractRef};
use frac_runtime::{PurchaseError, PurchaseFlow};
use frac_testkit::FakeChain;
use serde_json::json;
use tracing::info;

pub struct SimulateArgs<'a> {
    pub config_paths: &'a [&'a str],
    pub ledger_path: &'a str,
    pub balance_wei: u128,
    pub shares: i64,
    pub revert: Option<String>,
    pub suppress_transfer: bool,
}

/// Drive one purchase against a `FakeChain` seeded from the ledger file.
///
/// Prints the report (or the failure) as JSON. Any outcome other than
/// `Synced` exits non-zero.
pub async fn run(args: SimulateArgs<'_>) -> Result<()> {
    let loaded = super::load_config(args.config_paths, false)?;
    let contract = ContractSettings::from_config_json(&loaded.config_json)?;
    let buyer = BuyerSettings::from_config_json(&loaded.config_json)?;
    let flow_cfg = FlowConfig::from_config_json(&loaded.config_json)?;

    let raw = super::load_raw_ledger(args.ledger_path)?;
    let chain = FakeChain::new(raw, buyer.address.as_str(), args.balance_wei);
    if let Some(reason) = args.revert {
        chain.revert_next(reason);
    }
    chain.suppress_ownership_transfer(args.suppress_transfer);
    chain.connect().await?;

    info!(
        config_hash = %loaded.config_hash,
        gateway = chain.name(),
        "simulate/start"
    );

    let contract = ContractRef::new(
        contract.address.as_str(),
        contract.collection.as_str(),
        contract.token_id,
    );
    let mut flow = PurchaseFlow::new(&chain, contract, buyer.address.as_str(), flow_cfg);

    match flow.purchase(args.shares).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            let report = match &e {
                PurchaseError::OwnershipTransferUnconfirmed { report } => {
                    Some(serde_json::to_value(report.as_ref())?)
                }
                _ => None,
            };
            let out = json!({
                "code": e.code(),
                "final_state": format!("{:?}", e.final_state()),
                "purchase_confirmed": e.purchase_confirmed(),
                "error": e.to_string(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            bail!("{}", e);
        }
    }
}
