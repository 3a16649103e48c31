//! frac-config
//!
//! Layered YAML configuration for purchase flows.
//! - later layers override earlier ones, object by object
//! - the effective config is identified by a SHA-256 over canonical JSON
//! - wallet keys and seed phrases are refused as literal values
//! - leaves nothing reads are reported (or refused, under `Fail`)

mod flow;
mod guard;
mod layers;
mod unused;
mod walk;

pub use flow::{BuyerSettings, ContractSettings, FlowConfig};
pub use layers::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use unused::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport, CONSUMED_POINTERS};
