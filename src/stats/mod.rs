//! Aggregated wallet and subnet statistics.
//!
//! Everything here is built on the query façade and inherits its degrade
//! policy: a failed sub-query shows up as zero or missing data, never as an
//! error. Only a missing connection is reported.

pub mod overview;
pub mod price;
pub mod registration_cache;
pub mod snapshot;

pub use overview::{get_subnet_overview, SubnetOverview};
pub use price::{HttpPriceFeed, PriceFeedError, PriceSource};
pub use registration_cache::{
    build_global_registration_cache, build_registration_cache, RegistrationCache,
};
pub use snapshot::{
    get_wallet_snapshot, summarize_wallets, KnownPrice, SubnetStakeRow, WalletSnapshot,
};
