//! Terminal helpers shared by the commands.

use crate::chain::{signer_from_seed, ChainConnection, ExtrinsicOutcome, PairSigner};
use crate::config::Config;
use crate::core::constants::RAOPERTAO;
use crate::utils::balance_newtypes::Rao;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use console::{style, Term};

/// Environment variable holding the coldkey secret URI for signing.
pub const COLDKEY_URI_ENV: &str = "BTM_COLDKEY_URI";

/// Print success message in green.
pub fn print_success(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✓").green().bold(), message));
}

/// Print error message in red.
pub fn print_error(message: &str) {
    let term = Term::stderr();
    let _ = term.write_line(&format!("{} {}", style("✗").red().bold(), message));
}

/// Print info message in blue.
pub fn print_info(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("ℹ").blue().bold(), message));
}

pub fn print_warning(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("⚠").yellow().bold(), message));
}

/// Format a RAO amount as TAO with all nine decimals.
pub fn format_tao(rao: Rao) -> String {
    let rao = rao.as_u128();
    format!("{}.{:09} τ", rao / RAOPERTAO, rao % RAOPERTAO)
}

pub fn format_usd(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "-".to_string(),
    }
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a table with bold headers.
pub fn create_table_with_headers(headers: &[&str]) -> Table {
    let mut table = create_table();
    table.set_header(headers.iter().map(|h| style(*h).bold().to_string()));
    table
}

/// Open the chain session described by `config`.
pub async fn connect(config: &Config) -> anyhow::Result<ChainConnection> {
    let endpoint = config.chain_endpoint();
    print_info(&format!(
        "Connecting to {} ({})",
        endpoint,
        config.network_name()
    ));
    let mut conn = ChainConnection::with_retry(config.retry.clone());
    conn.connect(&endpoint, &config.fallback_endpoints).await?;
    Ok(conn)
}

/// Coldkey signer from [`COLDKEY_URI_ENV`].
pub fn signer_from_env() -> anyhow::Result<PairSigner> {
    let uri = std::env::var(COLDKEY_URI_ENV)
        .map_err(|_| anyhow::anyhow!("{COLDKEY_URI_ENV} is not set"))?;
    Ok(signer_from_seed(&uri)?)
}

/// Print the verdict of a mutating command and turn a failure into an error.
pub fn report_outcome(outcome: &ExtrinsicOutcome, pallet: &str, call: &str) -> anyhow::Result<()> {
    match outcome.check(pallet, call) {
        Ok(()) => {
            let hash = outcome
                .receipt
                .as_ref()
                .map(|r| r.extrinsic_hash.as_str())
                .unwrap_or("-");
            print_success(&format!("{call} succeeded (extrinsic {hash})"));
            Ok(())
        }
        Err(failure) => {
            print_error(&failure.message);
            Err(failure.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tao() {
        assert_eq!(format_tao(Rao(0)), "0.000000000 τ");
        assert_eq!(format_tao(Rao(1_500_000_000)), "1.500000000 τ");
        assert_eq!(format_tao(Rao(123_456_789_012)), "123.456789012 τ");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Some(1234.5)), "$1234.50");
        assert_eq!(format_usd(None), "-");
    }

    #[test]
    fn test_report_outcome() {
        let failed = ExtrinsicOutcome::precondition_failed("Insufficient balance");
        let err = report_outcome(&failed, "Balances", "transfer_keep_alive").unwrap_err();
        assert!(err.to_string().contains("Insufficient balance"));
    }
}
