use super::degrade;
use crate::chain::ChainConnection;
use crate::errors::ChainConnectionError;

/// Height of the best block, or 0 when it can't be read.
pub async fn get_current_block(conn: &ChainConnection) -> Result<u64, ChainConnectionError> {
    let rpc = conn.rpc()?;
    let head = match rpc.chain_head().await {
        Ok(hash) => hash,
        Err(e) => {
            degrade("chain_getHead", "best block", e);
            return Ok(0);
        }
    };
    match rpc.block_number(head).await {
        Ok(Some(number)) => Ok(number),
        Ok(None) => {
            degrade("chain_getHeader", &format!("{head:?}"), "header not found");
            Ok(0)
        }
        Err(e) => {
            degrade("chain_getHeader", &format!("{head:?}"), e);
            Ok(0)
        }
    }
}
