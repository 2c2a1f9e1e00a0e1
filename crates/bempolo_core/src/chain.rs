//! crates/bempolo_core/src/chain.rs
//!
//! Fixed on-chain parameters for USDT payments on Polygon, the ERC-20 transfer
//! payload encoder and the simulator's transaction-hash generator.

use rand::Rng;

use crate::ports::{ChainDefinition, NativeCurrency, TransactionRequest};

/// Polygon Mainnet, chain id 137.
pub const POLYGON_CHAIN_ID: &str = "0x89";
/// USDT contract on Polygon.
pub const USDT_CONTRACT: &str = "0xc2132D05D31c914a87C6611C10748AEb04B58e8F";
/// Shop wallet receiving payments.
pub const RECIPIENT_WALLET: &str = "0xB0aD6c79E8e232FE64b9C8fF77B5D00e2F76E1C3";
/// `transfer(address,uint256)`
pub const TRANSFER_SELECTOR: &str = "a9059cbb";
pub const GAS_LIMIT: u64 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Definition registered with the wallet when it does not know Polygon yet.
pub fn polygon_chain_definition() -> ChainDefinition {
    ChainDefinition {
        chain_id: POLYGON_CHAIN_ID.to_string(),
        chain_name: "Polygon Mainnet".to_string(),
        native_currency: NativeCurrency {
            name: "MATIC".to_string(),
            symbol: "MATIC".to_string(),
            decimals: 18,
        },
        rpc_urls: vec!["https://polygon-rpc.com/".to_string()],
        block_explorer_urls: vec!["https://polygonscan.com/".to_string()],
    }
}

fn strip_address(address: &str) -> Result<&str, EncodingError> {
    let body = address
        .strip_prefix("0x")
        .ok_or_else(|| EncodingError::InvalidAddress(address.to_string()))?;
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EncodingError::InvalidAddress(address.to_string()));
    }
    Ok(body)
}

/// Encodes `transfer(recipient, amount)` call data:
/// selector, recipient left-padded to 32 bytes, amount left-padded to 32 bytes.
pub fn encode_transfer(recipient: &str, amount: u128) -> Result<String, EncodingError> {
    let recipient = strip_address(recipient)?.to_ascii_lowercase();
    Ok(format!("0x{TRANSFER_SELECTOR}{recipient:0>64}{amount:064x}"))
}

/// Hex quantity for a gas limit, e.g. `0x186a0`.
pub fn gas_quantity(limit: u64) -> String {
    format!("{limit:#x}")
}

/// Builds the `eth_sendTransaction` request for a USDT transfer to the shop.
pub fn usdt_transfer(from: &str, amount: u128) -> Result<TransactionRequest, EncodingError> {
    Ok(TransactionRequest {
        from: from.to_string(),
        to: USDT_CONTRACT.to_string(),
        data: encode_transfer(RECIPIENT_WALLET, amount)?,
        gas: gas_quantity(GAS_LIMIT),
    })
}

/// A pseudorandom `0x`-prefixed 64-digit lowercase hex string.
/// Not cryptographically secure; only used by the simulator.
pub fn generate_transaction_hash() -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..64)
        .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect();
    format!("0x{digits}")
}
