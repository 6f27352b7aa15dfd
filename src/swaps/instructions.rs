/// Instruction assembly: decode route-service instructions and resolve
/// address lookup tables
///
/// The route service serializes instructions as program address, account
/// roles, and a base64 payload. Each field decodes independently with an
/// explicit failure; a malformed instruction is fatal for the request and
/// never retried.
use crate::errors::SwapError;
use crate::logger::{self, LogTag};
use crate::rpc::RpcHandle;
use crate::swaps::types::{InstructionSet, RawInstruction, SwapInstructionsResponse};
use base64::{engine::general_purpose, Engine as _};
use solana_sdk::address_lookup_table::state::AddressLookupTable;
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Decode one serialized instruction into its chain-native form
pub fn decode_instruction(raw: &RawInstruction) -> Result<Instruction, SwapError> {
    let program_id = Pubkey::from_str(&raw.program_id).map_err(|e| {
        SwapError::InstructionDecode(format!("invalid program id {}: {}", raw.program_id, e))
    })?;

    let mut accounts = Vec::with_capacity(raw.accounts.len());
    for account in &raw.accounts {
        let pubkey = Pubkey::from_str(&account.pubkey).map_err(|e| {
            SwapError::InstructionDecode(format!("invalid account pubkey {}: {}", account.pubkey, e))
        })?;
        accounts.push(AccountMeta {
            pubkey,
            is_signer: account.is_signer,
            is_writable: account.is_writable,
        });
    }

    let data = general_purpose::STANDARD
        .decode(&raw.data)
        .map_err(|e| SwapError::InstructionDecode(format!("undecodable payload: {}", e)))?;

    Ok(Instruction {
        program_id,
        accounts,
        data,
    })
}

/// Decode the full instruction response, preserving execution order
pub fn decode_instruction_set(
    response: SwapInstructionsResponse,
) -> Result<InstructionSet, SwapError> {
    let swap_raw = response.swap_instruction.ok_or_else(|| {
        SwapError::InstructionDecode("response carries no swap instruction".to_string())
    })?;

    let compute_budget = response
        .compute_budget_instructions
        .iter()
        .map(decode_instruction)
        .collect::<Result<Vec<_>, _>>()?;
    let setup = response
        .setup_instructions
        .iter()
        .map(decode_instruction)
        .collect::<Result<Vec<_>, _>>()?;
    let swap = decode_instruction(&swap_raw)?;
    let cleanup = response
        .cleanup_instruction
        .as_ref()
        .map(decode_instruction)
        .transpose()?;

    Ok(InstructionSet {
        compute_budget,
        setup,
        swap,
        cleanup,
        lookup_table_addresses: response.address_lookup_table_addresses,
    })
}

/// Resolve lookup table addresses to live on-chain table state
///
/// Tables can be extended or deactivated between requests, so resolution
/// happens synchronously in the request that uses them and is never
/// cached. Addresses whose account no longer exists are skipped.
pub async fn resolve_lookup_tables(
    rpc: &RpcHandle,
    addresses: &[String],
) -> Result<Vec<AddressLookupTableAccount>, SwapError> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    let keys = addresses
        .iter()
        .map(|addr| {
            Pubkey::from_str(addr).map_err(|e| {
                SwapError::TransactionComposition(format!(
                    "invalid lookup table address {}: {}",
                    addr, e
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let accounts = rpc
        .get_multiple_accounts(&keys)
        .await
        .map_err(|e| SwapError::TransactionComposition(e.to_string()))?;

    let mut tables = Vec::with_capacity(keys.len());
    for (key, account) in keys.iter().zip(accounts) {
        match account {
            Some(account) => {
                let table = AddressLookupTable::deserialize(&account.data).map_err(|e| {
                    SwapError::TransactionComposition(format!(
                        "cannot deserialize lookup table {}: {}",
                        key, e
                    ))
                })?;
                tables.push(AddressLookupTableAccount {
                    key: *key,
                    addresses: table.addresses.to_vec(),
                });
            }
            None => {
                logger::warning(
                    LogTag::Transaction,
                    &format!("lookup table {} not found on-chain, skipping", key),
                );
            }
        }
    }

    logger::debug(
        LogTag::Transaction,
        &format!("resolved {} lookup tables", tables.len()),
    );
    Ok(tables)
}
