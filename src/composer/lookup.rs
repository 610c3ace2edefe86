//! Lookup-table resolver
//!
//! Fetches the address lookup tables the swap instructions compress their
//! account references through. Tables mutate on chain, so they are fetched
//! fresh per composition; one batched account fetch covers all keys.
//!
//! Keys with no backing account are silently dropped: the aggregator may
//! list a table that does not apply to this particular instruction subset.
//! The surviving tables keep the requested relative order, which the message
//! compiler depends on for index-based account resolution.

use tracing::{debug, trace};

use solana_sdk::{
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    pubkey::Pubkey,
};

use crate::composer::errors::ComposeError;
use crate::ledger::LedgerRpc;

/// Resolve lookup tables for the given keys, preserving request order.
pub async fn resolve_lookup_tables(
    rpc: &dyn LedgerRpc,
    keys: &[Pubkey],
) -> Result<Vec<AddressLookupTableAccount>, ComposeError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let accounts = rpc
        .multiple_accounts(keys)
        .await
        .map_err(|e| ComposeError::CheckpointUnavailable(format!("lookup table fetch: {e}")))?;

    let mut tables = Vec::with_capacity(keys.len());
    for (key, account) in keys.iter().zip(accounts) {
        match account {
            Some(account) => {
                let table = AddressLookupTable::deserialize(&account.data).map_err(|e| {
                    ComposeError::assembly(format!("lookup table {key} failed to deserialize: {e}"))
                })?;
                tables.push(AddressLookupTableAccount {
                    key: *key,
                    addresses: table.addresses.to_vec(),
                });
            }
            None => {
                trace!(table = %key, "lookup table has no backing account, dropping");
            }
        }
    }

    debug!(requested = keys.len(), resolved = tables.len(), "lookup tables resolved");
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use solana_sdk::account::Account;
    use solana_sdk::address_lookup_table::state::LookupTableMeta;
    use solana_sdk::hash::Hash;

    use crate::ledger::{LedgerError, SignatureRecord};

    struct AccountStore {
        accounts: HashMap<Pubkey, Account>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl LedgerRpc for AccountStore {
        async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
            Ok(Hash::default())
        }

        async fn multiple_accounts(
            &self,
            keys: &[Pubkey],
        ) -> Result<Vec<Option<Account>>, LedgerError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(keys.iter().map(|k| self.accounts.get(k).cloned()).collect())
        }

        async fn signatures_for_reference(
            &self,
            _reference: &Pubkey,
        ) -> Result<Vec<SignatureRecord>, LedgerError> {
            Ok(vec![])
        }
    }

    fn table_account(addresses: Vec<Pubkey>) -> Account {
        let table = AddressLookupTable {
            meta: LookupTableMeta::default(),
            addresses: addresses.into(),
        };
        Account {
            lamports: 1,
            data: table.serialize_for_tests().unwrap(),
            owner: solana_sdk::address_lookup_table::program::id(),
            executable: false,
            rent_epoch: 0,
        }
    }

    #[tokio::test]
    async fn empty_input_skips_the_rpc_entirely() {
        let store = AccountStore {
            accounts: HashMap::new(),
            fetches: AtomicUsize::new(0),
        };
        let tables = resolve_lookup_tables(&store, &[]).await.unwrap();
        assert!(tables.is_empty());
        assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolves_in_one_batched_fetch_preserving_order() {
        let key_a = Pubkey::new_unique();
        let key_b = Pubkey::new_unique();
        let addrs_a = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let addrs_b = vec![Pubkey::new_unique()];

        let mut accounts = HashMap::new();
        accounts.insert(key_a, table_account(addrs_a.clone()));
        accounts.insert(key_b, table_account(addrs_b.clone()));
        let store = AccountStore {
            accounts,
            fetches: AtomicUsize::new(0),
        };

        let tables = resolve_lookup_tables(&store, &[key_a, key_b]).await.unwrap();
        assert_eq!(store.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].key, key_a);
        assert_eq!(tables[0].addresses, addrs_a);
        assert_eq!(tables[1].key, key_b);
        assert_eq!(tables[1].addresses, addrs_b);
    }

    #[tokio::test]
    async fn missing_accounts_are_dropped_silently() {
        let present = Pubkey::new_unique();
        let absent = Pubkey::new_unique();
        let mut accounts = HashMap::new();
        accounts.insert(present, table_account(vec![Pubkey::new_unique()]));
        let store = AccountStore {
            accounts,
            fetches: AtomicUsize::new(0),
        };

        let tables = resolve_lookup_tables(&store, &[absent, present]).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].key, present);
    }

    #[tokio::test]
    async fn garbled_table_data_is_an_assembly_error() {
        let key = Pubkey::new_unique();
        let mut accounts = HashMap::new();
        accounts.insert(
            key,
            Account {
                lamports: 1,
                data: vec![0xFF; 3],
                owner: solana_sdk::address_lookup_table::program::id(),
                executable: false,
                rent_epoch: 0,
            },
        );
        let store = AccountStore {
            accounts,
            fetches: AtomicUsize::new(0),
        };

        let err = resolve_lookup_tables(&store, &[key]).await.unwrap_err();
        assert!(matches!(err, ComposeError::Assembly(_)));
    }

    struct FailingRpc;

    #[async_trait]
    impl LedgerRpc for FailingRpc {
        async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
            Err(LedgerError::Transport("down".into()))
        }
        async fn multiple_accounts(
            &self,
            _keys: &[Pubkey],
        ) -> Result<Vec<Option<Account>>, LedgerError> {
            Err(LedgerError::Transport("down".into()))
        }
        async fn signatures_for_reference(
            &self,
            _reference: &Pubkey,
        ) -> Result<Vec<SignatureRecord>, LedgerError> {
            Err(LedgerError::Transport("down".into()))
        }
    }

    #[tokio::test]
    async fn rpc_failure_maps_to_checkpoint_unavailable() {
        let err = resolve_lookup_tables(&FailingRpc, &[Pubkey::new_unique()])
            .await
            .unwrap_err();
        assert!(matches!(err, ComposeError::CheckpointUnavailable(_)));
    }
}
