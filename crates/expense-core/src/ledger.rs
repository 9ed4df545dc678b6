//! The ledger store: owns the in-memory chain and the pending buffer, and keeps
//! both in step with the backing [`ChainStore`].

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    chain::ChainStore,
    constants::{GENESIS_INDEX, GENESIS_PREVIOUS_HASH},
    now_timestamp, verify_chain, Block, IntegrityViolation, LedgerError, Result, Transaction,
};

#[derive(Debug, Default)]
struct LedgerState {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

/// A single-writer, hash-linked expense ledger.
///
/// All mutation goes through one write lock, held across read-tip, seal,
/// append and persist. Readers clone a snapshot under the read lock.
pub struct Ledger<S: ChainStore> {
    store: S,
    state: RwLock<LedgerState>,
}

impl<S: ChainStore> Ledger<S> {
    /// Loads the chain from `store`, or seals and persists a genesis block when
    /// the store is empty.
    pub fn open(store: S) -> Result<Self> {
        let location = store.location();
        let chain = match store.load()? {
            Some(chain) if chain.is_empty() => {
                return Err(LedgerError::corrupt(location, "document holds no blocks"));
            }
            Some(chain) => {
                info!(%location, blocks = chain.len(), "ledger loaded");
                if let Err(violation) = verify_chain(&chain) {
                    warn!(%location, %violation, "loaded chain fails verification");
                }
                chain
            }
            None => {
                let genesis = Block::genesis(now_timestamp())?;
                store.save(std::slice::from_ref(&genesis))?;
                info!(%location, hash = genesis.hash(), "genesis block created");
                vec![genesis]
            }
        };

        Ok(Self {
            store,
            state: RwLock::new(LedgerState {
                chain,
                pending: Vec::new(),
            }),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates `tx` and buffers it for the next commit.
    pub fn stage_transaction(&self, tx: Transaction) -> Result<()> {
        tx.validate()?;
        let mut state = self.state.write();
        debug!(user_id = tx.user_id(), amount = tx.amount(), "transaction staged");
        state.pending.push(tx);
        Ok(())
    }

    /// Seals the pending buffer into a new block and persists the chain.
    ///
    /// Refuses with [`LedgerError::Integrity`] when the loaded chain fails
    /// verification. If persisting fails the block is dropped again and the
    /// pending buffer is left as it was, so memory never runs ahead of the
    /// stored copy.
    pub fn commit(&self) -> Result<Block> {
        let mut state = self.state.write();
        self.commit_locked(&mut state)
    }

    /// Parses, stages and commits one expense as a single step. On any
    /// failure the ledger is left unchanged.
    pub fn append_transaction(
        &self,
        user_id: &str,
        date: &str,
        category: &str,
        amount: f64,
        description: &str,
    ) -> Result<Block> {
        let tx = Transaction::parse(user_id, date, category, amount, description)?;
        let mut state = self.state.write();
        state.pending.push(tx);
        match self.commit_locked(&mut state) {
            Ok(block) => Ok(block),
            Err(err) => {
                state.pending.pop();
                Err(err)
            }
        }
    }

    fn commit_locked(&self, state: &mut LedgerState) -> Result<Block> {
        // Never extend a chain that no longer verifies.
        verify_chain(&state.chain)?;
        let index = state.chain.len() as u64 + GENESIS_INDEX;
        let previous_hash = state
            .chain
            .last()
            .map_or_else(|| GENESIS_PREVIOUS_HASH.to_string(), |tip| tip.hash().to_string());
        let block = Block::seal(index, state.pending.clone(), previous_hash, now_timestamp())?;

        state.chain.push(block.clone());
        if let Err(err) = self.store.save(&state.chain) {
            state.chain.pop();
            warn!(index, error = %err, "commit rolled back");
            return Err(err);
        }
        state.pending.clear();

        info!(
            index,
            hash = block.hash(),
            transactions = block.transactions().len(),
            "block committed"
        );
        Ok(block)
    }

    pub fn all_blocks(&self) -> Vec<Block> {
        self.state.read().chain.clone()
    }

    /// Every transaction in chain order, then in-block order.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.state
            .read()
            .chain
            .iter()
            .flat_map(|b| b.transactions().iter().cloned())
            .collect()
    }

    pub fn list_blocks(&self) -> Vec<Block> {
        self.all_blocks()
    }

    pub fn list_transactions(&self) -> Vec<Transaction> {
        self.all_transactions()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.state.read().pending.clone()
    }

    pub fn tip(&self) -> Option<Block> {
        self.state.read().chain.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().chain.is_empty()
    }

    pub fn verify(&self) -> std::result::Result<(), IntegrityViolation> {
        let state = self.state.read();
        verify_chain(&state.chain)
    }
}
