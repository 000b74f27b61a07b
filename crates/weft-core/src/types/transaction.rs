use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, hash_parts, Hash, PublicKey, SecretKey, Sig};
use crate::error::CoreError;
use crate::serialize;

/// Largest `data` field a transaction may carry (128 KiB)
pub const MAX_TX_DATA_SIZE: usize = 128 * 1024;

/// Upper bound on the encoded size of a single transaction
const MAX_TX_ENCODED_SIZE: u64 = MAX_TX_DATA_SIZE as u64 + 1024;

/// A signed transaction as carried inside events.
///
/// Events treat transactions as opaque blobs: this type only owns the
/// sub-codec (`encode`/`decode`) and the hash that payload commitments use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: PublicKey,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    /// `None` creates a contract
    pub to: Option<PublicKey>,
    pub value: u64,
    pub data: Vec<u8>,
    pub signature: Sig,
}

#[derive(Serialize)]
struct TransactionSigningData<'a> {
    sender: &'a PublicKey,
    nonce: u64,
    gas_limit: u64,
    gas_price: u64,
    to: &'a Option<PublicKey>,
    value: u64,
    data: &'a [u8],
}

impl Transaction {
    /// Create a new unsigned transaction
    pub fn new(
        sender: PublicKey,
        nonce: u64,
        gas_limit: u64,
        gas_price: u64,
        to: Option<PublicKey>,
        value: u64,
        data: Vec<u8>,
    ) -> Self {
        Transaction {
            sender,
            nonce,
            gas_limit,
            gas_price,
            to,
            value,
            data,
            signature: Sig::default(),
        }
    }

    pub fn signing_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serialize::to_bytes(&TransactionSigningData {
            sender: &self.sender,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            to: &self.to,
            value: self.value,
            data: &self.data,
        })
    }

    pub fn sign(&mut self, secret_key: &SecretKey) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        self.signature = secret_key.sign(&bytes);
        Ok(())
    }

    pub fn verify_signature(&self) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        self.sender.verify(&bytes, &self.signature)
    }

    /// Encode with the transaction sub-codec.
    ///
    /// Fails for transactions that could never be decoded again, so a
    /// malformed transaction is reported to whoever tries to embed it.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        if self.data.len() > MAX_TX_DATA_SIZE {
            return Err(CoreError::MalformedTransaction(format!(
                "data is {} bytes, limit is {}",
                self.data.len(),
                MAX_TX_DATA_SIZE
            )));
        }
        serialize::to_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() as u64 > MAX_TX_ENCODED_SIZE {
            return Err(CoreError::MalformedTransaction(format!(
                "encoding is {} bytes",
                bytes.len()
            )));
        }
        let tx: Transaction = serialize::from_bytes(bytes, MAX_TX_ENCODED_SIZE)?;
        if tx.data.len() > MAX_TX_DATA_SIZE {
            return Err(CoreError::MalformedTransaction(format!(
                "data is {} bytes, limit is {}",
                tx.data.len(),
                MAX_TX_DATA_SIZE
            )));
        }
        Ok(tx)
    }

    pub fn hash(&self) -> Result<Hash, CoreError> {
        Ok(hash_blake3(&self.encode()?))
    }
}

/// Commitment to an ordered transaction list: `H(count || tx hashes)`.
///
/// The count prefix keeps the hash of an empty list distinct from the zero
/// hash and from any other payload commitment.
pub fn transactions_hash(txs: &[Transaction]) -> Result<Hash, CoreError> {
    let count = (txs.len() as u32).to_be_bytes();
    let hashes = txs
        .iter()
        .map(|tx| tx.hash())
        .collect::<Result<Vec<_>, _>>()?;

    let mut parts: Vec<&[u8]> = Vec::with_capacity(hashes.len() + 1);
    parts.push(&count);
    parts.extend(hashes.iter().map(|h| h.as_bytes().as_slice()));
    Ok(hash_parts(&parts))
}
