//! The five block variants of the block-lattice.
//!
//! Every account chain is a sequence of blocks. Legacy chains use the four
//! single-purpose variants (open, send, receive, change); the unified state
//! variant carries the full account state and subsumes all of them plus the
//! epoch upgrade marker. Blocks are immutable once admitted.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::amount::Amount;
use crate::error::TypeError;
use crate::hash::{BlockHash, Root};
use crate::keys::Signature;

type Blake2b256 = Blake2b<U32>;

/// State blocks prepend this preamble before their hashable fields so their
/// hashes can never collide with a legacy variant's.
const STATE_PREAMBLE: [u8; 32] = {
    let mut p = [0u8; 32];
    p[31] = BlockType::State as u8;
    p
};

/// On-disk and on-wire block type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn from_u8(value: u8) -> Result<Self, TypeError> {
        match value {
            2 => Ok(Self::Send),
            3 => Ok(Self::Receive),
            4 => Ok(Self::Open),
            5 => Ok(Self::Change),
            6 => Ok(Self::State),
            other => Err(TypeError::UnknownBlockType(other)),
        }
    }

    /// Serialized payload size (after the 1-byte tag), in bytes.
    pub fn payload_size(&self) -> usize {
        match self {
            Self::Send => 152,
            Self::Receive => 136,
            Self::Open => 168,
            Self::Change => 136,
            Self::State => 216,
        }
    }
}

/// First block of an account — receives a send and names a representative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBlock {
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
    pub signature: Signature,
    pub work: u64,
}

/// Debits the account and creates a pending entry for the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendBlock {
    pub previous: BlockHash,
    pub destination: Account,
    /// The account balance *after* this send.
    pub balance: Amount,
    pub signature: Signature,
    pub work: u64,
}

/// Credits the account from a referenced send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveBlock {
    pub previous: BlockHash,
    pub source: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

/// Changes the account's voting delegate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBlock {
    pub previous: BlockHash,
    pub representative: Account,
    pub signature: Signature,
    pub work: u64,
}

/// Unified form: sign of (balance − prev.balance) plus the link value
/// determines the sub-kind (send / receive / change / epoch).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    /// The account balance *after* this block.
    pub balance: Amount,
    /// Send: destination account. Receive: source send hash. Change: zero.
    /// Epoch: the network's epoch link constant.
    pub link: BlockHash,
    pub signature: Signature,
    pub work: u64,
}

/// A block in an account's chain — tagged sum over the five variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Open(OpenBlock),
    Send(SendBlock),
    Receive(ReceiveBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Open(_) => BlockType::Open,
            Self::Send(_) => BlockType::Send,
            Self::Receive(_) => BlockType::Receive,
            Self::Change(_) => BlockType::Change,
            Self::State(_) => BlockType::State,
        }
    }

    /// Compute the Blake2b-256 hash over the hashable fields.
    ///
    /// Signature and work are excluded — they authenticate and shield the
    /// hash, they are not part of it.
    pub fn hash(&self) -> BlockHash {
        let mut hasher = Blake2b256::new();
        match self {
            Self::Open(b) => {
                hasher.update(b.source.as_bytes());
                hasher.update(b.representative.as_bytes());
                hasher.update(b.account.as_bytes());
            }
            Self::Send(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.destination.as_bytes());
                hasher.update(b.balance.to_be_bytes());
            }
            Self::Receive(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.source.as_bytes());
            }
            Self::Change(b) => {
                hasher.update(b.previous.as_bytes());
                hasher.update(b.representative.as_bytes());
            }
            Self::State(b) => {
                hasher.update(STATE_PREAMBLE);
                hasher.update(b.account.as_bytes());
                hasher.update(b.previous.as_bytes());
                hasher.update(b.representative.as_bytes());
                hasher.update(b.balance.to_be_bytes());
                hasher.update(b.link.as_bytes());
            }
        }
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        BlockHash::new(out)
    }

    /// The chain slot this block occupies: `previous` if nonzero, else the
    /// account (open blocks and zero-previous state blocks).
    pub fn root(&self) -> Root {
        match self {
            Self::Open(b) => b.account.into(),
            Self::Send(b) => b.previous.into(),
            Self::Receive(b) => b.previous.into(),
            Self::Change(b) => b.previous.into(),
            Self::State(b) => {
                if b.previous.is_zero() {
                    b.account.into()
                } else {
                    b.previous.into()
                }
            }
        }
    }

    /// The value the proof-of-work nonce covers — same as the root.
    pub fn work_root(&self) -> Root {
        self.root()
    }

    pub fn previous(&self) -> BlockHash {
        match self {
            Self::Open(_) => BlockHash::ZERO,
            Self::Send(b) => b.previous,
            Self::Receive(b) => b.previous,
            Self::Change(b) => b.previous,
            Self::State(b) => b.previous,
        }
    }

    /// The account named in the block payload (open and state only; legacy
    /// send/receive/change blocks address their account via the frontier).
    pub fn account_field(&self) -> Option<Account> {
        match self {
            Self::Open(b) => Some(b.account),
            Self::State(b) => Some(b.account),
            _ => None,
        }
    }

    /// The referenced send for legacy receive-style blocks.
    pub fn source(&self) -> Option<BlockHash> {
        match self {
            Self::Open(b) => Some(b.source),
            Self::Receive(b) => Some(b.source),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<Account> {
        match self {
            Self::Send(b) => Some(b.destination),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<BlockHash> {
        match self {
            Self::State(b) => Some(b.link),
            _ => None,
        }
    }

    pub fn representative(&self) -> Option<Account> {
        match self {
            Self::Open(b) => Some(b.representative),
            Self::Change(b) => Some(b.representative),
            Self::State(b) => Some(b.representative),
            _ => None,
        }
    }

    pub fn balance_field(&self) -> Option<Amount> {
        match self {
            Self::Send(b) => Some(b.balance),
            Self::State(b) => Some(b.balance),
            _ => None,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Self::Open(b) => b.work,
            Self::Send(b) => b.work,
            Self::Receive(b) => b.work,
            Self::Change(b) => b.work,
            Self::State(b) => b.work,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Self::Open(b) => &b.signature,
            Self::Send(b) => &b.signature,
            Self::Receive(b) => &b.signature,
            Self::Change(b) => &b.signature,
            Self::State(b) => &b.signature,
        }
    }

    pub fn set_signature(&mut self, signature: Signature) {
        match self {
            Self::Open(b) => b.signature = signature,
            Self::Send(b) => b.signature = signature,
            Self::Receive(b) => b.signature = signature,
            Self::Change(b) => b.signature = signature,
            Self::State(b) => b.signature = signature,
        }
    }

    pub fn set_work(&mut self, work: u64) {
        match self {
            Self::Open(b) => b.work = work,
            Self::Send(b) => b.work = work,
            Self::Receive(b) => b.work = work,
            Self::Change(b) => b.work = work,
            Self::State(b) => b.work = work,
        }
    }

    /// Whether a legacy block may sit on top of `previous`.
    ///
    /// State blocks may follow anything; legacy blocks may only follow other
    /// legacy blocks. Once a chain has a state head, legacy extension stops.
    pub fn valid_predecessor(&self, previous: &Block) -> bool {
        match self {
            Self::Open(_) => false,
            Self::State(_) => true,
            Self::Send(_) | Self::Receive(_) | Self::Change(_) => !matches!(
                previous,
                Block::State(_)
            ),
        }
    }

    // ── Binary codec (tag ‖ payload, big-endian integers) ───────────────

    /// Serialize as `type_tag ‖ payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let block_type = self.block_type();
        let mut out = Vec::with_capacity(1 + block_type.payload_size());
        out.push(block_type.as_u8());
        match self {
            Self::Open(b) => {
                out.extend_from_slice(b.source.as_bytes());
                out.extend_from_slice(b.representative.as_bytes());
                out.extend_from_slice(b.account.as_bytes());
                out.extend_from_slice(b.signature.as_bytes());
                out.extend_from_slice(&b.work.to_be_bytes());
            }
            Self::Send(b) => {
                out.extend_from_slice(b.previous.as_bytes());
                out.extend_from_slice(b.destination.as_bytes());
                out.extend_from_slice(&b.balance.to_be_bytes());
                out.extend_from_slice(b.signature.as_bytes());
                out.extend_from_slice(&b.work.to_be_bytes());
            }
            Self::Receive(b) => {
                out.extend_from_slice(b.previous.as_bytes());
                out.extend_from_slice(b.source.as_bytes());
                out.extend_from_slice(b.signature.as_bytes());
                out.extend_from_slice(&b.work.to_be_bytes());
            }
            Self::Change(b) => {
                out.extend_from_slice(b.previous.as_bytes());
                out.extend_from_slice(b.representative.as_bytes());
                out.extend_from_slice(b.signature.as_bytes());
                out.extend_from_slice(&b.work.to_be_bytes());
            }
            Self::State(b) => {
                out.extend_from_slice(b.account.as_bytes());
                out.extend_from_slice(b.previous.as_bytes());
                out.extend_from_slice(b.representative.as_bytes());
                out.extend_from_slice(&b.balance.to_be_bytes());
                out.extend_from_slice(b.link.as_bytes());
                out.extend_from_slice(b.signature.as_bytes());
                out.extend_from_slice(&b.work.to_be_bytes());
            }
        }
        out
    }

    /// Deserialize a `type_tag ‖ payload` prefix; trailing bytes (e.g. an
    /// appended sideband) are left for the caller.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let tag = *bytes
            .first()
            .ok_or(TypeError::Truncated("block", 1, 0))?;
        let block_type = BlockType::from_u8(tag)?;
        let payload_size = block_type.payload_size();
        if bytes.len() < 1 + payload_size {
            return Err(TypeError::Truncated(
                "block payload",
                1 + payload_size,
                bytes.len(),
            ));
        }
        let mut reader = Reader::new(&bytes[1..1 + payload_size]);
        let block = match block_type {
            BlockType::Open => Self::Open(OpenBlock {
                source: BlockHash::new(reader.take_32()),
                representative: Account::new(reader.take_32()),
                account: Account::new(reader.take_32()),
                signature: Signature(reader.take_64()),
                work: reader.take_u64(),
            }),
            BlockType::Send => Self::Send(SendBlock {
                previous: BlockHash::new(reader.take_32()),
                destination: Account::new(reader.take_32()),
                balance: Amount::from_be_bytes(reader.take_16()),
                signature: Signature(reader.take_64()),
                work: reader.take_u64(),
            }),
            BlockType::Receive => Self::Receive(ReceiveBlock {
                previous: BlockHash::new(reader.take_32()),
                source: BlockHash::new(reader.take_32()),
                signature: Signature(reader.take_64()),
                work: reader.take_u64(),
            }),
            BlockType::Change => Self::Change(ChangeBlock {
                previous: BlockHash::new(reader.take_32()),
                representative: Account::new(reader.take_32()),
                signature: Signature(reader.take_64()),
                work: reader.take_u64(),
            }),
            BlockType::State => Self::State(StateBlock {
                account: Account::new(reader.take_32()),
                previous: BlockHash::new(reader.take_32()),
                representative: Account::new(reader.take_32()),
                balance: Amount::from_be_bytes(reader.take_16()),
                link: BlockHash::new(reader.take_32()),
                signature: Signature(reader.take_64()),
                work: reader.take_u64(),
            }),
        };
        Ok(block)
    }
}

/// Cursor over a length-checked payload slice.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take_16(&mut self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + 16]);
        self.pos += 16;
        out
    }

    fn take_32(&mut self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + 32]);
        self.pos += 32;
        out
    }

    fn take_64(&mut self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + 64]);
        self.pos += 64;
        out
    }

    fn take_u64(&mut self) -> u64 {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + 8]);
        self.pos += 8;
        u64::from_be_bytes(out)
    }
}
