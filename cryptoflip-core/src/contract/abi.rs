//! Minimal ABI codec for the coin flip contract surface.
//!
//! Every value the contract exchanges is a static type, so calldata and
//! return data are sequences of 32-byte words. The only dynamic value is the
//! history array, which is a head offset followed by a length and packed
//! static tuples.

use crate::error::{FlipError, Result};
use crate::provider::Log;
use crate::types::{ContractStats, HistoryRecord, Side};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use chrono::DateTime;

pub const RESULT_EVENT_SIGNATURE: &str = "Result(address,uint256,uint8,uint8,bool)";
pub const FLIP_SIGNATURE: &str = "flip(uint8)";
pub const HISTORY_SIGNATURE: &str = "getUserGameHistory(address)";
pub const HOUSE_EDGE_SIGNATURE: &str = "getHouseEdge()";
pub const STATS_SIGNATURE: &str = "getStats()";

const WORD: usize = 32;
/// (id, player, betAmount, choice, result, won, timestamp)
const HISTORY_TUPLE_WORDS: usize = 7;

/// Decoded `Result` event:
/// `Result(address indexed player, uint256 betAmount, uint8 choice, uint8 result, bool won)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEvent {
    pub player: Address,
    pub bet_amount: U256,
    pub choice: Side,
    pub result: Side,
    pub won: bool,
}

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn result_event_topic() -> B256 {
    keccak256(RESULT_EVENT_SIGNATURE.as_bytes())
}

pub fn encode_flip(side: Side) -> Bytes {
    encode_call(FLIP_SIGNATURE, &[U256::from(side.ordinal())])
}

pub fn encode_history_query(player: Address) -> Bytes {
    encode_call(HISTORY_SIGNATURE, &[U256::from_be_bytes(player.into_word().0)])
}

pub fn encode_call(signature: &str, args: &[U256]) -> Bytes {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_be_bytes::<WORD>());
    }
    Bytes::from(data)
}

/// True when `log` is a `Result` event emitted by `contract`.
pub fn is_result_log(log: &Log, contract: Address) -> bool {
    log.address == contract && log.topics.first() == Some(&result_event_topic())
}

pub fn decode_result_log(log: &Log) -> Result<ResultEvent> {
    let topic = log
        .topics
        .first()
        .ok_or_else(|| FlipError::decode("Log has no topics"))?;
    if *topic != result_event_topic() {
        return Err(FlipError::decode("Log is not a Result event"));
    }

    let player_topic = log
        .topics
        .get(1)
        .ok_or_else(|| FlipError::decode("Result event is missing the indexed player"))?;
    let player = word_to_address(&player_topic.0)?;

    let words = Words::new(&log.data)?;
    if words.len() < 4 {
        return Err(FlipError::decode(format!(
            "Result event data has {} words, expected 4",
            words.len()
        )));
    }

    Ok(ResultEvent {
        player,
        bet_amount: words.uint(0)?,
        choice: Side::from_ordinal(words.uint8(1)?)?,
        result: Side::from_ordinal(words.uint8(2)?)?,
        won: words.boolean(3)?,
    })
}

/// Decode the return data of `getUserGameHistory(address)`.
pub fn decode_history(data: &[u8]) -> Result<Vec<HistoryRecord>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let words = Words::new(data)?;

    let offset = words.index(0)?;
    if offset % WORD != 0 {
        return Err(FlipError::decode(format!("Unaligned array offset {}", offset)));
    }
    let head = offset / WORD;
    let count = words.index(head)?;

    let needed = head
        .checked_add(1)
        .and_then(|start| count.checked_mul(HISTORY_TUPLE_WORDS).and_then(|n| n.checked_add(start)))
        .ok_or_else(|| FlipError::decode("History length overflows"))?;
    if needed > words.len() {
        return Err(FlipError::decode(format!(
            "History claims {} entries but return data is too short",
            count
        )));
    }

    (0..count)
        .map(|i| {
            let base = head + 1 + i * HISTORY_TUPLE_WORDS;
            let seconds = i64::try_from(words.uint(base + 6)?)
                .map_err(|_| FlipError::decode("Timestamp out of range"))?;
            let timestamp = DateTime::from_timestamp(seconds, 0)
                .ok_or_else(|| FlipError::decode("Timestamp out of range"))?;

            Ok(HistoryRecord {
                id: words.uint(base)?,
                player: words.address(base + 1)?,
                stake: words.uint(base + 2)?,
                chosen_side: Side::from_ordinal(words.uint8(base + 3)?)?,
                landed_side: Side::from_ordinal(words.uint8(base + 4)?)?,
                won: words.boolean(base + 5)?,
                timestamp,
            })
        })
        .collect()
}

pub fn decode_uint(data: &[u8]) -> Result<U256> {
    Words::new(data)?.uint(0)
}

pub fn decode_stats(data: &[u8]) -> Result<ContractStats> {
    let words = Words::new(data)?;
    Ok(ContractStats {
        total_games: words.uint(0)?,
        total_fees: words.uint(1)?,
    })
}

fn word_to_address(word: &[u8; WORD]) -> Result<Address> {
    if word[..12].iter().any(|b| *b != 0) {
        return Err(FlipError::decode("Address word has dirty high bytes"));
    }
    Ok(Address::from_slice(&word[12..]))
}

struct Words<'a> {
    data: &'a [u8],
}

impl<'a> Words<'a> {
    fn new(data: &'a [u8]) -> Result<Self> {
        if data.len() % WORD != 0 {
            return Err(FlipError::decode(format!(
                "ABI data length {} is not a multiple of 32",
                data.len()
            )));
        }
        Ok(Self { data })
    }

    fn len(&self) -> usize {
        self.data.len() / WORD
    }

    fn word(&self, i: usize) -> Result<&'a [u8; WORD]> {
        let start = i
            .checked_mul(WORD)
            .ok_or_else(|| FlipError::decode("Word index overflows"))?;
        let end = start
            .checked_add(WORD)
            .ok_or_else(|| FlipError::decode("Word index overflows"))?;
        self.data
            .get(start..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| FlipError::decode(format!("Missing ABI word {}", i)))
    }

    fn uint(&self, i: usize) -> Result<U256> {
        Ok(U256::from_be_bytes(*self.word(i)?))
    }

    fn uint8(&self, i: usize) -> Result<u8> {
        u8::try_from(self.uint(i)?)
            .map_err(|_| FlipError::decode(format!("Word {} does not fit uint8", i)))
    }

    fn index(&self, i: usize) -> Result<usize> {
        usize::try_from(self.uint(i)?)
            .map_err(|_| FlipError::decode(format!("Word {} is not a valid offset", i)))
    }

    fn boolean(&self, i: usize) -> Result<bool> {
        match self.uint8(i)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(FlipError::decode(format!("Invalid bool value {}", other))),
        }
    }

    fn address(&self, i: usize) -> Result<Address> {
        word_to_address(self.word(i)?)
    }
}

#[cfg(test)]
pub(crate) fn encode_words(words: &[U256]) -> Bytes {
    let mut data = Vec::with_capacity(words.len() * WORD);
    for word in words {
        data.extend_from_slice(&word.to_be_bytes::<WORD>());
    }
    Bytes::from(data)
}

#[cfg(test)]
pub(crate) fn address_word(address: Address) -> U256 {
    U256::from_be_bytes(address.into_word().0)
}

#[cfg(test)]
pub(crate) fn result_log(
    contract: Address,
    player: Address,
    bet_amount: U256,
    choice: u8,
    result: u8,
    won: bool,
    log_index: u64,
) -> Log {
    Log {
        address: contract,
        topics: vec![result_event_topic(), player.into_word()],
        data: encode_words(&[
            bet_amount,
            U256::from(choice),
            U256::from(result),
            U256::from(won as u8),
        ]),
        log_index: Some(alloy_primitives::U64::from(log_index)),
    }
}

#[cfg(test)]
pub(crate) fn encode_history(records: &[HistoryRecord]) -> Bytes {
    let mut words = vec![U256::from(WORD), U256::from(records.len())];
    for record in records {
        words.extend([
            record.id,
            address_word(record.player),
            record.stake,
            U256::from(record.chosen_side.ordinal()),
            U256::from(record.landed_side.ordinal()),
            U256::from(record.won as u8),
            U256::from(record.timestamp.timestamp() as u64),
        ]);
    }
    encode_words(&words)
}
