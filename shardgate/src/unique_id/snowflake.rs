//! Snowflake 64-bit key generator.
//!
//! Layout, most significant bit first:
//!
//! 1. sign bit, always 0
//! 2. 41 bits of milliseconds since [`EPOCH`]
//! 3. 10 bits of worker id
//! 4. 12 bits of per-millisecond sequence
//!
//! Two invariants hold as long as worker ids are unique across the
//! fleet: keys from one generator are strictly increasing, and keys
//! from different generators never collide.
//!
//! The sequence doesn't restart from zero on every new millisecond.
//! It restarts from a small offset that rotates between 0 and
//! `max.vibration.offset`, so low-traffic deployments don't produce
//! keys that are all even (or all sharded to the same place).
use std::sync::Arc;

use parking_lot::Mutex;
use shardgate_config::Properties;
use shardgate_types::ShardingValue;
use tracing::warn;

use super::{Clock, Error, KeyGenerator, SystemClock};

/// 2016-11-01T00:00:00Z
pub const EPOCH: u64 = 1_477_958_400_000;

const SEQUENCE_BITS: u64 = 12;
const WORKER_ID_BITS: u64 = 10;
const TIMESTAMP_BITS: u64 = 41;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1; // 4095
const WORKER_ID_SHIFT: u64 = SEQUENCE_BITS; // 12
const TIMESTAMP_SHIFT: u64 = SEQUENCE_BITS + WORKER_ID_BITS; // 22
const MAX_TIMESTAMP: u64 = (1 << TIMESTAMP_BITS) - 1;
pub const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1; // 1023

const WORKER_ID: &str = "worker.id";
const MAX_VIBRATION_OFFSET: &str = "max.vibration.offset";
const MAX_TOLERATE_TIME_DIFFERENCE: &str = "max.tolerate.time.difference.milliseconds";

/// Fields of a generated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parts {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl Parts {
    pub fn of(key: u64) -> Self {
        Self {
            timestamp_ms: (key >> TIMESTAMP_SHIFT) + EPOCH,
            worker_id: (key >> WORKER_ID_SHIFT) & MAX_WORKER_ID,
            sequence: key & SEQUENCE_MASK,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    last_timestamp_ms: u64,
    sequence: u64,
    // None until the first millisecond is seen.
    offset: Option<u64>,
}

impl State {
    fn vibrate(&mut self, max: u64) -> u64 {
        let next = match self.offset {
            Some(offset) if offset < max => offset + 1,
            _ => 0,
        };
        self.offset = Some(next);
        next
    }
}

#[derive(Debug)]
pub struct Snowflake {
    worker_id: u64,
    max_vibration_offset: u64,
    max_tolerate_time_difference_ms: u64,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl Snowflake {
    /// Generator driven by the system clock.
    pub fn new(props: &Properties) -> Result<Self, Error> {
        Self::with_clock(props, Arc::new(SystemClock))
    }

    pub fn with_clock(props: &Properties, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        let worker_id = props.get_or(WORKER_ID, 0_u64)?;
        if worker_id > MAX_WORKER_ID {
            return Err(Error::WorkerId(worker_id));
        }

        let max_vibration_offset = props.get_or(MAX_VIBRATION_OFFSET, 1_u64)?;
        if max_vibration_offset > SEQUENCE_MASK {
            return Err(Error::VibrationOffset(max_vibration_offset));
        }

        let max_tolerate_time_difference_ms = props.get_or(MAX_TOLERATE_TIME_DIFFERENCE, 10_u64)?;

        Ok(Self {
            worker_id,
            max_vibration_offset,
            max_tolerate_time_difference_ms,
            clock,
            state: Mutex::new(State::default()),
        })
    }

    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Generate the next key.
    pub fn next_id(&self) -> Result<u64, Error> {
        let mut state = self.state.lock();
        let mut now = self.clock.now_ms();

        if state.last_timestamp_ms > now {
            let difference = state.last_timestamp_ms - now;
            if difference >= self.max_tolerate_time_difference_ms {
                return Err(Error::ClockBackwards {
                    last: state.last_timestamp_ms,
                    current: now,
                });
            }

            warn!("clock moved backwards by {}ms, waiting for it", difference);
            self.clock.sleep_ms(difference);
            now = self.wait_until(state.last_timestamp_ms);
        }

        if now == state.last_timestamp_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            // Wraparound.
            if state.sequence == 0 {
                now = self.wait_until(state.last_timestamp_ms + 1);
            }
        } else {
            state.sequence = state.vibrate(self.max_vibration_offset);
        }

        let elapsed = now.checked_sub(EPOCH).ok_or(Error::BeforeEpoch(now))?;
        if elapsed > MAX_TIMESTAMP {
            return Err(Error::TimestampOverflow(elapsed));
        }

        state.last_timestamp_ms = now;

        Ok((elapsed << TIMESTAMP_SHIFT) | (self.worker_id << WORKER_ID_SHIFT) | state.sequence)
    }

    // Spin until the clock reaches `target_ms`.
    fn wait_until(&self, target_ms: u64) -> u64 {
        loop {
            let now = self.clock.now_ms();
            if now >= target_ms {
                return now;
            }
            self.clock.pause();
        }
    }
}

impl KeyGenerator for Snowflake {
    fn generate_key(&self) -> Result<ShardingValue, Error> {
        Ok(ShardingValue::Integer(self.next_id()? as i64))
    }
}
