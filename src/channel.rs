//! Output channel allocation per instrument class.
//!
//! Melodic tracks draw channels 0-8 then 11-15; percussion tracks draw 9
//! then 10.  Running out of either pool is fatal.

use crate::config::{MAX_CHANNEL, PERCUSSION_CHANNEL};
use crate::error::CompileError;
use crate::model::InstrumentClass;

/// Last channel of the percussion pool.
const LAST_PERCUSSION_CHANNEL: u8 = PERCUSSION_CHANNEL + 1;

/// First melodic channel after the percussion pair.
const MELODIC_RESUME_CHANNEL: u8 = LAST_PERCUSSION_CHANNEL + 1;

/// Maximum number of melodic tracks.
pub const MELODIC_CAPACITY: usize = 14;

/// Maximum number of percussion tracks.
pub const PERCUSSION_CAPACITY: usize = 2;

/// Cursor state for one compile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAllocator {
    next_melodic: u8,
    next_percussion: u8,
}

impl Default for ChannelAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelAllocator {
    pub fn new() -> Self {
        Self {
            next_melodic: 0,
            next_percussion: PERCUSSION_CHANNEL,
        }
    }

    /// Assign a channel to track `track` and advance the class's cursor.
    pub fn allocate(&mut self, track: usize, class: InstrumentClass) -> Result<u8, CompileError> {
        let channel = match class {
            InstrumentClass::Melodic => {
                if self.next_melodic > MAX_CHANNEL {
                    return Err(CompileError::ChannelCapacityExceeded {
                        track,
                        class,
                        limit: MELODIC_CAPACITY,
                    });
                }
                let channel = self.next_melodic;
                self.next_melodic += 1;
                if self.next_melodic == PERCUSSION_CHANNEL {
                    self.next_melodic = MELODIC_RESUME_CHANNEL;
                }
                channel
            }
            InstrumentClass::Percussion => {
                if self.next_percussion > LAST_PERCUSSION_CHANNEL {
                    return Err(CompileError::ChannelCapacityExceeded {
                        track,
                        class,
                        limit: PERCUSSION_CAPACITY,
                    });
                }
                let channel = self.next_percussion;
                self.next_percussion += 1;
                channel
            }
        };
        tracing::debug!(track, %class, channel, "allocated channel");
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn melodic_channels_skip_percussion_pair() {
        let mut alloc = ChannelAllocator::new();
        let channels: Vec<u8> = (0..MELODIC_CAPACITY)
            .map(|t| alloc.allocate(t, InstrumentClass::Melodic).unwrap())
            .collect();
        assert_eq!(channels, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 13, 14, 15]);
        assert_eq!(
            alloc.allocate(14, InstrumentClass::Melodic),
            Err(CompileError::ChannelCapacityExceeded {
                track: 14,
                class: InstrumentClass::Melodic,
                limit: MELODIC_CAPACITY,
            })
        );
    }

    #[test]
    fn percussion_uses_nine_and_ten() {
        let mut alloc = ChannelAllocator::new();
        assert_eq!(alloc.allocate(0, InstrumentClass::Percussion), Ok(9));
        assert_eq!(alloc.allocate(1, InstrumentClass::Melodic), Ok(0));
        assert_eq!(alloc.allocate(2, InstrumentClass::Percussion), Ok(10));
        assert!(matches!(
            alloc.allocate(3, InstrumentClass::Percussion),
            Err(CompileError::ChannelCapacityExceeded { track: 3, limit: 2, .. })
        ));
        // melodic pool is unaffected by percussion exhaustion
        assert_eq!(alloc.allocate(4, InstrumentClass::Melodic), Ok(1));
    }
}
