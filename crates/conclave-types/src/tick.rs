/// Chain time, supplied by the caller on every state transition.
///
/// Time only advances between operations; nothing inside the engine reads a
/// clock. The ledger keys off `height`, the timelock and the membership
/// vault key off `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick {
    /// Block height.
    pub height: u64,
    /// Block timestamp, in seconds.
    pub timestamp: u64,
}

impl Tick {
    pub const fn new(height: u64, timestamp: u64) -> Self {
        Self { height, timestamp }
    }

    /// A tick with only the height set; for call sites that never touch the
    /// timestamp.
    pub const fn at_height(height: u64) -> Self {
        Self {
            height,
            timestamp: 0,
        }
    }
}
