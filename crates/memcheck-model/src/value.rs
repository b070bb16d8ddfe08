//! Expected-value computation from raw memory words.

use memcheck_trace::{AccessKind, TraceEntry};

use crate::window::MemoryWindow;

/// Bit offset of the addressed byte lane within its word.
const fn lane_shift(addr: u32) -> u32 {
    (addr & 3) * 8
}

/// Value a load at `entry` returns given the word holding its address.
#[must_use]
pub const fn load_result(entry: &TraceEntry, raw: u32) -> u32 {
    let value = raw >> lane_shift(entry.addr);
    match entry.kind {
        AccessKind::Lh => sign_extend(value & 0xffff, 0x8000),
        AccessKind::Lb => sign_extend(value & 0xff, 0x80),
        AccessKind::Lhu => value & 0xffff,
        AccessKind::Lbu => value & 0xff,
        // Words pass through, stores are never loaded.
        _ => value,
    }
}

const fn sign_extend(value: u32, sign_bit: u32) -> u32 {
    if value & sign_bit == 0 {
        value
    } else {
        value | !((sign_bit << 1) - 1)
    }
}

/// Word left in memory after the store at `entry` is applied to `raw`.
///
/// `sh`/`sb` only replace their own lane. Lanes shifted past bit 31 are
/// dropped.
#[must_use]
pub const fn store_result(entry: &TraceEntry, raw: u32) -> u32 {
    let shift = lane_shift(entry.addr);
    let data = entry.write_data << shift;
    let mask = match entry.kind {
        AccessKind::Sh => 0xffff << shift,
        AccessKind::Sb => 0xff << shift,
        _ => u32::MAX,
    };
    (raw & !mask) | (data & mask)
}

/// Match mask for `lbcmp` over the scanned words.
///
/// Bytes are visited least significant first within each word, words in
/// ascending order; bit `k` is set when the `k`-th byte equals `byte`.
#[must_use]
pub fn byte_match_mask(byte: u8, words: &[u32]) -> u32 {
    words
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .take(32)
        .enumerate()
        .filter(|&(_, b)| b == byte)
        .fold(0u32, |mask, (k, _)| mask | (1u32 << k))
}

/// Expected `lbcmp` result, or `None` if its window is not fully modeled.
#[must_use]
pub fn cmp_result(entry: &TraceEntry, memory: &MemoryWindow) -> Option<u32> {
    let words = memory.cmp_window(entry.addr)?;
    let [byte, ..] = entry.write_data.to_le_bytes();
    Some(byte_match_mask(byte, words))
}
