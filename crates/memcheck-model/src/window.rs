//! Flat RAM window backing the reference model.
//!
//! Only addresses inside `[base, base + size)` are modeled. Everything else is
//! out of verification scope: lookups return `None` and the caller skips the
//! access without flagging it.

use thiserror::Error;

/// Default RAM base address.
pub const DEFAULT_RAM_BASE: u32 = 0x2000_0000;

/// Default RAM size in bytes (4 MiB).
pub const DEFAULT_RAM_SIZE: u32 = 0x40_0000;

/// Words read by one `lbcmp`.
pub const CMP_WINDOW_WORDS: usize = 8;

/// Invalid RAM window configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("RAM base {0:#010x} is not 8-byte aligned")]
    MisalignedBase(u32),
    #[error("RAM size {0:#x} must be a non-zero multiple of 8")]
    InvalidSize(u32),
    #[error("RAM window {base:#010x}+{size:#x} extends past the 32-bit address space")]
    Overflow { base: u32, size: u32 },
}

/// Location and extent of the modeled RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// First modeled byte address.
    pub base: u32,
    /// Window size in bytes.
    pub size: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            base: DEFAULT_RAM_BASE,
            size: DEFAULT_RAM_SIZE,
        }
    }
}

impl WindowConfig {
    /// Check the window can be modeled as whole, even-aligned word pairs.
    ///
    /// # Errors
    ///
    /// Returns the first constraint the configuration violates.
    pub const fn validate(&self) -> Result<(), WindowError> {
        if self.base % 8 != 0 {
            return Err(WindowError::MisalignedBase(self.base));
        }
        if self.size == 0 || self.size % 8 != 0 {
            return Err(WindowError::InvalidSize(self.size));
        }
        if self.base.checked_add(self.size - 1).is_none() {
            return Err(WindowError::Overflow {
                base: self.base,
                size: self.size,
            });
        }
        Ok(())
    }
}

/// Word-addressed simulated RAM, zero-initialized.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    base: u32,
    words: Vec<u32>,
}

impl MemoryWindow {
    /// Allocate a zeroed window.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not pass [`WindowConfig::validate`].
    pub fn new(config: WindowConfig) -> Result<Self, WindowError> {
        config.validate()?;
        Ok(Self {
            base: config.base,
            words: vec![0; (config.size / 4) as usize],
        })
    }

    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Number of modeled words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the word holding `addr`, if modeled.
    #[must_use]
    pub fn word_index(&self, addr: u32) -> Option<usize> {
        let offset = addr.checked_sub(self.base)?;
        let index = (offset / 4) as usize;
        (index < self.words.len()).then_some(index)
    }

    /// Word holding `addr`, if modeled.
    #[must_use]
    pub fn read(&self, addr: u32) -> Option<u32> {
        self.word_index(addr).map(|i| self.words[i])
    }

    /// Overwrite the word holding `addr`. Returns false when unmodeled.
    pub fn write(&mut self, addr: u32, value: u32) -> bool {
        match self.word_index(addr) {
            Some(i) => {
                self.words[i] = value;
                true
            }
            None => false,
        }
    }

    /// The eight words an `lbcmp` at `addr` scans.
    ///
    /// Starts at the word index of `addr` rounded down to even; `None` unless
    /// all eight words are modeled.
    #[must_use]
    pub fn cmp_window(&self, addr: u32) -> Option<&[u32]> {
        let start_addr = addr & !7;
        let start = self.word_index(start_addr)?;
        self.words.get(start..start + CMP_WINDOW_WORDS)
    }
}
