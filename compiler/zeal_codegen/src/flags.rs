//! `PH_*` access flags passed to the runtime's property and array helpers.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct AccessFlags: u8 {
        /// Warn when the member is missing.
        const NOISY = 1 << 0;
        /// Stay quiet when the member is missing.
        const SILENT = 1 << 1;
        /// Borrow the stored value without taking a reference.
        const READONLY = 1 << 2;
        /// Separate a shared value before writing.
        const SEPARATE = 1 << 3;
        const COPY = 1 << 4;
    }
}

impl AccessFlags {
    /// C spelling, `PH_NOISY_CC | PH_READONLY`; `0` when empty.
    pub fn render(self) -> String {
        if self.is_empty() {
            return "0".to_owned();
        }
        let mut parts = Vec::with_capacity(2);
        for (flag, name) in [
            (AccessFlags::NOISY, "PH_NOISY_CC"),
            (AccessFlags::SILENT, "PH_SILENT_CC"),
            (AccessFlags::READONLY, "PH_READONLY"),
            (AccessFlags::SEPARATE, "PH_SEPARATE"),
            (AccessFlags::COPY, "PH_COPY"),
        ] {
            if self.contains(flag) {
                parts.push(name);
            }
        }
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests;
