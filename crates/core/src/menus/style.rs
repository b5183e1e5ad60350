//! Item style flags

use bitflags::bitflags;

bitflags! {
    /// Flags describing how a menu item behaves and renders
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        /// Item can be selected
        const ACTIVE = 1 << 0;
        /// Item shows its selection number
        const HAS_NUMBER = 1 << 1;
        /// Item is a navigation control (back, next, exit)
        const CONTROL = 1 << 2;

        const DEFAULT = Self::ACTIVE.bits() | Self::HAS_NUMBER.bits();
        const FULL = Self::DEFAULT.bits() | Self::CONTROL.bits();
    }
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}
