//! Typed proxies over the native menu system
//!
//! Each proxy holds exactly one native handle and the bindings for its
//! interface. Proxies never own the native object: when the native side
//! destroys it, any proxy still referring to it is dangling and must not be
//! used.
//!
//! ```text
//! MenuSystem ──► ProfileSystem ──► Profile
//!     │                               │
//!     └──────── create_menu ◄─────────┘
//!                   │
//!                   ▼
//!                 Menu ──► item callbacks
//! ```

mod menu;
mod player;
mod profiles;
mod style;
mod system;

pub use menu::{Menu, MenuHandler};
pub use player::{is_valid_slot, MenuPlayer, MAX_PLAYERS};
pub use profiles::{Profile, ProfileSystem, DEFAULT_PROFILE};
pub use style::StyleFlags;
pub use system::{MenuSystem, PlayerFilter};
