//! Host-package bridge (§4.8): turns `host:<pkg>` imports into symbols.

mod bridge;
mod index;

pub use bridge::{HostBridge, HostSnapshot};
