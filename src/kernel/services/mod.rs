//! Services layer (ports + adapters).
//!
//! - `ports`: plain config and session types the editor consumes.
//! - `adapters`: OS/process specific implementations (files, git, LSP).

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::KernelServiceHost;
