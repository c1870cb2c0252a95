pub mod walk;

pub use walk::{discover, DiscoveryOptions};
