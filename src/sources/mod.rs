//! Log sources that push external events into a built logger

pub mod channel;

pub use channel::{ChannelSource, SourceEvent};
