pub mod channel;
pub mod logging;

pub use channel::ChannelRenderer;
pub use logging::LogRenderer;
