pub mod dispatch;
pub mod zone;

pub use dispatch::{DispatchGate, KeySink, NavKey, XdotoolKeys};
pub use zone::{detect_zone, NavCommand};
