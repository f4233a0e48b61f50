//! Key dispatch: turns zone commands into injected key presses.
//!
//! The sink is a capability object so the pipeline can run against a
//! recording fake in tests, and so nothing else in the crate knows how
//! keys reach the slide deck.

use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use super::zone::NavCommand;

/// Key identifiers understood by the automation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
}

impl NavKey {
    /// X11 keysym name as passed to `xdotool key`.
    pub fn keysym(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

impl From<NavCommand> for NavKey {
    fn from(command: NavCommand) -> Self {
        match command {
            NavCommand::Prev => Self::Left,
            NavCommand::Next => Self::Right,
        }
    }
}

/// Fire-and-forget key injection.
pub trait KeySink {
    fn press(&mut self, key: NavKey) -> Result<()>;
}

/// Injects key presses into the focused window via `xdotool`.
pub struct XdotoolKeys;

impl KeySink for XdotoolKeys {
    fn press(&mut self, key: NavKey) -> Result<()> {
        let status = Command::new("xdotool")
            .args(["key", "--clearmodifiers", key.keysym()])
            .status()
            .context("failed to run xdotool")?;
        if !status.success() {
            bail!("xdotool exited with {status}");
        }
        Ok(())
    }
}

/// Rate gate in front of the key sink.
///
/// With a zero cooldown every qualifying frame dispatches, which is the
/// historical behavior: a wrist held in a trigger zone fires tens of
/// presses per second. A positive cooldown admits one dispatch per window.
#[derive(Debug)]
pub struct DispatchGate {
    cooldown: Duration,
    last_dispatch: Option<Instant>,
}

impl DispatchGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_dispatch: None,
        }
    }

    /// Returns true when a dispatch is admitted at `now`, and records it.
    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_dispatch {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_dispatch = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_key_from_command() {
        assert_eq!(NavKey::from(NavCommand::Prev), NavKey::Left);
        assert_eq!(NavKey::from(NavCommand::Next), NavKey::Right);
    }

    #[test]
    fn test_keysym_names() {
        assert_eq!(NavKey::Left.keysym(), "Left");
        assert_eq!(NavKey::Right.keysym(), "Right");
    }

    #[test]
    fn test_zero_cooldown_admits_every_frame() {
        let mut gate = DispatchGate::new(Duration::ZERO);
        let now = Instant::now();
        for i in 0..10 {
            assert!(gate.admit(now + Duration::from_millis(i)), "frame {i}");
        }
    }

    #[test]
    fn test_cooldown_window() {
        let mut gate = DispatchGate::new(Duration::from_millis(250));
        let base = Instant::now();

        assert!(gate.admit(base));
        assert!(!gate.admit(base + Duration::from_millis(100)));
        assert!(!gate.admit(base + Duration::from_millis(249)));
        assert!(gate.admit(base + Duration::from_millis(250)));
    }

    #[test]
    fn test_rejected_admit_does_not_reset_window() {
        let mut gate = DispatchGate::new(Duration::from_millis(200));
        let base = Instant::now();

        assert!(gate.admit(base));
        // a rejected frame must not extend the window
        assert!(!gate.admit(base + Duration::from_millis(150)));
        assert!(gate.admit(base + Duration::from_millis(210)));
    }
}
