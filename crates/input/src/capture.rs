/// Pointer-lock state. Fly mode is on while the pointer is captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerCapture {
    captured: bool,
}

impl PointerCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Apply a capture state. Returns the new state only when it changed, so
    /// repeated lock events do not re-fire fly-mode callbacks.
    pub fn set(&mut self, captured: bool) -> Option<bool> {
        if self.captured == captured {
            return None;
        }
        self.captured = captured;
        tracing::debug!(captured, "pointer capture changed");
        Some(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_transitions_only() {
        let mut c = PointerCapture::new();
        assert_eq!(c.set(false), None);
        assert_eq!(c.set(true), Some(true));
        assert_eq!(c.set(true), None);
        assert!(c.is_captured());
        assert_eq!(c.set(false), Some(false));
        assert!(!c.is_captured());
    }
}
