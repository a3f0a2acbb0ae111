//! Execution strategy selection
//!
//! Decided once at mount from what the browser offers; never revisited.

/// Where the simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Main thread, driven by animation frames
    Inline,
    /// Dedicated worker drawing to a transferred canvas
    Offloaded,
}

/// What the host environment supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub offscreen_canvas: bool,
    pub transfer_control: bool,
    pub worker: bool,
    /// The host supplied a worker script URL
    pub worker_script: bool,
    /// The canvas was handed to a worker by an earlier mount
    pub already_transferred: bool,
    pub reduced_motion: bool,
}

impl Capabilities {
    pub fn supports_offload(&self) -> bool {
        self.offscreen_canvas && self.transfer_control && self.worker && self.worker_script
    }
}

impl Strategy {
    /// `None` means nothing should start: reduced motion was requested, or the
    /// canvas already belongs to a worker and cannot be drawn on here
    pub fn select(caps: &Capabilities) -> Option<Strategy> {
        if caps.reduced_motion {
            return None;
        }
        if caps.already_transferred {
            return None;
        }
        Some(if caps.supports_offload() {
            Strategy::Offloaded
        } else {
            Strategy::Inline
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Capabilities {
        Capabilities {
            offscreen_canvas: true,
            transfer_control: true,
            worker: true,
            worker_script: true,
            already_transferred: false,
            reduced_motion: false,
        }
    }

    #[test]
    fn test_full_support_offloads() {
        assert_eq!(Strategy::select(&full()), Some(Strategy::Offloaded));
    }

    #[test]
    fn test_any_missing_capability_falls_back_inline() {
        let cases = [
            Capabilities { offscreen_canvas: false, ..full() },
            Capabilities { transfer_control: false, ..full() },
            Capabilities { worker: false, ..full() },
            Capabilities { worker_script: false, ..full() },
        ];
        for caps in cases {
            assert_eq!(Strategy::select(&caps), Some(Strategy::Inline), "{caps:?}");
        }
    }

    #[test]
    fn test_reduced_motion_never_starts() {
        let caps = Capabilities { reduced_motion: true, ..full() };
        assert_eq!(Strategy::select(&caps), None);
        assert_eq!(Strategy::select(&Capabilities { reduced_motion: true, ..Default::default() }), None);
    }

    #[test]
    fn test_transferred_canvas_is_left_alone() {
        let caps = Capabilities { already_transferred: true, ..full() };
        assert_eq!(Strategy::select(&caps), None);
    }
}
