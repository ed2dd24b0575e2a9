use crate::config::OverlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStep {
    /// Take the faded overlay out of layout and the accessibility tree.
    Conceal,
    StartMedia,
    FocusMedia,
}

/// Delays of the hide sequence, earliest first.
pub fn hide_plan(config: &OverlayConfig) -> Vec<(u32, OverlayStep)> {
    let mut plan = vec![
        (config.conceal_delay_ms, OverlayStep::Conceal),
        (config.play_delay_ms, OverlayStep::StartMedia),
        (config.focus_delay_ms, OverlayStep::FocusMedia),
    ];
    plan.sort_by_key(|&(delay, _)| delay);
    plan
}

#[derive(Debug, Clone)]
pub struct OverlayMachine {
    state: OverlayState,
}

impl Default for OverlayMachine {
    fn default() -> Self {
        Self { state: OverlayState::Visible }
    }
}

impl OverlayMachine {
    #[cfg(test)]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Play was activated. Always runs, even if already hidden: each
    /// activation restarts the hide sequence.
    pub fn activate(&mut self) {
        self.state = OverlayState::Hidden;
    }

    /// Escape was pressed. Returns whether the overlay should come back.
    pub fn dismiss(&mut self) -> bool {
        match self.state {
            OverlayState::Hidden => {
                self.state = OverlayState::Visible;
                true
            }
            OverlayState::Visible => false,
        }
    }
}

pub fn is_play_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}
