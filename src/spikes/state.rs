#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SpikeStripState {
    #[default]
    Preparing,
    Undeployed,
    Deploying,
    Deployed,
    Bypassed,
    Hit,
    Disposed,
    Error,
}

impl SpikeStripState {
    /// States in which the strip is out on the road and checked every tick.
    pub fn is_monitored(self) -> bool {
        matches!(self, SpikeStripState::Deployed | SpikeStripState::Bypassed | SpikeStripState::Hit)
    }

    pub fn can_undeploy(self) -> bool {
        self.is_monitored()
    }

    /// The target either hit or went around the strip.
    pub fn is_resolved(self) -> bool {
        matches!(self, SpikeStripState::Bypassed | SpikeStripState::Hit)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SpikeStripState::Disposed | SpikeStripState::Error)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StateTransition {
    pub previous: SpikeStripState,
    pub current: SpikeStripState,
}
