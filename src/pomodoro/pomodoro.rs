pub const DEFAULT_WORK_MINUTES: u32 = 45;
pub const DEFAULT_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_WORK_SOUND: &str = "crank.wav";
pub const DEFAULT_BREAK_SOUND: &str = "deskbell.wav";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Work,
    Break,
}

impl IntervalKind {
    pub fn flipped(self) -> Self {
        match self {
            IntervalKind::Work => IntervalKind::Break,
            IntervalKind::Break => IntervalKind::Work,
        }
    }

    /// Label used in the status summary ("Running, work").
    pub fn label(&self) -> &'static str {
        match self {
            IntervalKind::Work => "work",
            IntervalKind::Break => "break",
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Work => "WORK",
            IntervalKind::Break => "BREAK",
        }
    }
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
