use super::value_objects::{PaneId, PriceScaleId, ScaleRegion};
use crate::domain::indicators::IndicatorKind;
use serde::Serialize;

/// Where an indicator instance is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    Overlay,
    Oscillator(PaneId),
}

impl Placement {
    pub fn scale(&self) -> PriceScaleId {
        match self {
            Self::Overlay => PriceScaleId::Main,
            Self::Oscillator(pane) => PriceScaleId::Pane(*pane),
        }
    }

    pub fn pane(&self) -> Option<PaneId> {
        match self {
            Self::Overlay => None,
            Self::Oscillator(pane) => Some(*pane),
        }
    }
}

/// Hands out oscillator panes.
///
/// Every oscillator instance gets a fresh pane in the bottom band; panes are never shared and
/// ids are never reused, even after release.
#[derive(Debug, Default)]
pub struct PaneAllocator {
    next_id: u64,
    active: Vec<PaneId>,
}

impl PaneAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, kind: IndicatorKind) -> Placement {
        if kind.is_overlay() {
            return Placement::Overlay;
        }
        self.next_id += 1;
        let pane = PaneId::from(self.next_id);
        self.active.push(pane);
        Placement::Oscillator(pane)
    }

    /// Vertical band for a placement. Overlays reuse the main scale and need none.
    pub fn region(&self, placement: Placement) -> Option<ScaleRegion> {
        placement.pane().map(|_| ScaleRegion::OSCILLATOR)
    }

    /// Frees a pane. Returns `false` for unknown or already released panes.
    pub fn release(&mut self, pane: PaneId) -> bool {
        let before = self.active.len();
        self.active.retain(|p| *p != pane);
        self.active.len() != before
    }

    pub fn active_panes(&self) -> &[PaneId] {
        &self.active
    }
}
