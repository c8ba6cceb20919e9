//! Overlay presenter seam.
//!
//! The tracker decides *when* an intervention is visible; the host decides
//! how it looks. Implementations must not block.

use serde::{Deserialize, Serialize};

use crate::error::PresenterError;
use crate::storage::OverlayConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Half the budget is used. Can be dismissed.
    SoftWarning,
    /// The budget is used up. Stays until the user leaves the section.
    HardBlock,
}

impl OverlayKind {
    pub fn dismissible(self) -> bool {
        matches!(self, OverlayKind::SoftWarning)
    }
}

/// Everything the host needs to draw an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRequest {
    pub kind: OverlayKind,
    pub dismissible: bool,
    pub elapsed_today_ms: u64,
    pub limit_ms: u64,
    pub appearance: OverlayConfig,
}

impl OverlayRequest {
    pub fn new(kind: OverlayKind, elapsed_today_ms: u64, limit_ms: u64, appearance: OverlayConfig) -> Self {
        Self {
            kind,
            dismissible: kind.dismissible(),
            elapsed_today_ms,
            limit_ms,
            appearance,
        }
    }
}

pub trait Presenter {
    fn show(&mut self, request: &OverlayRequest) -> Result<(), PresenterError>;

    fn hide(&mut self) -> Result<(), PresenterError>;
}

/// Presenter for headless hosts. Every call succeeds and draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show(&mut self, _request: &OverlayRequest) -> Result<(), PresenterError> {
        Ok(())
    }

    fn hide(&mut self) -> Result<(), PresenterError> {
        Ok(())
    }
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn show(&mut self, request: &OverlayRequest) -> Result<(), PresenterError> {
        (**self).show(request)
    }

    fn hide(&mut self) -> Result<(), PresenterError> {
        (**self).hide()
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show(&mut self, request: &OverlayRequest) -> Result<(), PresenterError> {
        (**self).show(request)
    }

    fn hide(&mut self) -> Result<(), PresenterError> {
        (**self).hide()
    }
}
