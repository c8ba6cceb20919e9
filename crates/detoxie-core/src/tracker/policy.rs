//! Intervention policy.
//!
//! A pure function of the day's figures. Flag side effects belong to the
//! caller: a `ShowSoftWarning` decision must be followed by
//! `DailyLedger::mark_half_shown`, a `ShowHardBlock` by
//! `DailyLedger::mark_limit_reached` (a no-op once set).
//!
//! Vacation mode is not an input. The caller applies it when talking to
//! the presenter, so the intervention itself evolves identically.

use serde::{Deserialize, Serialize};

use crate::presenter::OverlayKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    None,
    ShowSoftWarning,
    ShowHardBlock,
}

/// Inputs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    /// Ledger total plus the open session's elapsed time.
    pub total_elapsed_today_ms: u64,
    pub limit_ms: u64,
    pub half_shown: bool,
    pub limit_reached: bool,
    pub section_active: bool,
}

/// First matching rule wins:
///
/// 1. section not active: nothing
/// 2. limit already reached: hard block
/// 3. half not yet shown and half the budget used: soft warning
/// 4. budget used: hard block
/// 5. otherwise nothing
pub fn evaluate(input: &PolicyInput) -> Decision {
    if !input.section_active {
        return Decision::None;
    }
    if input.limit_reached {
        return Decision::ShowHardBlock;
    }
    if !input.half_shown && input.total_elapsed_today_ms >= input.limit_ms / 2 {
        return Decision::ShowSoftWarning;
    }
    if input.total_elapsed_today_ms >= input.limit_ms {
        return Decision::ShowHardBlock;
    }
    Decision::None
}

/// Overlay a decision calls for.
pub fn overlay_for(decision: Decision) -> Option<OverlayKind> {
    match decision {
        Decision::None => None,
        Decision::ShowSoftWarning => Some(OverlayKind::SoftWarning),
        Decision::ShowHardBlock => Some(OverlayKind::HardBlock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 300_000;

    fn input(total: u64, half_shown: bool, limit_reached: bool) -> PolicyInput {
        PolicyInput {
            total_elapsed_today_ms: total,
            limit_ms: LIMIT,
            half_shown,
            limit_reached,
            section_active: true,
        }
    }

    #[test]
    fn inactive_section_never_shows() {
        let mut i = input(LIMIT * 2, true, true);
        i.section_active = false;
        assert_eq!(evaluate(&i), Decision::None);
    }

    #[test]
    fn reached_limit_blocks_regardless_of_total() {
        assert_eq!(evaluate(&input(0, true, true)), Decision::ShowHardBlock);
    }

    #[test]
    fn half_threshold_is_inclusive() {
        assert_eq!(evaluate(&input(149_999, false, false)), Decision::None);
        assert_eq!(evaluate(&input(150_000, false, false)), Decision::ShowSoftWarning);
    }

    #[test]
    fn soft_warning_fires_before_block_when_both_crossed() {
        assert_eq!(evaluate(&input(LIMIT, false, false)), Decision::ShowSoftWarning);
        assert_eq!(evaluate(&input(LIMIT, true, false)), Decision::ShowHardBlock);
    }

    #[test]
    fn between_half_and_limit_after_warning_is_quiet() {
        assert_eq!(evaluate(&input(200_000, true, false)), Decision::None);
    }

    #[test]
    fn odd_limit_uses_integer_half() {
        let i = PolicyInput {
            limit_ms: 301,
            total_elapsed_today_ms: 150,
            ..input(0, false, false)
        };
        assert_eq!(evaluate(&i), Decision::ShowSoftWarning);
    }

    #[test]
    fn decisions_map_to_overlay_kinds() {
        assert_eq!(overlay_for(Decision::None), None);
        assert_eq!(overlay_for(Decision::ShowSoftWarning), Some(OverlayKind::SoftWarning));
        assert_eq!(overlay_for(Decision::ShowHardBlock), Some(OverlayKind::HardBlock));
    }
}
