//! Concentration resolver.

use tracing::trace;

use crate::models::{ConcentrationInput, ConcentrationUnit, ResolvedConcentration};

/// Resolve a drug amount in a diluent volume to an amount per mL.
///
/// Mass amounts are normalized to mcg/mL. U and mEq amounts are divided by
/// the volume as-is and keep their own unit. Non-finite input or a zero
/// volume gives [`ResolvedConcentration::DEGENERATE`].
pub fn resolve_concentration(input: &ConcentrationInput) -> ResolvedConcentration {
    if !input.amount.is_finite() || !input.volume_ml.is_finite() || input.volume_ml == 0.0 {
        trace!(
            amount = input.amount,
            volume_ml = input.volume_ml,
            "concentration not resolvable"
        );
        return ResolvedConcentration::DEGENERATE;
    }

    match (input.amount_unit.mcg_factor(), input.amount_unit.count_unit()) {
        (Some(factor), _) => ResolvedConcentration::new(
            input.amount * factor / input.volume_ml,
            ConcentrationUnit::McgPerMl,
        ),
        (None, Some(count)) => ResolvedConcentration::new(
            input.amount / input.volume_ml,
            ConcentrationUnit::for_count(count),
        ),
        (None, None) => ResolvedConcentration::DEGENERATE,
    }
}
