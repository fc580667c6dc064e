use rhai::{Dynamic, INT};
use sp_core::{Outcome, ParticipantError};

/// Reads a prepare-phase script result as an outcome bitmask, verbatim.
pub fn outcome_from_result(raw: Dynamic) -> Result<Outcome, ParticipantError> {
    if !raw.is::<INT>() {
        return Err(ParticipantError::execution(
            "EXEC_OUTCOME_NOT_INTEGER",
            format!(
                "prepare scripts must return an integer outcome, got '{}'.",
                raw.type_name()
            ),
        ));
    }
    let bits = raw.cast::<INT>();
    i32::try_from(bits)
        .map(Outcome::from_bits)
        .map_err(|_| {
            ParticipantError::execution(
                "EXEC_OUTCOME_OUT_OF_RANGE",
                format!("outcome {} does not fit in 32 bits.", bits),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_returned_verbatim() {
        for bits in [0, 1, 0xC1, 0x43, 0x7fff_ffff] {
            let outcome = outcome_from_result(Dynamic::from_int(bits)).expect("int outcome");
            assert_eq!(i64::from(outcome.bits()), bits);
        }
    }

    #[test]
    fn non_integers_are_rejected() {
        for raw in [Dynamic::UNIT, Dynamic::from("1"), Dynamic::from_float(1.0), Dynamic::TRUE] {
            let error = outcome_from_result(raw).expect_err("non-integer outcome should fail");
            assert_eq!(error.code, "EXEC_OUTCOME_NOT_INTEGER");
        }
    }

    #[test]
    fn oversized_integers_are_rejected() {
        let error = outcome_from_result(Dynamic::from_int(1 << 40)).expect_err("too large");
        assert_eq!(error.code, "EXEC_OUTCOME_OUT_OF_RANGE");
    }
}
