use crate::engine::error::EngineError;

/// Smallest positive counts `(m, n)` of a cation and an anion whose charges cancel.
///
/// With `g = gcd(|c|, |a|)` the result is `m = |a| / g`, `n = |c| / g`, so that
/// `m·c + n·a = 0`.
///
/// # Errors
///
/// [`EngineError::InvalidChargeCombination`] when either charge is zero or both have
/// the same sign.
pub fn balance(cation_charge: i32, anion_charge: i32) -> Result<(u32, u32), EngineError> {
    if cation_charge == 0 || anion_charge == 0 || cation_charge.signum() == anion_charge.signum()
    {
        return Err(EngineError::InvalidChargeCombination {
            cation: cation_charge,
            anion: anion_charge,
        });
    }

    let c = cation_charge.unsigned_abs();
    let a = anion_charge.unsigned_abs();
    let g = gcd(c, a);
    Ok((a / g, c / g))
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balances_common_salts() {
        assert_eq!(balance(1, -1).unwrap(), (1, 1));
        assert_eq!(balance(1, -2).unwrap(), (2, 1));
        assert_eq!(balance(2, -3).unwrap(), (3, 2));
        assert_eq!(balance(2, -4).unwrap(), (2, 1));
        assert_eq!(balance(3, -1).unwrap(), (1, 3));
    }

    #[test]
    fn accepts_a_negative_first_argument_with_a_positive_second() {
        assert_eq!(balance(-2, 1).unwrap(), (1, 2));
    }

    #[test]
    fn rejects_same_sign_and_zero_charges() {
        for (c, a) in [(1, 1), (-1, -2), (0, -1), (1, 0), (0, 0)] {
            assert!(matches!(
                balance(c, a),
                Err(EngineError::InvalidChargeCombination { .. })
            ));
        }
    }

    #[test]
    fn result_is_neutral_and_minimal_for_all_small_charges() {
        for c in 1..=6 {
            for a in -6..=-1 {
                let (m, n) = balance(c, a).unwrap();
                assert_eq!(m as i32 * c + n as i32 * a, 0, "({}, {})", c, a);
                for m2 in 1..=m {
                    for n2 in 1..=n {
                        if (m2, n2) != (m, n) {
                            assert_ne!(m2 as i32 * c + n2 as i32 * a, 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn handles_extreme_charges_without_overflow() {
        assert_eq!(balance(i32::MAX, i32::MIN).unwrap().1, i32::MAX as u32);
    }
}
