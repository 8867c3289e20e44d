//! The ABO/Rh transfusion compatibility table.

use crate::models::BloodGroup;

/// The blood groups that may donate to `recipient`, per standard ABO/Rh
/// transfusion rules: same type is always compatible, O- donates to anyone,
/// AB+ receives from anyone, and Rh-negative donors are compatible with the
/// matching Rh-positive recipient.
///
/// Total over the enum; the slices are the fixed table, in table order.
pub fn compatible_donor_groups(recipient: BloodGroup) -> &'static [BloodGroup] {
    use BloodGroup::*;
    match recipient {
        APositive => &[APositive, ANegative, OPositive, ONegative],
        ANegative => &[ANegative, ONegative],
        BPositive => &[BPositive, BNegative, OPositive, ONegative],
        BNegative => &[BNegative, ONegative],
        AbPositive => &[
            APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive,
            ONegative,
        ],
        AbNegative => &[ANegative, BNegative, AbNegative, ONegative],
        OPositive => &[OPositive, ONegative],
        ONegative => &[ONegative],
    }
}

/// Whether `donor` may donate to `recipient`.
///
/// Defined as membership in the table row, so the two entry points cannot
/// drift apart.
pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> bool {
    compatible_donor_groups(recipient).contains(&donor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BloodGroup::*;

    #[test]
    fn test_table_rows() {
        assert_eq!(
            compatible_donor_groups(APositive),
            &[APositive, ANegative, OPositive, ONegative]
        );
        assert_eq!(compatible_donor_groups(ANegative), &[ANegative, ONegative]);
        assert_eq!(
            compatible_donor_groups(BPositive),
            &[BPositive, BNegative, OPositive, ONegative]
        );
        assert_eq!(compatible_donor_groups(BNegative), &[BNegative, ONegative]);
        assert_eq!(compatible_donor_groups(AbPositive), &BloodGroup::ALL);
        assert_eq!(
            compatible_donor_groups(AbNegative),
            &[ANegative, BNegative, AbNegative, ONegative]
        );
        assert_eq!(compatible_donor_groups(OPositive), &[OPositive, ONegative]);
        assert_eq!(compatible_donor_groups(ONegative), &[ONegative]);
    }

    #[test]
    fn test_universal_donor_and_recipient() {
        for group in BloodGroup::ALL {
            assert!(can_donate(ONegative, group), "O- must donate to {group}");
            assert!(can_donate(group, AbPositive), "AB+ must receive from {group}");
        }
    }

    #[test]
    fn test_rh_barrier() {
        // Rh-positive donors never donate to Rh-negative recipients.
        for donor in BloodGroup::ALL.into_iter().filter(|g| g.is_rh_positive()) {
            for recipient in BloodGroup::ALL.into_iter().filter(|g| !g.is_rh_positive()) {
                assert!(!can_donate(donor, recipient), "{donor} -> {recipient}");
            }
        }
    }

    #[test]
    fn test_can_donate_spot_checks() {
        assert!(can_donate(ONegative, ONegative));
        assert!(can_donate(ANegative, AbNegative));
        assert!(!can_donate(AbPositive, ONegative));
        assert!(!can_donate(APositive, BPositive));
    }
}
