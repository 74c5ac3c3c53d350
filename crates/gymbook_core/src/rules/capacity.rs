//! Capacity admission guard.

/// Returns whether one more active enrollment fits.
///
/// Must be fed a count read inside the admission transaction.
pub fn has_room(active_count: u32, capacity: u32) -> bool {
    active_count < capacity
}

/// Free slots for display. Never used for admission.
pub fn available_slots(active_count: u32, capacity: u32) -> u32 {
    capacity.saturating_sub(active_count)
}

#[cfg(test)]
mod tests {
    use super::{available_slots, has_room};
    use rstest::rstest;

    #[rstest]
    #[case(0, 1, true)]
    #[case(0, 0, false)]
    #[case(19, 20, true)]
    #[case(20, 20, false)]
    #[case(25, 20, false)]
    fn room_means_strictly_below_capacity(
        #[case] active: u32,
        #[case] capacity: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(has_room(active, capacity), expected);
    }

    #[test]
    fn available_slots_never_underflow() {
        assert_eq!(available_slots(3, 10), 7);
        assert_eq!(available_slots(10, 10), 0);
        assert_eq!(available_slots(12, 10), 0);
    }
}
