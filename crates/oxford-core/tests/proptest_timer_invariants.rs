//! Property tests for the timer queue and viewport clamping.

use oxford_core::{CancellationSource, TimerQueue, Viewport};
use proptest::prelude::*;
use web_time::Duration;

fn schedule_strategy() -> impl Strategy<Value = Vec<(u64, bool)>> {
    prop::collection::vec((0u64..5_000, any::<bool>()), 0..64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn pops_are_sorted_and_skip_cancelled(entries in schedule_strategy(), horizon in 0u64..6_000) {
        let mut queue = TimerQueue::new();
        let cancelled = CancellationSource::new();
        let mut expected_live = 0usize;
        for (idx, (deadline, cancel)) in entries.iter().enumerate() {
            let token = cancel.then(|| cancelled.token());
            queue.schedule(Duration::from_millis(*deadline), token, idx);
            if !cancel && *deadline <= horizon {
                expected_live += 1;
            }
        }
        cancelled.cancel();

        let mut last: Option<(Duration, usize)> = None;
        let mut fired = 0usize;
        while let Some((deadline, idx)) = queue.pop_due(Duration::from_millis(horizon)) {
            prop_assert!(deadline <= Duration::from_millis(horizon));
            prop_assert!(!entries[idx].1);
            if let Some((prev_deadline, prev_idx)) = last {
                prop_assert!(prev_deadline < deadline || (prev_deadline == deadline && prev_idx < idx));
            }
            last = Some((deadline, idx));
            fired += 1;
        }
        prop_assert_eq!(fired, expected_live);
    }

    #[test]
    fn clamped_origin_keeps_fitting_windows_inside(
        width in 300i32..2_000,
        height in 300i32..1_200,
        w in 50i32..300,
        h in 50i32..250,
        x in -3_000i32..3_000,
        y in -3_000i32..3_000,
    ) {
        let vp = Viewport::new(width, height);
        let (left, top) = vp.clamp_origin(x, y, w, h);
        prop_assert!(left >= 0 && left + w <= width);
        prop_assert!(top >= 0 && top + h <= height - oxford_core::TASKBAR_HEIGHT);
    }
}
