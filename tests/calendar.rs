use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use simkernel::{Error, EventCalendar, FifoQueue, Resource};

proptest! {
    #[test]
    fn removal_is_ordered_by_time_then_insertion(times in prop::collection::vec(0u8..20, 1..200)) {
        let mut calendar = EventCalendar::new();
        for (sequence, &time) in times.iter().enumerate() {
            calendar.schedule_at(sequence, f64::from(time)).unwrap();
        }

        let mut expected: Vec<(f64, usize)> =
            times.iter().enumerate().map(|(sequence, &time)| (f64::from(time), sequence)).collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut removed = Vec::with_capacity(times.len());
        while !calendar.is_empty() {
            let notice = calendar.remove().unwrap();
            prop_assert_eq!(notice.time(), calendar.current_time());
            removed.push((notice.time(), notice.into_kind()));
        }
        prop_assert_eq!(expected, removed);
        prop_assert_eq!(Err(Error::EmptyCalendar), calendar.remove());
    }

    #[test]
    fn fifo_queue_preserves_insertion_order(items in prop::collection::vec(any::<u32>(), 0..100)) {
        let mut queue = FifoQueue::new();
        for (time, &item) in items.iter().enumerate() {
            queue.add(item, time as f64);
        }
        prop_assert_eq!(items.len(), queue.len());

        let now = items.len() as f64;
        let mut drained = Vec::new();
        while let Ok(item) = queue.remove(now) {
            drained.push(item);
        }
        prop_assert_eq!(items, drained);
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn resource_never_overcommits(
        capacity in 1u32..5,
        requests in prop::collection::vec((any::<bool>(), 1u32..4), 0..100)
    ) {
        let mut resource = Resource::new(capacity);
        for (step, &(seize, units)) in requests.iter().enumerate() {
            let before = resource.busy();
            let now = step as f64;
            let granted = if seize { resource.seize(units, now) } else { resource.free(units, now) };

            if seize {
                prop_assert_eq!(granted, before + units <= capacity);
            } else {
                prop_assert_eq!(granted, units <= before);
            }
            prop_assert!(resource.busy() <= resource.capacity());
            prop_assert_eq!(resource.capacity(), resource.busy() + resource.available());
        }
    }
}

#[test]
fn clock_never_moves_backward_under_random_scheduling() {
    let mut rng = Pcg64::seed_from_u64(0x5EED_CA1E_17DA_0001);
    let mut calendar = EventCalendar::new();
    for _ in 0..10 {
        calendar.schedule_with_delay((), rng.random_range(0.0..5.0)).unwrap();
    }

    let mut last_time = calendar.current_time();
    let mut removed = 0;
    while let Ok(notice) = calendar.remove() {
        assert!(notice.time() >= last_time, "clock moved backward from {last_time} to {}", notice.time());
        last_time = notice.time();
        removed += 1;

        // keep the calendar busy for a while, sometimes at the current instant
        if removed < 5_000 {
            let delay = if rng.random_bool(0.1) { 0.0 } else { rng.random_range(0.0..5.0) };
            calendar.schedule_with_delay((), delay).unwrap();
        }
        let past = calendar.current_time() - 1.0;
        assert!(
            matches!(calendar.schedule_at((), past), Err(Error::BackInTime { .. })),
            "scheduling into the past should be refused"
        );
    }
    assert_eq!(5_009, removed, "every scheduled notice should come back out exactly once");
}
