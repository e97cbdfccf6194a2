use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
};

use crate::{
    AtomicSnowflakeGenerator, ConfigError, EPOCH_MILLIS, Error, GeneratorState, Identity,
    LockSnowflakeGenerator, MonotonicClock, Poll, SnowflakeGenerator, SnowflakeId, SystemClock,
    TimeSource,
};

/// 1000 ms after the snowflake epoch.
const T: u64 = 1_288_834_975_000;

struct FixedTime {
    millis: u64,
}

impl TimeSource for FixedTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    fn at(millis: u64) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicU64::new(millis),
        })
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Returns `millis` for the first `frozen_reads` reads, then `millis + 1`.
struct FrozenClock {
    millis: u64,
    frozen_reads: u64,
    reads: AtomicU64,
}

impl FrozenClock {
    fn new(millis: u64, frozen_reads: u64) -> Arc<Self> {
        Arc::new(Self {
            millis,
            frozen_reads,
            reads: AtomicU64::new(0),
        })
    }

    fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl TimeSource for FrozenClock {
    fn current_millis(&self) -> u64 {
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        if read < self.frozen_reads {
            self.millis
        } else {
            self.millis + 1
        }
    }
}

fn identity(worker_id: i64, datacenter_id: i64) -> Identity {
    Identity::new(worker_id, datacenter_id).unwrap()
}

fn run_worked_example<G>()
where
    G: SnowflakeGenerator<FixedTime>,
{
    let generator = G::new(identity(1, 1), FixedTime { millis: T });
    let id = generator.next_id().unwrap();
    assert_eq!(id.to_raw(), 4_194_439_168);
    assert_eq!(id.timestamp(), 1000);
    assert_eq!(id.sequence(), 0);
    assert_eq!(
        generator.state().unwrap(),
        GeneratorState {
            last_timestamp: Some(T),
            sequence: 0
        }
    );
}

fn run_id_sequence_increments_within_same_tick<G>()
where
    G: SnowflakeGenerator<FixedTime>,
{
    let generator = G::new(identity(3, 7), FixedTime { millis: T + 42 });

    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.next_id().unwrap();

    for id in [id1, id2, id3] {
        assert_eq!(id.timestamp(), 1042);
        assert_eq!(id.worker_id(), 3);
        assert_eq!(id.datacenter_id(), 7);
    }
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_rollover_blocks_until_clock_advances<G>()
where
    G: SnowflakeGenerator<Arc<FrozenClock>>,
{
    let total = SnowflakeId::MAX_SEQUENCE + 2;
    // Every call reads the clock once; the overflowing call needs one more.
    let clock = FrozenClock::new(T, total);
    let generator = G::new(identity(1, 1), Arc::clone(&clock));

    let mut seen = HashSet::new();
    for i in 0..=SnowflakeId::MAX_SEQUENCE {
        let id = generator.next_id().unwrap();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 1000);
        assert!(seen.insert(id));
    }

    let id = generator.next_id().unwrap();
    assert!(clock.reads() > total, "overflowing call must re-read the clock");
    assert_eq!(id.sequence(), 0);
    assert_eq!(id.timestamp(), 1001);
    assert!(seen.insert(id));
    assert_eq!(seen.len() as u64, total);
}

fn run_poll_pending_when_sequence_exhausted<G>()
where
    G: SnowflakeGenerator<Arc<ManualClock>>,
{
    let clock = ManualClock::at(T);
    let generator = G::new(identity(0, 0), Arc::clone(&clock));

    for i in 0..=SnowflakeId::MAX_SEQUENCE {
        match generator.poll_id().unwrap() {
            Poll::Ready { id } => assert_eq!(id.sequence(), i),
            Poll::Pending { yield_for } => panic!("unexpected pending (yield for: {yield_for})"),
        }
    }

    assert_eq!(generator.poll_id().unwrap(), Poll::Pending { yield_for: 1 });
    assert_eq!(
        generator.state().unwrap(),
        GeneratorState {
            last_timestamp: Some(T),
            sequence: SnowflakeId::MAX_SEQUENCE
        }
    );

    clock.set(T + 1);
    match generator.poll_id().unwrap() {
        Poll::Ready { id } => {
            assert_eq!(id.sequence(), 0);
            assert_eq!(id.timestamp(), 1001);
        }
        Poll::Pending { yield_for } => panic!("unexpected pending (yield for: {yield_for})"),
    }
}

fn run_clock_regression_is_reported_without_mutation<G>()
where
    G: SnowflakeGenerator<Arc<ManualClock>>,
{
    let clock = ManualClock::at(T);
    let generator = G::new(identity(2, 2), Arc::clone(&clock));

    let first = generator.next_id().unwrap();
    let before = generator.state().unwrap();

    clock.set(T - 1);
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { last: T, now: T - 1 })
    );
    assert_eq!(
        generator.poll_id(),
        Err(Error::ClockRegression { last: T, now: T - 1 })
    );
    assert_eq!(generator.state().unwrap(), before);

    clock.set(T);
    let second = generator.next_id().unwrap();
    assert_eq!(second.sequence(), 1);
    assert!(second > first);

    clock.set(T + 5);
    let third = generator.next_id().unwrap();
    assert_eq!(third.sequence(), 0);
    assert_eq!(third.timestamp(), 1005);
}

fn run_clock_before_epoch_is_rejected<G>()
where
    G: SnowflakeGenerator<FixedTime>,
{
    let generator = G::new(
        identity(0, 0),
        FixedTime {
            millis: EPOCH_MILLIS - 1,
        },
    );
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockBeforeEpoch {
            now: EPOCH_MILLIS - 1
        })
    );
    assert_eq!(generator.state().unwrap().last_timestamp, None);

    let generator = G::new(
        identity(0, 0),
        FixedTime {
            millis: EPOCH_MILLIS,
        },
    );
    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), 0);
    assert_eq!(id.to_raw(), 0);
}

fn run_initial_sequence<G>()
where
    G: SnowflakeGenerator<FixedTime>,
{
    let generator = G::with_sequence(identity(0, 0), 4095, FixedTime { millis: T }).unwrap();
    assert_eq!(
        generator.state().unwrap(),
        GeneratorState {
            last_timestamp: None,
            sequence: 4095
        }
    );
    // The first call always lands on a new tick.
    assert_eq!(generator.next_id().unwrap().sequence(), 0);

    assert!(matches!(
        G::with_sequence(identity(0, 0), 4096, FixedTime { millis: T }),
        Err(ConfigError::SequenceOutOfRange { sequence: 4096, .. })
    ));
}

fn run_generator_monotonic<G, C>(clock: C)
where
    G: SnowflakeGenerator<C>,
    C: TimeSource,
{
    const TOTAL_IDS: usize = 4096 * 16;

    let generator = G::new(identity(5, 9), clock);
    let mut last: Option<SnowflakeId> = None;

    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        assert_eq!(id.worker_id(), 5);
        assert_eq!(id.datacenter_id(), 9);
        if let Some(prev) = last {
            assert!(id > prev, "{id} must be greater than {prev}");
            if id.timestamp() == prev.timestamp() {
                assert_eq!(id.sequence(), prev.sequence() + 1);
            } else {
                assert_eq!(id.sequence(), 0);
            }
        }
        last = Some(id);
    }
}

fn run_bit_round_trip<G>()
where
    G: SnowflakeGenerator<SystemClock>,
{
    let generator = G::new(identity(17, 29), SystemClock);

    let before = SystemClock.current_millis() - EPOCH_MILLIS;
    let id = generator.next_id().unwrap();
    let after = SystemClock.current_millis() - EPOCH_MILLIS;

    let raw = id.to_raw();
    assert_eq!(raw & 0xFFF, id.sequence());
    assert_eq!((raw >> 12) & 0x1F, 17);
    assert_eq!((raw >> 17) & 0x1F, 29);
    let delta = raw >> 22;
    assert!(
        before <= delta && delta <= after,
        "{before} <= {delta} <= {after}"
    );
}

fn run_generator_threaded_unique<G>(generator: G)
where
    G: SnowflakeGenerator<MonotonicClock> + Sync,
{
    const THREADS: usize = 64;
    const IDS_PER_THREAD: usize = 2048;
    const TOTAL_IDS: usize = THREADS * IDS_PER_THREAD;

    let per_thread: Vec<Vec<SnowflakeId>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    let mut ids = Vec::with_capacity(IDS_PER_THREAD);
                    for _ in 0..IDS_PER_THREAD {
                        ids.push(generator.next_id().unwrap());
                    }
                    ids
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for ids in &per_thread {
        assert!(
            ids.windows(2).all(|w| w[0] < w[1]),
            "each caller must observe increasing ids"
        );
    }

    let seen: HashSet<_> = per_thread.into_iter().flatten().collect();
    assert_eq!(seen.len(), TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

type LockManual = LockSnowflakeGenerator<Arc<ManualClock>>;
type AtomicManual = AtomicSnowflakeGenerator<Arc<ManualClock>>;
type LockFrozen = LockSnowflakeGenerator<Arc<FrozenClock>>;
type AtomicFrozen = AtomicSnowflakeGenerator<Arc<FrozenClock>>;

#[test]
fn lock_generator_worked_example() {
    run_worked_example::<LockSnowflakeGenerator<FixedTime>>();
}

#[test]
fn atomic_generator_worked_example() {
    run_worked_example::<AtomicSnowflakeGenerator<FixedTime>>();
}

#[test]
fn lock_generator_sequence_test() {
    run_id_sequence_increments_within_same_tick::<LockSnowflakeGenerator<FixedTime>>();
}

#[test]
fn atomic_generator_sequence_test() {
    run_id_sequence_increments_within_same_tick::<AtomicSnowflakeGenerator<FixedTime>>();
}

#[test]
fn lock_generator_rollover_test() {
    run_rollover_blocks_until_clock_advances::<LockFrozen>();
}

#[test]
fn atomic_generator_rollover_test() {
    run_rollover_blocks_until_clock_advances::<AtomicFrozen>();
}

#[test]
fn lock_generator_pending_test() {
    run_poll_pending_when_sequence_exhausted::<LockManual>();
}

#[test]
fn atomic_generator_pending_test() {
    run_poll_pending_when_sequence_exhausted::<AtomicManual>();
}

#[test]
fn lock_generator_clock_regression() {
    run_clock_regression_is_reported_without_mutation::<LockManual>();
}

#[test]
fn atomic_generator_clock_regression() {
    run_clock_regression_is_reported_without_mutation::<AtomicManual>();
}

#[test]
fn lock_generator_before_epoch() {
    run_clock_before_epoch_is_rejected::<LockSnowflakeGenerator<FixedTime>>();
}

#[test]
fn atomic_generator_before_epoch() {
    run_clock_before_epoch_is_rejected::<AtomicSnowflakeGenerator<FixedTime>>();
}

#[test]
fn lock_generator_initial_sequence() {
    run_initial_sequence::<LockSnowflakeGenerator<FixedTime>>();
}

#[test]
fn atomic_generator_initial_sequence() {
    run_initial_sequence::<AtomicSnowflakeGenerator<FixedTime>>();
}

#[test]
fn lock_generator_system_clock_monotonic() {
    run_generator_monotonic::<LockSnowflakeGenerator<SystemClock>, _>(SystemClock);
}

#[test]
fn atomic_generator_system_clock_monotonic() {
    run_generator_monotonic::<AtomicSnowflakeGenerator<SystemClock>, _>(SystemClock);
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    run_generator_monotonic::<LockSnowflakeGenerator<MonotonicClock>, _>(MonotonicClock::new());
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    run_generator_monotonic::<AtomicSnowflakeGenerator<MonotonicClock>, _>(MonotonicClock::new());
}

#[test]
fn lock_generator_bit_round_trip() {
    run_bit_round_trip::<LockSnowflakeGenerator<SystemClock>>();
}

#[test]
fn atomic_generator_bit_round_trip() {
    run_bit_round_trip::<AtomicSnowflakeGenerator<SystemClock>>();
}

#[test]
fn lock_generator_threaded_unique() {
    run_generator_threaded_unique(LockSnowflakeGenerator::new(
        identity(0, 0),
        MonotonicClock::new(),
    ));
}

#[test]
fn atomic_generator_threaded_unique() {
    run_generator_threaded_unique(AtomicSnowflakeGenerator::new(
        identity(0, 0),
        MonotonicClock::new(),
    ));
}

#[test]
fn lock_generator_clones_share_state() {
    let clock = ManualClock::at(T);
    let generator = LockSnowflakeGenerator::new(identity(1, 1), Arc::clone(&clock));
    let clone = generator.clone();

    assert_eq!(generator.next_id().unwrap().sequence(), 0);
    assert_eq!(clone.next_id().unwrap().sequence(), 1);
    assert_eq!(generator.state().unwrap(), clone.state().unwrap());
}

#[test]
fn from_ids_validates_identity() {
    assert!(LockSnowflakeGenerator::from_ids(0, 0, SystemClock).is_ok());
    assert!(AtomicSnowflakeGenerator::from_ids(31, 31, SystemClock).is_ok());
    assert!(matches!(
        LockSnowflakeGenerator::from_ids(32, 0, SystemClock),
        Err(ConfigError::WorkerIdOutOfRange { worker_id: 32, .. })
    ));
    assert!(matches!(
        AtomicSnowflakeGenerator::from_ids(0, -1, SystemClock),
        Err(ConfigError::DatacenterIdOutOfRange {
            datacenter_id: -1,
            ..
        })
    ));
}

#[test]
fn separate_identities_never_collide_at_the_same_instant() {
    let a = LockSnowflakeGenerator::new(identity(0, 1), FixedTime { millis: T });
    let b = LockSnowflakeGenerator::new(identity(1, 0), FixedTime { millis: T });

    let ids_a: HashSet<_> = (0..100).map(|_| a.next_id().unwrap()).collect();
    let ids_b: HashSet<_> = (0..100).map(|_| b.next_id().unwrap()).collect();
    assert!(ids_a.is_disjoint(&ids_b));
}
