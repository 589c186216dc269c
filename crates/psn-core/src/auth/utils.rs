use rand::{thread_rng, Rng};

/// Random per-session correlation id sent with token exchanges.
pub(crate) fn correlation_id() -> String {
    let mut rng = thread_rng();
    format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>())
}
