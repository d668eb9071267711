use crate::domain::ports::HostRotation;
use rand::Rng;

/// Starts each untargeted call at a uniformly random host.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngRotation;

impl HostRotation for ThreadRngRotation {
    fn start_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always starts at the same position. Used where failover order must be
/// reproducible.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedRotation(pub usize);

impl HostRotation for FixedRotation {
    fn start_index(&self, len: usize) -> usize {
        self.0 % len
    }
}
