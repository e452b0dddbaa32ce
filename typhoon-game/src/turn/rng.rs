//! Deterministic per-turn RNG streams.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

type HmacSha256 = Hmac<Sha256>;

/// Deterministic bundle of RNG streams segregated by simulation domain.
///
/// A fresh bundle is derived for every turn from `(seed, turn)`, so a session
/// replays identically from its initial state and the submitted choice ids.
#[derive(Debug, Clone)]
pub struct RngBundle<R = SmallRng> {
    alerts: RefCell<CountingRng<R>>,
    evacuation: RefCell<CountingRng<R>>,
    family: RefCell<CountingRng<R>>,
    disaster: RefCell<CountingRng<R>>,
    selection: RefCell<CountingRng<R>>,
}

impl RngBundle<SmallRng> {
    /// Construct the bundle for one turn of a seeded session.
    #[must_use]
    pub fn for_turn(seed: u64, turn: u32) -> Self {
        let stream = |tag: &[u8]| {
            RefCell::new(CountingRng::new(SmallRng::seed_from_u64(
                derive_stream_seed(seed, turn, tag),
            )))
        };
        Self {
            alerts: stream(b"alerts"),
            evacuation: stream(b"evacuation"),
            family: stream(b"family"),
            disaster: stream(b"disaster"),
            selection: stream(b"selection"),
        }
    }
}

impl<R: rand::RngCore + Clone> RngBundle<R> {
    /// Use copies of one generator for every stream.
    ///
    /// Mostly useful with stepped generators that pin probability branches.
    #[must_use]
    pub fn uniform(rng: R) -> Self {
        let stream = || RefCell::new(CountingRng::new(rng.clone()));
        Self {
            alerts: stream(),
            evacuation: stream(),
            family: stream(),
            disaster: stream(),
            selection: stream(),
        }
    }
}

impl<R: rand::RngCore> RngBundle<R> {
    /// Access the alert ladder RNG stream.
    #[must_use]
    pub fn alerts(&self) -> RefMut<'_, CountingRng<R>> {
        self.alerts.borrow_mut()
    }

    /// Access the evacuation RNG stream.
    #[must_use]
    pub fn evacuation(&self) -> RefMut<'_, CountingRng<R>> {
        self.evacuation.borrow_mut()
    }

    /// Access the family tracker RNG stream.
    #[must_use]
    pub fn family(&self) -> RefMut<'_, CountingRng<R>> {
        self.family.borrow_mut()
    }

    /// Access the disaster gate RNG stream.
    #[must_use]
    pub fn disaster(&self) -> RefMut<'_, CountingRng<R>> {
        self.disaster.borrow_mut()
    }

    /// Access the choice selection RNG stream.
    #[must_use]
    pub fn selection(&self) -> RefMut<'_, CountingRng<R>> {
        self.selection.borrow_mut()
    }

    /// Total draws across every stream.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        [
            &self.alerts,
            &self.evacuation,
            &self.family,
            &self.disaster,
            &self.selection,
        ]
        .iter()
        .map(|cell| cell.borrow().draws())
        .sum()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R: rand::RngCore> CountingRng<R> {
    const fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, turn: u32, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so this branch is unreachable in practice.
    let Ok(mut mac) = HmacSha256::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ u64::from(turn);
    };
    mac.update(&turn.to_le_bytes());
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
