//! Builder that wires a configuration to a workload and an engine.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

use crate::config::Config;
use crate::crypto::{fixture, OaepOracle, PrivateKey};
use crate::driver::Driver;
use crate::error::Error;
use crate::measurement::TimerSpec;
use crate::workload::{LeftPadWorkload, MangerWorkload, PadRoutine};

const DRIVER_STREAM: u64 = 0;
const WORKLOAD_STREAM: u64 = 1;
const ORACLE_STREAM: u64 = 2;

/// Entry point for a leak-detection run.
///
/// ```ignore
/// use ctprobe::{Detector, StopCondition};
///
/// let mut driver = Detector::quick().seed(1).manger_test_key()?;
/// driver.run(&StopCondition::Rounds(10), |report| println!("{report:?}"))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: Config,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// See [`Config::strict`].
    pub fn strict() -> Self {
        Self::with_config(Config::strict())
    }

    /// See [`Config::quick`].
    pub fn quick() -> Self {
        Self::with_config(Config::quick())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn measurements_per_round(mut self, n: usize) -> Self {
        self.config = self.config.measurements_per_round(n);
        self
    }

    pub fn percentile_count(mut self, count: usize) -> Self {
        self.config = self.config.percentile_count(count);
        self
    }

    pub fn enough_measurements(mut self, n: u64) -> Self {
        self.config = self.config.enough_measurements(n);
        self
    }

    pub fn second_order_after(mut self, n: u64) -> Self {
        self.config = self.config.second_order_after(n);
        self
    }

    pub fn t_threshold_bananas(mut self, t: f64) -> Self {
        self.config = self.config.t_threshold_bananas(t);
        self
    }

    pub fn t_threshold_moderate(mut self, t: f64) -> Self {
        self.config = self.config.t_threshold_moderate(t);
        self
    }

    pub fn timer(mut self, timer: TimerSpec) -> Self {
        self.config = self.config.timer(timer);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.seed(seed);
        self
    }

    pub fn blinding(mut self, blinding: bool) -> Self {
        self.config = self.config.blinding(blinding);
        self
    }

    pub fn check_crt(mut self, check: bool) -> Self {
        self.config = self.config.check_crt(check);
        self
    }

    pub fn message_len(mut self, len: usize) -> Self {
        self.config = self.config.message_len(len);
        self
    }

    pub fn label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.config = self.config.label(label);
        self
    }

    // =========================================================================
    // Workloads
    // =========================================================================

    /// Probe OAEP decryption under `key` with Manger-style inputs.
    pub fn manger(&self, key: PrivateKey) -> Result<Driver<MangerWorkload>, Error> {
        let oracle = OaepOracle::new(key, self.rng(ORACLE_STREAM))
            .inspect_err(|err| error!(%err, "subject key rejected"))?
            .with_label(self.config.label.clone())
            .with_blinding(self.config.blinding)
            .with_check_crt(self.config.check_crt);

        let workload =
            MangerWorkload::new(oracle, self.rng(WORKLOAD_STREAM), self.config.message_len)?;
        info!(
            bits = workload.oracle().key().public_key().n().bits(),
            blinding = self.config.blinding,
            check_crt = self.config.check_crt,
            "manger workload ready"
        );
        Ok(self.driver(workload))
    }

    /// [`manger`](Self::manger) with the built-in 2048-bit test key.
    pub fn manger_test_key(&self) -> Result<Driver<MangerWorkload>, Error> {
        let key = fixture::test_key_2048()
            .inspect_err(|err| error!(%err, "built-in test key failed validation"))?;
        self.manger(key)
    }

    /// Time left-padding of full-width against one-byte-short buffers.
    pub fn left_pad(&self) -> Driver<LeftPadWorkload> {
        self.driver(LeftPadWorkload::new(self.rng(WORKLOAD_STREAM)))
    }

    /// [`left_pad`](Self::left_pad) with the masked byte-wise copy timed instead.
    pub fn left_pad_const(&self) -> Driver<LeftPadWorkload> {
        self.driver(LeftPadWorkload::new(self.rng(WORKLOAD_STREAM)).routine(PadRoutine::Masked))
    }

    fn driver<W: crate::workload::Workload>(&self, workload: W) -> Driver<W> {
        Driver::new(workload, &self.config, self.rng(DRIVER_STREAM))
    }

    /// Independent random stream `stream`, reproducible under a seed.
    fn rng(&self, stream: u64) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_os_rng(),
        }
    }
}
