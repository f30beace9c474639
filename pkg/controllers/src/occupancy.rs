use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use pkg_constants::presence::DEFAULT_CHECK_INTERVAL_SECS;
use pkg_daylight::{DaylightSource, check_darkness};
use pkg_lights::LightSwitch;
use pkg_presence::leases::latest_by_hardware_id;
use pkg_presence::{default_window, read_leases, recently_arrived};
use pkg_types::occupancy::{Effect, OccupancyState, Signals};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Result of one occupancy transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: OccupancyState,
    pub effects: Vec<Effect>,
}

/// Pure occupancy transition.
///
/// - Unoccupied + arrived → Occupied, plus `LightOn` when it is dark.
/// - Occupied + nobody arrived + daylight → Unoccupied.
/// - Anything else keeps the state. Occupied + dark never vacates.
pub fn step(state: OccupancyState, signals: Signals) -> Transition {
    match (state, signals.arrived, signals.dark) {
        (OccupancyState::Unoccupied, true, dark) => Transition {
            next: OccupancyState::Occupied,
            effects: if dark == Some(true) {
                vec![Effect::LightOn]
            } else {
                vec![]
            },
        },
        (OccupancyState::Occupied, false, Some(false)) => Transition {
            next: OccupancyState::Unoccupied,
            effects: vec![],
        },
        _ => Transition {
            next: state,
            effects: vec![],
        },
    }
}

/// Settings the occupancy loop needs.
#[derive(Debug, Clone)]
pub struct OccupancyConfig {
    pub leases_file: PathBuf,
    /// Tracked hardware ids; empty tracks every device.
    pub tracked: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub arrival_window: TimeDelta,
    pub check_interval: Duration,
}

impl OccupancyConfig {
    pub fn new(
        leases_file: impl Into<PathBuf>,
        tracked: Vec<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            leases_file: leases_file.into(),
            tracked,
            latitude,
            longitude,
            arrival_window: default_window(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

/// Controller that watches DHCP leases and switches the porch light on when
/// somebody comes home after dark.
pub struct OccupancyController {
    config: OccupancyConfig,
    daylight: Arc<dyn DaylightSource>,
    light: Arc<dyn LightSwitch>,
    state: OccupancyState,
}

impl OccupancyController {
    pub fn new(
        config: OccupancyConfig,
        daylight: Arc<dyn DaylightSource>,
        light: Arc<dyn LightSwitch>,
    ) -> Self {
        Self {
            config,
            daylight,
            light,
            state: OccupancyState::default(),
        }
    }

    pub fn state(&self) -> OccupancyState {
        self.state
    }

    /// Start the controller loop as a background task.
    pub fn start(mut self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "OccupancyController started (interval={}s, leases={}, tracked={}, light={})",
                self.config.check_interval.as_secs(),
                self.config.leases_file.display(),
                self.config.tracked.len(),
                self.light.name()
            );
            let mut interval = tokio::time::interval(self.config.check_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let now = Utc::now().naive_utc();
                if let Err(e) = self.reconcile(now).await {
                    warn!("OccupancyController reconcile error: {:#}", e);
                }
            }
        })
    }

    /// One tick at `now` (naive UTC).
    ///
    /// The daylight service is only consulted when the transition depends
    /// on it. A failure before the transition leaves the state untouched.
    pub async fn reconcile(&mut self, now: NaiveDateTime) -> Result<()> {
        let leases = read_leases(&self.config.leases_file, &self.config.tracked).await?;
        let arrived = recently_arrived(now, &leases, self.config.arrival_window);

        for entry in latest_by_hardware_id(&leases) {
            debug!(
                "Device {} ({}) last seen {}",
                entry.hardware_id, entry.address, entry.last_transaction_time
            );
        }

        let dark = if self.state.needs_darkness(arrived) {
            Some(
                check_darkness(
                    self.daylight.as_ref(),
                    now,
                    self.config.latitude,
                    self.config.longitude,
                )
                .await?,
            )
        } else {
            None
        };

        let transition = step(self.state, Signals { arrived, dark });
        match (self.state, transition.next) {
            (OccupancyState::Unoccupied, OccupancyState::Occupied) => {
                info!("Someone just came home (dark={:?})", dark);
            }
            (OccupancyState::Occupied, OccupancyState::Unoccupied) => {
                info!("Nobody arrived recently and it is light out, assuming home is empty");
            }
            _ => {
                debug!(
                    "Nothing happened (state={}, arrived={}, dark={:?})",
                    self.state, arrived, dark
                );
            }
        }
        self.state = transition.next;

        for effect in transition.effects {
            debug!("Applying {} (state={})", effect, self.state);
            self.apply(effect).await?;
        }
        Ok(())
    }

    async fn apply(&self, effect: Effect) -> Result<()> {
        match effect {
            Effect::LightOn => {
                info!("It's dark, turning the light on ({})", self.light.name());
                self.light.turn_on().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pkg_types::daylight::DarkInterval;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PHONE: &str = "a4:5e:60:d2:11:0b";

    // --- step ---

    fn signals(arrived: bool, dark: Option<bool>) -> Signals {
        Signals { arrived, dark }
    }

    #[test]
    fn test_arrival_in_the_dark_turns_light_on() {
        let t = step(OccupancyState::Unoccupied, signals(true, Some(true)));
        assert_eq!(t.next, OccupancyState::Occupied);
        assert_eq!(t.effects, vec![Effect::LightOn]);
    }

    #[test]
    fn test_arrival_in_daylight_only_occupies() {
        let t = step(OccupancyState::Unoccupied, signals(true, Some(false)));
        assert_eq!(t.next, OccupancyState::Occupied);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_vacate_in_daylight_without_light_call() {
        let t = step(OccupancyState::Occupied, signals(false, Some(false)));
        assert_eq!(t.next, OccupancyState::Unoccupied);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_occupied_stays_when_dark() {
        let t = step(OccupancyState::Occupied, signals(false, Some(true)));
        assert_eq!(t.next, OccupancyState::Occupied);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_idle_combinations_are_noops() {
        for (state, sig) in [
            (OccupancyState::Unoccupied, signals(false, None)),
            (OccupancyState::Unoccupied, signals(false, Some(true))),
            (OccupancyState::Occupied, signals(true, None)),
            (OccupancyState::Occupied, signals(true, Some(true))),
            (OccupancyState::Occupied, signals(false, None)),
        ] {
            let t = step(state, sig);
            assert_eq!(t.next, state, "{:?} with {:?}", state, sig);
            assert!(t.effects.is_empty());
        }
    }

    // --- controller ---

    struct FakeDaylight {
        interval: Mutex<DarkInterval>,
        lookups: AtomicUsize,
    }

    impl FakeDaylight {
        fn new(interval: DarkInterval) -> Arc<Self> {
            Arc::new(Self {
                interval: Mutex::new(interval),
                lookups: AtomicUsize::new(0),
            })
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl DaylightSource for FakeDaylight {
        async fn dark_interval(&self, _latitude: f64, _longitude: f64) -> Result<DarkInterval> {
            self.lookups.fetch_add(1, Ordering::Relaxed);
            Ok(*self.interval.lock().unwrap())
        }
    }

    struct FailingDaylight;

    #[async_trait]
    impl DaylightSource for FailingDaylight {
        async fn dark_interval(&self, _latitude: f64, _longitude: f64) -> Result<DarkInterval> {
            anyhow::bail!("daylight service unreachable")
        }
    }

    #[derive(Default)]
    struct RecordingLight {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingLight {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LightSwitch for RecordingLight {
        fn name(&self) -> &str {
            "recording"
        }

        async fn turn_on(&self) -> Result<()> {
            self.calls.lock().unwrap().push("on");
            Ok(())
        }

        async fn turn_off(&self) -> Result<()> {
            self.calls.lock().unwrap().push("off");
            Ok(())
        }
    }

    fn day(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    /// Dark before 00:30 and after 21:00.
    fn may_night() -> DarkInterval {
        DarkInterval {
            dark_begin: day(21, 0),
            dark_end: day(0, 30),
        }
    }

    fn lease_log(cltt: NaiveDateTime) -> String {
        format!(
            "lease 192.168.0.10 {{\n  cltt 2 {};\n  hardware ethernet {};\n}}\n\
             lease 192.168.0.12 {{\n  cltt 2 {};\n  hardware ethernet b8:27:eb:4f:90:21;\n}}\n",
            cltt.format("%Y/%m/%d %H:%M:%S"),
            PHONE,
            cltt.format("%Y/%m/%d %H:%M:%S"),
        )
    }

    fn tmp_leases(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "porch-occupancy-{}-{:?}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            std::thread::current().id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn controller(
        leases: &Path,
        daylight: Arc<dyn DaylightSource>,
        light: Arc<RecordingLight>,
    ) -> OccupancyController {
        let config =
            OccupancyConfig::new(leases.to_path_buf(), vec![PHONE.to_string()], 60.17, 24.94);
        OccupancyController::new(config, daylight, light)
    }

    #[tokio::test]
    async fn test_arrival_after_dark_switches_light_once() {
        let path = tmp_leases(&lease_log(day(22, 0)));
        let daylight = FakeDaylight::new(may_night());
        let light = Arc::new(RecordingLight::default());
        let mut ctl = controller(&path, daylight.clone(), light.clone());

        ctl.reconcile(day(22, 2)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Occupied);
        assert_eq!(light.calls(), vec!["on"]);
        assert_eq!(daylight.lookups(), 1);

        // Still inside the window: occupied + arrived is idle, no lookup.
        ctl.reconcile(day(22, 4)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Occupied);
        assert_eq!(light.calls(), vec!["on"]);
        assert_eq!(daylight.lookups(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_stays_occupied_through_the_night_and_vacates_by_day() {
        let path = tmp_leases(&lease_log(day(22, 0)));
        let daylight = FakeDaylight::new(may_night());
        let light = Arc::new(RecordingLight::default());
        let mut ctl = controller(&path, daylight.clone(), light.clone());

        ctl.reconcile(day(22, 1)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Occupied);

        // Window passed but it is dark: ambiguous, keep state.
        ctl.reconcile(day(23, 30)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Occupied);

        // Next day at noon the darkness check says light.
        *daylight.interval.lock().unwrap() = DarkInterval {
            dark_begin: day(21, 0) + TimeDelta::days(1),
            dark_end: day(0, 30) + TimeDelta::days(1),
        };
        ctl.reconcile(day(12, 0) + TimeDelta::days(1)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Unoccupied);
        assert_eq!(light.calls(), vec!["on"]);
        assert_eq!(daylight.lookups(), 3);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_idle_unoccupied_tick_skips_daylight_lookup() {
        let path = tmp_leases(&lease_log(day(10, 0)));
        let daylight = FakeDaylight::new(may_night());
        let light = Arc::new(RecordingLight::default());
        let mut ctl = controller(&path, daylight.clone(), light.clone());

        ctl.reconcile(day(23, 0)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Unoccupied);
        assert_eq!(daylight.lookups(), 0);
        assert!(light.calls().is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_untracked_device_does_not_count() {
        let log = format!(
            "lease 192.168.0.12 {{\n  cltt 2 {};\n  hardware ethernet b8:27:eb:4f:90:21;\n}}\n",
            day(22, 0).format("%Y/%m/%d %H:%M:%S")
        );
        let path = tmp_leases(&log);
        let daylight = FakeDaylight::new(may_night());
        let light = Arc::new(RecordingLight::default());
        let mut ctl = controller(&path, daylight.clone(), light.clone());

        ctl.reconcile(day(22, 1)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Unoccupied);
        assert!(light.calls().is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_failed_tick_keeps_state() {
        let light = Arc::new(RecordingLight::default());
        let missing = PathBuf::from("/nonexistent/porch/dhcpd.leases");
        let mut ctl = controller(&missing, FakeDaylight::new(may_night()), light.clone());
        assert!(ctl.reconcile(day(22, 0)).await.is_err());
        assert_eq!(ctl.state(), OccupancyState::Unoccupied);

        let path = tmp_leases(&lease_log(day(22, 0)));
        let mut ctl = controller(&path, Arc::new(FailingDaylight), light.clone());
        let err = ctl.reconcile(day(22, 1)).await.unwrap_err();
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(ctl.state(), OccupancyState::Unoccupied);
        assert!(light.calls().is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[derive(Default)]
    struct FailingLight {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl LightSwitch for FailingLight {
        fn name(&self) -> &str {
            "failing"
        }

        async fn turn_on(&self) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            anyhow::bail!("gateway refused the command")
        }

        async fn turn_off(&self) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            anyhow::bail!("gateway refused the command")
        }
    }

    #[tokio::test]
    async fn test_failed_light_command_keeps_occupied_without_retry() {
        let path = tmp_leases(&lease_log(day(22, 0)));
        let light = Arc::new(FailingLight::default());
        let config = OccupancyConfig::new(path.clone(), vec![PHONE.to_string()], 60.17, 24.94);
        let mut ctl =
            OccupancyController::new(config, FakeDaylight::new(may_night()), light.clone());

        let err = ctl.reconcile(day(22, 1)).await.unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert_eq!(ctl.state(), OccupancyState::Occupied);
        assert_eq!(light.attempts.load(Ordering::Relaxed), 1);

        // Next tick inside the window is idle: no second attempt.
        ctl.reconcile(day(22, 3)).await.unwrap();
        assert_eq!(ctl.state(), OccupancyState::Occupied);
        assert_eq!(light.attempts.load(Ordering::Relaxed), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_started_loop_turns_light_on() {
        let now = Utc::now().naive_utc();
        let path = tmp_leases(&lease_log(now));
        let always_dark = DarkInterval {
            dark_begin: now - TimeDelta::days(1),
            dark_end: now + TimeDelta::days(1),
        };
        let light = Arc::new(RecordingLight::default());
        let mut config = OccupancyConfig::new(path.clone(), vec![PHONE.to_string()], 60.17, 24.94);
        config.check_interval = Duration::from_millis(10);
        let handle =
            OccupancyController::new(config, FakeDaylight::new(always_dark), light.clone()).start();

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();
        assert_eq!(light.calls(), vec!["on"]);

        let _ = std::fs::remove_file(path);
    }
}
