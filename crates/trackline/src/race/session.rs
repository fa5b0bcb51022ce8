//! Race lifecycle around the orchestrator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use trackline_core::EntityId;
use trackline_shared::{RaceSnapshot, RaceStatus};

use super::field;
use crate::config::{RaceConfig, SimConfig};
use crate::error::{SimError, SimResult};
use crate::events::{EventBus, EventReceiver, RaceEvent};
use crate::orchestrator::Orchestrator;
use crate::path::PathProvider;
use crate::systems::TickInput;
use crate::timestep::FixedStep;

/// One line of the finish order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaceResult {
    /// Who finished.
    pub runner: EntityId,
    /// Race clock at the finish (seconds).
    pub finish_time: f32,
    /// Finishing place, 1-based.
    pub place: u32,
}

/// Coarse state for menus and HUDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// No field set up.
    Idle,
    /// Field lined up, waiting for the start.
    Ready,
    /// Countdown or race in progress.
    Racing,
    /// Everybody finished.
    Results,
}

/// A race: field, formation, countdown, clock, finish order.
///
/// `update` is called once per rendered frame with the frame delta. The
/// session turns it into zero or more orchestrator ticks depending on status
/// and the configured timestep.
pub struct RaceSession {
    orchestrator: Orchestrator,
    race: RaceConfig,
    status: RaceStatus,
    countdown: f32,
    elapsed: f32,
    paused: bool,
    results: Vec<RaceResult>,
    timestep: Option<FixedStep>,
    events: EventBus,
    /// Formation jitter.
    rng: ChaCha8Rng,
}

impl RaceSession {
    /// Generates a field from `config`, lines it up and maps it onto the path.
    ///
    /// # Errors
    ///
    /// - [`SimError::Config`] if the config does not validate.
    /// - [`SimError::Core`] if field generation or store setup fails.
    pub fn new(config: &SimConfig, provider: Box<dyn PathProvider>) -> SimResult<Self> {
        config.validate()?;
        let race = &config.race;
        let mut rng = ChaCha8Rng::seed_from_u64(config.store.seed);

        let profiles = field::generate_field(
            race.runner_count,
            config.store.segments,
            race.distance,
            &mut rng,
        )?;

        let mut orchestrator = Orchestrator::from_config(config);
        orchestrator.set_path_provider(provider);
        for (i, profile) in profiles.iter().enumerate() {
            let is_primary = race.primary_runner == Some(i);
            orchestrator.add_runner(profile, 1.0, is_primary)?;
        }
        debug!(runners = profiles.len(), "field generated");

        let mut session = Self::with_orchestrator(orchestrator, race.clone(), rng);
        session.line_up()?;
        Ok(session)
    }

    /// Wraps an orchestrator that already holds a field.
    ///
    /// Runners are not moved; call [`reset_heat`](Self::reset_heat) to put
    /// them in formation.
    #[must_use]
    pub fn with_orchestrator(orchestrator: Orchestrator, race: RaceConfig, rng: ChaCha8Rng) -> Self {
        let timestep = race
            .fixed_step
            .map(|step| FixedStep::new(step, FixedStep::DEFAULT_MAX_STEPS));
        let events = EventBus::new(race.event_capacity);
        let results = Vec::with_capacity(orchestrator.store().capacity());
        Self {
            orchestrator,
            countdown: race.countdown,
            race,
            status: RaceStatus::NotStarted,
            elapsed: 0.0,
            paused: false,
            results,
            timestep,
            events,
            rng,
        }
    }

    /// Starts the countdown. Returns `false` unless the race was waiting.
    pub fn start(&mut self) -> bool {
        if self.status != RaceStatus::NotStarted {
            return false;
        }
        self.status = RaceStatus::Countdown;
        self.countdown = self.race.countdown;
        info!(seconds = self.countdown, "countdown started");
        self.events.emit(RaceEvent::CountdownStarted {
            seconds: self.countdown,
        });
        true
    }

    /// Advances the session by one rendered frame.
    ///
    /// The delta is clamped to `max_frame_delta`, then either used directly
    /// for one step or fed to the fixed timestep. Returns the number of
    /// orchestrator steps taken (countdown steps included).
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidTickInput`] for a negative or non-finite delta;
    /// otherwise whatever the orchestrator reports.
    pub fn update(&mut self, frame_delta: f32) -> SimResult<u32> {
        if !frame_delta.is_finite() || frame_delta < 0.0 {
            return Err(SimError::InvalidTickInput(
                "frame delta must be finite and non-negative",
            ));
        }
        if self.paused || frame_delta <= 0.0 {
            return Ok(0);
        }

        let delta = frame_delta.min(self.race.max_frame_delta);
        let Some(timestep) = self.timestep.as_mut() else {
            self.step(delta)?;
            return Ok(1);
        };

        let steps = timestep.advance(delta);
        let step = timestep.step();
        for _ in 0..steps {
            self.step(step)?;
        }
        Ok(steps)
    }

    fn step(&mut self, delta: f32) -> SimResult<()> {
        match self.status {
            RaceStatus::NotStarted => {}

            RaceStatus::Countdown => {
                self.countdown -= delta;
                if self.countdown <= 0.0 {
                    self.countdown = 0.0;
                    self.status = RaceStatus::Racing;
                    info!("race started");
                    self.events.emit(RaceEvent::RaceStarted);
                }
            }

            RaceStatus::Racing => {
                let input = self.tick_input(delta);
                self.orchestrator.tick(input)?;
                self.elapsed += delta * self.race.time_scale;
                self.record_finishers();

                if self.results.len() >= self.orchestrator.store().active_count() {
                    self.status = RaceStatus::Finished;
                    info!(elapsed = self.elapsed, "race finished");
                    self.events.emit(RaceEvent::RaceFinished {
                        elapsed: self.elapsed,
                    });
                }
            }

            // Keeps ticking for the cooldown jog; the clock is stopped.
            RaceStatus::Finished => {
                let input = self.tick_input(delta);
                self.orchestrator.tick(input)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn record_finishers(&mut self) {
        for &runner in self.orchestrator.finished_this_tick() {
            let place = self.results.len() as u32 + 1;
            let result = RaceResult {
                runner,
                finish_time: self.elapsed,
                place,
            };
            self.results.push(result);
            info!(%runner, place, finish_time = self.elapsed, "runner finished");
            self.events.emit(RaceEvent::RunnerFinished {
                runner,
                finish_time: self.elapsed,
                place,
            });
        }
    }

    const fn tick_input(&self, delta: f32) -> TickInput {
        TickInput::new(delta, self.race.distance, self.race.time_scale)
    }

    /// Puts every runner in start formation and maps them onto the path.
    #[allow(clippy::cast_possible_truncation)]
    fn line_up(&mut self) -> SimResult<()> {
        let count = self.orchestrator.store().active_count();
        for i in 0..count {
            let (distance, lane) = field::formation(i, self.race.formation_spread, &mut self.rng);
            self.orchestrator
                .reset_runner(EntityId::new(i as u32), distance, lane);
        }
        self.orchestrator.refresh_world()
    }

    /// Starts a new heat with the same field: formation, cleared results,
    /// clock and countdown reset.
    ///
    /// # Errors
    ///
    /// [`SimError::MissingPathProvider`] if the orchestrator has no provider.
    pub fn reset_heat(&mut self) -> SimResult<()> {
        self.status = RaceStatus::NotStarted;
        self.countdown = self.race.countdown;
        self.elapsed = 0.0;
        self.paused = false;
        self.results.clear();
        if let Some(timestep) = self.timestep.as_mut() {
            timestep.reset();
        }
        self.line_up()?;
        info!("heat reset");
        self.events.emit(RaceEvent::HeatReset);
        Ok(())
    }

    /// Freezes the session; `update` becomes a no-op.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("session paused");
        }
        self.paused = true;
    }

    /// Unfreezes the session.
    pub fn resume(&mut self) {
        if self.paused {
            debug!("session resumed");
        }
        self.paused = false;
    }

    /// True while paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Race status.
    #[must_use]
    pub const fn status(&self) -> RaceStatus {
        self.status
    }

    /// Coarse session state.
    #[must_use]
    pub fn state(&self) -> GameState {
        if self.orchestrator.store().active_count() == 0 {
            return GameState::Idle;
        }
        match self.status {
            RaceStatus::NotStarted => GameState::Ready,
            RaceStatus::Countdown | RaceStatus::Racing => GameState::Racing,
            RaceStatus::Finished => GameState::Results,
        }
    }

    /// Race clock (seconds, time-scaled).
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Countdown remaining (seconds).
    #[must_use]
    pub const fn countdown(&self) -> f32 {
        self.countdown
    }

    /// Finish order so far.
    #[must_use]
    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    /// Runner furthest along the route.
    #[must_use]
    pub fn leader(&self) -> Option<EntityId> {
        self.orchestrator.view().leader()
    }

    /// Full race snapshot for IPC or replay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            elapsed_time: self.elapsed,
            countdown: self.countdown,
            finisher_count: self.results.len() as u32,
            ..self.orchestrator.snapshot()
        }
    }

    /// A receiver for race events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.events.receiver()
    }

    /// Race settings in use.
    #[must_use]
    pub const fn race_config(&self) -> &RaceConfig {
        &self.race
    }

    /// The orchestrator, for render views and stats.
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Mutable orchestrator access (incapacitating runners, swapping the path).
    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }
}
