//! Tick-driven pomodoro timer.
//!
//! The timer owns no clock or thread. The caller feeds it elapsed seconds
//! through [`Pomodoro::tick`] and reacts to the returned events.

use crate::model::config::PomodoroSettings;

/// Work durations offered in settings, in minutes
pub const WORK_MINUTES_OPTIONS: [u32; 9] = [15, 20, 25, 30, 35, 40, 45, 50, 60];
/// Break durations offered in settings, in minutes
pub const BREAK_MINUTES_OPTIONS: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Error type for pomodoro settings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PomodoroError {
    #[error("work duration must be 15, 20, 25, 30, 35, 40, 45, 50 or 60 minutes, got {0}")]
    WorkMinutes(u32),
    #[error("break duration must be 5, 10, 15, 20, 25 or 30 minutes, got {0}")]
    BreakMinutes(u32),
}

pub fn validate_settings(settings: &PomodoroSettings) -> Result<(), PomodoroError> {
    if !WORK_MINUTES_OPTIONS.contains(&settings.work_minutes) {
        return Err(PomodoroError::WorkMinutes(settings.work_minutes));
    }
    if !BREAK_MINUTES_OPTIONS.contains(&settings.break_minutes) {
        return Err(PomodoroError::BreakMinutes(settings.break_minutes));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionType {
    #[default]
    Work,
    Break,
}

/// Emitted when the countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionComplete {
    /// The session that just ended
    pub finished: SessionType,
    /// The session now loaded (idle, at full duration)
    pub next: SessionType,
    /// Minutes of the next session
    pub next_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pomodoro {
    settings: PomodoroSettings,
    state: TimerState,
    session: SessionType,
    remaining_secs: u32,
    sessions_completed: u32,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Pomodoro::new(PomodoroSettings::default())
    }
}

impl Pomodoro {
    /// An idle timer loaded with a full work session.
    pub fn new(settings: PomodoroSettings) -> Self {
        Pomodoro {
            settings,
            state: TimerState::Idle,
            session: SessionType::Work,
            remaining_secs: settings.work_minutes.saturating_mul(60),
            sessions_completed: 0,
        }
    }

    pub fn settings(&self) -> PomodoroSettings {
        self.settings
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Work sessions finished since the timer was created
    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    fn full_duration(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Work => self.settings.work_minutes.saturating_mul(60),
            SessionType::Break => self.settings.break_minutes.saturating_mul(60),
        }
    }

    pub fn start(&mut self) {
        if self.remaining_secs > 0 {
            self.state = TimerState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Abandon the current session and go back to an idle work session.
    pub fn stop(&mut self) {
        self.state = TimerState::Idle;
        self.session = SessionType::Work;
        self.remaining_secs = self.full_duration(SessionType::Work);
    }

    /// Restart the current session type from its full duration.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.full_duration(self.session);
    }

    /// Count down by `seconds` while running. Extra seconds past zero are
    /// dropped; the next session waits idle until started.
    pub fn tick(&mut self, seconds: u32) -> Option<SessionComplete> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(seconds);
        if self.remaining_secs > 0 {
            return None;
        }

        let finished = self.session;
        self.state = TimerState::Idle;
        self.session = match finished {
            SessionType::Work => {
                self.sessions_completed += 1;
                SessionType::Break
            }
            SessionType::Break => SessionType::Work,
        };
        self.remaining_secs = self.full_duration(self.session);
        tracing::debug!(?finished, sessions = self.sessions_completed, "pomodoro session complete");
        Some(SessionComplete {
            finished,
            next: self.session,
            next_minutes: self.remaining_secs / 60,
        })
    }

    /// Replace the durations. An idle timer is reloaded with the new
    /// duration of its current session; a running or paused one keeps going.
    pub fn update_settings(&mut self, settings: PomodoroSettings) -> Result<(), PomodoroError> {
        validate_settings(&settings)?;
        self.settings = settings;
        if self.state == TimerState::Idle {
            self.remaining_secs = self.full_duration(self.session);
        }
        Ok(())
    }

    /// Remaining time as `MM:SS`
    pub fn format_time(&self) -> String {
        format_time(self.remaining_secs)
    }

    /// Percent of the current session elapsed, 0.0 to 100.0
    pub fn progress(&self) -> f64 {
        let total = self.full_duration(self.session);
        if total == 0 {
            return 0.0;
        }
        f64::from(total.saturating_sub(self.remaining_secs)) / f64::from(total) * 100.0
    }
}

/// `MM:SS`, with minutes allowed past 99.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
