use super::storage::{Storage, StorageKey, read_json, write_json};
use super::PersistenceError;
use crate::gamification::Gamification;
use crate::model::config::PomodoroSettings;
use crate::model::user::UserRecord;
use crate::pomodoro::validate_settings;

/// Load the scoring state. A missing or unreadable document gives a fresh
/// state with `weekly_goal`; a loaded one is normalized against the current
/// achievement catalog.
pub fn load_gamification_state(storage: &impl Storage, weekly_goal: u32) -> Gamification {
    match read_json::<Gamification>(storage, StorageKey::Gamification) {
        Ok(Some(mut state)) => {
            state.normalize();
            state
        }
        Ok(None) => Gamification::new(weekly_goal),
        Err(e) => {
            tracing::warn!(error = %e, "could not load gamification state, starting fresh");
            Gamification::new(weekly_goal)
        }
    }
}

pub fn save_gamification_state(storage: &impl Storage, state: &Gamification) -> Result<(), PersistenceError> {
    write_json(storage, StorageKey::Gamification, state)
}

/// Load the saved timer durations, or `fallback` if none are stored or the
/// stored ones are not allowed values.
pub fn load_pomodoro_settings(storage: &impl Storage, fallback: PomodoroSettings) -> PomodoroSettings {
    match read_json::<PomodoroSettings>(storage, StorageKey::Pomodoro) {
        Ok(Some(settings)) => match validate_settings(&settings) {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring saved pomodoro settings");
                fallback
            }
        },
        Ok(None) => fallback,
        Err(e) => {
            tracing::warn!(error = %e, "could not load pomodoro settings");
            fallback
        }
    }
}

pub fn save_pomodoro_settings(storage: &impl Storage, settings: &PomodoroSettings) -> Result<(), PersistenceError> {
    write_json(storage, StorageKey::Pomodoro, settings)
}

/// Load the registered accounts. Unlike the other documents, an unreadable
/// user list is an error rather than an empty list.
pub fn load_users(storage: &impl Storage) -> Result<Vec<UserRecord>, PersistenceError> {
    Ok(read_json(storage, StorageKey::Users)?.unwrap_or_default())
}

pub fn save_users(storage: &impl Storage, users: &[UserRecord]) -> Result<(), PersistenceError> {
    write_json(storage, StorageKey::Users, users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;

    #[test]
    fn gamification_falls_back_to_fresh_state() {
        let storage = MemoryStorage::new();
        assert_eq!(load_gamification_state(&storage, 6), Gamification::new(6));

        let storage = MemoryStorage::new().with_entry(StorageKey::Gamification, "{{{");
        assert_eq!(load_gamification_state(&storage, 6), Gamification::new(6));
    }

    #[test]
    fn gamification_partial_document_uses_defaults() {
        let storage = MemoryStorage::new().with_entry(StorageKey::Gamification, r#"{"awardedTaskIds":["t1"]}"#);
        let state = load_gamification_state(&storage, 6);
        assert!(state.is_awarded("t1"));
        assert_eq!(state.user_stats().achievements.len(), 15);
        assert_eq!(state.points_history().count(), 0);
    }

    #[test]
    fn gamification_round_trip() {
        let storage = MemoryStorage::new();
        let mut state = Gamification::new(3);
        state.update_weekly_goal(12);
        save_gamification_state(&storage, &state).unwrap();
        assert_eq!(load_gamification_state(&storage, 6), state);
    }

    #[test]
    fn pomodoro_settings_are_validated_on_load() {
        let fallback = PomodoroSettings::default();
        let storage = MemoryStorage::new();
        assert_eq!(load_pomodoro_settings(&storage, fallback), fallback);

        let custom = PomodoroSettings {
            work_minutes: 50,
            break_minutes: 10,
        };
        save_pomodoro_settings(&storage, &custom).unwrap();
        assert_eq!(load_pomodoro_settings(&storage, fallback), custom);

        let storage = MemoryStorage::new().with_entry(StorageKey::Pomodoro, r#"{"work_minutes":7,"break_minutes":5}"#);
        assert_eq!(load_pomodoro_settings(&storage, fallback), fallback);
    }

    #[test]
    fn users_missing_is_empty_but_corrupt_is_error() {
        assert!(load_users(&MemoryStorage::new()).unwrap().is_empty());
        let storage = MemoryStorage::new().with_entry(StorageKey::Users, "oops");
        assert!(load_users(&storage).is_err());
    }
}
