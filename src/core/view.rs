//! Onboarding view state machine.
//!
//! Transitions are a pure function of the current [`ViewState`], the event
//! and whether a wallet is connected. Events that do not apply to the
//! current state are ignored.

use std::cell::Cell;

use tracing::debug;

use crate::models::ViewState;

/// Events driving [`ViewState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    IntentToConnect,
    ChooseSocial,
    ChooseImport,
    Cancel,
    ImportSucceeded,
    ClickAddress,
    Disconnect,
    IdentityUnresolved,
    /// An email was linked successfully
    EmailLinked,
    /// Esc, click outside or "Go Back"
    Dismiss,
}

/// Next state for `event`, or `None` when the event is ignored.
pub fn transition(state: ViewState, event: ViewEvent, connected: bool) -> Option<ViewState> {
    use ViewEvent::*;
    use ViewState::*;

    match (state, event) {
        (Closed, IntentToConnect) => Some(DropdownOpen),
        (DropdownOpen, ChooseSocial) => Some(Closed),
        (DropdownOpen, ChooseImport) => Some(WalletImport),
        (WalletImport, Cancel | ImportSucceeded) => Some(Closed),
        (Closed, ClickAddress) if connected => Some(Settings),
        (Settings, Disconnect) => Some(Closed),
        (Closed, IdentityUnresolved) if connected => Some(EmailImport),
        (EmailImport, EmailLinked) => Some(Closed),
        (panel, Dismiss) if panel.is_panel() => Some(Closed),
        _ => None,
    }
}

/// Holds the active [`ViewState`].
#[derive(Debug, Default)]
pub struct ViewMachine {
    state: Cell<ViewState>,
}

impl ViewMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    /// Apply `event`; returns the `(from, to)` pair when the state changed.
    pub fn apply(&self, event: ViewEvent, connected: bool) -> Option<(ViewState, ViewState)> {
        let from = self.state.get();
        let to = transition(from, event, connected)?;
        if to == from {
            return None;
        }
        self.state.set(to);
        debug!(?from, ?to, ?event, "view transition");
        Some((from, to))
    }

    /// Back to `Closed` regardless of the current state (session teardown).
    pub fn reset(&self) -> ViewState {
        self.state.replace(ViewState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::ViewEvent::*;
    use crate::models::ViewState::*;

    const ALL_STATES: [ViewState; 5] = [Closed, DropdownOpen, Settings, WalletImport, EmailImport];

    #[test]
    fn test_transition_table() {
        let cases = [
            (Closed, IntentToConnect, false, Some(DropdownOpen)),
            (DropdownOpen, ChooseSocial, false, Some(Closed)),
            (DropdownOpen, ChooseImport, false, Some(WalletImport)),
            (WalletImport, Cancel, false, Some(Closed)),
            (WalletImport, ImportSucceeded, true, Some(Closed)),
            (Closed, ClickAddress, true, Some(Settings)),
            (Settings, Disconnect, true, Some(Closed)),
            (Closed, IdentityUnresolved, true, Some(EmailImport)),
            (EmailImport, EmailLinked, true, Some(Closed)),
        ];
        for (state, event, connected, expected) in cases {
            assert_eq!(transition(state, event, connected), expected, "{state:?} --{event:?}-->");
        }
    }

    #[test]
    fn test_connection_guards() {
        assert_eq!(transition(Closed, ClickAddress, false), None);
        assert_eq!(transition(Closed, IdentityUnresolved, false), None);
    }

    #[test]
    fn test_unlisted_events_are_ignored() {
        assert_eq!(transition(Closed, ChooseSocial, true), None);
        assert_eq!(transition(Settings, ChooseImport, true), None);
        assert_eq!(transition(EmailImport, Cancel, true), None);
        assert_eq!(transition(DropdownOpen, IdentityUnresolved, true), None);
        assert_eq!(transition(WalletImport, EmailLinked, true), None);
        assert_eq!(transition(Closed, Dismiss, true), None);
    }

    #[test]
    fn test_dismiss_closes_any_panel() {
        for state in ALL_STATES.into_iter().filter(|s| s.is_panel()) {
            assert_eq!(transition(state, Dismiss, true), Some(Closed), "{state:?}");
            assert_eq!(transition(state, Dismiss, false), Some(Closed), "{state:?}");
        }
    }

    #[test]
    fn test_machine_reports_changes() {
        let machine = ViewMachine::new();
        assert_eq!(machine.state(), Closed);

        assert_eq!(machine.apply(IntentToConnect, false), Some((Closed, DropdownOpen)));
        assert_eq!(machine.apply(IntentToConnect, false), None);
        assert_eq!(machine.apply(ChooseImport, false), Some((DropdownOpen, WalletImport)));
        assert_eq!(machine.state(), WalletImport);

        assert_eq!(machine.reset(), WalletImport);
        assert_eq!(machine.state(), Closed);
    }
}
