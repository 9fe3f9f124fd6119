//! Onboarding view modes.

/// Interaction mode currently presented to the user.
///
/// Exactly one is active. Every variant other than `Closed` is a panel
/// (dropdown or full-screen layer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Only the wallet button is visible
    #[default]
    Closed,
    /// Provider choice (social login / import wallet)
    DropdownOpen,
    /// Wallet settings with the transfer form
    Settings,
    /// Private key entry
    WalletImport,
    /// Email entry after an unresolved identity lookup
    EmailImport,
}

impl ViewState {
    pub fn is_panel(self) -> bool {
        self != Self::Closed
    }
}
