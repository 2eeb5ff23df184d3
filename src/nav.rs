//! Role-gated navigation.
//!
//! Which screens a signed-in user can reach is a static table keyed by
//! role. Dispatch checks this table before running a screen, so nothing
//! leaks across roles.

use crate::model::Role;

/// Every authenticated screen in the application, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    AddValue,
    UpdateValue,
    Users,
    CreateUser,
    Departments,
    Indicators,
    CreateIndicator,
    History,
    Profile,
    Chat,
}

impl Screen {
    /// The REPL command that opens this screen.
    pub fn command(&self) -> &'static str {
        match self {
            Self::AddValue => "/add-value",
            Self::UpdateValue => "/update-value",
            Self::Users => "/users",
            Self::CreateUser => "/create-user",
            Self::Departments => "/departments",
            Self::Indicators => "/indicators",
            Self::CreateIndicator => "/create-indicator",
            Self::History => "/history",
            Self::Profile => "/profile",
            Self::Chat => "/chat",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::AddValue => "record a measurement for an indicator",
            Self::UpdateValue => "amend a previously recorded value",
            Self::Users => "list and edit user accounts",
            Self::CreateUser => "create a user account",
            Self::Departments => "manage departments",
            Self::Indicators => "manage indicators, action items, waste reasons",
            Self::CreateIndicator => "create an indicator",
            Self::History => "weekly history dashboard",
            Self::Profile => "view and edit your profile",
            Self::Chat => "ask the assistant",
        }
    }

    pub fn from_command(cmd: &str) -> Option<Self> {
        ALL_SCREENS.iter().copied().find(|s| s.command() == cmd)
    }
}

pub const ALL_SCREENS: &[Screen] = &[
    Screen::AddValue,
    Screen::UpdateValue,
    Screen::Users,
    Screen::CreateUser,
    Screen::Departments,
    Screen::Indicators,
    Screen::CreateIndicator,
    Screen::History,
    Screen::Profile,
    Screen::Chat,
];

/// The visibility table. Team members get the value screens scoped to
/// their own department; viewers get only profile and chat.
pub fn visible_screens(role: Role) -> &'static [Screen] {
    match role {
        Role::Admin => ALL_SCREENS,
        Role::TeamMember => &[
            Screen::AddValue,
            Screen::UpdateValue,
            Screen::Profile,
            Screen::Chat,
        ],
        Role::Viewer => &[Screen::Profile, Screen::Chat],
    }
}

pub fn is_visible(role: Role, screen: Screen) -> bool {
    visible_screens(role).contains(&screen)
}
