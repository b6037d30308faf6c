use crate::lookup::{Listing, LookupOutcome};

/// Which security the user is looking at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppState {
    /// Nothing selected
    #[default]
    Idle,
    /// Search matched several names; waiting for a pick
    AmbiguousChoice(Vec<Listing>),
    /// Code and name to analyze
    Resolved(Listing),
}

/// User action driving the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A search was submitted and resolved by the lookup
    Search(LookupOutcome),
    /// A code was picked from the candidate list
    Select(String),
    Reset,
}

/// Message shown alongside the new state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blank search
    EnterName,
    /// No exact match, candidates listed
    ChooseCandidate(usize),
    /// No listing contains the keyword
    NotFound,
    /// Selected code is not among the candidates
    InvalidSelection(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::EnterName => write!(f, "Enter a stock name and search"),
            Notice::ChooseCandidate(count) => {
                write!(f, "No exact match; choose one of {} similar names", count)
            }
            Notice::NotFound => write!(f, "No listing found for that name"),
            Notice::InvalidSelection(code) => write!(f, "{} is not one of the candidates", code),
        }
    }
}

/// State after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    pub notice: Option<Notice>,
}

impl Transition {
    fn quiet(state: AppState) -> Self {
        Self { state, notice: None }
    }

    fn with_notice(state: AppState, notice: Notice) -> Self {
        Self {
            state,
            notice: Some(notice),
        }
    }
}

impl AppState {
    /// Apply a user action
    pub fn apply(self, action: Action) -> Transition {
        match action {
            Action::Search(LookupOutcome::Exact(listing)) => {
                Transition::quiet(AppState::Resolved(listing))
            }
            Action::Search(LookupOutcome::Candidates(candidates)) => {
                let count = candidates.len();
                Transition::with_notice(
                    AppState::AmbiguousChoice(candidates),
                    Notice::ChooseCandidate(count),
                )
            }
            Action::Search(LookupOutcome::NotFound) => {
                Transition::with_notice(AppState::Idle, Notice::NotFound)
            }
            Action::Search(LookupOutcome::EmptyQuery) => {
                Transition::with_notice(AppState::Idle, Notice::EnterName)
            }
            Action::Select(code) => match self {
                AppState::AmbiguousChoice(candidates) => {
                    let picked = candidates.iter().find(|l| l.code == code).cloned();
                    match picked {
                        Some(listing) => Transition::quiet(AppState::Resolved(listing)),
                        None => Transition::with_notice(
                            AppState::AmbiguousChoice(candidates),
                            Notice::InvalidSelection(code),
                        ),
                    }
                }
                other => Transition::with_notice(other, Notice::InvalidSelection(code)),
            },
            Action::Reset => Transition::quiet(AppState::Idle),
        }
    }

    /// Listing to analyze, if resolved
    pub fn selected(&self) -> Option<&Listing> {
        match self {
            AppState::Resolved(listing) => Some(listing),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[Listing] {
        match self {
            AppState::AmbiguousChoice(candidates) => candidates,
            _ => &[],
        }
    }
}
