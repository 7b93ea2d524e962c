use crate::card::TrainColor;

/// The only error a player can run into while playing: the proposed [`crate::decision::Decision`]
/// breaks a rule. The state is left untouched, so the caller may simply try something else.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Illegal decision: {reason}")]
pub struct IllegalDecision {
    /// Human-readable explanation, suitable to be shown to a player.
    pub reason: String,
}

impl IllegalDecision {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failures of [`crate::card::CardBag`] draws.
///
/// Enumerated decisions never trigger these, so hitting one during play means the caller
/// bypassed the legality checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CardBagError {
    #[error("Cannot draw from an empty bag of cards.")]
    Empty,
    #[error("There is no {0} card in the bag.")]
    ColorAbsent(TrainColor),
}

/// Raised when deserializing an id that does not match any route or destination ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnknownIdError {
    #[error("There is no route with id {0}.")]
    Route(u8),
    #[error("There is no mission with id {0}.")]
    Mission(u8),
}

/// Errors raised while creating or setting up a [`crate::state::State`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("Cannot create a game with {0} players: there must be between 2 and 5 players.")]
    PlayerCount(usize),
    #[error("Cannot have two players named `{0}`.")]
    DuplicateName(String),
    #[error("The game has already been set up.")]
    AlreadySetUp,
    #[error("Could not deal the initial cards: {0}")]
    Deal(#[from] CardBagError),
}
