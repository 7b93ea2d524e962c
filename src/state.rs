use crate::{
    card::{
        CardBag, MissionId, TrainColor, NUM_INITIAL_MISSIONS, NUM_INITIAL_TRAIN_CARDS,
        OPEN_DECK_SIZE,
    },
    config::{GameConfig, MAX_PLAYERS},
    decision::Decision,
    error::{IllegalDecision, SetupError},
    map::{longest_path, RouteId},
    player::{PlayerColor, PlayerHandle, PlayerState},
};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Range;
use strum::IntoEnumIterator;

/// Granted to every player tied for the longest continuous path.
pub const LONGEST_PATH_BONUS: i32 = 10;

/// Where the turn-based game currently stands.
///
/// # JSON
/// Phases are serialized in snake_case, alongside the player they wait on.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// The player may draw a card, draw missions, or claim a route.
    AwaitingAction(PlayerHandle),
    /// The player drew a first card, and may only draw a second one.
    AwaitingSecondDraw(PlayerHandle),
    /// The player drew missions, and must now decide which ones to keep.
    AwaitingMissionKeep(PlayerHandle),
    /// No decision is legal anymore.
    GameOver,
}

/// The whole game: players, decks, route ownership and turns.
///
/// A [`State`] only changes through [`State::setup`] and [`State::apply_decision`], so any
/// state reached through those is one that can occur in a real game.
///
/// Cloning is a deep copy, random generator included: a clone can be played forward
/// (e.g. to explore hypothetical futures) without affecting the original, and a clone fed the
/// same decisions as its original draws the same cards.
#[derive(Clone, Debug)]
pub struct State {
    /// Index is the player's handle.
    pub(crate) players: SmallVec<[PlayerState; MAX_PLAYERS]>,
    pub(crate) current_player: PlayerHandle,
    /// Unclaimed routes are absent.
    pub(crate) owner_by_route: BTreeMap<RouteId, PlayerHandle>,
    /// Closed deck of train cards.
    pub(crate) deck: CardBag,
    /// Face-up train cards.
    pub(crate) open_deck: CardBag,
    /// Cards spent on claimed routes, until they are reshuffled into the deck.
    pub(crate) discarded: CardBag,
    /// Destination tickets, drawn from the front.
    pub(crate) missions: VecDeque<MissionId>,
    pub(crate) rng: ChaCha8Rng,
    seed: u64,
    /// The player who first ended their turn almost out of cars.
    last_player: Option<PlayerHandle>,
    game_over: bool,
    set_up: bool,
}

impl State {
    /// Creates a game with the configured players, each getting their own color.
    ///
    /// Nothing is dealt until [`State::setup`] is called.
    pub fn new(config: &GameConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let players = config
            .players
            .iter()
            .zip(PlayerColor::iter())
            .enumerate()
            .map(|(handle, (name, color))| PlayerState::new(handle, name.clone(), color))
            .collect();

        Ok(Self {
            players,
            current_player: 0,
            owner_by_route: BTreeMap::new(),
            deck: CardBag::new(),
            open_deck: CardBag::new(),
            discarded: CardBag::new(),
            missions: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            last_player: None,
            game_over: false,
            set_up: false,
        })
    }

    /// Shuffles the decks, then deals every player their initial train cards and missions,
    /// and fills the open deck.
    ///
    /// Can only be done once.
    pub fn setup(&mut self) -> Result<(), SetupError> {
        if self.set_up {
            return Err(SetupError::AlreadySetUp);
        }

        self.deck = CardBag::full_deck();

        let mut missions: Vec<MissionId> = MissionId::all().collect();
        missions.shuffle(&mut self.rng);
        self.missions = missions.into();

        for player in self.players.iter_mut() {
            for _ in 0..NUM_INITIAL_TRAIN_CARDS {
                player.hand.add(self.deck.draw_random(&mut self.rng)?);
            }
            player
                .missions
                .extend(self.missions.drain(..NUM_INITIAL_MISSIONS));
        }

        self.restore_decks();
        self.set_up = true;

        info!(
            "Set up a game of {} players with seed {}.",
            self.players.len(),
            self.seed
        );
        Ok(())
    }

    /// Refills the open deck from the closed deck, reshuffling the discard pile into the closed
    /// deck whenever the latter runs out.
    pub(crate) fn restore_decks(&mut self) {
        loop {
            if self.deck.is_empty() && !self.discarded.is_empty() {
                debug!("Reshuffling {} discarded cards into the deck.", self.discarded.size());
                std::mem::swap(&mut self.deck, &mut self.discarded);
            }

            if self.open_deck.size() >= OPEN_DECK_SIZE {
                break;
            }

            match self.deck.draw_random(&mut self.rng) {
                Ok(card) => self.open_deck.add(card),
                // Both the deck and the discard pile are empty.
                Err(_) => break,
            }
        }
    }

    /// Whether a train card could be drawn, from either deck.
    #[inline]
    pub(crate) fn can_draw_card(&self) -> bool {
        !self.deck.is_empty() || !self.open_deck.is_empty()
    }

    /// Hands the turn to the next player, arming or closing the end-game on the way.
    pub(crate) fn end_turn(&mut self) {
        let finishing_player = &self.players[self.current_player];

        if self.last_player.is_none() && finishing_player.almost_out_of_cars() {
            info!(
                "{} has {} cars left: every other player plays one last turn.",
                finishing_player.name(),
                finishing_player.cars()
            );
            self.last_player = Some(self.current_player);
        }

        self.current_player = (self.current_player + 1) % self.players.len();

        if self.last_player == Some(self.current_player) {
            self.game_over = true;
            info!("The game is over.");
        }
    }

    /// Makes `player` the current player, whatever the turn order says.
    ///
    /// This is an escape hatch for search: it can produce states that are unreachable in a real
    /// game, and the end-game trigger is left as is. Out-of-range handles are ignored.
    pub fn switch_to_player_unchecked(&mut self, player: PlayerHandle) {
        if player < self.players.len() {
            self.current_player = player;
        }
    }

    /// Validates `decision`, then applies it.
    ///
    /// On error, the state is left untouched.
    pub fn apply_decision(&mut self, decision: &Decision) -> Result<(), IllegalDecision> {
        if let Err(error) = decision.require_legal(self) {
            debug!("Rejected `{}`: {}", decision, error.reason);
            return Err(error);
        }

        debug!("Applying `{}`.", decision);
        decision.apply(self);
        Ok(())
    }

    /// All decisions the current player may take.
    pub fn all_possible_decisions(&self) -> Vec<Decision> {
        self.all_possible_decisions_for(self.current_player)
    }

    /// All decisions `player` may take, in a deterministic order.
    ///
    /// Since only the current player may act, this is empty for anyone else. Use
    /// [`State::switch_to_player_unchecked`] on a clone to explore another player's options.
    pub fn all_possible_decisions_for(&self, player: PlayerHandle) -> Vec<Decision> {
        let mut decisions = Vec::new();

        if self.game_over || player != self.current_player {
            return decisions;
        }

        let player_state = match self.players.get(player) {
            Some(player_state) => player_state,
            None => return decisions,
        };

        if player_state.has_pending_missions() {
            let drawn_missions = player_state.drawn_missions();
            for subset in 1..(1u32 << drawn_missions.len()) {
                let kept = drawn_missions
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| subset & (1u32 << *i) != 0)
                    .map(|(_, mission)| *mission);
                decisions.push(Decision::keep_missions(player, kept));
            }
            return decisions;
        }

        let first_draw = player_state.drawn_card().is_none();

        if first_draw {
            for route_id in RouteId::all() {
                let route = route_id.route();
                if self.is_claimed(route_id)
                    || route.length > player_state.cars()
                    || player_state.owns_dual_of(route_id)
                {
                    continue;
                }

                for color in TrainColor::iter() {
                    if let Some(cards) = player_state.hand().cards_to_claim(route, color) {
                        decisions.push(Decision::ClaimRoute {
                            player,
                            route: route_id,
                            cards,
                        });
                    }
                }
            }
        }

        for (color, _) in self.open_deck.iter() {
            decisions.push(Decision::DrawFromOpen { player, color });
        }

        if !self.deck.is_empty() {
            decisions.push(Decision::DrawFromDeck { player });
        }

        if first_draw && !self.missions.is_empty() {
            decisions.push(Decision::DrawMissions { player });
        }

        decisions
    }

    /// Handles of all players, in turn order.
    #[inline]
    pub fn players(&self) -> Range<PlayerHandle> {
        0..self.players.len()
    }

    #[inline]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// # Panics
    /// If there is no such player.
    #[inline]
    pub fn player_state(&self, player: PlayerHandle) -> &PlayerState {
        &self.players[player]
    }

    #[inline]
    pub fn current_player(&self) -> PlayerHandle {
        self.current_player
    }

    #[inline]
    pub fn current_player_state(&self) -> &PlayerState {
        &self.players[self.current_player]
    }

    #[inline]
    pub fn open_cards(&self) -> &CardBag {
        &self.open_deck
    }

    #[inline]
    pub fn deck_size(&self) -> usize {
        self.deck.size()
    }

    #[inline]
    pub fn discarded_size(&self) -> usize {
        self.discarded.size()
    }

    #[inline]
    pub fn mission_deck_size(&self) -> usize {
        self.missions.len()
    }

    #[inline]
    pub fn is_claimed(&self, route: RouteId) -> bool {
        self.owner_by_route.contains_key(&route)
    }

    #[inline]
    pub fn owner_of(&self, route: RouteId) -> Option<PlayerHandle> {
        self.owner_by_route.get(&route).copied()
    }

    /// The player who triggered the end-game, if any.
    #[inline]
    pub fn last_player(&self) -> Option<PlayerHandle> {
        self.last_player
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> TurnPhase {
        if self.game_over {
            return TurnPhase::GameOver;
        }

        let player = self.current_player_state();
        if player.has_pending_missions() {
            TurnPhase::AwaitingMissionKeep(self.current_player)
        } else if player.drawn_card().is_some() {
            TurnPhase::AwaitingSecondDraw(self.current_player)
        } else {
            TurnPhase::AwaitingAction(self.current_player)
        }
    }

    /// Scores of all players, indexed by handle.
    ///
    /// Routes and missions are scored as they stand, so this can be computed mid-game too.
    pub fn final_scores(&self) -> SmallVec<[i32; MAX_PLAYERS]> {
        let longest_paths: SmallVec<[u16; MAX_PLAYERS]> = self
            .players
            .iter()
            .map(|player| {
                let routes: Vec<RouteId> = player.routes().iter().copied().collect();
                longest_path(&routes)
            })
            .collect();
        let longest = longest_paths.iter().copied().max().unwrap_or(0);

        self.players
            .iter()
            .zip(longest_paths)
            .map(|(player, path)| {
                let bonus = if longest > 0 && path == longest {
                    LONGEST_PATH_BONUS
                } else {
                    0
                };
                player.route_points() + player.mission_points() + bonus
            })
            .collect()
    }

    /// # Panics
    /// If there is no such player.
    pub fn final_score(&self, player: PlayerHandle) -> i32 {
        self.final_scores()[player]
    }

    /// The player with the highest score. Ties go to the lowest handle, see [`State::is_draw`].
    pub fn winner(&self) -> PlayerHandle {
        let scores = self.final_scores();

        let mut winner = 0;
        for (player, score) in scores.iter().enumerate() {
            if *score > scores[winner] {
                winner = player;
            }
        }
        winner
    }

    /// Whether another player shares the winner's score.
    pub fn is_draw(&self) -> bool {
        let scores = self.final_scores();
        let winner = self.winner();

        scores
            .iter()
            .enumerate()
            .any(|(player, score)| player != winner && *score == scores[winner])
    }

    /// A snapshot of the game as `viewer` sees it: public information about everyone, and
    /// private information about `viewer` only.
    pub fn view(&self, viewer: PlayerHandle) -> StateView {
        StateView {
            phase: self.phase(),
            current_player: self.current_player,
            last_player: self.last_player,
            open_cards: &self.open_deck,
            deck_size: self.deck.size(),
            discarded_size: self.discarded.size(),
            mission_deck_size: self.missions.len(),
            players: self
                .players
                .iter()
                .map(|player| PlayerView {
                    public: PublicPlayerView {
                        handle: player.handle(),
                        name: player.name(),
                        color: player.color(),
                        cars: player.cars(),
                        num_train_cards: player.hand().size(),
                        routes: player.routes(),
                        num_missions: player.missions().len(),
                        num_drawn_missions: player.drawn_missions().len(),
                    },
                    private: (player.handle() == viewer).then(|| PrivatePlayerView {
                        hand: player.hand(),
                        missions: player.missions(),
                        drawn_missions: player.drawn_missions(),
                    }),
                })
                .collect(),
        }
    }
}

/// Everything a presentation layer needs to render a game, returned by [`State::view`].
#[derive(Debug, Serialize)]
pub struct StateView<'a> {
    pub phase: TurnPhase,
    pub current_player: PlayerHandle,
    /// Set once a player has ended their turn almost out of cars.
    pub last_player: Option<PlayerHandle>,
    pub open_cards: &'a CardBag,
    pub deck_size: usize,
    pub discarded_size: usize,
    pub mission_deck_size: usize,
    pub players: SmallVec<[PlayerView<'a>; MAX_PLAYERS]>,
}

impl StateView<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Information about one player, as seen by the viewer of a [`StateView`].
#[derive(Debug, Serialize)]
pub struct PlayerView<'a> {
    pub public: PublicPlayerView<'a>,
    /// Only set for the viewer.
    pub private: Option<PrivatePlayerView<'a>>,
}

/// What everyone knows about a player.
#[derive(Debug, Serialize)]
pub struct PublicPlayerView<'a> {
    pub handle: PlayerHandle,
    pub name: &'a str,
    pub color: PlayerColor,
    pub cars: u8,
    pub num_train_cards: usize,
    pub routes: &'a BTreeSet<RouteId>,
    pub num_missions: usize,
    pub num_drawn_missions: usize,
}

/// What only the player themselves knows.
#[derive(Debug, Serialize)]
pub struct PrivatePlayerView<'a> {
    pub hand: &'a CardBag,
    pub missions: &'a BTreeSet<MissionId>,
    pub drawn_missions: &'a [MissionId],
}
