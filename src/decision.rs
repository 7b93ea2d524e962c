use crate::card::{CardBag, MissionId, TrainColor, NUM_DRAWN_MISSIONS};
use crate::error::{CardBagError, IllegalDecision};
use crate::map::RouteId;
use crate::player::{PendingMissions, PlayerHandle, PlayerState};
use crate::state::State;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One action proposed by a player.
///
/// A [`Decision`] is only a proposal: it is checked against a [`State`] via
/// [`Decision::reason_for_illegality`], and only then applied by [`State::apply_decision`].
///
/// # JSON
/// Decisions are tagged by their `type`, in snake_case.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// Draws the top card of the closed deck.
    DrawFromDeck { player: PlayerHandle },
    /// Draws a card of the given color from the open deck.
    DrawFromOpen {
        player: PlayerHandle,
        color: TrainColor,
    },
    /// Draws destination tickets. Must be followed by [`Decision::KeepMissions`].
    DrawMissions { player: PlayerHandle },
    /// Keeps some of the destination tickets drawn this turn. The others go back under the deck.
    KeepMissions {
        player: PlayerHandle,
        missions: PendingMissions,
    },
    /// Claims a route, spending exactly the given cards.
    ClaimRoute {
        player: PlayerHandle,
        route: RouteId,
        cards: CardBag,
    },
}

impl Decision {
    /// Builds a [`Decision::KeepMissions`], with the missions in a canonical order so that
    /// equal selections compare equal.
    pub fn keep_missions(
        player: PlayerHandle,
        missions: impl IntoIterator<Item = MissionId>,
    ) -> Self {
        let mut missions: PendingMissions = missions.into_iter().collect();
        missions.sort_unstable();
        missions.dedup();

        Decision::KeepMissions { player, missions }
    }

    /// The player taking this decision.
    pub fn player(&self) -> PlayerHandle {
        match self {
            Decision::DrawFromDeck { player }
            | Decision::DrawFromOpen { player, .. }
            | Decision::DrawMissions { player }
            | Decision::KeepMissions { player, .. }
            | Decision::ClaimRoute { player, .. } => *player,
        }
    }

    /// Returns a human-readable reason if this decision cannot be applied to `state`,
    /// or `None` if it is legal.
    ///
    /// This never mutates the state.
    pub fn reason_for_illegality(&self, state: &State) -> Option<String> {
        let player = self.player();
        let player_state = match state.players.get(player) {
            Some(player_state) => player_state,
            None => return Some(format!("there is no player {}", player)),
        };

        if state.game_over() {
            return Some(String::from("the game is over"));
        }

        if state.current_player() != player {
            return Some(String::from("it's not your turn"));
        }

        match self {
            Decision::DrawFromDeck { .. } => {
                Self::reason_against_drawing(player_state).or_else(|| {
                    state
                        .deck
                        .is_empty()
                        .then(|| String::from("the deck is empty"))
                })
            }
            Decision::DrawFromOpen { color, .. } => {
                Self::reason_against_drawing(player_state).or_else(|| {
                    (!state.open_deck.contains(*color))
                        .then(|| format!("there is no {} card in the open deck", color))
                })
            }
            Decision::DrawMissions { .. } => {
                if player_state.has_pending_missions() {
                    Some(Self::pending_missions_reason())
                } else if player_state.drawn_card.is_some() {
                    Some(String::from(
                        "you drew a train card this turn, and may only draw another one",
                    ))
                } else if state.missions.is_empty() {
                    Some(String::from("the mission deck is empty"))
                } else {
                    None
                }
            }
            Decision::KeepMissions { missions, .. } => {
                Self::reason_against_keeping(player_state, missions)
            }
            Decision::ClaimRoute { route, cards, .. } => {
                Self::reason_against_claiming(state, player_state, *route, cards)
            }
        }
    }

    /// Same as [`Decision::reason_for_illegality`], wrapped as an error.
    pub fn require_legal(&self, state: &State) -> Result<(), IllegalDecision> {
        match self.reason_for_illegality(state) {
            Some(reason) => Err(IllegalDecision::new(reason)),
            None => Ok(()),
        }
    }

    #[inline]
    fn pending_missions_reason() -> String {
        String::from("you drew mission cards and now must decide which to keep")
    }

    fn reason_against_drawing(player_state: &PlayerState) -> Option<String> {
        player_state
            .has_pending_missions()
            .then(Self::pending_missions_reason)
    }

    fn reason_against_keeping(
        player_state: &PlayerState,
        missions: &[MissionId],
    ) -> Option<String> {
        if !player_state.has_pending_missions() {
            return Some(String::from("you have not drawn any mission cards"));
        }

        if missions.is_empty() {
            return Some(String::from("you must keep at least one mission card"));
        }

        if let Some(mission) = missions
            .iter()
            .find(|&mission| !player_state.drawn_missions.contains(mission))
        {
            return Some(format!("you did not just draw the mission {}", mission));
        }

        let num_distinct_missions = missions
            .iter()
            .enumerate()
            .filter(|&(i, mission)| !missions[..i].contains(mission))
            .count();
        if num_distinct_missions != missions.len() {
            return Some(String::from("you cannot keep the same mission card twice"));
        }

        None
    }

    fn reason_against_claiming(
        state: &State,
        player_state: &PlayerState,
        route_id: RouteId,
        cards: &CardBag,
    ) -> Option<String> {
        if player_state.has_pending_missions() {
            return Some(Self::pending_missions_reason());
        }

        if player_state.drawn_card.is_some() {
            return Some(String::from(
                "you cannot claim a route after having drawn a train card this turn",
            ));
        }

        let route = route_id.route();
        let (start, end) = route.cities;

        if state.is_claimed(route_id) {
            return Some(format!(
                "the route between {} and {} is already claimed",
                start, end
            ));
        }

        if route.length > player_state.cars {
            return Some(format!(
                "the route between {} and {} needs {} cars, but you only have {} left",
                start, end, route.length, player_state.cars
            ));
        }

        if player_state.owns_dual_of(route_id) {
            return Some(format!(
                "you cannot claim more than one route between {} and {}",
                start, end
            ));
        }

        if cards.size() != route.length as usize {
            return Some(format!(
                "the route between {} and {} needs {} cards, but {} were provided",
                start,
                end,
                route.length,
                cards.size()
            ));
        }

        let common_color = match cards.common_color() {
            Some(common_color) => common_color,
            None => {
                return Some(String::from(
                    "a route must be claimed with cards of a single color (wild cards aside)",
                ))
            }
        };

        if common_color.is_not_wild() && route.color.is_not_wild() && route.color != common_color {
            return Some(format!(
                "cannot claim a route of color {} with {} cards",
                route.color, common_color
            ));
        }

        if !player_state.hand.contains_all(cards) {
            return Some(format!("you do not have {} in hand", cards));
        }

        None
    }

    /// Mutates `state` according to this decision, including follow-up effects: refilling the
    /// open deck, and ending the turn.
    ///
    /// Assumes that the decision is legal.
    pub(crate) fn apply(&self, state: &mut State) {
        match self {
            Decision::DrawFromDeck { player } => {
                let card = checked(state.deck.draw_random(&mut state.rng));
                Self::apply_draw(state, *player, card, false);
            }
            Decision::DrawFromOpen { player, color } => {
                let card = checked(state.open_deck.draw(*color));
                Self::apply_draw(state, *player, card, card.is_wild());
            }
            Decision::DrawMissions { player } => {
                let num_drawn_missions = NUM_DRAWN_MISSIONS.min(state.missions.len());
                let drawn_missions: PendingMissions =
                    state.missions.drain(..num_drawn_missions).collect();

                state.players[*player].drawn_missions = drawn_missions;
            }
            Decision::KeepMissions { player, missions } => {
                let player_state = &mut state.players[*player];
                let drawn_missions = std::mem::take(&mut player_state.drawn_missions);

                for mission in drawn_missions {
                    if missions.contains(&mission) {
                        player_state.missions.insert(mission);
                    } else {
                        // Missions that are not kept go to the bottom of the deck.
                        state.missions.push_back(mission);
                    }
                }

                state.end_turn();
            }
            Decision::ClaimRoute {
                player,
                route,
                cards,
            } => {
                let player_state = &mut state.players[*player];
                checked(player_state.hand.remove_all(cards));
                player_state.routes.insert(*route);
                player_state.cars -= route.route().length;

                state.discarded.add_all(cards);
                state.owner_by_route.insert(*route, *player);
                state.restore_decks();
                state.end_turn();
            }
        }
    }

    fn apply_draw(state: &mut State, player: PlayerHandle, card: TrainColor, single_draw: bool) {
        let player_state = &mut state.players[player];
        // If the player already drew a card this turn, this is their second and last draw.
        let last_draw = single_draw || player_state.drawn_card.is_some();
        player_state.hand.add(card);

        state.restore_decks();

        // There might be nothing left to draw a second card from.
        if last_draw || !state.can_draw_card() {
            state.players[player].drawn_card = None;
            state.end_turn();
        } else {
            state.players[player].drawn_card = Some(card);
        }
    }
}

/// Bag underflows are ruled out by the legality checks that precede every application.
#[inline]
fn checked<T>(result: Result<T, CardBagError>) -> T {
    result.unwrap_or_else(|error| unreachable!("{} Decisions must be legal to be applied.", error))
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::DrawFromDeck { player } => {
                write!(f, "player {} draws a card from the deck", player)
            }
            Decision::DrawFromOpen { player, color } => write!(
                f,
                "player {} draws a {} card from the open deck",
                player, color
            ),
            Decision::DrawMissions { player } => {
                write!(f, "player {} draws mission cards", player)
            }
            Decision::KeepMissions { player, missions } => {
                let missions: Vec<String> =
                    missions.iter().map(|mission| mission.to_string()).collect();
                write!(f, "player {} keeps {}", player, missions.join(", "))
            }
            Decision::ClaimRoute {
                player,
                route,
                cards,
            } => write!(f, "player {} claims {} with {}", player, route, cards),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::config::GameConfig;

    use pretty_assertions::assert_eq;

    const ALICE: PlayerHandle = 0;
    const BOB: PlayerHandle = 1;

    fn new_state() -> State {
        let mut state = State::new(&GameConfig::new(["Alice", "Bob"], 3)).unwrap();
        state.setup().unwrap();
        state
    }

    fn route(cities: (City, City), parallel_route_index: usize) -> RouteId {
        RouteId::between(cities)[parallel_route_index]
    }

    // Tests for drawing train cards.

    #[test]
    fn draw_when_not_your_turn() {
        let state = new_state();

        assert_eq!(
            Decision::DrawFromDeck { player: BOB }.reason_for_illegality(&state),
            Some(String::from("it's not your turn"))
        );
        assert_eq!(
            Decision::DrawFromDeck { player: 7 }.reason_for_illegality(&state),
            Some(String::from("there is no player 7"))
        );
    }

    #[test]
    fn draw_from_empty_deck() {
        let mut state = new_state();
        state.deck = CardBag::new();

        assert_eq!(
            Decision::DrawFromDeck { player: ALICE }.reason_for_illegality(&state),
            Some(String::from("the deck is empty"))
        );
    }

    #[test]
    fn draw_absent_color_from_open_deck() {
        let mut state = new_state();
        state.open_deck = CardBag::of(TrainColor::Red, 5);

        assert_eq!(
            Decision::DrawFromOpen {
                player: ALICE,
                color: TrainColor::Blue
            }
            .reason_for_illegality(&state),
            Some(String::from("there is no blue card in the open deck"))
        );
        assert_eq!(
            Decision::DrawFromOpen {
                player: ALICE,
                color: TrainColor::Red
            }
            .reason_for_illegality(&state),
            None
        );
    }

    #[test]
    fn draw_from_deck_twice_ends_turn() {
        let mut state = new_state();
        let hand_size = state.player_state(ALICE).hand().size();

        let decision = Decision::DrawFromDeck { player: ALICE };
        assert!(state.apply_decision(&decision).is_ok());
        assert_eq!(state.current_player(), ALICE);
        assert!(state.player_state(ALICE).drawn_card().is_some());

        assert!(state.apply_decision(&decision).is_ok());
        assert_eq!(state.current_player(), BOB);
        assert_eq!(state.player_state(ALICE).drawn_card(), None);
        assert_eq!(state.player_state(ALICE).hand().size(), hand_size + 2);
    }

    #[test]
    fn draw_open_wild_card_ends_turn_immediately() {
        let mut state = new_state();
        state.open_deck = CardBag::of(TrainColor::Wild, 5);

        let decision = Decision::DrawFromOpen {
            player: ALICE,
            color: TrainColor::Wild,
        };
        assert!(state.apply_decision(&decision).is_ok());

        assert_eq!(state.current_player(), BOB);
        assert_eq!(state.player_state(ALICE).drawn_card(), None);
        assert!(state.player_state(ALICE).hand().contains(TrainColor::Wild));
    }

    #[test]
    fn draw_open_wild_card_as_second_draw_ends_turn() {
        let mut state = new_state();
        let mut open_deck = CardBag::of(TrainColor::Green, 4);
        open_deck.add(TrainColor::Wild);
        state.open_deck = open_deck;

        assert!(state
            .apply_decision(&Decision::DrawFromOpen {
                player: ALICE,
                color: TrainColor::Green,
            })
            .is_ok());
        assert_eq!(state.current_player(), ALICE);

        // The wild card is still face up.
        assert!(state.open_cards().contains(TrainColor::Wild));
        assert!(state
            .apply_decision(&Decision::DrawFromOpen {
                player: ALICE,
                color: TrainColor::Wild,
            })
            .is_ok());

        assert_eq!(state.current_player(), BOB);
        assert_eq!(state.player_state(ALICE).drawn_card(), None);
        assert!(state.player_state(ALICE).hand().contains(TrainColor::Wild));
    }

    #[test]
    fn draw_open_non_wild_card_leaves_one_more_draw() {
        let mut state = new_state();
        state.open_deck = CardBag::of(TrainColor::Green, 5);
        let hand_greens = state.player_state(ALICE).hand().count(TrainColor::Green);

        let decision = Decision::DrawFromOpen {
            player: ALICE,
            color: TrainColor::Green,
        };
        assert!(state.apply_decision(&decision).is_ok());
        assert_eq!(state.current_player(), ALICE);
        assert_eq!(
            state.player_state(ALICE).drawn_card(),
            Some(TrainColor::Green)
        );

        // The open deck is refilled after every draw.
        assert_eq!(state.open_cards().size(), 5);

        assert!(state
            .apply_decision(&Decision::DrawFromDeck { player: ALICE })
            .is_ok());
        assert_eq!(state.current_player(), BOB);
        assert!(state.player_state(ALICE).hand().count(TrainColor::Green) > hand_greens);
    }

    #[test]
    fn draw_ends_turn_when_nothing_left_to_draw() {
        let mut state = new_state();
        state.deck = CardBag::new();
        state.discarded = CardBag::new();
        state.open_deck = CardBag::of(TrainColor::Red, 1);

        let decision = Decision::DrawFromOpen {
            player: ALICE,
            color: TrainColor::Red,
        };
        assert!(state.apply_decision(&decision).is_ok());
        assert_eq!(state.current_player(), BOB);
        assert!(state.open_cards().is_empty());
    }

    #[test]
    fn draw_reshuffles_discard_pile_into_deck() {
        let mut state = new_state();
        state.deck = CardBag::of(TrainColor::Orange, 1);
        state.discarded = CardBag::of(TrainColor::Pink, 4);
        state.open_deck = CardBag::of(TrainColor::Black, 5);

        assert!(state
            .apply_decision(&Decision::DrawFromDeck { player: ALICE })
            .is_ok());

        assert_eq!(state.deck, CardBag::of(TrainColor::Pink, 4));
        assert!(state.discarded.is_empty());
        assert_eq!(state.open_cards(), &CardBag::of(TrainColor::Black, 5));
    }

    // Tests for missions.

    #[test]
    fn draw_missions_then_keep() {
        let mut state = new_state();
        let mission_deck_size = state.mission_deck_size();

        assert!(state
            .apply_decision(&Decision::DrawMissions { player: ALICE })
            .is_ok());
        assert_eq!(state.current_player(), ALICE);

        let drawn_missions = state.player_state(ALICE).drawn_missions().to_vec();
        assert_eq!(drawn_missions.len(), NUM_DRAWN_MISSIONS);
        assert_eq!(state.mission_deck_size(), mission_deck_size - 3);

        // Nothing else is allowed until the missions are kept.
        assert_eq!(
            Decision::DrawFromDeck { player: ALICE }.reason_for_illegality(&state),
            Some(String::from(
                "you drew mission cards and now must decide which to keep"
            ))
        );

        let keep = Decision::keep_missions(ALICE, [drawn_missions[2], drawn_missions[0]]);
        assert!(state.apply_decision(&keep).is_ok());

        let player_state = state.player_state(ALICE);
        assert!(!player_state.has_pending_missions());
        assert!(player_state.missions().contains(&drawn_missions[0]));
        assert!(!player_state.missions().contains(&drawn_missions[1]));
        assert!(player_state.missions().contains(&drawn_missions[2]));

        // The mission that was not kept is at the bottom of the deck.
        assert_eq!(state.mission_deck_size(), mission_deck_size - 2);
        assert_eq!(state.missions.back(), Some(&drawn_missions[1]));
        assert_eq!(state.current_player(), BOB);
    }

    #[test]
    fn draw_missions_after_drawing_a_card() {
        let mut state = new_state();
        state.players[ALICE].drawn_card = Some(TrainColor::Red);

        assert_eq!(
            Decision::DrawMissions { player: ALICE }.reason_for_illegality(&state),
            Some(String::from(
                "you drew a train card this turn, and may only draw another one"
            ))
        );
    }

    #[test]
    fn draw_missions_from_empty_deck() {
        let mut state = new_state();
        state.missions.clear();

        assert_eq!(
            Decision::DrawMissions { player: ALICE }.reason_for_illegality(&state),
            Some(String::from("the mission deck is empty"))
        );
    }

    #[test]
    fn keep_missions_illegal() {
        let mut state = new_state();
        let mission = MissionId::from_index(0).unwrap();

        assert_eq!(
            Decision::keep_missions(ALICE, [mission]).reason_for_illegality(&state),
            Some(String::from("you have not drawn any mission cards"))
        );

        assert!(state
            .apply_decision(&Decision::DrawMissions { player: ALICE })
            .is_ok());

        assert_eq!(
            Decision::keep_missions(ALICE, std::iter::empty()).reason_for_illegality(&state),
            Some(String::from("you must keep at least one mission card"))
        );

        let not_drawn = MissionId::all()
            .find(|mission| !state.player_state(ALICE).drawn_missions().contains(mission))
            .unwrap();
        assert_eq!(
            Decision::keep_missions(ALICE, [not_drawn]).reason_for_illegality(&state),
            Some(format!("you did not just draw the mission {}", not_drawn))
        );

        let drawn = state.player_state(ALICE).drawn_missions()[0];
        let twice = Decision::KeepMissions {
            player: ALICE,
            missions: [drawn, drawn].into_iter().collect(),
        };
        assert_eq!(
            twice.reason_for_illegality(&state),
            Some(String::from("you cannot keep the same mission card twice"))
        );
    }

    // Tests for claiming routes.

    fn claim(player: PlayerHandle, route: RouteId, cards: CardBag) -> Decision {
        Decision::ClaimRoute {
            player,
            route,
            cards,
        }
    }

    #[test]
    fn claim_route() {
        let mut state = new_state();
        // Denver - Kansas City, orange, length 4.
        let route_id = route((City::Denver, City::KansasCity), 1);
        let mut cards = CardBag::of(TrainColor::Orange, 3);
        cards.add(TrainColor::Wild);
        state.players[ALICE].hand = CardBag::of(TrainColor::Orange, 3);
        state.players[ALICE].hand.add(TrainColor::Wild);
        state.players[ALICE].hand.add(TrainColor::Red);
        let discarded_size = state.discarded.size();

        assert!(state
            .apply_decision(&claim(ALICE, route_id, cards))
            .is_ok());

        let player_state = state.player_state(ALICE);
        assert_eq!(player_state.hand(), &CardBag::of(TrainColor::Red, 1));
        assert_eq!(player_state.cars(), 41);
        assert!(player_state.routes().contains(&route_id));
        assert_eq!(state.owner_of(route_id), Some(ALICE));
        assert_eq!(state.discarded.size(), discarded_size + 4);
        assert_eq!(state.current_player(), BOB);
    }

    #[test]
    fn claim_route_already_claimed() {
        let mut state = new_state();
        let route_id = route((City::Atlanta, City::Miami), 0);
        state.owner_by_route.insert(route_id, BOB);
        state.players[ALICE].hand = CardBag::of(TrainColor::Blue, 5);

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Blue, 5)).reason_for_illegality(&state),
            Some(String::from(
                "the route between Atlanta and Miami is already claimed"
            ))
        );
    }

    #[test]
    fn claim_route_missing_cars() {
        let mut state = new_state();
        let route_id = route((City::Atlanta, City::Miami), 0);
        state.players[ALICE].hand = CardBag::of(TrainColor::Blue, 5);
        state.players[ALICE].cars = 4;

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Blue, 5)).reason_for_illegality(&state),
            Some(String::from(
                "the route between Atlanta and Miami needs 5 cars, but you only have 4 left"
            ))
        );
    }

    #[test]
    fn claim_route_dual_already_owned() {
        let mut state = new_state();
        let routes = RouteId::between((City::Boston, City::NewYork));
        state.players[ALICE].routes.insert(routes[0]);
        state.owner_by_route.insert(routes[0], ALICE);
        state.players[ALICE].hand = CardBag::of(TrainColor::Red, 2);

        assert_eq!(
            claim(ALICE, routes[1], CardBag::of(TrainColor::Red, 2)).reason_for_illegality(&state),
            Some(String::from(
                "you cannot claim more than one route between Boston and New York"
            ))
        );

        // The other player may still claim it.
        state.current_player = BOB;
        state.players[BOB].hand = CardBag::of(TrainColor::Red, 2);
        assert_eq!(
            claim(BOB, routes[1], CardBag::of(TrainColor::Red, 2)).reason_for_illegality(&state),
            None
        );
    }

    #[test]
    fn claim_route_wrong_cards() {
        let mut state = new_state();
        let route_id = route((City::Denver, City::KansasCity), 1);
        state.players[ALICE].hand = CardBag::full_deck();

        let too_few_cards = claim(ALICE, route_id, CardBag::of(TrainColor::Orange, 3));
        assert_eq!(
            too_few_cards.reason_for_illegality(&state),
            Some(String::from(
                "the route between Denver and Kansas City needs 4 cards, but 3 were provided"
            ))
        );

        let mut mixed_cards = CardBag::of(TrainColor::Orange, 3);
        mixed_cards.add(TrainColor::Black);
        assert_eq!(
            claim(ALICE, route_id, mixed_cards).reason_for_illegality(&state),
            Some(String::from(
                "a route must be claimed with cards of a single color (wild cards aside)"
            ))
        );

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Black, 4)).reason_for_illegality(&state),
            Some(String::from("cannot claim a route of color orange with black cards"))
        );

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Wild, 4)).reason_for_illegality(&state),
            None
        );
    }

    #[test]
    fn claim_route_cards_not_in_hand() {
        let mut state = new_state();
        let route_id = route((City::Atlanta, City::Nashville), 0);
        state.players[ALICE].hand = CardBag::of(TrainColor::Red, 1);

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Pink, 1)).reason_for_illegality(&state),
            Some(String::from("you do not have 1 pink in hand"))
        );
    }

    #[test]
    fn claim_route_after_drawing() {
        let mut state = new_state();
        let route_id = route((City::Atlanta, City::Nashville), 0);
        state.players[ALICE].hand = CardBag::of(TrainColor::Red, 1);
        state.players[ALICE].drawn_card = Some(TrainColor::Red);

        assert_eq!(
            claim(ALICE, route_id, CardBag::of(TrainColor::Red, 1)).reason_for_illegality(&state),
            Some(String::from(
                "you cannot claim a route after having drawn a train card this turn"
            ))
        );
    }

    #[test]
    fn illegal_decision_leaves_state_untouched() {
        let mut state = new_state();
        let before = state.clone();

        let result = state.apply_decision(&Decision::DrawFromDeck { player: BOB });
        assert_eq!(
            result,
            Err(IllegalDecision::new("it's not your turn"))
        );
        assert_eq!(state.deck, before.deck);
        assert_eq!(state.players, before.players);
        assert_eq!(state.current_player(), before.current_player());
    }

    // Tests for `Decision` helpers.

    #[test]
    fn keep_missions_is_canonical() {
        let first = MissionId::from_index(3).unwrap();
        let second = MissionId::from_index(9).unwrap();

        assert_eq!(
            Decision::keep_missions(ALICE, [second, first, second]),
            Decision::keep_missions(ALICE, [first, second])
        );
    }

    #[test]
    fn decision_to_json() -> serde_json::Result<()> {
        let decision = Decision::DrawFromOpen {
            player: BOB,
            color: TrainColor::Yellow,
        };

        let json = serde_json::to_string(&decision)?;
        assert_eq!(json, r#"{"type":"draw_from_open","player":1,"color":"yellow"}"#);
        assert_eq!(serde_json::from_str::<Decision>(&json)?, decision);
        Ok(())
    }

    #[test]
    fn json_to_decision_with_unknown_route() {
        let unknown_route = r#"{
            "type": "claim_route",
            "player": 0,
            "route": 200,
            "cards": {"counts": [0, 0, 0, 0, 0, 2, 0, 0, 0]}
        }"#;
        assert!(serde_json::from_str::<Decision>(unknown_route).is_err());

        let known_route = unknown_route.replace("200", "0");
        assert!(serde_json::from_str::<Decision>(&known_route).is_ok());
    }

    #[test]
    fn json_to_decision_with_unknown_mission() -> serde_json::Result<()> {
        let mut state = new_state();
        assert!(state
            .apply_decision(&Decision::DrawMissions { player: ALICE })
            .is_ok());

        let unknown_mission = r#"{"type":"keep_missions","player":0,"missions":[200]}"#;
        assert!(serde_json::from_str::<Decision>(unknown_mission).is_err());

        // A known mission that was not drawn is rejected by the rules instead.
        let not_drawn = MissionId::all()
            .find(|mission| !state.player_state(ALICE).drawn_missions().contains(mission))
            .unwrap();
        let json = format!(
            r#"{{"type":"keep_missions","player":0,"missions":[{}]}}"#,
            serde_json::to_string(&not_drawn)?
        );
        let decision = serde_json::from_str::<Decision>(&json)?;
        assert_eq!(
            state.apply_decision(&decision),
            Err(IllegalDecision::new(format!(
                "you did not just draw the mission {}",
                not_drawn
            )))
        );
        assert!(state.player_state(ALICE).has_pending_missions());
        Ok(())
    }

    #[test]
    fn decision_to_string() {
        let decision = claim(
            ALICE,
            route((City::Atlanta, City::Miami), 0),
            CardBag::of(TrainColor::Blue, 5),
        );
        assert_eq!(
            decision.to_string(),
            "player 0 claims Atlanta - Miami (5 blue) with 5 blue"
        );
    }
}
