use crate::card::{CardBag, MissionId, TrainColor, NUM_DRAWN_MISSIONS};
use crate::map::{connects, RouteId};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter};

/// Every player starts the game with 45 cars.
pub const NUM_OF_CARS: u8 = 45;

/// Once a player is left with this many cars (or fewer) at the end of their turn,
/// every other player gets one last turn.
pub const ALMOST_OUT_OF_CARS: u8 = 2;

/// Stable index of a player in the [`crate::state::State`]. This is the only way a player
/// is referred to across the public API.
pub type PlayerHandle = usize;

/// Missions drawn this turn, awaiting a keep decision.
pub type PendingMissions = SmallVec<[MissionId; NUM_DRAWN_MISSIONS]>;

/// Every player has their own color.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    Blue,
    Red,
    Green,
    Yellow,
    Black,
}

/// Everything the engine knows about one player.
///
/// The [`PlayerState`] holds no rules: decisions are validated and applied by the
/// [`crate::state::State`], which is also in charge of inter-player concerns such as turns
/// and route ownership.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerState {
    pub(crate) handle: PlayerHandle,
    pub(crate) name: String,
    pub(crate) color: PlayerColor,
    /// Maps how many of a train color a player has.
    pub(crate) hand: CardBag,
    /// Routes claimed by this player.
    pub(crate) routes: BTreeSet<RouteId>,
    /// The number of cars the player has left.
    /// This is the currency used, alongside train cards, to claim routes.
    pub(crate) cars: u8,
    /// Destination tickets the player has kept, and will try to fulfill.
    pub(crate) missions: BTreeSet<MissionId>,
    /// Set only between the first and the second draw of a two-draw turn.
    pub(crate) drawn_card: Option<TrainColor>,
    /// After having drawn missions, we place them in this "pending" state until the player
    /// selects which ones they want to keep.
    pub(crate) drawn_missions: PendingMissions,
}

impl PlayerState {
    pub fn new(handle: PlayerHandle, name: String, color: PlayerColor) -> Self {
        Self {
            handle,
            name,
            color,
            hand: CardBag::new(),
            routes: BTreeSet::new(),
            cars: NUM_OF_CARS,
            missions: BTreeSet::new(),
            drawn_card: None,
            drawn_missions: SmallVec::new(),
        }
    }

    #[inline]
    pub fn handle(&self) -> PlayerHandle {
        self.handle
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn color(&self) -> PlayerColor {
        self.color
    }

    #[inline]
    pub fn hand(&self) -> &CardBag {
        &self.hand
    }

    #[inline]
    pub fn cars(&self) -> u8 {
        self.cars
    }

    #[inline]
    pub fn routes(&self) -> &BTreeSet<RouteId> {
        &self.routes
    }

    #[inline]
    pub fn missions(&self) -> &BTreeSet<MissionId> {
        &self.missions
    }

    /// The card drawn earlier this turn, if the player may still draw a second one.
    #[inline]
    pub fn drawn_card(&self) -> Option<TrainColor> {
        self.drawn_card
    }

    /// Missions drawn this turn, which the player must now choose from.
    #[inline]
    pub fn drawn_missions(&self) -> &[MissionId] {
        &self.drawn_missions
    }

    #[inline]
    pub fn has_pending_missions(&self) -> bool {
        !self.drawn_missions.is_empty()
    }

    #[inline]
    pub fn almost_out_of_cars(&self) -> bool {
        self.cars <= ALMOST_OUT_OF_CARS
    }

    /// Whether the player owns the parallel route of `route_id`.
    pub fn owns_dual_of(&self, route_id: RouteId) -> bool {
        route_id
            .dual()
            .map_or(false, |dual| self.routes.contains(&dual))
    }

    /// Points granted by the routes claimed so far.
    pub fn route_points(&self) -> i32 {
        self.routes
            .iter()
            .map(|route_id| route_id.route().points() as i32)
            .sum()
    }

    /// Whether the claimed routes connect both ends of the given mission.
    pub fn has_fulfilled(&self, mission_id: MissionId) -> bool {
        let claimed_routes: Vec<RouteId> = self.routes.iter().copied().collect();
        connects(&claimed_routes, mission_id.mission().destination)
    }

    /// Fulfilled missions add their value, unfulfilled ones subtract it.
    pub fn mission_points(&self) -> i32 {
        let claimed_routes: Vec<RouteId> = self.routes.iter().copied().collect();

        self.missions
            .iter()
            .map(|mission_id| {
                let mission = mission_id.mission();
                if connects(&claimed_routes, mission.destination) {
                    mission.points as i32
                } else {
                    -(mission.points as i32)
                }
            })
            .sum()
    }
}
