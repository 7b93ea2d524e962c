use crate::city::{City, CityToCity};
use crate::error::{CardBagError, UnknownIdError};
use crate::map::Route;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::min;
use std::fmt;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

pub const OPEN_DECK_SIZE: usize = 5;
pub const NUM_WILD_CARDS: u8 = 14;
pub const NUM_NON_WILD_CARDS: u8 = 12;
pub const NUM_DRAWN_MISSIONS: usize = 3;
pub const NUM_INITIAL_TRAIN_CARDS: usize = 4;
pub const NUM_INITIAL_MISSIONS: usize = 3;

/// Represents the different variants of train cards.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    /// Also known as the *Hopper train*.
    Black,
    /// Also known as the *Tanker train*.
    Blue,
    /// Also known as the *Caboose train*.
    Green,
    /// Also known as the *Freight train*.
    Orange,
    /// Also known as the *Box train*.
    Pink,
    /// Also known as the *Coal train*.
    Red,
    /// Also known as the *Passenger train*.
    White,
    /// Also known as the *Locomotive*.
    /// This is a special train that matches with any color, and drawing it from
    /// the open deck always ends the turn.
    Wild,
    /// Also known as the *Reefer train*.
    Yellow,
}

impl TrainColor {
    /// Whether the current color is wild, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use ticket_to_ride_engine::card::TrainColor;
    ///
    /// assert!(!TrainColor::Black.is_wild());
    /// assert!(TrainColor::Wild.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == TrainColor::Wild
    }

    /// The opposite of `is_wild`.
    #[inline]
    pub fn is_not_wild(&self) -> bool {
        !self.is_wild()
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A multiset of train cards. Only counts per color are kept: there is no notion of order.
///
/// Used for the closed deck, the open deck, the discard pile, player hands, and the cards
/// spent on a route.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CardBag {
    counts: [u8; TrainColor::COUNT],
}

impl CardBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full deck of train cards a game starts with: 12 of every color, and 14 wild cards.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_engine::card::{CardBag, TrainColor};
    ///
    /// let deck = CardBag::full_deck();
    /// assert_eq!(deck.size(), 110);
    /// assert_eq!(deck.count(TrainColor::Wild), 14);
    /// ```
    pub fn full_deck() -> Self {
        let mut deck = Self::new();
        for color in TrainColor::iter() {
            deck.counts[color.index()] = if color.is_wild() {
                NUM_WILD_CARDS
            } else {
                NUM_NON_WILD_CARDS
            };
        }
        deck
    }

    /// A bag holding `num` cards of the given `color`.
    pub fn of(color: TrainColor, num: u8) -> Self {
        let mut bag = Self::new();
        bag.counts[color.index()] = num;
        bag
    }

    pub fn add(&mut self, color: TrainColor) {
        self.counts[color.index()] += 1;
    }

    /// Adds every card of `other` to this bag, leaving `other` as is.
    pub fn add_all(&mut self, other: &CardBag) {
        for (count, other_count) in self.counts.iter_mut().zip(other.counts) {
            *count += other_count;
        }
    }

    /// How many cards of `color` the bag holds.
    #[inline]
    pub fn count(&self, color: TrainColor) -> u8 {
        self.counts[color.index()]
    }

    #[inline]
    pub fn contains(&self, color: TrainColor) -> bool {
        self.count(color) > 0
    }

    /// Whether every card of `other` can be found in this bag.
    pub fn contains_all(&self, other: &CardBag) -> bool {
        self.counts
            .iter()
            .zip(other.counts)
            .all(|(count, other_count)| *count >= other_count)
    }

    pub fn size(&self) -> usize {
        self.counts.iter().map(|count| *count as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    /// Removes one card of the given `color`.
    ///
    /// Returns an `Err` if there is no such card.
    pub fn draw(&mut self, color: TrainColor) -> Result<TrainColor, CardBagError> {
        match self.counts[color.index()] {
            0 => Err(CardBagError::ColorAbsent(color)),
            _ => {
                self.counts[color.index()] -= 1;
                Ok(color)
            }
        }
    }

    /// Removes one card picked at random, weighted by how many cards of each color are left.
    ///
    /// Given a seeded `rng`, the outcome is reproducible.
    ///
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use ticket_to_ride_engine::card::{CardBag, TrainColor};
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(7);
    /// let mut bag = CardBag::of(TrainColor::Red, 2);
    ///
    /// assert_eq!(bag.draw_random(&mut rng), Ok(TrainColor::Red));
    /// assert_eq!(bag.draw_random(&mut rng), Ok(TrainColor::Red));
    /// assert!(bag.draw_random(&mut rng).is_err());
    /// ```
    pub fn draw_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<TrainColor, CardBagError> {
        let size = self.size();
        if size == 0 {
            return Err(CardBagError::Empty);
        }

        let mut nth = rng.gen_range(0..size);
        for color in TrainColor::iter() {
            let count = self.count(color) as usize;
            if nth < count {
                return self.draw(color);
            }
            nth -= count;
        }

        unreachable!("The random index is always smaller than the size of the bag.")
    }

    /// Removes every card of `other` from this bag.
    ///
    /// Returns an `Err` (and leaves the bag untouched) if some card of `other` is missing.
    pub fn remove_all(&mut self, other: &CardBag) -> Result<(), CardBagError> {
        if let Some(color) =
            TrainColor::iter().find(|color| self.count(*color) < other.count(*color))
        {
            return Err(CardBagError::ColorAbsent(color));
        }

        for (count, other_count) in self.counts.iter_mut().zip(other.counts) {
            *count -= other_count;
        }
        Ok(())
    }

    /// Non-empty `(color, count)` pairs, in color order.
    pub fn iter(&self) -> impl Iterator<Item = (TrainColor, u8)> + '_ {
        TrainColor::iter()
            .map(|color| (color, self.count(color)))
            .filter(|(_, count)| *count > 0)
    }

    /// The single non-wild color used amongst these cards.
    ///
    /// All cards used to claim a route should have the same color, ignoring wild cards.
    /// In case all cards are wild cards (or there are none), the common color is "wild".
    /// Returns `None` if there are two different non-wild colors.
    pub fn common_color(&self) -> Option<TrainColor> {
        let mut non_wild_colors = self
            .iter()
            .map(|(color, _)| color)
            .filter(TrainColor::is_not_wild);

        match (non_wild_colors.next(), non_wild_colors.next()) {
            (None, _) => Some(TrainColor::Wild),
            (Some(color), None) => Some(color),
            (Some(_), Some(_)) => None,
        }
    }

    /// The cards this hand would spend to claim `route` using `color`, if it can.
    ///
    /// As many `color` cards as possible are used, and wild cards cover the rest.
    /// When `color` is wild, only wild cards are used.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_engine::card::{CardBag, TrainColor};
    /// use ticket_to_ride_engine::city::City;
    /// use ticket_to_ride_engine::map::RouteId;
    ///
    /// // Boston to New York is a yellow route of length 2, and a red one.
    /// let yellow_route = RouteId::between((City::Boston, City::NewYork))[0].route();
    ///
    /// let mut hand = CardBag::of(TrainColor::Yellow, 1);
    /// hand.add(TrainColor::Wild);
    ///
    /// let mut expected = CardBag::of(TrainColor::Yellow, 1);
    /// expected.add(TrainColor::Wild);
    /// assert_eq!(hand.cards_to_claim(yellow_route, TrainColor::Yellow), Some(expected));
    /// assert_eq!(hand.cards_to_claim(yellow_route, TrainColor::Red), None);
    /// ```
    pub fn cards_to_claim(&self, route: &Route, color: TrainColor) -> Option<CardBag> {
        if color.is_not_wild() && route.color.is_not_wild() && route.color != color {
            return None;
        }

        let num_wild_cards = self.count(TrainColor::Wild);
        if color.is_wild() {
            return (num_wild_cards >= route.length)
                .then(|| CardBag::of(TrainColor::Wild, route.length));
        }

        let num_color_cards = min(self.count(color), route.length);
        if num_color_cards == 0 || num_color_cards + num_wild_cards < route.length {
            return None;
        }

        let mut cards = CardBag::of(color, num_color_cards);
        cards.counts[TrainColor::Wild.index()] = route.length - num_color_cards;
        Some(cards)
    }
}

impl FromIterator<TrainColor> for CardBag {
    fn from_iter<I: IntoIterator<Item = TrainColor>>(colors: I) -> Self {
        let mut bag = Self::new();
        bag.extend(colors);
        bag
    }
}

impl Extend<TrainColor> for CardBag {
    fn extend<I: IntoIterator<Item = TrainColor>>(&mut self, colors: I) {
        for color in colors {
            self.add(color);
        }
    }
}

impl fmt::Display for CardBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no cards");
        }

        let description: Vec<String> = self
            .iter()
            .map(|(color, count)| format!("{} {}", count, color))
            .collect();
        write!(f, "{}", description.join(", "))
    }
}

/// Identifies one of the destination tickets of [`MISSIONS`].
///
/// # JSON
/// Tickets are serialized as their index, and unknown indices are rejected.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8")]
pub struct MissionId(u8);

impl TryFrom<u8> for MissionId {
    type Error = UnknownIdError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index as usize).ok_or(UnknownIdError::Mission(index))
    }
}

impl MissionId {
    /// All destination tickets, in deck order before shuffling.
    pub fn all() -> impl Iterator<Item = MissionId> {
        (0..MISSIONS.len() as u8).map(MissionId)
    }

    /// Returns `None` if there is no ticket with this index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < MISSIONS.len()).then(|| MissionId(index as u8))
    }

    #[inline]
    pub fn mission(self) -> &'static Mission {
        &MISSIONS[self.0 as usize]
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mission = self.mission();
        write!(
            f,
            "{} - {} ({})",
            mission.destination.0, mission.destination.1, mission.points
        )
    }
}

/// Encapsulates information about a destination ticket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mission {
    /// The two cities that must be connected to fulfill the ticket.
    pub destination: CityToCity,
    /// How many points are granted once this ticket is fulfilled.
    /// If not fulfilled, the same amount will rather be substracted.
    pub points: u8,
}

/// Convenience macro to generate a destination ticket.
macro_rules! mission {
    ($start:expr, $end:expr, $points:literal) => {
        Mission {
            destination: ($start, $end),
            points: $points,
        }
    };
}

/// The fixed deck of destination tickets.
pub static MISSIONS: [Mission; 30] = [
    mission! {City::Boston, City::Miami, 12},
    mission! {City::Calgary, City::Phoenix, 13},
    mission! {City::Calgary, City::SaltLakeCity, 7},
    mission! {City::Chicago, City::NewOrleans, 7},
    mission! {City::Chicago, City::SantaFe, 9},
    mission! {City::Dallas, City::NewYork, 11},
    mission! {City::Denver, City::ElPaso, 4},
    mission! {City::Denver, City::Pittsburgh, 11},
    mission! {City::Duluth, City::ElPaso, 10},
    mission! {City::Duluth, City::Houston, 8},
    mission! {City::Helena, City::LosAngeles, 8},
    mission! {City::KansasCity, City::Houston, 5},
    mission! {City::LosAngeles, City::Chicago, 16},
    mission! {City::LosAngeles, City::Miami, 20},
    mission! {City::LosAngeles, City::NewYork, 21},
    mission! {City::Montreal, City::Atlanta, 9},
    mission! {City::Montreal, City::NewOrleans, 13},
    mission! {City::NewYork, City::Atlanta, 6},
    mission! {City::Portland, City::Nashville, 17},
    mission! {City::Portland, City::Phoenix, 11},
    mission! {City::SanFrancisco, City::Atlanta, 17},
    mission! {City::SaultStMarie, City::Nashville, 8},
    mission! {City::SaultStMarie, City::OklahomaCity, 9},
    mission! {City::Seattle, City::LosAngeles, 9},
    mission! {City::Seattle, City::NewYork, 22},
    mission! {City::Toronto, City::Miami, 10},
    mission! {City::Vancouver, City::Montreal, 20},
    mission! {City::Vancouver, City::SantaFe, 13},
    mission! {City::Winnipeg, City::Houston, 12},
    mission! {City::Winnipeg, City::LittleRock, 11},
];
