use crate::card::TrainColor;
use crate::card::TrainColor::*;
use crate::city::{normalize, City, CityToCity};
use crate::error::UnknownIdError;

use array_init::array_init;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::max;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use strum::EnumCount;

// Helena has the highest number of neighbors, which is 7 adjacent cities.
const MAX_ROUTES_PER_CITY: usize = 7;

/// Number of routes on the map, counting each of the parallel routes.
pub const NUM_ROUTES: usize = 100;

/// Identifies one of the routes of the map.
///
/// This is the handle used everywhere a route is referred to: in decisions, in the ownership
/// map of the [`crate::state::State`], and in each player's claimed routes.
///
/// # JSON
/// Routes are serialized as their index, and unknown indices are rejected.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8")]
pub struct RouteId(u8);

impl TryFrom<u8> for RouteId {
    type Error = UnknownIdError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index as usize).ok_or(UnknownIdError::Route(index))
    }
}

/// A claimable connection between two adjacent cities.
///
/// There can be two "parallel" routes between the same cities: they are each other's `dual`,
/// and a player may only ever own one of them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    /// Both endpoints, ordered as in [`normalize`].
    pub cities: CityToCity,
    /// The color of this specific route.
    /// The `Wild` color means that any (single) color matches.
    pub color: TrainColor,
    /// The distance between two cities.
    /// This is analogous to the number of train cards needed to claim the route.
    pub length: u8,
    /// The parallel route between the same two cities, if any.
    pub dual: Option<RouteId>,
}

/// All routes connecting two adjacent cities.
/// There is up to two "parallel" routes between two cities.
type ParallelRoutes = SmallVec<[RouteId; 2]>;

/// Convenience macro to describe the "parallel" routes between two cities.
macro_rules! parallel_routes {
    ($cities:expr, $length:literal, $($train_colors:expr),+) => {
        ($cities, $length, &[$($train_colors),+])
    };
}

/// Every pair of adjacent cities on the US map, with the length and colors of their routes.
static US_MAP: [(CityToCity, u8, &[TrainColor]); 78] = [
    // Atlanta.
    parallel_routes!((City::Atlanta, City::Charleston), 2, Wild),
    parallel_routes!((City::Atlanta, City::Miami), 5, Blue),
    parallel_routes!((City::Atlanta, City::Nashville), 1, Wild),
    parallel_routes!((City::Atlanta, City::NewOrleans), 5, Orange, Yellow),
    parallel_routes!((City::Atlanta, City::Raleigh), 2, Wild, Wild),
    // Boston.
    parallel_routes!((City::Boston, City::Montreal), 2, Wild, Wild),
    parallel_routes!((City::Boston, City::NewYork), 2, Yellow, Red),
    // Calgary.
    parallel_routes!((City::Calgary, City::Helena), 4, Wild),
    parallel_routes!((City::Calgary, City::Seattle), 4, Wild),
    parallel_routes!((City::Calgary, City::Vancouver), 3, Wild),
    parallel_routes!((City::Calgary, City::Winnipeg), 6, White),
    // Charleston.
    parallel_routes!((City::Charleston, City::Miami), 4, Pink),
    parallel_routes!((City::Charleston, City::Raleigh), 2, Wild),
    // Chicago.
    parallel_routes!((City::Chicago, City::Duluth), 3, Red),
    parallel_routes!((City::Chicago, City::Omaha), 4, Blue),
    parallel_routes!((City::Chicago, City::Pittsburgh), 3, Black, Orange),
    parallel_routes!((City::Chicago, City::SaintLouis), 2, Green, White),
    parallel_routes!((City::Chicago, City::Toronto), 4, White),
    // Dallas.
    parallel_routes!((City::Dallas, City::ElPaso), 4, Red),
    parallel_routes!((City::Dallas, City::Houston), 1, Wild, Wild),
    parallel_routes!((City::Dallas, City::LittleRock), 2, Wild),
    parallel_routes!((City::Dallas, City::OklahomaCity), 2, Wild, Wild),
    // Denver.
    parallel_routes!((City::Denver, City::Helena), 4, Green),
    parallel_routes!((City::Denver, City::KansasCity), 4, Black, Orange),
    parallel_routes!((City::Denver, City::OklahomaCity), 4, Red),
    parallel_routes!((City::Denver, City::Omaha), 4, Pink),
    parallel_routes!((City::Denver, City::Phoenix), 5, White),
    parallel_routes!((City::Denver, City::SaltLakeCity), 3, Red, Yellow),
    parallel_routes!((City::Denver, City::SantaFe), 2, Wild),
    // Duluth.
    parallel_routes!((City::Duluth, City::Helena), 6, Orange),
    parallel_routes!((City::Duluth, City::Omaha), 2, Wild, Wild),
    parallel_routes!((City::Duluth, City::SaultStMarie), 3, Wild),
    parallel_routes!((City::Duluth, City::Toronto), 6, Pink),
    parallel_routes!((City::Duluth, City::Winnipeg), 4, Black),
    // El Paso.
    parallel_routes!((City::ElPaso, City::Houston), 6, Green),
    parallel_routes!((City::ElPaso, City::LosAngeles), 6, Black),
    parallel_routes!((City::ElPaso, City::OklahomaCity), 5, Yellow),
    parallel_routes!((City::ElPaso, City::Phoenix), 3, Wild),
    parallel_routes!((City::ElPaso, City::SantaFe), 2, Wild),
    // Helena.
    parallel_routes!((City::Helena, City::Omaha), 5, Red),
    parallel_routes!((City::Helena, City::SaltLakeCity), 3, Pink),
    parallel_routes!((City::Helena, City::Seattle), 6, Yellow),
    parallel_routes!((City::Helena, City::Winnipeg), 4, Blue),
    // Houston.
    parallel_routes!((City::Houston, City::NewOrleans), 2, Wild),
    // Kansas City.
    parallel_routes!((City::KansasCity, City::SaintLouis), 2, Blue, Pink),
    parallel_routes!((City::KansasCity, City::OklahomaCity), 2, Wild, Wild),
    parallel_routes!((City::KansasCity, City::Omaha), 1, Wild, Wild),
    // Las Vegas.
    parallel_routes!((City::LasVegas, City::LosAngeles), 2, Wild),
    parallel_routes!((City::LasVegas, City::SaltLakeCity), 3, Orange),
    // Little Rock.
    parallel_routes!((City::LittleRock, City::Nashville), 3, White),
    parallel_routes!((City::LittleRock, City::NewOrleans), 3, Wild),
    parallel_routes!((City::LittleRock, City::OklahomaCity), 2, Wild),
    parallel_routes!((City::LittleRock, City::SaintLouis), 2, Wild),
    // Los Angeles.
    parallel_routes!((City::LosAngeles, City::Phoenix), 3, Wild),
    parallel_routes!((City::LosAngeles, City::SanFrancisco), 3, Pink, Yellow),
    // Miami.
    parallel_routes!((City::Miami, City::NewOrleans), 6, Red),
    // Montreal.
    parallel_routes!((City::Montreal, City::NewYork), 3, Blue),
    parallel_routes!((City::Montreal, City::SaultStMarie), 5, Black),
    parallel_routes!((City::Montreal, City::Toronto), 3, Wild),
    // Nashville.
    parallel_routes!((City::Nashville, City::Pittsburgh), 4, Yellow),
    parallel_routes!((City::Nashville, City::Raleigh), 3, Black),
    parallel_routes!((City::Nashville, City::SaintLouis), 2, Wild),
    // New York.
    parallel_routes!((City::NewYork, City::Pittsburgh), 2, Green, White),
    parallel_routes!((City::NewYork, City::Washington), 2, Black, Orange),
    // Oklahoma City.
    parallel_routes!((City::OklahomaCity, City::SantaFe), 3, Blue),
    // Phoenix.
    parallel_routes!((City::Phoenix, City::SantaFe), 3, Wild),
    // Pittsburgh.
    parallel_routes!((City::Pittsburgh, City::Raleigh), 2, Wild),
    parallel_routes!((City::Pittsburgh, City::SaintLouis), 5, Green),
    parallel_routes!((City::Pittsburgh, City::Toronto), 2, Wild),
    parallel_routes!((City::Pittsburgh, City::Washington), 2, Wild),
    // Portland.
    parallel_routes!((City::Portland, City::SaltLakeCity), 6, Blue),
    parallel_routes!((City::Portland, City::SanFrancisco), 5, Green, Pink),
    // Raleigh.
    parallel_routes!((City::Raleigh, City::Washington), 2, Wild, Wild),
    // Salt Lake City.
    parallel_routes!((City::SaltLakeCity, City::SanFrancisco), 5, Orange, White),
    // Sault St. Marie.
    parallel_routes!((City::SaultStMarie, City::Toronto), 2, Wild),
    parallel_routes!((City::SaultStMarie, City::Winnipeg), 6, Wild),
    // Seattle.
    parallel_routes!((City::Seattle, City::Portland), 1, Wild, Wild),
    parallel_routes!((City::Seattle, City::Vancouver), 1, Wild, Wild),
];

lazy_static! {
    static ref ROUTES: Vec<Route> = build_routes();
    static ref ROUTES_BY_CITIES: BTreeMap<CityToCity, ParallelRoutes> = {
        let mut routes_by_cities: BTreeMap<CityToCity, ParallelRoutes> = BTreeMap::new();
        for route in ROUTES.iter() {
            routes_by_cities.entry(route.cities).or_default().push(route.id);
        }
        routes_by_cities
    };
}

fn build_routes() -> Vec<Route> {
    let mut routes = Vec::with_capacity(NUM_ROUTES);

    for (cities, length, train_colors) in US_MAP.iter() {
        let first_id = routes.len();
        let num_parallel_routes = train_colors.len();

        for (i, train_color) in train_colors.iter().enumerate() {
            let dual = match num_parallel_routes {
                2 => Some(RouteId((first_id + 1 - i) as u8)),
                _ => None,
            };

            routes.push(Route {
                id: RouteId((first_id + i) as u8),
                cities: normalize(*cities),
                color: *train_color,
                length: *length,
                dual,
            });
        }
    }

    routes
}

impl RouteId {
    /// All routes of the map.
    pub fn all() -> impl Iterator<Item = RouteId> {
        (0..NUM_ROUTES as u8).map(RouteId)
    }

    /// Returns `None` if there is no route with this index.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_ROUTES).then(|| RouteId(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn route(self) -> &'static Route {
        &ROUTES[self.index()]
    }

    #[inline]
    pub fn dual(self) -> Option<RouteId> {
        self.route().dual
    }

    /// The parallel routes between two cities, in either direction.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_engine::card::TrainColor;
    /// use ticket_to_ride_engine::city::City;
    /// use ticket_to_ride_engine::map::RouteId;
    ///
    /// let routes = RouteId::between((City::SaintLouis, City::KansasCity));
    /// assert_eq!(routes.len(), 2);
    /// assert_eq!(routes[0].route().color, TrainColor::Blue);
    /// assert_eq!(routes[0].dual(), Some(routes[1]));
    ///
    /// assert!(RouteId::between((City::Houston, City::NewYork)).is_empty());
    /// ```
    pub fn between(cities: CityToCity) -> &'static [RouteId] {
        ROUTES_BY_CITIES
            .get(&normalize(cities))
            .map(|parallel_routes| parallel_routes.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = self.route();
        write!(
            f,
            "{} - {} ({} {})",
            route.cities.0, route.cities.1, route.length, route.color
        )
    }
}

impl Route {
    /// Points granted for claiming a route of the given length.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_engine::map::Route;
    ///
    /// assert_eq!(Route::points_for_length(3), 4);
    /// assert_eq!(Route::points_for_length(6), 15);
    /// ```
    pub fn points_for_length(length: u8) -> u8 {
        match length {
            1 => 1,
            2 => 2,
            3 => 4,
            4 => 7,
            5 => 10,
            6 => 15,
            _ => 0,
        }
    }

    #[inline]
    pub fn points(&self) -> u8 {
        Self::points_for_length(self.length)
    }
}

/// Maps each city to the adjacent cities reachable through a set of claimed routes,
/// alongside the route used.
type Adjacency = [SmallVec<[(City, RouteId); MAX_ROUTES_PER_CITY]>; City::COUNT];

fn build_adjacency(claimed_routes: &[RouteId]) -> Adjacency {
    let mut adjacency: Adjacency = array_init(|_| SmallVec::new());

    for route_id in claimed_routes {
        let (start, end) = route_id.route().cities;
        adjacency[start as usize].push((end, *route_id));
        adjacency[end as usize].push((start, *route_id));
    }

    adjacency
}

/// Predicate that assess whether the given claimed routes connect two cities.
///
/// # Example
/// ```
/// use ticket_to_ride_engine::city::City;
/// use ticket_to_ride_engine::map::{connects, RouteId};
///
/// let destination = (City::Raleigh, City::NewYork);
/// let mut claimed_routes = vec![RouteId::between((City::Raleigh, City::Washington))[0]];
/// assert!(!connects(&claimed_routes, destination));
///
/// claimed_routes.push(RouteId::between((City::Washington, City::NewYork))[1]);
/// assert!(connects(&claimed_routes, destination));
/// ```
pub fn connects(claimed_routes: &[RouteId], (start, end): CityToCity) -> bool {
    if start == end {
        return true;
    }

    let adjacency = build_adjacency(claimed_routes);
    let mut cities_visited = [false; City::COUNT];
    let mut cities_to_visit = VecDeque::with_capacity(City::COUNT);

    cities_visited[start as usize] = true;
    cities_to_visit.push_back(start);

    while let Some(city) = cities_to_visit.pop_front() {
        for (neighbor, _) in &adjacency[city as usize] {
            if *neighbor == end {
                return true;
            }

            if !cities_visited[*neighbor as usize] {
                cities_visited[*neighbor as usize] = true;
                cities_to_visit.push_back(*neighbor);
            }
        }
    }

    false
}

/// Returns the longest continuous path spanned from the claimed routes.
///
/// Note that a continous path may visit a city multiple times, but may not go through a
/// route twice.
///
/// # Example
/// ```
/// use ticket_to_ride_engine::city::City;
/// use ticket_to_ride_engine::map::{longest_path, RouteId};
///
/// let claimed_routes = [
///     RouteId::between((City::ElPaso, City::Phoenix))[0],
///     RouteId::between((City::Denver, City::Phoenix))[0],
/// ];
///
/// // Route El Paso -> Phoenix is of length 3.
/// // Route Phoenix -> Denver is of length 5.
/// assert_eq!(longest_path(&claimed_routes), 8);
/// ```
pub fn longest_path(claimed_routes: &[RouteId]) -> u16 {
    let adjacency = build_adjacency(claimed_routes);
    let mut routes_visited = [false; NUM_ROUTES];

    claimed_routes
        .iter()
        .flat_map(|route_id| {
            let (start, end) = route_id.route().cities;
            [start, end]
        })
        .map(|city| longest_path_from_city(city, &adjacency, &mut routes_visited, 0))
        .max()
        .unwrap_or(0)
}

fn longest_path_from_city(
    start: City,
    adjacency: &Adjacency,
    routes_visited: &mut [bool; NUM_ROUTES],
    current_length: u16,
) -> u16 {
    let mut longest_path = current_length;

    for (end, route_id) in &adjacency[start as usize] {
        if routes_visited[route_id.index()] {
            continue;
        }

        routes_visited[route_id.index()] = true;
        longest_path = max(
            longest_path,
            longest_path_from_city(
                *end,
                adjacency,
                routes_visited,
                current_length + route_id.route().length as u16,
            ),
        );
        routes_visited[route_id.index()] = false;
    }

    longest_path
}
