use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// Endpoints of routes and destination tickets.
///
/// # JSON
/// Cities are serialized as an 8-bit unsigned integer.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize_repr,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Serialize_repr,
)]
#[repr(u8)]
pub enum City {
    Atlanta = 0,
    Boston = 1,
    Calgary = 2,
    Charleston = 3,
    Chicago = 4,
    Dallas = 5,
    Denver = 6,
    Duluth = 7,
    #[strum(serialize = "El Paso")]
    ElPaso = 8,
    Helena = 9,
    Houston = 10,
    #[strum(serialize = "Kansas City")]
    KansasCity = 11,
    #[strum(serialize = "Las Vegas")]
    LasVegas = 12,
    #[strum(serialize = "Little Rock")]
    LittleRock = 13,
    #[strum(serialize = "Los Angeles")]
    LosAngeles = 14,
    Miami = 15,
    #[strum(serialize = "Montréal")]
    Montreal = 16,
    Nashville = 17,
    #[strum(serialize = "New Orleans")]
    NewOrleans = 18,
    #[strum(serialize = "New York")]
    NewYork = 19,
    #[strum(serialize = "Oklahoma City")]
    OklahomaCity = 20,
    Omaha = 21,
    Phoenix = 22,
    Pittsburgh = 23,
    Portland = 24,
    Raleigh = 25,
    #[strum(serialize = "Saint Louis")]
    SaintLouis = 26,
    #[strum(serialize = "Salt Lake City")]
    SaltLakeCity = 27,
    #[strum(serialize = "San Francisco")]
    SanFrancisco = 28,
    #[strum(serialize = "Santa Fe")]
    SantaFe = 29,
    #[strum(serialize = "Sault St. Marie")]
    SaultStMarie = 30,
    Seattle = 31,
    Toronto = 32,
    Vancouver = 33,
    Washington = 34,
    Winnipeg = 35,
}

/// A pair of cities, e.g. the endpoints of a route or of a destination ticket.
pub type CityToCity = (City, City);

/// Orders a pair of cities, so that `(a, b)` and `(b, a)` compare equal once normalized.
///
/// # Example
/// ```
/// use ticket_to_ride_engine::city::{normalize, City};
///
/// assert_eq!(
///     normalize((City::Seattle, City::Calgary)),
///     (City::Calgary, City::Seattle)
/// );
/// ```
#[inline]
pub fn normalize((start, end): CityToCity) -> CityToCity {
    if start <= end {
        (start, end)
    } else {
        (end, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn city_count() {
        assert_eq!(City::COUNT, 36);
        assert_eq!(City::iter().count(), City::COUNT);
        assert_eq!(City::iter().last(), Some(City::Winnipeg));
    }

    #[test]
    fn multi_word_city_to_string() {
        assert_eq!(City::Atlanta.to_string(), "Atlanta");
        assert_eq!(City::LosAngeles.to_string(), "Los Angeles");
        assert_eq!(City::Montreal.to_string(), "Montréal");
        assert_eq!(City::SaultStMarie.to_string(), "Sault St. Marie");
    }

    #[test]
    fn city_json_round_trip() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&City::Duluth)?, "7");
        assert_eq!(serde_json::from_str::<City>("22")?, City::Phoenix);
        assert!(serde_json::from_str::<City>("36").is_err());

        Ok(())
    }

    #[test]
    fn normalize_pairs() {
        let pair = (City::Boston, City::Atlanta);
        assert_eq!(normalize(pair), (City::Atlanta, City::Boston));
        assert_eq!(normalize(normalize(pair)), normalize(pair));
        assert_eq!(
            normalize((City::Denver, City::Denver)),
            (City::Denver, City::Denver)
        );
    }
}
