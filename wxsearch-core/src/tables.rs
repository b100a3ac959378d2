//! Fixed lookup tables used by the resolver.
//!
//! Keys are stored trimmed and lowercased. Both tables are built once and
//! only read afterwards; config overrides are merged in at construction time.

use std::collections::HashMap;

use crate::error::TableError;

/// (state name, postal abbreviation, candidate cities)
pub(crate) const STATES: &[(&str, &str, &[&str])] = &[
    ("alabama", "al", &["Birmingham", "Montgomery", "Huntsville", "Mobile"]),
    ("alaska", "ak", &["Anchorage", "Fairbanks", "Juneau"]),
    ("arizona", "az", &["Phoenix", "Tucson", "Flagstaff", "Mesa"]),
    ("arkansas", "ar", &["Little Rock", "Fayetteville", "Fort Smith"]),
    ("california", "ca", &["Los Angeles", "San Francisco", "San Diego", "Sacramento"]),
    ("colorado", "co", &["Denver", "Colorado Springs", "Boulder"]),
    ("connecticut", "ct", &["Hartford", "New Haven", "Stamford"]),
    ("delaware", "de", &["Wilmington", "Dover", "Newark, DE"]),
    ("florida", "fl", &["Miami", "Orlando", "Tampa", "Jacksonville"]),
    ("georgia", "ga", &["Atlanta", "Savannah", "Augusta"]),
    ("hawaii", "hi", &["Honolulu", "Hilo", "Kahului"]),
    ("idaho", "id", &["Boise", "Idaho Falls", "Coeur d'Alene"]),
    ("illinois", "il", &["Chicago", "Springfield, IL", "Peoria"]),
    ("indiana", "in", &["Indianapolis", "Fort Wayne", "South Bend"]),
    ("iowa", "ia", &["Des Moines", "Cedar Rapids", "Iowa City"]),
    ("kansas", "ks", &["Wichita", "Topeka", "Kansas City, KS"]),
    ("kentucky", "ky", &["Louisville", "Lexington", "Frankfort"]),
    ("louisiana", "la", &["New Orleans", "Baton Rouge", "Shreveport"]),
    ("maine", "me", &["Portland, ME", "Bangor", "Augusta, ME"]),
    ("maryland", "md", &["Baltimore", "Annapolis", "Frederick"]),
    ("massachusetts", "ma", &["Boston", "Worcester", "Springfield, MA"]),
    ("michigan", "mi", &["Detroit", "Grand Rapids", "Lansing", "Ann Arbor"]),
    ("minnesota", "mn", &["Minneapolis", "Saint Paul", "Duluth"]),
    ("mississippi", "ms", &["Jackson, MS", "Gulfport", "Biloxi"]),
    ("missouri", "mo", &["Kansas City", "St. Louis", "Springfield, MO"]),
    ("montana", "mt", &["Billings", "Missoula", "Helena"]),
    ("nebraska", "ne", &["Omaha", "Lincoln", "Grand Island"]),
    ("nevada", "nv", &["Las Vegas", "Reno", "Carson City"]),
    ("new hampshire", "nh", &["Manchester, NH", "Concord, NH", "Nashua"]),
    ("new jersey", "nj", &["Newark", "Jersey City", "Trenton", "Atlantic City"]),
    ("new mexico", "nm", &["Albuquerque", "Santa Fe", "Las Cruces"]),
    ("new york", "ny", &["New York", "Buffalo", "Albany", "Rochester"]),
    ("north carolina", "nc", &["Charlotte", "Raleigh", "Asheville"]),
    ("north dakota", "nd", &["Fargo", "Bismarck", "Grand Forks"]),
    ("ohio", "oh", &["Columbus", "Cleveland", "Cincinnati"]),
    ("oklahoma", "ok", &["Oklahoma City", "Tulsa", "Norman"]),
    ("oregon", "or", &["Portland", "Eugene", "Salem"]),
    ("pennsylvania", "pa", &["Philadelphia", "Pittsburgh", "Harrisburg"]),
    ("rhode island", "ri", &["Providence", "Newport", "Warwick"]),
    ("south carolina", "sc", &["Charleston", "Columbia, SC", "Greenville, SC"]),
    ("south dakota", "sd", &["Sioux Falls", "Rapid City", "Pierre"]),
    ("tennessee", "tn", &["Nashville", "Memphis", "Knoxville"]),
    ("texas", "tx", &["Houston", "Austin", "Dallas", "San Antonio"]),
    ("utah", "ut", &["Salt Lake City", "Provo", "St. George"]),
    ("vermont", "vt", &["Burlington", "Montpelier", "Rutland"]),
    ("virginia", "va", &["Richmond", "Virginia Beach", "Norfolk"]),
    ("washington", "wa", &["Seattle", "Spokane", "Tacoma", "Olympia"]),
    ("west virginia", "wv", &["Charleston, WV", "Morgantown", "Huntington, WV"]),
    ("wisconsin", "wi", &["Milwaukee", "Madison", "Green Bay"]),
    ("wyoming", "wy", &["Cheyenne", "Casper", "Jackson, WY"]),
];

pub(crate) const NICKNAMES: &[(&str, &str)] = &[
    ("big apple", "New York"),
    ("the big apple", "New York"),
    ("nyc", "New York"),
    ("windy city", "Chicago"),
    ("chi-town", "Chicago"),
    ("city of angels", "Los Angeles"),
    ("sf", "San Francisco"),
    ("frisco", "San Francisco"),
    ("bay area", "San Francisco"),
    ("philly", "Philadelphia"),
    ("vegas", "Las Vegas"),
    ("sin city", "Las Vegas"),
    ("nola", "New Orleans"),
    ("big easy", "New Orleans"),
    ("the big easy", "New Orleans"),
    ("motor city", "Detroit"),
    ("motown", "Detroit"),
    ("dc", "Washington, DC"),
    ("beantown", "Boston"),
    ("mile high city", "Denver"),
    ("music city", "Nashville"),
    ("h-town", "Houston"),
    ("atl", "Atlanta"),
    ("emerald city", "Seattle"),
    ("magic city", "Miami"),
    ("twin cities", "Minneapolis"),
    ("steel city", "Pittsburgh"),
];

/// NicknameTable and StateTable.
#[derive(Debug, Clone, Default)]
pub struct LocationTables {
    nicknames: HashMap<String, String>,
    states: HashMap<String, Vec<String>>,
}

impl LocationTables {
    /// Tables shipped with the binary.
    pub fn builtin() -> Self {
        let nicknames = NICKNAMES
            .iter()
            .map(|(alias, city)| ((*alias).to_string(), (*city).to_string()))
            .collect();

        let mut states = HashMap::with_capacity(STATES.len() * 2);
        for (name, abbrev, cities) in STATES {
            let cities: Vec<String> = cities.iter().map(|c| (*c).to_string()).collect();
            states.insert((*abbrev).to_string(), cities.clone());
            states.insert((*name).to_string(), cities);
        }

        Self { nicknames, states }
    }

    /// Merge extra entries over the current tables. Entries with an existing
    /// key replace the old value.
    pub fn with_overrides(
        mut self,
        nicknames: &HashMap<String, String>,
        states: &HashMap<String, Vec<String>>,
    ) -> Result<Self, TableError> {
        for (alias, city) in nicknames {
            self.nicknames.insert(normalize_key(alias), city.trim().to_string());
        }

        for (state, cities) in states {
            let cities: Vec<String> = cities
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();

            if cities.is_empty() {
                return Err(TableError::EmptyStateList { state: state.clone() });
            }

            self.states.insert(normalize_key(state), cities);
        }

        Ok(self)
    }

    /// `key` must already be trimmed and lowercased.
    pub fn nickname(&self, key: &str) -> Option<&str> {
        self.nicknames.get(key).map(String::as_str)
    }

    /// `key` must already be trimmed and lowercased. Never returns an empty slice.
    pub fn state_cities(&self, key: &str) -> Option<&[String]> {
        self.states.get(key).map(Vec::as_slice)
    }
}

pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
