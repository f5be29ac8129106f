//! Region registry — the fixed set of administrative regions the catalog
//! can filter supplier pricing by, with their site-internal codes.

use serde::{Deserialize, Serialize};

/// An administrative region the catalog knows how to filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Región Metropolitana.
    Rm,
    /// Región de Valparaíso.
    Valparaiso,
    /// Región de O'Higgins.
    OHiggins,
}

impl Region {
    /// Every registered region, in the order probes run. The order is a
    /// convention only; each probe re-selects its region and re-reads the
    /// table fresh, so results do not depend on it.
    pub const ALL: [Region; 3] = [Region::Rm, Region::Valparaiso, Region::OHiggins];

    /// The option value the site's region `<select>` uses for this region.
    pub fn selector_value(self) -> &'static str {
        match self {
            Region::Rm => "13",
            Region::Valparaiso => "5",
            Region::OHiggins => "6",
        }
    }

    /// The field name this region carries in result rows and JSON bodies.
    pub fn key(self) -> &'static str {
        match self {
            Region::Rm => "RM",
            Region::Valparaiso => "VALPO",
            Region::OHiggins => "OHIGGINS",
        }
    }
}
