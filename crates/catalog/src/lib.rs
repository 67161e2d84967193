use serde::{Deserialize, Serialize};

/// Fixed catalog of selectable basemaps.
///
/// The ids are the strings the rendering engine understands; the order of
/// [`Basemap::ALL`] is the presentation order used in error messages.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Basemap {
    #[default]
    TopoVector,
    StreetsVector,
    Streets,
    Satellite,
    Hybrid,
    Terrain,
    Osm,
    DarkGrayVector,
    GrayVector,
    StreetsNightVector,
    StreetsReliefVector,
    StreetsNavigationVector,
}

impl Basemap {
    pub const ALL: [Basemap; 12] = [
        Basemap::TopoVector,
        Basemap::StreetsVector,
        Basemap::Streets,
        Basemap::Satellite,
        Basemap::Hybrid,
        Basemap::Terrain,
        Basemap::Osm,
        Basemap::DarkGrayVector,
        Basemap::GrayVector,
        Basemap::StreetsNightVector,
        Basemap::StreetsReliefVector,
        Basemap::StreetsNavigationVector,
    ];

    pub const fn id(&self) -> &'static str {
        match self {
            Basemap::TopoVector => "topo-vector",
            Basemap::StreetsVector => "streets-vector",
            Basemap::Streets => "streets",
            Basemap::Satellite => "satellite",
            Basemap::Hybrid => "hybrid",
            Basemap::Terrain => "terrain",
            Basemap::Osm => "osm",
            Basemap::DarkGrayVector => "dark-gray-vector",
            Basemap::GrayVector => "gray-vector",
            Basemap::StreetsNightVector => "streets-night-vector",
            Basemap::StreetsReliefVector => "streets-relief-vector",
            Basemap::StreetsNavigationVector => "streets-navigation-vector",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.id() == id)
    }

    pub fn all_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(Basemap::id).collect()
    }
}

impl std::fmt::Display for Basemap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// 2D map view or 3D scene view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

impl ViewMode {
    pub const ALL: [ViewMode; 2] = [ViewMode::TwoD, ViewMode::ThreeD];

    pub const fn id(&self) -> &'static str {
        match self {
            ViewMode::TwoD => "2d",
            ViewMode::ThreeD => "3d",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.id() == id)
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
