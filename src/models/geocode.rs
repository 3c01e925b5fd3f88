use serde::Deserialize;

/// One result row from the third-party place search. Coordinates arrive as
/// strings on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodePlace {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

impl GeocodePlace {
    pub fn coords(&self) -> Option<(f64, f64)> {
        let lat = self.lat.parse().ok()?;
        let lon = self.lon.parse().ok()?;
        Some((lat, lon))
    }
}
