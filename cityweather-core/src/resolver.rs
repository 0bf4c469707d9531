use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{Result, WeatherError},
    input::SearchQuery,
    model::{Coordinates, GeoCandidate},
    provider::Geocoder,
};

/// Turns names and coordinates into geocoded candidates.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Every match for `query`, in geocoder order. No match is [`WeatherError::NotFound`].
    pub async fn resolve_by_name(&self, query: &SearchQuery) -> Result<Vec<GeoCandidate>> {
        let candidates = self.geocoder.search(query.as_str()).await?;
        if candidates.is_empty() {
            debug!(%query, "no geocoding match");
            return Err(WeatherError::NotFound);
        }

        debug!(%query, count = candidates.len(), "resolved candidates");
        Ok(candidates)
    }

    /// Closest named place to `coordinates`.
    ///
    /// `Ok(None)` means the lookup worked but named nothing; the caller can go
    /// on without a city name.
    pub async fn resolve_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<GeoCandidate>> {
        let candidates = self.geocoder.reverse(coordinates).await?;
        Ok(candidates.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticGeocoder;

    fn place(name: &str) -> GeoCandidate {
        GeoCandidate {
            city_name: name.to_string(),
            country_name: "France".to_string(),
            admin_name: "Île-de-France".to_string(),
            coordinates: Coordinates::new(48.85, 2.35),
            timezone_id: "Europe/Paris".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_search_is_not_found() {
        let resolver = LocationResolver::new(Arc::new(StaticGeocoder::default()));
        let query = SearchQuery::parse("nowhere").unwrap();

        let err = resolver.resolve_by_name(&query).await.unwrap_err();
        assert!(matches!(err, WeatherError::NotFound));
    }

    #[tokio::test]
    async fn search_keeps_geocoder_order() {
        let geocoder = StaticGeocoder {
            search: vec![place("Paris"), place("Paris (TX)")],
            ..Default::default()
        };
        let resolver = LocationResolver::new(Arc::new(geocoder));

        let found = resolver.resolve_by_name(&SearchQuery::parse("paris").unwrap()).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].city_name, "Paris (TX)");
    }

    #[tokio::test]
    async fn reverse_takes_first_or_nothing() {
        let empty = LocationResolver::new(Arc::new(StaticGeocoder::default()));
        assert_eq!(empty.resolve_by_coordinates(Coordinates::new(0.0, 0.0)).await.unwrap(), None);

        let geocoder = StaticGeocoder { reverse: vec![place("Paris"), place("Versailles")], ..Default::default() };
        let resolver = LocationResolver::new(Arc::new(geocoder));
        let first = resolver.resolve_by_coordinates(Coordinates::new(48.85, 2.35)).await.unwrap();
        assert_eq!(first.map(|c| c.city_name), Some("Paris".to_string()));
    }
}
