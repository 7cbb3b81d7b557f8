use crate::core::provider::RatingsSource;
use crate::models::{Candidate, EnrichedResult, RankedResult};

/// Attaches company display fields and rating summaries to ranked results
pub struct ResultAssembler<'a, R: ?Sized> {
    ratings: &'a R,
}

impl<'a, R> ResultAssembler<'a, R>
where
    R: RatingsSource + ?Sized,
{
    pub fn new(ratings: &'a R) -> Self {
        Self { ratings }
    }

    /// Enrich results in one ratings lookup, preserving their order
    pub async fn enrich<C>(
        &self,
        results: Vec<RankedResult<C>>,
    ) -> Result<Vec<EnrichedResult<C>>, R::Error>
    where
        C: Candidate,
    {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = results.iter().map(|r| r.candidate.id()).collect();
        let stats = self.ratings.rating_stats(C::KIND, &ids).await?;

        Ok(results
            .into_iter()
            .map(|ranked| {
                let summary = stats
                    .get(&ranked.candidate.id())
                    .copied()
                    .unwrap_or_default();
                let contact = ranked.candidate.contact().clone();

                EnrichedResult {
                    distance: ranked.distance_km,
                    company_name: contact.name,
                    company_phone: contact.phone,
                    company_email: contact.email,
                    company_address: contact.address,
                    company_city: contact.city,
                    company_district: contact.district,
                    average_rating: summary.average_rating,
                    review_count: summary.review_count,
                    candidate: ranked.candidate,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyContact, RatingSummary, TowTruck};
    use crate::services::memory::StaticRatings;

    fn ranked(id: i32, distance_km: Option<f64>) -> RankedResult<TowTruck> {
        RankedResult {
            candidate: TowTruck {
                id,
                company_id: 9,
                license_plate: format!("06 KRT {}", id),
                driver_name: "Mehmet".to_string(),
                driver_photo_url: None,
                operating_areas: vec![],
                is_active: true,
                company: CompanyContact {
                    name: "Ankara Kurtarma".to_string(),
                    phone: "05550000000".to_string(),
                    ..Default::default()
                },
                updated_at: None,
            },
            distance_km,
        }
    }

    #[tokio::test]
    async fn test_enrich_preserves_order_and_attaches_ratings() {
        let ratings = StaticRatings::default().with(
            crate::models::CandidateKind::TowTruck,
            2,
            RatingSummary::from_raw(4.5, 2),
        );
        let assembler = ResultAssembler::new(&ratings);

        let enriched = assembler
            .enrich(vec![ranked(2, Some(1.5)), ranked(1, None)])
            .await
            .unwrap();

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].candidate.id, 2);
        assert_eq!(enriched[0].average_rating, 4.5);
        assert_eq!(enriched[0].review_count, 2);
        assert_eq!(enriched[0].distance, Some(1.5));
        assert_eq!(enriched[0].company_name, "Ankara Kurtarma");

        assert_eq!(enriched[1].candidate.id, 1);
        assert_eq!(enriched[1].average_rating, 0.0);
        assert_eq!(enriched[1].review_count, 0);
        assert_eq!(enriched[1].distance, None);
    }

    #[tokio::test]
    async fn test_enriched_json_shape() {
        let ratings = StaticRatings::default();
        let enriched = ResultAssembler::new(&ratings)
            .enrich(vec![ranked(5, Some(2.25))])
            .await
            .unwrap();

        let json = serde_json::to_value(&enriched[0]).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["distance"], 2.25);
        assert_eq!(json["companyName"], "Ankara Kurtarma");
        assert_eq!(json["licensePlate"], "06 KRT 5");
        assert_eq!(json["reviewCount"], 0);
        assert!(json.get("isActive").is_none());
    }
}
