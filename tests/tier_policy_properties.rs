//! Property tests for tier gating and field projection.

#![allow(clippy::unwrap_used)]

use estimate_workflow::domain::entities::{AiAssessment, Estimate, EstimateDraft, QuoteTerms};
use estimate_workflow::domain::services::{EstimateView, Operation, TierPolicy, project};
use estimate_workflow::domain::value_objects::{
    Cost, InsuranceDetails, MediaRef, PartyId, Tier, Timestamp, VehicleDescriptor,
};
use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn tier() -> impl Strategy<Value = Tier> {
    select(Tier::ALL.to_vec())
}

fn operation() -> impl Strategy<Value = Operation> {
    select(Operation::ALL.to_vec())
}

fn grants() -> impl Strategy<Value = Vec<(Operation, Tier)>> {
    prop::collection::vec((operation(), tier()), 0..Operation::ALL.len())
}

/// A fully populated view: quoted, insured, with expiry and assessment.
fn full_view(cost: i64, media: usize, quoted: bool) -> EstimateView {
    let now = Timestamp::now();
    let requester = PartyId::new("req-1");
    let shop = PartyId::new("shop-1");
    let media = (0..media)
        .map(|i| MediaRef::parse(&format!("https://cdn.example.com/{i}.jpg")).unwrap())
        .collect();
    let draft = EstimateDraft::new(requester.clone(), VehicleDescriptor::new("Kia", "Rio"), "Dent")
        .with_media(media)
        .with_insurance(InsuranceDetails {
            provider: "Acme".into(),
            policy_number: "P-9".into(),
            claim_number: Some("C-1".into()),
        });
    let (mut estimate, _) = Estimate::open(draft, shop.clone(), now);
    if quoted {
        let terms = QuoteTerms::new(Cost::new(Decimal::from(cost)).unwrap())
            .with_timeline_days(3)
            .with_details("Parts in stock");
        estimate.respond(&shop, terms, now).unwrap();
    }
    estimate.set_expiry(&requester, now.add_hours(24), now).unwrap();
    let assessment = AiAssessment::new("Dent", Decimal::from(cost), Decimal::new(8, 1), now).unwrap();
    estimate.attach_assessment(&requester, assessment, now).unwrap();
    EstimateView::from_estimate(&estimate, now)
}

proptest! {
    #[test]
    fn ungranted_operations_are_denied_everywhere(grants in grants(), op in operation(), t in tier()) {
        let granted: BTreeMap<Operation, Tier> = grants.iter().copied().collect();
        let policy = TierPolicy::from_grants(grants);
        if !granted.contains_key(&op) {
            prop_assert!(!policy.allows(t, op));
        }
    }

    #[test]
    fn access_is_monotone_in_tier(op in operation(), low in tier(), high in tier()) {
        let policy = TierPolicy::standard();
        if high >= low && policy.allows(low, op) {
            prop_assert!(policy.allows(high, op));
        }
    }

    #[test]
    fn projection_is_idempotent(t in tier(), cost in 1i64..50_000, media in 0usize..4, quoted in any::<bool>()) {
        let view = full_view(cost, media, quoted);
        let once = project(t, &view);
        prop_assert_eq!(project(t, &once), once);
    }

    #[test]
    fn projecting_down_matches_direct_projection(high in tier(), low in tier(), cost in 1i64..50_000) {
        prop_assume!(high >= low);
        let view = full_view(cost, 2, true);
        prop_assert_eq!(project(low, &project(high, &view)), project(low, &view));
    }

    #[test]
    fn top_tier_sees_everything(cost in 1i64..50_000, media in 1usize..4) {
        let view = full_view(cost, media, true);
        prop_assert_eq!(project(Tier::WowPlus, &view), view);
    }
}
