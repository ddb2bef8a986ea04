//! Property-based tests for extraction, similarity and mock selection

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use moodquote::{
    candidate_pool, extract_first_json_object, parse_and_validate, pick, score, string_similarity,
    QuoteEntry, SamplingParams, StructuredRecord,
};

/// Field text that cannot contain braces, quotes or backslashes
fn arb_field() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,.!']{0,40}"
}

fn arb_record() -> impl Strategy<Value = StructuredRecord> {
    (arb_field(), arb_field(), arb_field(), arb_field())
        .prop_map(|(m, q, a, s)| StructuredRecord::new(m, q, a, s))
}

proptest! {
    #[test]
    fn similarity_is_bounded(a in ".{0,60}", b in ".{0,60}") {
        let s = string_similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn similarity_is_reflexive(a in ".{0,60}") {
        prop_assert_eq!(string_similarity(&a, &a), 1.0);
    }

    #[test]
    fn overall_score_is_bounded(expected in arb_record(), actual in arb_record()) {
        let report = score(&expected, &actual);
        prop_assert!(report.overall_score >= 0.0);
        prop_assert!(report.overall_score <= 1.0 + 1e-12);
    }

    #[test]
    fn fenced_and_wrapped_records_are_recovered(
        record in arb_record(),
        prefix in "[a-zA-Z :]{0,30}",
        suffix in "[a-zA-Z .]{0,30}",
        tag in prop_oneof![Just(""), Just("json"), Just("JSON")],
    ) {
        let json = serde_json::to_string(&record).unwrap();
        let text = format!("```{}\n{}\n```", tag, json);
        prop_assert_eq!(parse_and_validate(&text).unwrap(), record.clone());

        let wrapped = format!("{} {} {}", prefix, json, suffix);
        prop_assert_eq!(extract_first_json_object(&wrapped), Some(json.as_str()));
        prop_assert_eq!(parse_and_validate(&wrapped).unwrap(), record);
    }

    #[test]
    fn truncated_objects_never_parse(record in arb_record(), cut in 1usize..20) {
        let json = serde_json::to_string(&record).unwrap();
        let truncated = &json[..json.len() - cut.min(json.len() - 1)];
        prop_assert!(extract_first_json_object(truncated).is_none());
        prop_assert!(parse_and_validate(truncated).unwrap_err().is_parse());
    }

    #[test]
    fn top_k_bounds_pool_and_zero_temperature_is_stable(
        k in 1usize..5,
        seed in any::<u64>(),
    ) {
        let database: Vec<QuoteEntry> = (0..5)
            .map(|i| QuoteEntry::new("tired", format!("quote {}", i)))
            .collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let params = SamplingParams::default().with_top_k(k);

        let pool = candidate_pool("so tired", &database, &params, &mut rng);
        prop_assert_eq!(pool.len(), k);

        let first = pick("so tired", &pool, 0.0, &mut rng);
        for _ in 0..3 {
            prop_assert_eq!(&pick("so tired", &pool, 0.0, &mut rng), &first);
        }
        prop_assert_eq!(&first, pool[0]);
    }
}
