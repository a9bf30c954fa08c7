//! Property tests for destination key building.

use proptest::prelude::*;

use artifact_publisher::models::ExecutionContext;
use artifact_publisher::publish::destination::build;

fn identity() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.:+-]{1,24}"
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_]{1,12}", 1..4).prop_map(|parts| format!("{}.json", parts.join("/")))
}

fn root() -> impl Strategy<Value = String> {
    ("(s3|gs|abfs|store)", "[a-z0-9-]{3,20}", "(/[a-z0-9]{1,8}){0,2}", "/{0,2}")
        .prop_map(|(scheme, bucket, prefix, trailing)| format!("{}://{}{}{}", scheme, bucket, prefix, trailing))
}

proptest! {
    #[test]
    fn build_is_deterministic(
        root in root(),
        dag in identity(),
        run in identity(),
        task in identity(),
        attempt in 1u32..100,
        relative in relative_path(),
    ) {
        let context = ExecutionContext::new(&dag, &run, &task, attempt);
        let first = build(&root, &context, "target", &relative).unwrap();
        let second = build(&root, &context, "target", &relative).unwrap();
        prop_assert_eq!(&first, &second);
        let expected_suffix = format!("/target/{}", relative);
        prop_assert!(first.as_str().ends_with(&expected_suffix));
        prop_assert_eq!(first.as_str().matches("//").count(), 1);
    }

    #[test]
    fn attempts_get_disjoint_prefixes(
        root in root(),
        dag in identity(),
        run in identity(),
        task in identity(),
        (a, b) in (1u32..1000, 1u32..1000).prop_filter("distinct attempts", |(a, b)| a != b),
        left in relative_path(),
        right in relative_path(),
    ) {
        let first = build(&root, &ExecutionContext::new(&dag, &run, &task, a), "target", &left).unwrap();
        let second = build(&root, &ExecutionContext::new(&dag, &run, &task, b), "target", &right).unwrap();

        let prefix = |attempt: u32| format!("{}/{}/{}/{}/{}/", root.trim_end_matches('/'), dag, run, task, attempt);
        prop_assert!(first.as_str().starts_with(&prefix(a)));
        prop_assert!(second.as_str().starts_with(&prefix(b)));
        prop_assert!(!first.as_str().starts_with(&prefix(b)));
        prop_assert!(!second.as_str().starts_with(&prefix(a)));
    }
}
