//! Integration tests for `#[derive(Params)]`.

use vestibule_extract::{Date, ExtractionSource, ParamSchema, QueryArgs};
use vestibule_macros::Params;
use vestibule_router::Params as PathParams;

#[derive(Debug, Default, Params)]
struct Inner {
    #[param("g")]
    g: f64,
}

#[derive(Debug, Default, Params)]
struct ListFilter {
    #[param("id")]
    id: i32,
    #[param("deletedOnly")]
    deleted_only: bool,
    #[param(name = "day")]
    day: Date,
    #[param(nested)]
    bb: Inner,
    #[param("limit")]
    limit: Option<u16>,
    not_a_param: String,
}

#[derive(Debug, Default, Params)]
struct BillPath {
    #[param("customerId")]
    customer_id: u64,
    #[param("billNum")]
    bill_num: String,
    #[param("draft")]
    draft: bool,
    #[param("ratio")]
    ratio: f32,
    #[param("segments")]
    segments: Vec<String>,
}

#[derive(Debug, Default, Params)]
struct DatedPath {
    #[param("day")]
    day: Date,
}

#[test]
fn test_query_example_with_nested_struct() {
    let args = QueryArgs::parse("id=1&deletedOnly=true&day=2021-09-01&g=0.5").unwrap();
    let mut filter = ListFilter {
        not_a_param: "kept".into(),
        ..ListFilter::default()
    };
    filter.decode_query(&args).unwrap();

    assert_eq!(filter.id, 1);
    assert!(filter.deleted_only);
    assert_eq!(filter.day.packed(), 0x2021_0901);
    assert!((filter.bb.g - 0.5).abs() < f64::EPSILON);
    assert_eq!(filter.limit, None);
    assert_eq!(filter.not_a_param, "kept");
}

#[test]
fn test_query_optional_allocated_when_present() {
    let args = QueryArgs::parse("limit=50").unwrap();
    let mut filter = ListFilter::default();
    filter.decode_query(&args).unwrap();
    assert_eq!(filter.limit, Some(50));
}

#[test]
fn test_query_parse_failure_is_reported() {
    let args = QueryArgs::parse("id=one").unwrap();
    let err = ListFilter::default().decode_query(&args).unwrap_err();
    assert_eq!(err.extraction_source(), ExtractionSource::Query);
    assert_eq!(err.field(), Some("id"));
    assert!(err.to_string().contains("invalid digit"));
}

#[test]
fn test_path_decoding() {
    let params: PathParams = [
        ("customerId", "42"),
        ("billNum", "B-7"),
        ("draft", "t"),
        ("ratio", "1.5"),
        ("segments", "a/b"),
    ]
    .into_iter()
    .collect();

    let mut path = BillPath::default();
    path.decode_path(&params).unwrap();
    assert_eq!(path.customer_id, 42);
    assert_eq!(path.bill_num, "B-7");
    assert!(path.draft);
    assert!((path.ratio - 1.5).abs() < f32::EPSILON);
    assert!(path.segments.is_empty());
}

#[test]
fn test_path_unsupported_type_names_tag() {
    let params: PathParams = [("day", "2021-09-01")].into_iter().collect();
    let err = DatedPath::default().decode_path(&params).unwrap_err();
    assert_eq!(err.to_string(), "unsupported type");
    assert_eq!(err.field(), Some("day"));
}

#[test]
fn test_param_keys() {
    let mut keys = Vec::new();
    ListFilter::default().param_keys(&mut keys);
    assert_eq!(keys, ["id", "deletedOnly", "day", "g", "limit"]);
}
