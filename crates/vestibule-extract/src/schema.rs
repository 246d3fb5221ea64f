//! Destination structures for path and query decoding.

use percent_encoding::percent_decode_str;
use vestibule_router::Params;

use crate::error::{ExtractionError, ExtractionSource};
use crate::query::QueryArgs;
use crate::value::{PathValue, QueryValue, ValueError};

/// Field-by-field decoding of path parameters and query strings.
///
/// Normally generated by `#[derive(Params)]`. Each field tagged
/// `#[param("key")]` is assigned from the source value named `key`; untagged
/// fields are left as they are. Fields marked `#[param(nested)]` are decoded
/// from the same query string by recursion.
///
/// A hand-written implementation looks like this:
///
/// ```
/// use vestibule_extract::{assign_path, assign_query, ExtractionError, ParamSchema, QueryArgs};
/// use vestibule_router::Params;
///
/// #[derive(Default)]
/// struct BillPath {
///     customer_id: i64,
///     bill_num: String,
/// }
///
/// impl ParamSchema for BillPath {
///     fn decode_path(&mut self, params: &Params) -> Result<(), ExtractionError> {
///         assign_path(&mut self.customer_id, "customerId", params)?;
///         assign_path(&mut self.bill_num, "billNum", params)
///     }
///
///     fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError> {
///         assign_query(&mut self.customer_id, "customerId", args)?;
///         assign_query(&mut self.bill_num, "billNum", args)
///     }
///
///     fn param_keys(&self, keys: &mut Vec<&'static str>) {
///         keys.extend(["customerId", "billNum"]);
///     }
/// }
///
/// let params: Params = [("customerId", "7"), ("billNum", "A-1")].into_iter().collect();
/// let mut path = BillPath::default();
/// path.decode_path(&params).unwrap();
/// assert_eq!(path.customer_id, 7);
/// assert_eq!(path.bill_num, "A-1");
/// ```
pub trait ParamSchema {
    /// Assigns every tagged field from the matched path segments.
    fn decode_path(&mut self, params: &Params) -> Result<(), ExtractionError>;

    /// Assigns every tagged field whose key is present in the query string.
    fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError>;

    /// Appends the source keys this type reads, nested ones included.
    fn param_keys(&self, keys: &mut Vec<&'static str>);
}

/// Assigns `field` from the path segment captured as `tag`.
///
/// A tag with no captured segment means the route and the destination type
/// disagree, which is reported as an internal error.
pub fn assign_path<T: PathValue + ?Sized>(
    field: &mut T,
    tag: &'static str,
    params: &Params,
) -> Result<(), ExtractionError> {
    let raw = params
        .get(tag)
        .ok_or_else(|| ExtractionError::missing_path_value(tag))?;
    field
        .assign_path(raw)
        .map_err(|e| value_error(ExtractionSource::Path, tag, raw, e))
}

/// Percent-decodes every captured path segment.
///
/// Segments that do not decode to UTF-8 are rejected as invalid path values.
///
/// ```
/// use vestibule_extract::decode_path_params;
/// use vestibule_router::Params;
///
/// let raw: Params = [("name", "J%C3%BCrgen%20Smith")].into_iter().collect();
/// let params = decode_path_params(&raw).unwrap();
/// assert_eq!(params.get("name"), Some("Jürgen Smith"));
/// ```
pub fn decode_path_params(params: &Params) -> Result<Params, ExtractionError> {
    params
        .iter()
        .map(|(name, raw)| {
            percent_decode_str(raw)
                .decode_utf8()
                .map(|value| (name.to_string(), value.into_owned()))
                .map_err(|e| {
                    ExtractionError::invalid_value(
                        ExtractionSource::Path,
                        name,
                        raw,
                        format!("invalid percent-encoded path segment: {e}"),
                    )
                })
        })
        .collect()
}

/// Assigns `field` from the first query value of `tag`. Absent keys leave
/// the field untouched.
pub fn assign_query<T: QueryValue + ?Sized>(
    field: &mut T,
    tag: &'static str,
    args: &QueryArgs,
) -> Result<(), ExtractionError> {
    let Some(raw) = args.get(tag) else {
        return Ok(());
    };
    field
        .assign_query(raw)
        .map_err(|e| value_error(ExtractionSource::Query, tag, raw, e))
}

fn value_error(source: ExtractionSource, tag: &str, raw: &str, err: ValueError) -> ExtractionError {
    match err {
        ValueError::Parse(details) => ExtractionError::invalid_value(source, tag, raw, details),
        ValueError::Unsupported { kind } => ExtractionError::unsupported(source, tag, raw, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Inner {
        g: f64,
    }

    impl ParamSchema for Inner {
        fn decode_path(&mut self, _params: &Params) -> Result<(), ExtractionError> {
            Ok(())
        }

        fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError> {
            assign_query(&mut self.g, "g", args)
        }

        fn param_keys(&self, keys: &mut Vec<&'static str>) {
            keys.push("g");
        }
    }

    #[derive(Default)]
    struct Filter {
        id: i32,
        deleted_only: bool,
        limit: Option<u32>,
        inner: Inner,
        untouched: u8,
    }

    impl ParamSchema for Filter {
        fn decode_path(&mut self, params: &Params) -> Result<(), ExtractionError> {
            assign_path(&mut self.id, "id", params)
        }

        fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError> {
            assign_query(&mut self.id, "id", args)?;
            assign_query(&mut self.deleted_only, "deletedOnly", args)?;
            assign_query(&mut self.limit, "limit", args)?;
            self.inner.decode_query(args)
        }

        fn param_keys(&self, keys: &mut Vec<&'static str>) {
            keys.extend(["id", "deletedOnly", "limit"]);
            self.inner.param_keys(keys);
        }
    }

    #[test]
    fn test_query_decoding() {
        let args = QueryArgs::parse("id=1&deletedOnly=true&g=0.5&untouched=9").unwrap();
        let mut f = Filter {
            untouched: 3,
            ..Filter::default()
        };
        f.decode_query(&args).unwrap();
        assert_eq!(f.id, 1);
        assert!(f.deleted_only);
        assert_eq!(f.limit, None);
        assert!((f.inner.g - 0.5).abs() < f64::EPSILON);
        assert_eq!(f.untouched, 3);
    }

    #[test]
    fn test_query_error_names_tag() {
        let args = QueryArgs::parse("deletedOnly=maybe").unwrap();
        let err = Filter::default().decode_query(&args).unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::Query);
        assert_eq!(err.field(), Some("deletedOnly"));
        assert_eq!(err.value(), Some("maybe"));
    }

    #[test]
    fn test_path_missing_value_is_internal() {
        let err = Filter::default().decode_path(&Params::new()).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_path_segments_are_percent_decoded() {
        let raw: Params = [("name", "J%C3%BCrgen%20Smith"), ("rest", "a%2Fb+c")]
            .into_iter()
            .collect();
        let params = decode_path_params(&raw).unwrap();
        assert_eq!(params.get("name"), Some("Jürgen Smith"));
        // '+' is literal in a path
        assert_eq!(params.get("rest"), Some("a/b+c"));
    }

    #[test]
    fn test_path_segment_with_invalid_utf8_is_bad_request() {
        let raw: Params = [("id", "%FF%FE")].into_iter().collect();
        let err = decode_path_params(&raw).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(err.extraction_source(), ExtractionSource::Path);
        assert_eq!(err.field(), Some("id"));
        assert_eq!(err.value(), Some("%FF%FE"));
    }

    #[test]
    fn test_param_keys_include_nested() {
        let mut keys = Vec::new();
        Filter::default().param_keys(&mut keys);
        assert_eq!(keys, ["id", "deletedOnly", "limit", "g"]);
    }
}
