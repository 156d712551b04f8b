//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions,
//! enabling comparison, dotted-path lookup and polygon containment on BSON documents.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime};

use docscope_core::{
    query::{QueryVisitor, Expr, FieldOp, Polygon, Position},
    error::{ConnectorError, ConnectorResult},
};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types, decimals included, are normalized to f64 so that a Decimal128
/// price sorts against an Int32 price the way a database would. Filters only compare
/// values of the same kind ([`PartialOrd`]); sorting uses [`Comparable::total_cmp`].
#[derive(Debug, PartialEq)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    /// Anything without a natural ordering (documents, binaries, object ids)
    Opaque(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::Decimal128(value) => {
                Comparable::Number(value.to_string().parse::<f64>().unwrap_or(f64::NAN))
            },
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) | Bson::Symbol(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            other => Comparable::Opaque(other),
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Position of the value's kind in MongoDB's cross-type sort order.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 1,
            Comparable::Number(_) => 2,
            Comparable::String(_) => 3,
            Comparable::Array(_) => 5,
            Comparable::Bool(_) => 8,
            Comparable::DateTime(_) => 9,
            Comparable::Opaque(bson) => match bson {
                Bson::MinKey => 0,
                Bson::Undefined => 1,
                Bson::Document(_) => 4,
                Bson::Binary(_) => 6,
                Bson::ObjectId(_) => 7,
                Bson::Timestamp(_) => 10,
                Bson::RegularExpression(_) => 11,
                Bson::MaxKey => 13,
                _ => 12,
            },
        }
    }

    /// Total order for sorting: kind first, then value within a kind.
    ///
    /// Doubles use `f64::total_cmp`. Arrays compare element by element. Values of
    /// kinds without a natural order (documents, binaries, object ids) tie.
    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        self.type_rank()
            .cmp(&other.type_rank())
            .then_with(|| match (self, other) {
                (Comparable::Bool(a), Comparable::Bool(b)) => a.cmp(b),
                (Comparable::Number(a), Comparable::Number(b)) => a.total_cmp(b),
                (Comparable::DateTime(a), Comparable::DateTime(b)) => a.cmp(b),
                (Comparable::String(a), Comparable::String(b)) => a.cmp(b),
                (Comparable::Array(a), Comparable::Array(b)) => a
                    .iter()
                    .zip(b)
                    .map(|(left, right)| left.total_cmp(right))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or_else(|| a.len().cmp(&b.len())),
                _ => Ordering::Equal,
            })
    }
}

/// Resolves a dotted path such as `address.location.coordinates`.
///
/// Numeric segments index into arrays.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Reads a `[lng, lat]` pair or a GeoJSON `Point` document.
fn position(value: &Bson) -> Option<Position> {
    match value {
        Bson::Array(items) if items.len() == 2 => {
            match (Comparable::from(&items[0]), Comparable::from(&items[1])) {
                (Comparable::Number(lng), Comparable::Number(lat)) => Some([lng, lat]),
                _ => None,
            }
        },
        Bson::Document(point) if point.get_str("type").ok() == Some("Point") => {
            position(point.get("coordinates")?)
        },
        _ => None,
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> ConnectorResult<bool> {
        self.visit_expr(expr)
    }

    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        expr: &Expr,
    ) -> ConnectorResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).evaluate(expr)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = ConnectorError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = lookup(self.document, field) else {
            return Ok(op == FieldOp::Ne);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    },
                    None => false,
                }
            },
        })
    }

    fn visit_geo_within(
        &mut self,
        field: &str,
        polygon: &Polygon,
    ) -> Result<Self::Output, Self::Error> {
        if polygon.rings().first().is_none_or(|ring| ring.len() < 4) {
            return Err(ConnectorError::Query(
                "$geoWithin polygon needs a closed ring of at least four positions".to_string(),
            ));
        }

        Ok(
            lookup(self.document, field)
                .and_then(position)
                .is_some_and(|point| polygon.contains(point))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{Decimal128, doc};
    use docscope_core::query::Filter;
    use std::str::FromStr;

    fn triangle() -> Polygon {
        Polygon::new([[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]])
    }

    #[test]
    fn test_lookup_follows_dotted_paths() {
        let document = doc! { "address": { "location": { "coordinates": [1.0, 2.0] } } };

        assert_eq!(
            lookup(&document, "address.location.coordinates.1"),
            Some(&Bson::Double(2.0))
        );
        assert_eq!(lookup(&document, "address.street"), None);
    }

    #[test]
    fn test_geo_within_accepts_pairs_and_points() {
        let pair = doc! { "loc": [1.0, 1.0] };
        let point = doc! { "loc": { "type": "Point", "coordinates": [1.0, 1.0] } };
        let outside = doc! { "loc": [3.0, 3.0] };
        let expr = Filter::geo_within("loc", triangle());

        assert!(DocumentEvaluator::new(&pair).evaluate(&expr).unwrap());
        assert!(DocumentEvaluator::new(&point).evaluate(&expr).unwrap());
        assert!(!DocumentEvaluator::new(&outside).evaluate(&expr).unwrap());
    }

    #[test]
    fn test_geo_within_rejects_open_polygon() {
        let document = doc! { "loc": [1.0, 1.0] };
        let expr = Filter::geo_within("loc", Polygon::new([[0.0, 0.0], [1.0, 1.0]]));

        assert!(matches!(
            DocumentEvaluator::new(&document).evaluate(&expr),
            Err(ConnectorError::Query(_))
        ));
    }

    #[test]
    fn test_decimal_compares_as_number() {
        let document = doc! { "price": Decimal128::from_str("19.99").unwrap() };

        assert!(DocumentEvaluator::new(&document).evaluate(&Filter::lt("price", 20)).unwrap());
        assert!(!DocumentEvaluator::new(&document).evaluate(&Filter::gt("price", 20.5)).unwrap());
    }

    #[test]
    fn test_total_cmp_ranks_kinds_like_mongodb() {
        let values = [
            Bson::Boolean(false),
            Bson::String("x".into()),
            Bson::Int32(5),
            Bson::Null,
            Bson::Document(doc! { "a": 1 }),
            Bson::Double(1.5),
            Bson::Array(vec![Bson::Int32(1)]),
        ];
        let mut sorted = values.iter().map(Comparable::from).collect::<Vec<_>>();

        sorted.sort_by(|a, b| a.total_cmp(b));

        assert_eq!(sorted, vec![
            Comparable::Null,
            Comparable::Number(1.5),
            Comparable::Number(5.0),
            Comparable::String("x"),
            Comparable::from(&values[4]),
            Comparable::Array(vec![Comparable::Number(1.0)]),
            Comparable::Bool(false),
        ]);
    }

    #[test]
    fn test_total_cmp_orders_nan_consistently() {
        let nan = Bson::Double(f64::NAN);
        let one = Bson::Double(1.0);

        assert_eq!(Comparable::from(&one).total_cmp(&Comparable::from(&nan)), Ordering::Less);
        assert_eq!(Comparable::from(&nan).total_cmp(&Comparable::from(&one)), Ordering::Greater);
    }

    #[test]
    fn test_missing_field_only_matches_ne() {
        let document = doc! { "name": "Loft" };

        assert!(!DocumentEvaluator::new(&document).evaluate(&Filter::eq("price", 1)).unwrap());
        assert!(DocumentEvaluator::new(&document).evaluate(&Filter::ne("price", 1)).unwrap());
    }
}
