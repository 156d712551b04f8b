//! Query construction for document sources.
//!
//! This module provides a small, backend-neutral query model: a filter expression,
//! an optional sort and an optional limit. Backends consume it through the
//! [`QueryVisitor`] trait.
//!
//! # Query Building
//!
//! ```ignore
//! use docscope::query::{Query, Filter, Polygon, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::geo_within("address.location.coordinates", polygon))
//!     .sort("price", SortDirection::Asc)
//!     .limit(1)
//!     .build();
//! ```
//!
//! Field names may be dotted paths into nested documents, as in MongoDB.

use bson::{Bson, Document, ser::serialize_to_document};
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (smallest first).
    Asc,
    /// Descending order (largest first).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone)]
pub struct Sort {
    /// The field name (or dotted path) to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A `[longitude, latitude]` pair, in that order.
pub type Position = [f64; 2];

/// A GeoJSON-style polygon: one exterior ring followed by optional holes.
///
/// Rings are stored exactly as given. MongoDB requires each ring to be closed
/// (first position repeated as the last) and to hold at least four positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    rings: Vec<Vec<Position>>,
}

#[derive(Serialize)]
struct GeoJsonPolygon<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: &'a [Vec<Position>],
}

impl Polygon {
    /// Creates a polygon from its exterior ring.
    pub fn new(exterior: impl IntoIterator<Item = Position>) -> Self {
        Polygon {
            rings: vec![exterior.into_iter().collect()],
        }
    }

    /// Adds an interior ring (a hole) to the polygon.
    pub fn with_hole(mut self, hole: impl IntoIterator<Item = Position>) -> Self {
        self.rings.push(hole.into_iter().collect());
        self
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> &[Vec<Position>] {
        &self.rings
    }

    /// Returns `true` if `point` lies inside the exterior ring and outside every hole.
    ///
    /// Uses planar ray casting, which matches spherical containment closely for
    /// polygons the size of a city.
    pub fn contains(&self, point: Position) -> bool {
        match self.rings.split_first() {
            Some((exterior, holes)) => {
                ring_contains(exterior, point)
                    && !holes.iter().any(|hole| ring_contains(hole, point))
            }
            None => false,
        }
    }

    /// Renders the polygon as a GeoJSON `Polygon` geometry document.
    pub fn to_geojson(&self) -> ConnectorResult<Document> {
        serialize_to_document(&GeoJsonPolygon {
            kind: "Polygon",
            coordinates: &self.rings,
        })
        .map_err(ConnectorError::from)
    }
}

fn ring_contains(ring: &[Position], [x, y]: Position) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };

    let mut inside = false;
    let mut previous = last;

    for &current in ring {
        let [xi, yi] = current;
        let [xj, yj] = previous;

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        previous = current;
    }

    inside
}

/// A filter expression for querying documents.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Matches documents whose coordinate field lies within the polygon.
    GeoWithin {
        /// The field holding a `[lng, lat]` pair or a GeoJSON point.
        field: String,
        /// The bounding polygon.
        polygon: Polygon,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// A structured read query: filter, sort and limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Sort specification for results.
    pub sort: Option<Sort>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a new empty query matching every document.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper struct for constructing filter expressions.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the specified value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field does not equal the specified value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches documents whose coordinates at `field` fall inside `polygon`.
    pub fn geo_within(field: impl Into<String>, polygon: Polygon) -> Expr {
        Expr::GeoWithin {
            field: field.into(),
            polygon,
        }
    }

    /// Combines multiple expressions such that all must match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder::default()
    }

    /// Sets the filter expression for this query.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the sort specification for the query results.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<ConnectorError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_geo_within(
        &mut self,
        field: &str,
        polygon: &Polygon,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, *op, value),
            Expr::GeoWithin { field, polygon } => self.visit_geo_within(field, polygon),
        }
    }
}
