//! Query translation from the docscope query model to MongoDB query syntax.
//!
//! This module translates abstract query expressions into MongoDB BSON filter
//! documents and sort specifications for execution by the MongoDB query engine.

use bson::{Document, Bson, doc};

use docscope_core::{
    query::{QueryVisitor, Expr, FieldOp, Polygon, Sort, SortDirection},
    error::ConnectorError,
};


/// Translates docscope query expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Builds the filter document for an optional expression; `None` matches everything.
    pub(crate) fn filter(expr: Option<&Expr>) -> Result<Document, ConnectorError> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }

    pub(crate) fn sort(sort: &Sort) -> Document {
        doc! {
            sort.field.clone(): match sort.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            }
        }
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = ConnectorError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
            }
        })
    }

    fn visit_geo_within(
        &mut self,
        field: &str,
        polygon: &Polygon,
    ) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: {
                "$geoWithin": {
                    "$geometry": polygon.to_geojson()?,
                },
            },
        })
    }
}
