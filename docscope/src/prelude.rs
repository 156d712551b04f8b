//! Convenient re-exports of commonly used types from docscope.
//!
//! ```ignore
//! use docscope::prelude::*;
//! ```

pub use docscope_core::{
    connector::{Connector, ConnectorExt},
    backend::DocumentSource,
    query::{
        Query, QueryBuilder, QueryVisitor, Expr, Filter, FieldOp, Sort, SortDirection, Polygon,
        Position,
    },
    json::{JsonEncoder, custom_serializer},
    error::{ConnectorError, ConnectorResult},
};

pub use crate::{
    config::Settings,
    queries::{apartment_in_manhattan, first_document},
};
