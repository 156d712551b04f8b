use std::str::FromStr;

use bson::{Binary, DateTime, Decimal128, Document, doc, spec::BinarySubtype};
use serde_json::{Value, json};

use docscope::{
    memory::InMemoryServer,
    prelude::*,
    queries::{COLLECTION_NAME, DATABASE_NAME},
};

fn listing(id: i32, price: i32, coordinates: [f64; 2]) -> Document {
    doc! {
        "_id": id,
        "price": price,
        "address": {
            "location": { "type": "Point", "coordinates": [coordinates[0], coordinates[1]] },
        },
    }
}

async fn server_with(documents: Vec<Document>) -> InMemoryServer {
    let server = InMemoryServer::new();
    server
        .insert_documents(DATABASE_NAME, COLLECTION_NAME, documents)
        .await;
    server
}

#[tokio::test]
async fn test_geo_query_returns_cheapest_match() {
    let server = server_with(vec![
        listing(1, 500, [-73.98, 40.75]),
        listing(2, 300, [-73.98, 40.75]),
    ])
    .await;

    let json = apartment_in_manhattan(&mut server.connector()).await.unwrap();
    let results: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["_id"], json!(2));
    assert_eq!(results[0]["price"], json!(300));
    assert_eq!(server.open_connections(), 0);
}

#[tokio::test]
async fn test_geo_query_ignores_listings_outside_manhattan() {
    let server = server_with(vec![
        listing(1, 50, [-73.95, 40.65]),
        listing(2, 900, [-73.97, 40.78]),
        listing(3, 400, [-73.99, 40.73]),
    ])
    .await;

    let json = apartment_in_manhattan(&mut server.connector()).await.unwrap();
    let results: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(results, json!([{
        "_id": 3,
        "price": 400,
        "address": { "location": { "type": "Point", "coordinates": [-73.99, 40.73] } },
    }]));
}

#[tokio::test]
async fn test_geo_query_reads_bare_coordinate_pairs() {
    let server = server_with(vec![
        doc! {
            "_id": 1,
            "price": 500,
            "address": { "location": { "coordinates": [-73.98, 40.75] } },
        },
        doc! {
            "_id": 2,
            "price": 300,
            "address": { "location": { "coordinates": [-73.98, 40.75] } },
        },
    ])
    .await;

    let json = apartment_in_manhattan(&mut server.connector()).await.unwrap();
    let results: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["_id"], json!(2));
    assert_eq!(results[0]["address"]["location"]["coordinates"], json!([-73.98, 40.75]));
}

#[tokio::test]
async fn test_geo_query_without_matches_is_empty_array() {
    let server = server_with(vec![listing(1, 50, [-73.95, 40.65])]).await;

    let json = apartment_in_manhattan(&mut server.connector()).await.unwrap();

    assert_eq!(json, "[]");
}

#[tokio::test]
async fn test_first_document_on_empty_collection() {
    let server = InMemoryServer::new();

    let json = first_document(&mut server.connector()).await.unwrap();

    assert_eq!(json, "{}");
    assert_eq!(server.open_connections(), 0);
}

#[tokio::test]
async fn test_first_document_encodes_dates_and_decimals() {
    let server = server_with(vec![
        doc! {
            "_id": "10006546",
            "name": "Ribeira Charming Duplex",
            "last_scraped": DateTime::from_millis(1_550_293_200_000),
            "price": Decimal128::from_str("80.00").unwrap(),
        },
        doc! { "_id": "10009999", "name": "Second" },
    ])
    .await;

    let json = first_document(&mut server.connector()).await.unwrap();

    assert_eq!(
        json,
        concat!(
            "{\n",
            "    \"_id\": \"10006546\",\n",
            "    \"name\": \"Ribeira Charming Duplex\",\n",
            "    \"last_scraped\": \"2019-02-16T05:00:00\",\n",
            "    \"price\": \"80.00\"\n",
            "}",
        )
    );
}

#[tokio::test]
async fn test_unsupported_value_fails_without_partial_output() {
    let server = server_with(vec![doc! {
        "_id": 1,
        "photo": Binary { subtype: BinarySubtype::Generic, bytes: vec![0xff, 0xd8] },
    }])
    .await;

    let result = first_document(&mut server.connector()).await;

    assert!(matches!(result, Err(ConnectorError::UnsupportedType(name)) if name == "Binary"));
    assert_eq!(server.open_connections(), 0);
}

#[tokio::test]
async fn test_connection_failure_propagates() {
    let server = server_with(vec![listing(1, 100, [-73.98, 40.75])]).await;
    server.set_unavailable(true);

    let result = apartment_in_manhattan(&mut server.connector()).await;

    assert!(matches!(result, Err(ConnectorError::Connection(_))));
    assert_eq!(server.open_connections(), 0);
}

#[cfg(feature = "mongodb")]
#[tokio::test]
async fn test_missing_connection_string_fails_at_connect() {
    let settings = Settings::default();

    let result = docscope::queries::get_first_document(&settings).await;

    assert!(matches!(result, Err(ConnectorError::Configuration(_))));
}
