use serde::{Deserialize, Serialize};

use crate::schema::{Field, Shape, Validated};

/// A customer account the logged-in user may act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
}

const CLIENT: Shape = Shape::Object(&[
    Field::required("id", Shape::Number),
    Field::required("name", Shape::String),
]);

/// Wire envelope for `GET /auth/clients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub clients: Vec<Client>,
}

impl Validated for ClientsResponse {
    const SHAPE: Shape = Shape::Object(&[Field::nullable_seq("clients", &CLIENT)]);
}
