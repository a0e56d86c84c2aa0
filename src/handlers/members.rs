use axum::{Extension, Json};
use rand::Rng;
use serde::Serialize;

use crate::models::session::Session;

/// Number of member images available under the public directory.
const MEMBER_IMAGES: u32 = 3;

#[derive(Serialize)]
pub struct MembersResponse {
    pub name: String,
    pub image: String,
}

/// The members area. Only reachable through `require_auth`.
pub async fn members(Extension(session): Extension<Session>) -> Json<MembersResponse> {
    let n = rand::thread_rng().gen_range(1..=MEMBER_IMAGES);
    Json(MembersResponse {
        name: session.name,
        image: format!("/image{}.jpg", n),
    })
}
