use serde::Serialize;
use warp::reply::Json;

use crate::service::HandService;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    hands_in_memory: usize,
    pending_archives: usize,
}

pub fn health(service: &HandService) -> Json {
    warp::reply::json(&HealthBody {
        status: "ok",
        hands_in_memory: service.store().len(),
        pending_archives: service.archiver().pending_count(),
    })
}
