// Fileserver hit counter and the admin pages that expose it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, Response},
};
use tracing::info;

/// Number of requests served under /app since startup or the last reset
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the static file server
pub async fn count_hits(State(hits): State<HitCounter>, request: Request, next: Next) -> Response {
    hits.increment();
    next.run(request).await
}

/// Handler for GET /admin/metrics
pub async fn metrics_handler(State(hits): State<HitCounter>) -> Html<String> {
    Html(format!(
        "<html>\n<body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n</body>\n</html>\n",
        hits.get()
    ))
}

/// Handler for POST /admin/reset
pub async fn reset_handler(State(hits): State<HitCounter>) -> &'static str {
    hits.reset();
    info!("Fileserver hit counter reset");
    "Hits reset to 0"
}
