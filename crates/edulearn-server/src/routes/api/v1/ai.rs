pub(crate) mod assessment;
pub(crate) mod chat;
pub(crate) mod error;
pub(crate) mod feedback;
pub(crate) mod recommendations;
pub(crate) mod voice;

use axum::Router;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .nest("/chat", chat::create_router())
        .nest("/feedback", feedback::create_router())
        .nest("/recommendations", recommendations::create_router())
        .nest("/voice", voice::create_router())
        .nest("/assessment", assessment::create_router())
        .with_state(())
}
