//! Server-sent event streams over the change feed.

use std::convert::Infallible;

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::application::realtime::{ChangeFeed, OrderAlerts, PointsBoard, Reducer};
use crate::errors::AppError;
use crate::handlers::session::AdminSession;
use crate::AppState;

/// Streams the reducer's outputs. The feed subscription is owned by the
/// body stream, so it ends when the client goes away.
fn event_stream<R>(feed: &ChangeFeed, event_name: &'static str, reducer: R) -> HttpResponse
where
    R: Reducer + 'static,
    R::Output: Serialize,
{
    let subscription = feed.subscribe(R::filter());
    let stream = futures::stream::unfold(
        (subscription, reducer),
        move |(mut subscription, mut reducer)| async move {
            loop {
                let event = subscription.recv().await?;
                let Some(output) = reducer.apply(&event) else {
                    continue;
                };
                match serde_json::to_string(&output) {
                    Ok(data) => {
                        let frame = format!("id: {}\nevent: {event_name}\ndata: {data}\n\n", event.id);
                        return Some((
                            Ok::<_, Infallible>(web::Bytes::from(frame)),
                            (subscription, reducer),
                        ));
                    }
                    Err(e) => log::warn!("could not encode {event_name} event {}: {e}", event.id),
                }
            }
        },
    );
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

/// GET /events/orders
pub async fn order_alerts(
    _admin: AdminSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(event_stream(&state.feed, "order", OrderAlerts::default()))
}

/// GET /events/points
pub async fn points_updates(
    _admin: AdminSession,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(event_stream(&state.feed, "points", PointsBoard::default()))
}
