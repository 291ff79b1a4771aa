//! Live activity WebSocket
//!
//! Each socket subscribes to the [`ActivityHub`](crate::services::ActivityHub)
//! at handshake and forwards every event as a JSON text frame. Client frames
//! are only used for keep-alive.

use actix::prelude::*;
use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::AppState;
use crate::models::ActivityEvent;

pub struct ActivitySocket {
    receiver: Option<broadcast::Receiver<ActivityEvent>>,
}

impl ActivitySocket {
    pub fn new(receiver: broadcast::Receiver<ActivityEvent>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }
}

impl Actor for ActivitySocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        if let Some(receiver) = self.receiver.take() {
            ctx.add_stream(BroadcastStream::new(receiver));
        }
        tracing::debug!("Activity socket connected");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("Activity socket disconnected");
    }
}

impl StreamHandler<Result<ActivityEvent, BroadcastStreamRecvError>> for ActivitySocket {
    fn handle(
        &mut self,
        item: Result<ActivityEvent, BroadcastStreamRecvError>,
        ctx: &mut Self::Context,
    ) {
        match item {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => ctx.text(json),
                Err(e) => tracing::warn!("Failed to serialize activity event: {}", e),
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Activity socket lagging; events dropped");
            }
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ActivitySocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Pong(_)) | Ok(ws::Message::Nop) => {}
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Binary(_)) | Ok(ws::Message::Continuation(_)) => {
                tracing::debug!("Ignoring unsupported frame on activity socket");
            }
            Err(e) => {
                tracing::warn!("Activity socket protocol error: {}", e);
                ctx.stop();
            }
        }
    }
}

#[get("/ws")]
pub async fn activity_socket(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(ActivitySocket::new(state.activity.subscribe()), &req, stream)
}
