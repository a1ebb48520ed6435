use std::collections::{HashMap, HashSet};
use std::time::Instant;

use actix::prelude::{Actor, Context, Handler, Message as ActixMessage, Recipient};
use actix::{
    fut,
    prelude::{Addr, StreamHandler},
    ActorContext, ActorFutureExt, AsyncContext, ContextFutureSpawner, Running, WrapFuture,
};
use actix_web_actors::ws;
use serde::{Deserialize, Serialize};
use serde_json::{error::Result as SerdeResult, to_string, Value};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{CLIENT_TIMEOUT, HEARTBEAT_INTERVAL};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WebSocketActionType {
    NewAgreementMessage,
    OrderList,
    StatusUpdated,
}

#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Message(pub String);

#[derive(ActixMessage, Serialize)]
#[rtype(result = "()")]
pub struct MessageToClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    pub action_type: WebSocketActionType,
    pub data: Value,
}

impl MessageToClient {
    pub fn new(action_type: WebSocketActionType, data: Value, order_id: Option<Uuid>) -> Self {
        Self {
            order_id,
            action_type,
            data,
        }
    }
}

/// Hub for dashboard sessions. Sessions subscribe to per-order rooms so the
/// server only fans agreement-chat events out to panels that have that order
/// open.
pub struct Server {
    sessions: HashMap<String, Recipient<Message>>,
    rooms: HashMap<Uuid, HashSet<String>>,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    pub fn join_room(&mut self, order_id: Uuid, session_id: &str) {
        self.rooms
            .entry(order_id)
            .or_default()
            .insert(session_id.to_string());
    }

    pub fn leave_room(&mut self, order_id: Uuid, session_id: &str) {
        if let Some(members) = self.rooms.get_mut(&order_id) {
            members.remove(session_id);
            if members.is_empty() {
                self.rooms.remove(&order_id);
            }
        }
    }

    /// Removes a session and every room membership it still holds, so an
    /// abrupt disconnect counts as the paired leave.
    pub fn drop_session(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
        self.rooms.retain(|_, members| {
            members.remove(session_id);
            !members.is_empty()
        });
    }

    pub fn room_members(&self, order_id: Uuid) -> usize {
        self.rooms.get(&order_id).map_or(0, |members| members.len())
    }

    fn send_message_to(&self, id: &str, data: &str) {
        if let Some(recipient) = self.sessions.get(id) {
            if let Err(err) = recipient.try_send(Message(data.to_string())) {
                error!("Error sending client message: {:?}", err);
            }
        } else {
            warn!("No session found with ID: {}", id);
        }
    }

    fn send_message_to_all(&self, data: SerdeResult<String>) {
        match data {
            Ok(data) => {
                for recipient in self.sessions.values() {
                    if let Err(err) = recipient.try_send(Message(data.clone())) {
                        error!("Error sending client message: {:?}", err);
                    }
                }
            }
            Err(err) => {
                error!("Data did not convert to string {:?}", err);
            }
        }
    }

    fn send_message_to_room(&self, order_id: Uuid, data: SerdeResult<String>) {
        match data {
            Ok(data) => {
                if let Some(members) = self.rooms.get(&order_id) {
                    for id in members {
                        self.send_message_to(id, &data);
                    }
                }
            }
            Err(err) => {
                error!("Data did not convert to string {:?}", err);
            }
        }
    }
}

impl Actor for Server {
    type Context = Context<Self>;
}

#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Connect {
    pub addr: Recipient<Message>,
    pub id: String,
}

impl Handler<Connect> for Server {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        self.sessions.insert(msg.id.clone(), msg.addr);
    }
}

#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: String,
}

impl Handler<Disconnect> for Server {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.drop_session(&msg.id);
    }
}

#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Join {
    pub id: String,
    pub order_id: Uuid,
}

impl Handler<Join> for Server {
    type Result = ();

    fn handle(&mut self, msg: Join, _: &mut Context<Self>) {
        self.join_room(msg.order_id, &msg.id);
    }
}

#[derive(ActixMessage)]
#[rtype(result = "()")]
pub struct Leave {
    pub id: String,
    pub order_id: Uuid,
}

impl Handler<Leave> for Server {
    type Result = ();

    fn handle(&mut self, msg: Leave, _: &mut Context<Self>) {
        self.leave_room(msg.order_id, &msg.id);
    }
}

/// Lets HTTP handlers gate actions on channel connectivity (a send with no
/// live session is rejected before any provider request goes out).
#[derive(ActixMessage)]
#[rtype(result = "bool")]
pub struct IsConnected {
    pub id: String,
}

impl Handler<IsConnected> for Server {
    type Result = bool;

    fn handle(&mut self, msg: IsConnected, _: &mut Context<Self>) -> bool {
        self.sessions.contains_key(&msg.id)
    }
}

impl Handler<MessageToClient> for Server {
    type Result = ();

    fn handle(&mut self, msg: MessageToClient, _: &mut Context<Self>) -> Self::Result {
        let message_str = to_string(&msg);
        if let Some(order_id) = msg.order_id {
            self.send_message_to_room(order_id, message_str);
        } else {
            self.send_message_to_all(message_str);
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum SessionState {
    Connecting,
    Connected,
}

/// Frames sent by the dashboard over the socket: chat panels announce which
/// order thread they are watching.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ClientFrame {
    Join { order_id: Uuid },
    Leave { order_id: Uuid },
}

pub struct WebSocketSession {
    id: String,
    hb: Instant,
    state: SessionState,
    server_addr: Addr<Server>,
}

impl WebSocketSession {
    pub fn new(key: String, server_addr: Addr<Server>) -> Self {
        Self {
            id: key,
            hb: Instant::now(),
            state: SessionState::Connecting,
            server_addr,
        }
    }

    fn send_heartbeat(&self, ctx: &mut <Self as Actor>::Context) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                info!("Websocket client heartbeat failed, disconnecting!");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WebSocketSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.send_heartbeat(ctx);

        let session_addr = ctx.address();
        self.server_addr
            .send(Connect {
                addr: session_addr.recipient(),
                id: self.id.clone(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(_res) => act.state = SessionState::Connected,
                    _ => ctx.stop(),
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    // Runs on every exit path, so room membership is always released.
    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.server_addr.do_send(Disconnect {
            id: self.id.clone(),
        });
        Running::Stop
    }
}

impl Handler<Message> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: Message, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WebSocketSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                info!("closed ws session");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Text(text)) => {
                if self.state != SessionState::Connected {
                    warn!("Frame received before session handshake finished");
                    return;
                }
                match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(ClientFrame::Join { order_id }) => self.server_addr.do_send(Join {
                        id: self.id.clone(),
                        order_id,
                    }),
                    Ok(ClientFrame::Leave { order_id }) => self.server_addr.do_send(Leave {
                        id: self.id.clone(),
                        order_id,
                    }),
                    Err(err) => warn!("Unrecognized client frame: {:?}", err),
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Unexpected binary frame");
            }
            Err(err) => {
                warn!("Error handling msg: {:?}", err);
                ctx.stop()
            }
            _ => ctx.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_session_releases_every_room() {
        let mut server = Server::new();
        let order_a = Uuid::new_v4();
        let order_b = Uuid::new_v4();
        server.join_room(order_a, "device-1");
        server.join_room(order_b, "device-1");
        server.join_room(order_a, "device-2");

        server.drop_session("device-1");
        assert_eq!(server.room_members(order_a), 1);
        assert_eq!(server.room_members(order_b), 0);
    }

    #[test]
    fn leave_is_scoped_to_one_room() {
        let mut server = Server::new();
        let order_a = Uuid::new_v4();
        let order_b = Uuid::new_v4();
        server.join_room(order_a, "device-1");
        server.join_room(order_b, "device-1");

        server.leave_room(order_a, "device-1");
        assert_eq!(server.room_members(order_a), 0);
        assert_eq!(server.room_members(order_b), 1);
    }

    struct IdleSession;

    impl Actor for IdleSession {
        type Context = Context<Self>;
    }

    impl Handler<Message> for IdleSession {
        type Result = ();

        fn handle(&mut self, _: Message, _: &mut Context<Self>) {}
    }

    #[actix_web::test]
    async fn sends_are_gated_on_a_live_session() {
        let server = Server::new().start();
        let query = |id: &str| IsConnected { id: id.to_string() };

        assert!(!server.send(query("device-1")).await.unwrap());

        let session = IdleSession.start();
        server
            .send(Connect {
                addr: session.recipient(),
                id: "device-1".to_string(),
            })
            .await
            .unwrap();
        assert!(server.send(query("device-1")).await.unwrap());
        assert!(!server.send(query("device-2")).await.unwrap());

        server
            .send(Disconnect {
                id: "device-1".to_string(),
            })
            .await
            .unwrap();
        assert!(!server.send(query("device-1")).await.unwrap());
    }

    #[test]
    fn client_frames_parse_join_and_leave() {
        let order_id = Uuid::new_v4();
        let raw = format!(r#"{{"action":"join","order_id":"{}"}}"#, order_id);
        match serde_json::from_str::<ClientFrame>(&raw) {
            Ok(ClientFrame::Join { order_id: parsed }) => assert_eq!(parsed, order_id),
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}
