//! Kitchen display realtime hub (Socket.IO)
//!
//! Clients connect on `/` with `{ "token": "<jwt>" }` as auth data and then
//! join tenant/branch/kitchen rooms. Order changes are broadcast after the
//! writing transaction commits. Delivery is best effort.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Deserialize;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::kitchen::{self, KitchenEvent};
use socketioxide::SocketIo;
use socketioxide::extract::{Data, SocketRef};
use socketioxide::layer::SocketIoLayer;

use crate::auth::{CurrentUser, JwtService};
use crate::security_log;

#[derive(Debug, Deserialize)]
struct ConnectAuth {
    token: String,
}

/// Room kinds a client may ask to join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Tenant,
    Branch,
    Kitchen,
}

/// Resolve a join request into a room name, enforcing tenant/branch scope.
///
/// `id` is the tenant id for [`JoinKind::Tenant`] (defaults to the caller's
/// tenant) and a branch id otherwise (defaults to the caller's branch).
pub fn authorize_join(user: &CurrentUser, kind: JoinKind, id: Option<i64>) -> Result<String, AppError> {
    match kind {
        JoinKind::Tenant => {
            let tenant_id = id.unwrap_or(user.tenant_id);
            if tenant_id != user.tenant_id {
                return Err(AppError::new(ErrorCode::PermissionDenied));
            }
            Ok(kitchen::tenant_room(tenant_id))
        }
        JoinKind::Branch | JoinKind::Kitchen => {
            let branch_id = id
                .or(user.branch_id)
                .ok_or_else(|| AppError::validation("branch id is required"))?;
            if !user.can_access_branch(branch_id) {
                return Err(AppError::new(ErrorCode::BranchAccessDenied));
            }
            Ok(match kind {
                JoinKind::Branch => kitchen::branch_room(branch_id),
                _ => kitchen::kitchen_room(branch_id),
            })
        }
    }
}

/// Join payloads arrive either as a bare number, a numeric string or `{ "id": n }`
fn payload_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map
            .get("id")
            .or_else(|| map.get("branch_id"))
            .or_else(|| map.get("tenant_id"))
            .and_then(payload_id),
        _ => None,
    }
}

/// Handle a join event: enter the room and confirm it, or log the denial
fn join_room(user: &CurrentUser, kind: JoinKind, event: &'static str, socket: &SocketRef, payload: &Value) {
    match authorize_join(user, kind, payload_id(payload)) {
        Ok(room) => {
            tracing::debug!(socket_id = %socket.id, room = %room, "Joined room");
            socket.join(room.clone());
            if let Err(e) = socket.emit(kitchen::JOINED, &room) {
                tracing::warn!(socket_id = %socket.id, error = %e, "Join confirmation failed");
            }
        }
        Err(e) => {
            security_log!(
                "WARN",
                "socket_join_denied",
                user_id = user.id,
                join_event = event,
                error = e.message.clone()
            );
        }
    }
}

/// Socket.IO server handle plus per-tenant connection counts
#[derive(Clone)]
pub struct KitchenHub {
    io: SocketIo,
    connections: Arc<DashMap<i64, usize>>,
}

impl KitchenHub {
    /// Build the Socket.IO layer and register the `/` namespace
    pub fn new(jwt: JwtService) -> (SocketIoLayer, Self) {
        let (layer, io) = SocketIo::new_layer();
        let hub = Self {
            io,
            connections: Arc::new(DashMap::new()),
        };

        let connect_hub = hub.clone();
        hub.io.ns("/", move |socket: SocketRef, Data(auth): Data<Value>| {
            let hub = connect_hub.clone();
            let jwt = jwt.clone();
            async move { hub.on_connect(&jwt, socket, auth) }
        });

        (layer, hub)
    }

    fn on_connect(&self, jwt: &JwtService, socket: SocketRef, auth: Value) {
        let claims = serde_json::from_value::<ConnectAuth>(auth)
            .ok()
            .and_then(|a| jwt.validate(&a.token).ok());
        let Some(claims) = claims else {
            security_log!("WARN", "socket_auth_failed", socket_id = socket.id.to_string());
            let _ = socket.disconnect();
            return;
        };
        let user = CurrentUser::from(claims);
        tracing::info!(socket_id = %socket.id, user_id = user.id, tenant_id = user.tenant_id, "Kitchen client connected");

        *self.connections.entry(user.tenant_id).or_insert(0) += 1;

        for (event, kind) in [
            (kitchen::JOIN_TENANT, JoinKind::Tenant),
            (kitchen::JOIN_BRANCH, JoinKind::Branch),
            (kitchen::JOIN_KITCHEN, JoinKind::Kitchen),
        ] {
            let user = user.clone();
            socket.on(event, move |s: SocketRef, Data(payload): Data<Value>| {
                let user = user.clone();
                async move { join_room(&user, kind, event, &s, &payload) }
            });
        }

        let connections = self.connections.clone();
        let tenant_id = user.tenant_id;
        socket.on_disconnect(move |s: SocketRef| {
            let connections = connections.clone();
            async move {
                tracing::info!(socket_id = %s.id, tenant_id, "Kitchen client disconnected");
                if let Some(mut count) = connections.get_mut(&tenant_id) {
                    *count = count.saturating_sub(1);
                }
                connections.remove_if(&tenant_id, |_, count| *count == 0);
            }
        });
    }

    /// Push an order change to every room of its branch
    pub async fn broadcast(&self, event: KitchenEvent) {
        let name = event.name();
        if let Err(e) = self.io.to(event.rooms()).emit(name, &event).await {
            tracing::warn!(event = name, error = %e, "Kitchen broadcast failed");
        }
    }

    /// Send a batch of events in order, after the writing transaction committed
    pub async fn broadcast_all(&self, events: Vec<KitchenEvent>) {
        for event in events {
            self.broadcast(event).await;
        }
    }

    /// Connected clients of one tenant
    pub fn connected(&self, tenant_id: i64) -> usize {
        self.connections.get(&tenant_id).map_or(0, |c| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::Role;

    fn user(role: Role, branch_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            tenant_id: 3,
            branch_id,
            role,
            email: "k@example.com".into(),
        }
    }

    #[test]
    fn test_join_tenant_scope() {
        let u = user(Role::Kitchen, Some(2));
        assert_eq!(authorize_join(&u, JoinKind::Tenant, None).unwrap(), "tenant:3");
        assert_eq!(authorize_join(&u, JoinKind::Tenant, Some(3)).unwrap(), "tenant:3");
        assert!(authorize_join(&u, JoinKind::Tenant, Some(4)).is_err());
    }

    #[test]
    fn test_join_branch_scope() {
        let u = user(Role::Kitchen, Some(2));
        assert_eq!(authorize_join(&u, JoinKind::Kitchen, None).unwrap(), "kitchen:2");
        assert_eq!(authorize_join(&u, JoinKind::Branch, Some(2)).unwrap(), "branch:2");
        assert_eq!(
            authorize_join(&u, JoinKind::Kitchen, Some(9)).unwrap_err().code,
            ErrorCode::BranchAccessDenied
        );
    }

    #[test]
    fn test_owner_joins_any_branch_but_must_name_it() {
        let owner = user(Role::Owner, None);
        assert_eq!(authorize_join(&owner, JoinKind::Branch, Some(9)).unwrap(), "branch:9");
        assert_eq!(
            authorize_join(&owner, JoinKind::Kitchen, None).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn test_payload_id_shapes() {
        assert_eq!(payload_id(&json!(5)), Some(5));
        assert_eq!(payload_id(&json!("6")), Some(6));
        assert_eq!(payload_id(&json!({ "branch_id": 7 })), Some(7));
        assert_eq!(payload_id(&json!({ "id": "8" })), Some(8));
        assert_eq!(payload_id(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_hub_starts_with_no_connections() {
        let (_layer, hub) = KitchenHub::new(JwtService::new("secret", 1));
        assert_eq!(hub.connected(3), 0);
    }

    /// Socket.IO clients driven over Engine.IO long-polling through the full router
    mod socket {
        use std::time::Duration;

        use axum::Router;
        use axum::body::Body;
        use http::{Request, header};
        use http_body_util::BodyExt;
        use shared::models::{OrderDetail, OrderStatus, RestaurantOrder, Role, Staff};
        use tower::ServiceExt;

        use super::super::*;
        use crate::api::build_app;
        use crate::state::AppState;

        const RECORD_SEPARATOR: char = '\u{1e}';

        fn app() -> (Router, AppState) {
            let (state, layer) = AppState::for_tests("kitchen-socket-secret").unwrap();
            (build_app(state.clone(), layer, &[]), state)
        }

        fn token(state: &AppState) -> String {
            let staff = Staff {
                id: 11,
                tenant_id: 1,
                branch_id: Some(5),
                email: "line@example.com".into(),
                full_name: "Line Cook".into(),
                role: Role::Kitchen,
                is_active: true,
                created_at: 0,
                updated_at: 0,
            };
            state.jwt.issue(&staff).unwrap()
        }

        fn polling_uri(sid: &str) -> String {
            format!("/socket.io/?EIO=4&transport=polling&sid={sid}")
        }

        async fn call(app: &Router, req: Request<Body>) -> String {
            let res = app.clone().oneshot(req).await.unwrap();
            assert!(res.status().is_success(), "unexpected status {}", res.status());
            let bytes = res.into_body().collect().await.unwrap().to_bytes();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        async fn handshake(app: &Router) -> String {
            let body = call(
                app,
                Request::get("/socket.io/?EIO=4&transport=polling")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            let open: Value = serde_json::from_str(body.strip_prefix('0').unwrap()).unwrap();
            open["sid"].as_str().unwrap().to_string()
        }

        async fn send(app: &Router, sid: &str, packet: String) {
            call(
                app,
                Request::post(polling_uri(sid))
                    .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
                    .body(Body::from(packet))
                    .unwrap(),
            )
            .await;
        }

        /// Long-poll until a packet matching `wanted` arrives
        async fn receive(app: &Router, sid: &str, wanted: impl Fn(&str) -> bool) -> String {
            tokio::time::timeout(Duration::from_secs(5), async {
                loop {
                    let body = call(app, Request::get(polling_uri(sid)).body(Body::empty()).unwrap()).await;
                    if let Some(packet) = body.split(RECORD_SEPARATOR).find(|p| wanted(p)) {
                        return packet.to_string();
                    }
                }
            })
            .await
            .expect("packet never arrived")
        }

        async fn wait_connected(hub: &KitchenHub, tenant_id: i64) {
            tokio::time::timeout(Duration::from_secs(5), async {
                while hub.connected(tenant_id) == 0 {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .expect("client never registered");
        }

        fn order_on_branch(branch_id: i64) -> OrderDetail {
            OrderDetail {
                order: RestaurantOrder {
                    id: 40,
                    tenant_id: 1,
                    branch_id,
                    order_number: "O-00000040".into(),
                    table_id: None,
                    customer_id: None,
                    created_by: 11,
                    status: OrderStatus::Pending,
                    is_tab_open: true,
                    notes: None,
                    sale_id: None,
                    created_at: 0,
                    updated_at: 0,
                    closed_at: None,
                },
                items: vec![],
            }
        }

        #[tokio::test]
        async fn test_bad_token_is_disconnected() {
            let (app, state) = app();
            let sid = handshake(&app).await;
            send(&app, &sid, r#"40{"token":"not-a-jwt"}"#.to_string()).await;

            let packet = receive(&app, &sid, |p| p == "41").await;
            assert_eq!(packet, "41");
            assert_eq!(state.kitchen.connected(1), 0);
        }

        #[tokio::test]
        async fn test_joined_kitchen_receives_order_broadcast() {
            let (app, state) = app();
            let sid = handshake(&app).await;
            send(&app, &sid, format!(r#"40{{"token":"{}"}}"#, token(&state))).await;
            receive(&app, &sid, |p| p.starts_with("40")).await;
            wait_connected(&state.kitchen, 1).await;

            send(&app, &sid, r#"42["join-kitchen",5]"#.to_string()).await;
            let joined = receive(&app, &sid, |p| p.starts_with(r#"42["joined""#)).await;
            assert_eq!(joined, r#"42["joined","kitchen:5"]"#);

            state
                .kitchen
                .broadcast(KitchenEvent::OrderCreated(order_on_branch(5)))
                .await;
            let pushed = receive(&app, &sid, |p| p.starts_with("42[")).await;
            let frame: Value = serde_json::from_str(pushed.strip_prefix("42").unwrap()).unwrap();
            assert_eq!(frame[0], kitchen::ORDER_CREATED);
            assert_eq!(frame[1]["order_number"], "O-00000040");
        }
    }
}
