//! Room registry for name-based message routing.
//!
//! Rooms are created implicitly on first join and removed as soon as their
//! last member leaves, so a room name never maps to an empty set.
//!
//! # Architecture
//!
//! ```text
//! Room: general        Room: ops
//! ├── conn-a           ├── conn-d
//! ├── conn-b           └── conn-e
//! └── conn-c
//! ```
//!
//! When a message is dispatched to `ops`, only d and e receive it.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::{ConnectionId, RoomName};
use crate::ports::Connection;

type Members = HashMap<ConnectionId, Arc<dyn Connection>>;

/// Maps room names to the live connections registered in them.
///
/// Provides:
/// - Join/leave with implicit room creation and deletion
/// - Point-in-time snapshots for fan-out outside the lock
/// - Cross-room eviction for connections that failed a write
///
/// # Thread Safety
///
/// Uses `RwLock` since snapshots (reads) vastly outnumber joins/leaves
/// (writes). No method awaits anything other than the lock while holding
/// it; writes to connections happen on snapshots, never under the lock.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomName, Members>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room, creating the room if absent.
    ///
    /// Joining the same connection twice is a no-op.
    pub async fn join(&self, room: &RoomName, conn: Arc<dyn Connection>) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.clone())
            .or_default()
            .insert(conn.id(), conn);
    }

    /// Remove a connection from a room, deleting the room if it becomes empty.
    ///
    /// Leaving a room the connection is not in, or a room that does not
    /// exist, is a silent no-op. Returns true if a member was removed.
    pub async fn leave(&self, room: &RoomName, conn_id: &ConnectionId) -> bool {
        let mut rooms = self.rooms.write().await;

        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(conn_id).is_some();
        if members.is_empty() {
            rooms.remove(room);
        }
        removed
    }

    /// Remove a connection from every room it appears in.
    ///
    /// Used after a write failure, where the registry cannot trust that the
    /// connection is filed only under the room it failed in. Returns the
    /// number of rooms it was removed from.
    pub async fn remove_everywhere(&self, conn_id: &ConnectionId) -> usize {
        let mut rooms = self.rooms.write().await;
        let mut removed = 0;

        rooms.retain(|_, members| {
            if members.remove(conn_id).is_some() {
                removed += 1;
            }
            !members.is_empty()
        });

        removed
    }

    /// Current members of a room, cloned out of the lock.
    ///
    /// Returns an empty list for unknown rooms.
    pub async fn snapshot(&self, room: &RoomName) -> Vec<Arc<dyn Connection>> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if the connection is registered in the room.
    pub async fn contains(&self, room: &RoomName, conn_id: &ConnectionId) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(room)
            .map(|members| members.contains_key(conn_id))
            .unwrap_or(false)
    }

    /// Number of connections in a room (0 if the room doesn't exist).
    pub async fn client_count(&self, room: &RoomName) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room).map(|members| members.len()).unwrap_or(0)
    }

    /// All active room names (for monitoring/debugging).
    pub async fn active_rooms(&self) -> Vec<RoomName> {
        self.rooms.read().await.keys().cloned().collect()
    }

    /// Total connection registrations across all rooms.
    pub async fn total_client_count(&self) -> usize {
        self.rooms.read().await.values().map(|m| m.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::InMemoryConnection;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn room(name: &str) -> RoomName {
        RoomName::new(name)
    }

    #[tokio::test]
    async fn join_creates_room_if_not_exists() {
        let registry = RoomRegistry::new();
        let conn = InMemoryConnection::new();

        registry.join(&room("ops"), conn.clone()).await;

        assert_eq!(registry.active_rooms().await, vec![room("ops")]);
        assert!(registry.contains(&room("ops"), &conn.id()).await);
    }

    #[tokio::test]
    async fn join_twice_registers_once() {
        let registry = RoomRegistry::new();
        let conn = InMemoryConnection::new();

        registry.join(&room("ops"), conn.clone()).await;
        registry.join(&room("ops"), conn.clone()).await;

        assert_eq!(registry.client_count(&room("ops")).await, 1);
    }

    #[tokio::test]
    async fn leave_removes_member_and_deletes_empty_room() {
        let registry = RoomRegistry::new();
        let a = InMemoryConnection::new();
        let b = InMemoryConnection::new();
        registry.join(&room("ops"), a.clone()).await;
        registry.join(&room("ops"), b.clone()).await;

        assert!(registry.leave(&room("ops"), &a.id()).await);
        assert_eq!(registry.client_count(&room("ops")).await, 1);

        assert!(registry.leave(&room("ops"), &b.id()).await);
        assert!(registry.active_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn leave_unknown_connection_or_room_is_noop() {
        let registry = RoomRegistry::new();
        let member = InMemoryConnection::new();
        registry.join(&room("ops"), member.clone()).await;

        assert!(!registry.leave(&room("ops"), &ConnectionId::new()).await);
        assert!(!registry.leave(&room("missing"), &member.id()).await);
        assert!(!registry.leave(&room("missing"), &member.id()).await);

        assert_eq!(registry.client_count(&room("ops")).await, 1);
        assert_eq!(registry.active_rooms().await, vec![room("ops")]);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_changes() {
        let registry = RoomRegistry::new();
        let a = InMemoryConnection::new();
        registry.join(&room("ops"), a.clone()).await;

        let snapshot = registry.snapshot(&room("ops")).await;
        registry.leave(&room("ops"), &a.id()).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
        assert!(registry.snapshot(&room("ops")).await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_of_unknown_room_is_empty() {
        let registry = RoomRegistry::new();
        assert!(registry.snapshot(&room("nobody")).await.is_empty());
    }

    #[tokio::test]
    async fn remove_everywhere_scans_all_rooms() {
        let registry = RoomRegistry::new();
        let misfiled = InMemoryConnection::new();
        let other = InMemoryConnection::new();
        registry.join(&room("a"), misfiled.clone()).await;
        registry.join(&room("b"), misfiled.clone()).await;
        registry.join(&room("b"), other.clone()).await;

        assert_eq!(registry.remove_everywhere(&misfiled.id()).await, 2);

        assert!(!registry.contains(&room("a"), &misfiled.id()).await);
        assert!(!registry.contains(&room("b"), &misfiled.id()).await);
        assert_eq!(registry.active_rooms().await, vec![room("b")]);
        assert_eq!(registry.remove_everywhere(&misfiled.id()).await, 0);
    }

    #[tokio::test]
    async fn total_client_count_sums_rooms() {
        let registry = RoomRegistry::new();
        registry.join(&room("a"), InMemoryConnection::new()).await;
        registry.join(&room("a"), InMemoryConnection::new()).await;
        registry.join(&room("b"), InMemoryConnection::new()).await;

        assert_eq!(registry.total_client_count().await, 3);
    }

    #[tokio::test]
    async fn concurrent_joins_and_leaves_leave_no_empty_rooms() {
        let registry = Arc::new(RoomRegistry::new());
        let mut tasks = Vec::new();

        for i in 0..64 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let conn = InMemoryConnection::new();
                let name = room(&format!("room-{}", i % 4));
                registry.join(&name, conn.clone()).await;
                let _ = registry.snapshot(&name).await;
                registry.leave(&name, &conn.id()).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(registry.active_rooms().await.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Join { room: u8, conn: u8 },
        Leave { room: u8, conn: u8 },
        Evict { conn: u8 },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, 0u8..6).prop_map(|(room, conn)| Op::Join { room, conn }),
            (0u8..5, 0u8..7).prop_map(|(room, conn)| Op::Leave { room, conn }),
            (0u8..7).prop_map(|conn| Op::Evict { conn }),
        ]
    }

    proptest! {
        #[test]
        fn registry_matches_model_and_never_holds_empty_rooms(
            ops in proptest::collection::vec(op_strategy(), 1..60)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let registry = RoomRegistry::new();
                let conns: Vec<Arc<InMemoryConnection>> =
                    (0..7).map(|_| InMemoryConnection::new()).collect();
                let mut model: BTreeMap<u8, BTreeSet<u8>> = BTreeMap::new();

                for op in &ops {
                    match *op {
                        Op::Join { room: r, conn: c } => {
                            registry.join(&room(&r.to_string()), conns[c as usize].clone()).await;
                            model.entry(r).or_default().insert(c);
                        }
                        Op::Leave { room: r, conn: c } => {
                            registry.leave(&room(&r.to_string()), &conns[c as usize].id()).await;
                            if let Some(members) = model.get_mut(&r) {
                                members.remove(&c);
                                if members.is_empty() {
                                    model.remove(&r);
                                }
                            }
                        }
                        Op::Evict { conn: c } => {
                            registry.remove_everywhere(&conns[c as usize].id()).await;
                            model.retain(|_, members| {
                                members.remove(&c);
                                !members.is_empty()
                            });
                            for r in 0u8..5 {
                                prop_assert!(
                                    !registry.contains(&room(&r.to_string()), &conns[c as usize].id()).await
                                );
                            }
                        }
                    }

                    for name in registry.active_rooms().await {
                        prop_assert!(registry.client_count(&name).await > 0);
                    }
                }

                prop_assert_eq!(registry.active_rooms().await.len(), model.len());
                for (r, members) in &model {
                    prop_assert_eq!(
                        registry.client_count(&room(&r.to_string())).await,
                        members.len()
                    );
                }
                Ok(())
            })?;
        }
    }
}
