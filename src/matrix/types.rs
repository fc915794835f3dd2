//! Wire types for the Matrix client-server API.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::common::types::RoomSnapshot;

/// Body of a `/sync` response, reduced to the parts the tool reads.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    #[serde(default)]
    pub rooms: SyncRooms,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncRooms {
    #[serde(default)]
    pub join: HashMap<String, JoinedRoom>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinedRoom {
    #[serde(default)]
    pub state: EventBatch,
    #[serde(default)]
    pub timeline: EventBatch,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventBatch {
    #[serde(default)]
    pub events: Vec<StateEvent>,
}

#[derive(Debug, Deserialize)]
pub struct StateEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub state_key: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl SyncResponse {
    /// Project the sync payload into room snapshots.
    ///
    /// Each snapshot is built from scratch; membership comes from the
    /// `m.room.member` state events (timeline events applied last, so a
    /// join arriving in the timeline supersedes older state).
    pub fn into_snapshots(self) -> Vec<RoomSnapshot> {
        let mut snapshots: Vec<RoomSnapshot> = self
            .rooms
            .join
            .into_iter()
            .map(|(room_id, room)| project_room(room_id, room))
            .collect();
        snapshots.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        snapshots
    }
}

fn project_room(room_id: String, room: JoinedRoom) -> RoomSnapshot {
    let mut membership: BTreeMap<String, String> = BTreeMap::new();
    let mut name: Option<String> = None;
    let mut alias: Option<String> = None;

    for event in room.state.events.iter().chain(room.timeline.events.iter()) {
        match event.event_type.as_str() {
            "m.room.member" => {
                if let Some(user_id) = &event.state_key {
                    let state = event
                        .content
                        .get("membership")
                        .and_then(|m| m.as_str())
                        .unwrap_or("leave");
                    membership.insert(user_id.clone(), state.to_string());
                }
            }
            "m.room.name" => {
                name = event
                    .content
                    .get("name")
                    .and_then(|n| n.as_str())
                    .map(String::from);
            }
            "m.room.canonical_alias" => {
                alias = event
                    .content
                    .get("alias")
                    .and_then(|a| a.as_str())
                    .map(String::from);
            }
            _ => {}
        }
    }

    let members = membership
        .into_iter()
        .filter(|(_, state)| state == "join")
        .map(|(user_id, _)| user_id)
        .collect();

    let display_name = name.or(alias).unwrap_or_else(|| room_id.clone());

    RoomSnapshot {
        room_id,
        display_name,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<RoomSnapshot> {
        serde_json::from_str::<SyncResponse>(json)
            .unwrap()
            .into_snapshots()
    }

    #[test]
    fn test_members_from_state_events() {
        let rooms = parse(
            r#"{
                "next_batch": "s1",
                "rooms": { "join": { "!r:x": {
                    "state": { "events": [
                        { "type": "m.room.name", "content": { "name": "Test Room" } },
                        { "type": "m.room.member", "state_key": "@a:x", "content": { "membership": "join" } },
                        { "type": "m.room.member", "state_key": "@b:x", "content": { "membership": "invite" } },
                        { "type": "m.room.member", "state_key": "@c:x", "content": { "membership": "join" } }
                    ] }
                } } }
            }"#,
        );

        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].display_name, "Test Room");
        assert_eq!(rooms[0].members, vec!["@a:x", "@c:x"]);
    }

    #[test]
    fn test_timeline_join_supersedes_state() {
        let rooms = parse(
            r#"{
                "rooms": { "join": { "!r:x": {
                    "state": { "events": [
                        { "type": "m.room.member", "state_key": "@bot:x", "content": { "membership": "invite" } }
                    ] },
                    "timeline": { "events": [
                        { "type": "m.room.member", "state_key": "@bot:x", "content": { "membership": "join" } }
                    ] }
                } } }
            }"#,
        );

        assert!(rooms[0].has_member("@bot:x"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let rooms = parse(
            r##"{
                "rooms": { "join": {
                    "!a:x": { "state": { "events": [
                        { "type": "m.room.canonical_alias", "content": { "alias": "#room:x" } }
                    ] } },
                    "!b:x": {}
                } }
            }"##,
        );

        assert_eq!(rooms[0].display_name, "#room:x");
        assert_eq!(rooms[1].display_name, "!b:x");
    }

    #[test]
    fn test_empty_sync() {
        assert!(parse("{}").is_empty());
    }
}
