//! Builders for canonical push-channel frames.
//!
//! Every frame on the channel is `{"type": ..., "data": ...}`; these
//! helpers keep tests honest about the wire shapes.

use serde_json::{json, Value};

pub fn nodes_frame(nodes: Value) -> Value {
    json!({ "type": "nodes", "data": nodes })
}

pub fn systems_frame(systems: Value) -> Value {
    json!({ "type": "systems", "data": systems })
}

pub fn alert_fire(message: &str) -> Value {
    json!({ "type": "alert", "data": { "type": "fire", "message": message } })
}

pub fn alert_fire_on(message: &str, target: &str) -> Value {
    json!({ "type": "alert", "data": { "type": "fire", "message": message, "target": target } })
}

pub fn alert_resolve(id: i64) -> Value {
    json!({ "type": "alert", "data": { "type": "resolve", "id": id } })
}

/// Minimal node payload for inventory frames.
pub fn node(ip: &str, status: &str) -> Value {
    json!({ "ip": ip, "status": status })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_carry_type_and_data() {
        let frame = nodes_frame(json!([node("10.0.0.1", "online")]));
        assert_eq!(frame["type"], "nodes");
        assert_eq!(frame["data"][0]["ip"], "10.0.0.1");

        let frame = alert_fire("disk full");
        assert_eq!(frame["data"]["type"], "fire");

        let frame = alert_resolve(42);
        assert_eq!(frame["data"]["id"], 42);
    }
}
