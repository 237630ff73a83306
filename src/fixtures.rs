//! Shared test models.
use serde_json::{json, Value};

use crate::graph::model::ModelGraph;

/// Binding annotation by simple name (`XmlElement`, `adapters.XmlJavaTypeAdapter`).
pub fn ann(simple: &str, values: Value) -> Value {
    json!({ "name": format!("javax.xml.bind.annotation.{simple}"), "values": values })
}

pub fn adapted_by(adapter: &str) -> Value {
    ann("adapters.XmlJavaTypeAdapter", json!({ "value": { "type": adapter } }))
}

fn xml_adapter(name: &str, value: &str, bound: &str) -> Value {
    let superclass = format!("javax.xml.bind.annotation.adapters.XmlAdapter<{value}, {bound}>");
    json!({ "kind": "class", "name": name, "superclass": superclass })
}

pub fn model(declarations: Value) -> ModelGraph {
    ModelGraph::from_value(json!({ "declarations": declarations })).unwrap()
}

/// `Order { items: List<LineItem>, total: BigDecimal }`, `LineItem { sku: String, qty: int }`.
pub fn order_model() -> ModelGraph {
    model(json!([
        { "kind": "class", "name": "com.acme.Order",
          "annotations": [ ann("XmlRootElement", json!({})) ],
          "position": { "file": "Order.java", "line": 3 },
          "members": [
            { "name": "items", "type": "java.util.List<LineItem>", "doc": "The line items." },
            { "name": "total", "type": "java.math.BigDecimal" }
          ] },
        { "kind": "class", "name": "com.acme.LineItem",
          "members": [
            { "name": "sku", "type": "String" },
            { "name": "qty", "type": "int" }
          ] }
    ]))
}

/// Adapters at every level, plus the broken ones.
pub fn adapter_model() -> ModelGraph {
    model(json!([
        { "kind": "package", "name": "a", "annotations": [
            ann("adapters.XmlJavaTypeAdapters", json!({ "value": [
                { "annotation": ann("adapters.XmlJavaTypeAdapter",
                    json!({ "value": { "type": "a.MoneyAdapter" },
                            "type": { "type": "a.Money" } })) }
            ] }))
        ] },
        { "kind": "class", "name": "a.Money", "members": [
            { "name": "amount", "type": "java.math.BigDecimal" },
            { "name": "currency", "type": "String" }
        ] },
        xml_adapter("a.MoneyAdapter", "String", "a.Money"),
        { "kind": "class", "name": "a.Point", "annotations": [ adapted_by("a.PointAdapter") ],
          "members": [ { "name": "x", "type": "int" }, { "name": "y", "type": "int" } ] },
        xml_adapter("a.PointAdapter", "String", "a.Point"),
        { "kind": "class", "name": "a.PointEntry",
          "members": [ { "name": "x", "type": "int" }, { "name": "y", "type": "int" } ] },
        xml_adapter("a.PointEntryAdapter", "a.PointEntry", "a.Point"),
        { "kind": "class", "name": "a.StringAdapter", "abstract": true, "type_parameters": ["T"],
          "superclass": "javax.xml.bind.annotation.adapters.XmlAdapter<String, T>" },
        { "kind": "class", "name": "a.When", "annotations": [ adapted_by("a.WhenAdapter") ],
          "members": [ { "name": "at", "type": "long" } ] },
        { "kind": "class", "name": "a.WhenAdapter", "superclass": "a.StringAdapter<a.When>" },
        { "kind": "class", "name": "a.Same", "annotations": [ adapted_by("a.SameAdapter") ],
          "members": [ { "name": "v", "type": "String" } ] },
        xml_adapter("a.SameAdapter", "a.Same", "a.Same"),
        { "kind": "class", "name": "a.NotAdapter" },
        { "kind": "class", "name": "a.RawAdapter",
          "superclass": "javax.xml.bind.annotation.adapters.XmlAdapter" },
        { "kind": "class", "name": "a.Celsius", "annotations": [ adapted_by("a.CelsiusAdapter") ] },
        xml_adapter("a.CelsiusAdapter", "a.Kelvin", "a.Celsius"),
        { "kind": "class", "name": "a.Kelvin", "annotations": [ adapted_by("a.KelvinAdapter") ] },
        xml_adapter("a.KelvinAdapter", "Double", "a.Kelvin"),
        { "kind": "class", "name": "a.Ping", "annotations": [ adapted_by("a.PingAdapter") ] },
        xml_adapter("a.PingAdapter", "a.Pong", "a.Ping"),
        { "kind": "class", "name": "a.Pong", "annotations": [ adapted_by("a.PongAdapter") ] },
        xml_adapter("a.PongAdapter", "a.Ping", "a.Pong"),
        { "kind": "class", "name": "a.Shape", "members": [
            { "name": "price", "type": "a.Money" },
            { "name": "where", "type": "a.Point" },
            { "name": "spot", "type": "a.Point",
              "annotations": [ adapted_by("a.PointEntryAdapter") ] },
            { "name": "setterOnly", "type": "a.Point", "kind": "property",
              "setter_annotations": [ adapted_by("a.PointEntryAdapter") ] },
            { "name": "points", "type": "java.util.List<a.Point>" },
            { "name": "when", "type": "a.When" },
            { "name": "same", "type": "a.Same" },
            { "name": "bad", "type": "String", "annotations": [ adapted_by("a.PointAdapter") ] },
            { "name": "count", "type": "int", "annotations": [ adapted_by("a.PointAdapter") ] },
            { "name": "wrong", "type": "a.Money", "annotations": [ adapted_by("a.NotAdapter") ] },
            { "name": "temp", "type": "a.Celsius" },
            { "name": "ping", "type": "a.Ping" }
        ] }
    ]))
}
