//! Platform library: the declarations every model can reference without declaring
//! them (java.lang, java.util collections and maps, java.math, java.time, the
//! javax.xml value types and the adapter base classes).
use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub const OBJECT: &str = "java.lang.Object";

fn class(name: &str) -> Value {
    json!({ "kind": "class", "name": name })
}

fn extends(name: &str, superclass: &str) -> Value {
    json!({ "kind": "class", "name": name, "superclass": superclass })
}

pub static PLATFORM_DOCUMENT: Lazy<Value> = Lazy::new(|| {
    let mut decls = vec![
        json!({ "kind": "class", "name": OBJECT }),
        class("java.lang.String"),
        class("java.lang.Boolean"),
        class("java.lang.Character"),
        json!({ "kind": "class", "name": "java.lang.Number", "abstract": true }),
        extends("java.lang.Byte", "java.lang.Number"),
        extends("java.lang.Short", "java.lang.Number"),
        extends("java.lang.Integer", "java.lang.Number"),
        extends("java.lang.Long", "java.lang.Number"),
        extends("java.lang.Float", "java.lang.Number"),
        extends("java.lang.Double", "java.lang.Number"),
        extends("java.math.BigInteger", "java.lang.Number"),
        extends("java.math.BigDecimal", "java.lang.Number"),
        json!({ "kind": "class", "name": "java.lang.Class", "type_parameters": ["T"] }),
        json!({ "kind": "interface", "name": "java.io.Serializable" }),
        json!({ "kind": "interface", "name": "java.lang.Iterable", "type_parameters": ["T"] }),
        json!({ "kind": "interface", "name": "java.lang.Comparable", "type_parameters": ["T"] }),
        // collections
        json!({ "kind": "interface", "name": "java.util.Collection", "type_parameters": ["E"],
                "interfaces": ["java.lang.Iterable<E>"] }),
        json!({ "kind": "interface", "name": "java.util.List", "type_parameters": ["E"],
                "interfaces": ["java.util.Collection<E>"] }),
        json!({ "kind": "interface", "name": "java.util.Set", "type_parameters": ["E"],
                "interfaces": ["java.util.Collection<E>"] }),
        json!({ "kind": "interface", "name": "java.util.SortedSet", "type_parameters": ["E"],
                "interfaces": ["java.util.Set<E>"] }),
        json!({ "kind": "interface", "name": "java.util.Queue", "type_parameters": ["E"],
                "interfaces": ["java.util.Collection<E>"] }),
        json!({ "kind": "class", "name": "java.util.AbstractCollection", "type_parameters": ["E"],
                "abstract": true, "interfaces": ["java.util.Collection<E>"] }),
        json!({ "kind": "class", "name": "java.util.AbstractList", "type_parameters": ["E"],
                "abstract": true, "superclass": "java.util.AbstractCollection<E>",
                "interfaces": ["java.util.List<E>"] }),
        json!({ "kind": "class", "name": "java.util.ArrayList", "type_parameters": ["E"],
                "superclass": "java.util.AbstractList<E>",
                "interfaces": ["java.util.List<E>", "java.io.Serializable"] }),
        json!({ "kind": "class", "name": "java.util.LinkedList", "type_parameters": ["E"],
                "superclass": "java.util.AbstractList<E>",
                "interfaces": ["java.util.List<E>", "java.util.Queue<E>"] }),
        json!({ "kind": "class", "name": "java.util.HashSet", "type_parameters": ["E"],
                "superclass": "java.util.AbstractCollection<E>",
                "interfaces": ["java.util.Set<E>"] }),
        json!({ "kind": "class", "name": "java.util.TreeSet", "type_parameters": ["E"],
                "superclass": "java.util.AbstractCollection<E>",
                "interfaces": ["java.util.SortedSet<E>"] }),
        // maps
        json!({ "kind": "interface", "name": "java.util.Map", "type_parameters": ["K", "V"] }),
        json!({ "kind": "interface", "name": "java.util.SortedMap", "type_parameters": ["K", "V"],
                "interfaces": ["java.util.Map<K, V>"] }),
        json!({ "kind": "class", "name": "java.util.AbstractMap", "type_parameters": ["K", "V"],
                "abstract": true, "interfaces": ["java.util.Map<K, V>"] }),
        json!({ "kind": "class", "name": "java.util.HashMap", "type_parameters": ["K", "V"],
                "superclass": "java.util.AbstractMap<K, V>",
                "interfaces": ["java.util.Map<K, V>"] }),
        json!({ "kind": "class", "name": "java.util.LinkedHashMap", "type_parameters": ["K", "V"],
                "superclass": "java.util.HashMap<K, V>" }),
        json!({ "kind": "class", "name": "java.util.TreeMap", "type_parameters": ["K", "V"],
                "superclass": "java.util.AbstractMap<K, V>",
                "interfaces": ["java.util.SortedMap<K, V>"] }),
        // values
        class("java.util.Date"),
        json!({ "kind": "class", "name": "java.util.Calendar", "abstract": true }),
        extends("java.util.GregorianCalendar", "java.util.Calendar"),
        class("java.util.UUID"),
        class("java.net.URI"),
        class("java.net.URL"),
        extends("java.sql.Timestamp", "java.util.Date"),
        class("java.time.LocalDate"),
        class("java.time.LocalTime"),
        class("java.time.LocalDateTime"),
        class("java.time.OffsetDateTime"),
        class("java.time.ZonedDateTime"),
        class("java.time.Instant"),
        class("java.nio.ByteBuffer"),
        class("javax.xml.namespace.QName"),
        json!({ "kind": "class", "name": "javax.xml.datatype.Duration", "abstract": true }),
        json!({ "kind": "class", "name": "javax.xml.datatype.XMLGregorianCalendar",
                "abstract": true }),
        json!({ "kind": "class", "name": "javax.xml.bind.JAXBElement",
                "type_parameters": ["T"] }),
        json!({ "kind": "class", "name": "jakarta.xml.bind.JAXBElement",
                "type_parameters": ["T"] }),
    ];
    for pkg in ["javax", "jakarta"] {
        decls.push(json!({
            "kind": "class",
            "name": format!("{pkg}.xml.bind.annotation.adapters.XmlAdapter"),
            "type_parameters": ["ValueType", "BoundType"],
            "abstract": true,
        }));
    }
    json!({ "declarations": decls })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_names_are_unique() {
        let decls = PLATFORM_DOCUMENT["declarations"].as_array().unwrap();
        let mut names: Vec<&str> = decls.iter().map(|d| d["name"].as_str().unwrap()).collect();
        let n = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), n);
    }
}
