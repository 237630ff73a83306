//! Well-known atomic types, by qualified name.
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::QName;
use crate::graph::PrimitiveKind;

pub static KNOWN_TYPES: Lazy<IndexMap<&'static str, QName>> = Lazy::new(|| {
    let table: &[(&str, &str)] = &[
        ("java.lang.Boolean", "boolean"),
        ("java.lang.Byte", "byte"),
        ("java.lang.Character", "unsignedShort"),
        ("java.lang.Double", "double"),
        ("java.lang.Float", "float"),
        ("java.lang.Integer", "int"),
        ("java.lang.Long", "long"),
        ("java.lang.Short", "short"),
        ("java.lang.String", "string"),
        ("java.lang.Class", "string"),
        ("java.math.BigInteger", "integer"),
        ("java.math.BigDecimal", "decimal"),
        ("java.util.Calendar", "dateTime"),
        ("java.util.GregorianCalendar", "dateTime"),
        ("java.util.Date", "dateTime"),
        ("java.sql.Timestamp", "dateTime"),
        ("java.util.UUID", "string"),
        ("java.net.URI", "string"),
        ("java.nio.ByteBuffer", "base64Binary"),
        ("java.time.LocalDate", "date"),
        ("java.time.LocalTime", "time"),
        ("java.time.LocalDateTime", "dateTime"),
        ("java.time.OffsetDateTime", "dateTime"),
        ("java.time.ZonedDateTime", "dateTime"),
        ("java.time.Instant", "dateTime"),
        ("javax.xml.namespace.QName", "QName"),
        ("javax.xml.datatype.Duration", "duration"),
        ("javax.xml.datatype.XMLGregorianCalendar", "dateTime"),
    ];
    table.iter().map(|(java, xsd)| (*java, QName::xsd(xsd))).collect()
});

/// `byte[]`.
pub fn binary() -> QName {
    QName::xsd("base64Binary")
}

/// `char` has no schema primitive of its own.
pub fn primitive_atomic(kind: PrimitiveKind) -> Option<QName> {
    match kind {
        PrimitiveKind::Char => Some(QName::xsd("unsignedShort")),
        _ => None,
    }
}
