//! Java types, in the dotted notation used by summaries (`int`,
//! `java.lang.String`, `byte[][]`).

use std::fmt;

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";
pub const JAVA_LANG_STRING: &str = "java.lang.String";
pub const JAVA_LANG_CLONEABLE: &str = "java.lang.Cloneable";
pub const JAVA_IO_SERIALIZABLE: &str = "java.io.Serializable";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JavaType {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Class(String),
    Array(Box<Self>),
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Boolean => write!(f, "boolean"),
            Self::Byte => write!(f, "byte"),
            Self::Char => write!(f, "char"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Class(name) => write!(f, "{name}"),
            Self::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

impl From<&str> for JavaType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl JavaType {
    /// Builds a type from its name. Any name that is not a primitive type
    /// designates a class, known or not.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if let Some(elem) = name.strip_suffix("[]") {
            return Self::Array(Box::new(Self::parse(elem)));
        }
        match name {
            "void" => Self::Void,
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => Self::Class(name.to_string()),
        }
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Byte
                | Self::Char
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }

    /// Class and array types.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Class(_) | Self::Array(_))
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Class(name) if name == JAVA_LANG_OBJECT)
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

/// Checks whether values of the given type can be referenced from several
/// places, i.e. whether it makes sense to look for aliases of them.
///
/// Primitive values are copied and strings are immutable.
pub fn can_type_alias(type_name: &str) -> bool {
    match JavaType::parse(type_name) {
        t if t.is_primitive() => false,
        JavaType::Class(name) => name != JAVA_LANG_STRING,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(JavaType::parse("int"), JavaType::Int);
        assert_eq!(
            JavaType::parse("java.lang.String[][]"),
            JavaType::Array(Box::new(JavaType::Array(Box::new(JavaType::Class(
                JAVA_LANG_STRING.to_string()
            )))))
        );
        assert_eq!(JavaType::parse("byte[]").to_string(), "byte[]");
        assert!(JavaType::parse(JAVA_LANG_OBJECT).is_object());
        assert!(!JavaType::parse("java.lang.Object[]").is_object());
    }

    #[test]
    fn test_element_type() {
        let t = JavaType::parse("char[][]");
        let elem = t.element_type().unwrap();
        assert_eq!(elem.to_string(), "char[]");
        assert_eq!(elem.element_type(), Some(&JavaType::Char));
        assert_eq!(JavaType::Char.element_type(), None);
    }

    #[test]
    fn test_can_type_alias() {
        assert!(!can_type_alias("double"));
        assert!(!can_type_alias("int"));
        assert!(!can_type_alias(JAVA_LANG_STRING));
        assert!(can_type_alias("java.util.List"));
        assert!(can_type_alias("int[]"));
        assert!(can_type_alias("java.lang.String[]"));
    }
}
