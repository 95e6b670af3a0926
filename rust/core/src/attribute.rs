// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded attribute values and records

use crate::parser::Token;
use crate::schema::IfcType;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference
    EntityRef(u32),
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Enum value, without the surrounding dots
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Typed value such as IFCLENGTHMEASURE(2.5)
    Typed(String, Vec<AttributeValue>),
    /// Null/undefined
    Null,
    /// Derived value (*)
    Derived,
}

impl AttributeValue {
    /// Convert from Token
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(s.replace("''", "'")),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => AttributeValue::List(items.iter().map(Self::from_token).collect()),
            Token::TypedValue(name, args) => AttributeValue::Typed(
                name.to_string(),
                args.iter().map(Self::from_token).collect(),
            ),
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    /// Get as entity reference
    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Get as string
    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as enum value
    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Get a STEP boolean (.T. / .F.); .U. and anything else is None
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_enum()? {
            "T" | "TRUE" => Some(true),
            "F" | "FALSE" => Some(false),
            _ => None,
        }
    }

    /// Get as float; typed measures unwrap to their single argument
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Typed(_, args) if args.len() == 1 => args[0].as_float(),
            _ => None,
        }
    }

    /// Get as list
    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }

    /// Read a coordinate list of 2 or 3 numbers; 2D points get z = 0
    pub fn as_coordinates(&self) -> Option<(f64, f64, f64)> {
        let coords = self.as_list()?;
        match coords.len() {
            2 => Some((coords[0].as_float()?, coords[1].as_float()?, 0.0)),
            3 => Some((
                coords[0].as_float()?,
                coords[1].as_float()?,
                coords[2].as_float()?,
            )),
            _ => None,
        }
    }
}

/// Decoded IFC entity with attributes
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntity {
    pub id: u32,
    pub ifc_type: IfcType,
    /// Keyword as written in the file, kept for diagnostics on unknown types
    pub type_name: String,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    /// Create new decoded entity
    pub fn new(id: u32, type_name: &str, attributes: Vec<AttributeValue>) -> Self {
        let type_name = type_name.to_ascii_uppercase();
        Self {
            id,
            ifc_type: IfcType::from_name(&type_name),
            type_name,
            attributes,
        }
    }

    /// Get attribute by index
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Get entity reference attribute
    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// Get boolean attribute
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        self.get(index).and_then(|v| v.as_bool())
    }

    /// Get list attribute
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_conversion() {
        let attr = AttributeValue::from_token(&Token::EntityRef(123));
        assert_eq!(attr.as_entity_ref(), Some(123));

        let attr = AttributeValue::from_token(&Token::String("it''s"));
        assert_eq!(attr.as_string(), Some("it's"));

        let attr = AttributeValue::from_token(&Token::Enum("F"));
        assert_eq!(attr.as_bool(), Some(false));
        assert_eq!(AttributeValue::Enum("U".into()).as_bool(), None);

        let attr = AttributeValue::from_token(&Token::TypedValue(
            "IFCLENGTHMEASURE",
            vec![Token::Float(2.5)],
        ));
        assert_eq!(attr.as_float(), Some(2.5));
    }

    #[test]
    fn test_coordinates() {
        let pt = AttributeValue::List(vec![AttributeValue::Float(1.0), AttributeValue::Integer(2)]);
        assert_eq!(pt.as_coordinates(), Some((1.0, 2.0, 0.0)));

        let bad = AttributeValue::List(vec![AttributeValue::Float(1.0)]);
        assert_eq!(bad.as_coordinates(), None);
    }

    #[test]
    fn test_decoded_entity() {
        let entity = DecodedEntity::new(
            1,
            "IfcOrientedEdge",
            vec![
                AttributeValue::Derived,
                AttributeValue::Derived,
                AttributeValue::EntityRef(2),
                AttributeValue::Enum("T".to_string()),
            ],
        );

        assert_eq!(entity.ifc_type, IfcType::IfcOrientedEdge);
        assert_eq!(entity.type_name, "IFCORIENTEDEDGE");
        assert!(entity.get(0).unwrap().is_null());
        assert_eq!(entity.get_ref(2), Some(2));
        assert_eq!(entity.get_bool(3), Some(true));
    }
}
