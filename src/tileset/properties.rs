use std::fmt;
use derive_more::*;
use roxmltree::Node;
use crate::TsxParseError;

/// Raw contents of a Tiled `<properties>` element, in document order.
#[derive(Clone, PartialEq, Default, Debug, Deref)]
pub struct Properties(Vec<Property>);

impl Properties {

    pub fn new(properties: Vec<Property>) -> Self {
        Self(properties)
    }

    pub fn parse(properties_node: Node) -> Result<Self, TsxParseError> {
        let mut properties: Vec<Property> = Vec::new();
        for child in properties_node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "property" => {
                    let property = Property::parse(child)?;
                    if properties.iter().any(|existing| existing.name == property.name) {
                        return Err(TsxParseError::DuplicateProperty { name: property.name });
                    }
                    properties.push(property);
                },
                tag_name => log::warn!("Ignoring unexpected tag '{tag_name}' in <properties>"),
            }
        }
        Ok(Self(properties))
    }

    /// Value of the property with the given name. Names are unique within a list.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0
            .iter()
            .find(|property| property.name == name)
            .map(|property| &property.value)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn parse(property_node: Node) -> Result<Self, TsxParseError> {
        let name = property_node
            .attribute("name")
            .ok_or_else(|| TsxParseError::MissingAttributeError {
                tag_name: String::from("property"),
                attribute: String::from("name"),
            })?;
        let property_type = property_node.attribute("type").unwrap_or("string");

        // Multi-line strings are stored as text instead of in the value attribute
        let value = property_node
            .attribute("value")
            .or_else(|| property_node.text())
            .unwrap_or("");

        let value = match property_type {
            "string" => PropertyValue::String(String::from(value)),
            "int" => PropertyValue::Int(value.parse()?),
            "float" => PropertyValue::Float(value.parse()?),
            "bool" => PropertyValue::Bool(value.parse()?),
            "color" => PropertyValue::Color(String::from(value)),
            "file" => PropertyValue::File(String::from(value)),
            "object" => PropertyValue::Object(if value.is_empty() { 0 } else { value.parse()? }),
            "class" => {
                let properties = property_node
                    .children()
                    .find(|child| child.has_tag_name("properties"))
                    .map(Properties::parse)
                    .transpose()?
                    .unwrap_or_default();
                PropertyValue::Class {
                    property_type: String::from(property_node.attribute("propertytype").unwrap_or("")),
                    properties,
                }
            },
            _ => return Err(TsxParseError::UnknownPropertyType { property_type: String::from(property_type) }),
        };
        Ok(Self { name: String::from(name), value })
    }
}

/// Typed value of a single property.
#[derive(Clone, PartialEq, Debug)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Color in #AARRGGBB or #RRGGBB form. Empty if unset.
    Color(String),
    File(String),
    /// ID of a referenced object. 0 when unset.
    Object(u32),
    Class {
        property_type: String,
        properties: Properties,
    },
}

impl PropertyValue {

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Name of the type as written in a tsx file.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Color(_) => "color",
            Self::File(_) => "file",
            Self::Object(_) => "object",
            Self::Class { .. } => "class",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) | Self::Color(value) | Self::File(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Object(id) => write!(f, "object#{id}"),
            Self::Class { property_type, properties } => {
                write!(f, "{property_type} {{")?;
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 { write!(f, ",")? }
                    write!(f, " {}: {}", property.name, property.value)?;
                }
                write!(f, " }}")
            },
        }
    }
}

/// The typed tile metadata understood by the game.
/// Every field is optional since tiles only carry what they need.
#[derive(Clone, Eq, PartialEq, Default, Debug)]
pub struct TileProperties {
    /// Animation frame duration in milliseconds.
    pub delay: Option<u32>,
    /// Whether the delay should be jittered each time it's used.
    pub scramble_delay: Option<bool>,
    /// Entity this tile is a frame of.
    pub entity: Option<String>,
    /// Position of this tile in its entity's animation.
    pub keyframe: Option<u32>,
    /// Entity type to instantiate where this tile is placed.
    pub spawn: Option<String>,
    pub visible: Option<bool>,
}

impl TileProperties {

    /// Extracts known keys from raw properties.
    /// Unknown keys are left alone, known keys of the wrong type are an error.
    pub fn from_properties(properties: &Properties) -> Result<Self, TsxParseError> {
        let mut result = Self::default();
        for property in properties.iter() {
            let name = property.name.as_str();
            let value = &property.value;
            match name {
                "delay" => result.delay = Some(non_negative(name, value)?),
                "keyframe" => result.keyframe = Some(non_negative(name, value)?),
                "scramble_delay" => result.scramble_delay = Some(value.as_bool().ok_or_else(|| type_error(name, "a bool"))?),
                "visible" => result.visible = Some(value.as_bool().ok_or_else(|| type_error(name, "a bool"))?),
                "entity" => result.entity = Some(String::from(value.as_str().ok_or_else(|| type_error(name, "a string"))?)),
                "spawn" => result.spawn = Some(String::from(value.as_str().ok_or_else(|| type_error(name, "a string"))?)),
                _ => log::debug!("Keeping unrecognized property '{name}' as raw"),
            }
        }
        Ok(result)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Tiles are rendered unless told otherwise.
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn is_scrambled(&self) -> bool {
        self.scramble_delay.unwrap_or(false)
    }
}

impl fmt::Display for TileProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(entity) = &self.entity { parts.push(format!("entity={entity}")) }
        if let Some(keyframe) = self.keyframe { parts.push(format!("keyframe={keyframe}")) }
        if let Some(delay) = self.delay { parts.push(format!("delay={delay}ms")) }
        if let Some(scramble_delay) = self.scramble_delay { parts.push(format!("scramble_delay={scramble_delay}")) }
        if let Some(spawn) = &self.spawn { parts.push(format!("spawn={spawn}")) }
        if let Some(visible) = self.visible { parts.push(format!("visible={visible}")) }
        write!(f, "{}", parts.join(" "))
    }
}

fn non_negative(name: &str, value: &PropertyValue) -> Result<u32, TsxParseError> {
    value
        .as_int()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| type_error(name, "a non-negative int"))
}

fn type_error(name: &str, expected: &'static str) -> TsxParseError {
    TsxParseError::PropertyType { name: String::from(name), expected }
}

#[cfg(test)]
mod test {
    use roxmltree::Document;
    use crate::{Properties, PropertyValue, TileProperties, TsxParseError};

    fn parse(xml: &str) -> Result<Properties, TsxParseError> {
        let doc = Document::parse(xml)?;
        Properties::parse(doc.root_element())
    }

    #[test]
    fn typed_values() {
        let properties = parse(r##"<properties>
            <property name="delay" type="int" value="100"/>
            <property name="scramble_delay" type="bool" value="true"/>
            <property name="entity" value="flame"/>
            <property name="speed" type="float" value="1.5"/>
            <property name="tint" type="color" value="#ff00ff00"/>
            <property name="target" type="object" value="12"/>
            <property name="notes">first line
second line</property>
        </properties>"##).unwrap();
        assert_eq!(7, properties.len());
        assert_eq!(Some(&PropertyValue::Int(100)), properties.get("delay"));
        assert_eq!(Some(&PropertyValue::Bool(true)), properties.get("scramble_delay"));
        assert_eq!(Some("flame"), properties.get("entity").and_then(PropertyValue::as_str));
        assert_eq!(Some(&PropertyValue::Float(1.5)), properties.get("speed"));
        assert_eq!(Some(&PropertyValue::Color(String::from("#ff00ff00"))), properties.get("tint"));
        assert_eq!(Some(&PropertyValue::Object(12)), properties.get("target"));
        assert_eq!(Some("first line\nsecond line"), properties.get("notes").and_then(PropertyValue::as_str));
        assert_eq!(None, properties.get("missing"));
        assert_eq!(Some("float"), properties.get("speed").map(PropertyValue::type_name));
        assert_eq!("object#12", properties.get("target").unwrap().to_string());
    }

    #[test]
    fn class_values() {
        let properties = parse(r#"<properties>
            <property name="loot" type="class" propertytype="Drop">
             <properties>
              <property name="amount" type="int" value="3"/>
             </properties>
            </property>
        </properties>"#).unwrap();
        let Some(PropertyValue::Class { property_type, properties }) = properties.get("loot") else {
            panic!("Expected class value");
        };
        assert_eq!("Drop", property_type);
        assert_eq!(Some(&PropertyValue::Int(3)), properties.get("amount"));
    }

    #[test]
    fn bad_values() {
        assert!(matches!(
            parse(r#"<properties><property name="delay" type="int" value="soon"/></properties>"#),
            Err(TsxParseError::ParseIntError(_))
        ));
        assert!(matches!(
            parse(r#"<properties><property name="visible" type="bool" value="yes"/></properties>"#),
            Err(TsxParseError::ParseBoolError(_))
        ));
        assert!(matches!(
            parse(r#"<properties><property name="x" type="vec2" value="1,2"/></properties>"#),
            Err(TsxParseError::UnknownPropertyType { .. })
        ));
        assert!(matches!(
            parse(r#"<properties><property value="nameless"/></properties>"#),
            Err(TsxParseError::MissingAttributeError { .. })
        ));
    }

    #[test]
    fn duplicate_names() {
        let result = parse(r#"<properties>
            <property name="delay" type="int" value="100"/>
            <property name="delay" type="int" value="250"/>
        </properties>"#);
        assert!(matches!(result, Err(TsxParseError::DuplicateProperty { name }) if name == "delay"));

        // Nested class members form their own list
        let properties = parse(r#"<properties>
            <property name="delay" type="int" value="100"/>
            <property name="loot" type="class" propertytype="Drop">
             <properties><property name="delay" type="int" value="5"/></properties>
            </property>
        </properties>"#).unwrap();
        assert_eq!(Some(&PropertyValue::Int(100)), properties.get("delay"));
    }

    #[test]
    fn tile_properties() {
        let properties = parse(r#"<properties>
            <property name="delay" type="int" value="100"/>
            <property name="entity" value="player-top"/>
            <property name="keyframe" type="int" value="1"/>
            <property name="sound" value="step.ogg"/>
        </properties>"#).unwrap();
        let tile_properties = TileProperties::from_properties(&properties).unwrap();
        assert_eq!(Some(100), tile_properties.delay);
        assert_eq!(Some("player-top"), tile_properties.entity.as_deref());
        assert_eq!(Some(1), tile_properties.keyframe);
        assert_eq!(None, tile_properties.spawn);
        assert!(tile_properties.is_visible());
        assert!(!tile_properties.is_scrambled());
        assert_eq!("entity=player-top keyframe=1 delay=100ms", tile_properties.to_string());
    }

    #[test]
    fn tile_properties_wrong_type() {
        let properties = parse(r#"<properties><property name="delay" value="100"/></properties>"#).unwrap();
        assert!(matches!(
            TileProperties::from_properties(&properties),
            Err(TsxParseError::PropertyType { expected: "a non-negative int", .. })
        ));
        let properties = parse(r#"<properties><property name="keyframe" type="int" value="-1"/></properties>"#).unwrap();
        assert!(TileProperties::from_properties(&properties).is_err());
        let properties = parse(r#"<properties><property name="visible" value="false"/></properties>"#).unwrap();
        assert!(TileProperties::from_properties(&properties).is_err());
    }

    #[test]
    fn empty_tile_properties() {
        let tile_properties = TileProperties::from_properties(&Properties::default()).unwrap();
        assert!(tile_properties.is_empty());
    }
}
