//! Descriptor sets assembled in-test with prost-types

#![allow(dead_code)]

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MessageOptions,
};

use schema_marshal::{Record, Value};

fn json_name(name: &str) -> String {
    let mut out = String::new();
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn field(name: &str, number: i32, label: Label, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(String::from),
        json_name: Some(json_name(name)),
        ..Default::default()
    }
}

fn optional(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    field(name, number, Label::Optional, ty, None)
}

fn repeated(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    field(name, number, Label::Repeated, ty, None)
}

fn enum_value(name: &str, number: i32) -> EnumValueDescriptorProto {
    EnumValueDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        ..Default::default()
    }
}

/// proto2 file `sample.proto`, package `test`:
///
/// ```text
/// enum Color { RED = 0; GREEN = 1; BLUE = 2; }
/// message Inner { optional int32 id = 1; optional string label = 2; }
/// message Sample {
///   optional int32 small_int = 1;   optional uint32 small_uint = 2;
///   optional int64 big_int = 3;     optional uint64 big_uint = 4;
///   optional float ratio = 5;       optional double precise = 6;
///   optional bool flag = 7;         optional string text = 8;
///   optional bytes blob = 9;        optional Color color = 10;
///   optional Inner inner = 11;      repeated Inner items = 12;
///   repeated int64 big_numbers = 13; repeated string tags = 14;
///   optional sint64 zigzag = 15;    optional fixed64 fixed = 16;
///   repeated Color colors = 17;     map<string, int32> counts = 18;
///   optional Sample child = 19;
/// }
/// ```
pub fn sample_file() -> FileDescriptorProto {
    let color = EnumDescriptorProto {
        name: Some("Color".to_string()),
        value: vec![enum_value("RED", 0), enum_value("GREEN", 1), enum_value("BLUE", 2)],
        ..Default::default()
    };

    let inner = DescriptorProto {
        name: Some("Inner".to_string()),
        field: vec![optional("id", 1, Type::Int32), optional("label", 2, Type::String)],
        ..Default::default()
    };

    let counts_entry = DescriptorProto {
        name: Some("CountsEntry".to_string()),
        field: vec![optional("key", 1, Type::String), optional("value", 2, Type::Int32)],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    };

    let sample = DescriptorProto {
        name: Some("Sample".to_string()),
        field: vec![
            optional("small_int", 1, Type::Int32),
            optional("small_uint", 2, Type::Uint32),
            optional("big_int", 3, Type::Int64),
            optional("big_uint", 4, Type::Uint64),
            optional("ratio", 5, Type::Float),
            optional("precise", 6, Type::Double),
            optional("flag", 7, Type::Bool),
            optional("text", 8, Type::String),
            optional("blob", 9, Type::Bytes),
            field("color", 10, Label::Optional, Type::Enum, Some(".test.Color")),
            field("inner", 11, Label::Optional, Type::Message, Some(".test.Inner")),
            field("items", 12, Label::Repeated, Type::Message, Some(".test.Inner")),
            repeated("big_numbers", 13, Type::Int64),
            repeated("tags", 14, Type::String),
            optional("zigzag", 15, Type::Sint64),
            optional("fixed", 16, Type::Fixed64),
            field("colors", 17, Label::Repeated, Type::Enum, Some(".test.Color")),
            field("counts", 18, Label::Repeated, Type::Message, Some(".test.Sample.CountsEntry")),
            field("child", 19, Label::Optional, Type::Message, Some(".test.Sample")),
        ],
        nested_type: vec![counts_entry],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("sample.proto".to_string()),
        package: Some("test".to_string()),
        message_type: vec![inner, sample],
        enum_type: vec![color],
        syntax: Some("proto2".to_string()),
        ..Default::default()
    }
}

/// proto3 file `plain.proto`, package `plain`:
///
/// ```text
/// enum Level { LEVEL_UNSPECIFIED = 0; LEVEL_HIGH = 1; }
/// message Plain { int32 count = 1; string name = 2; Level level = 3; }
/// ```
pub fn plain_file() -> FileDescriptorProto {
    let level = EnumDescriptorProto {
        name: Some("Level".to_string()),
        value: vec![enum_value("LEVEL_UNSPECIFIED", 0), enum_value("LEVEL_HIGH", 1)],
        ..Default::default()
    };

    let plain = DescriptorProto {
        name: Some("Plain".to_string()),
        field: vec![
            optional("count", 1, Type::Int32),
            optional("name", 2, Type::String),
            field("level", 3, Label::Optional, Type::Enum, Some(".plain.Level")),
        ],
        ..Default::default()
    };

    FileDescriptorProto {
        name: Some("plain.proto".to_string()),
        package: Some("plain".to_string()),
        message_type: vec![plain],
        enum_type: vec![level],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

/// Serialized descriptor set holding both test files
pub fn descriptor_set_bytes() -> Vec<u8> {
    FileDescriptorSet {
        file: vec![sample_file(), plain_file()],
    }
    .encode_to_vec()
}

/// Build a record from `(name, value)` pairs
pub fn record<const N: usize>(pairs: [(&str, Value); N]) -> Record {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub fn object<const N: usize>(pairs: [(&str, Value); N]) -> Value {
    Value::Object(record(pairs))
}
