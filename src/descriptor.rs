//! Descriptor export
//!
//! Converts a [`Schema`] into a `FileDescriptorProto`, the structure protoc
//! plugins consume. Field types are resolved through the schema's enum map:
//! a name registered as an enum becomes `TYPE_ENUM`, every other generated
//! name is a message.

use crate::codegen::{FieldLabel, FieldType, Message, MessageField};
use crate::schema::Schema;
use crate::types::ScalarType;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileOptions, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto,
};
use tracing::debug;

impl Schema {
    /// Build the file descriptor for this schema
    pub fn to_file_descriptor(&self) -> FileDescriptorProto {
        let message_type = self
            .messages()
            .iter()
            .flat_map(Message::family)
            .map(|m| self.message_descriptor(&m))
            .collect();

        let enum_type = self
            .enums()
            .iter()
            .map(|e| EnumDescriptorProto {
                name: Some(e.name.clone()),
                value: e
                    .fields()
                    .iter()
                    .map(|f| EnumValueDescriptorProto {
                        name: Some(f.name().to_string()),
                        number: Some(f.tag()),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            })
            .collect();

        let service = self.service();
        let method = service
            .methods()
            .map(|m| MethodDescriptorProto {
                name: Some(m.name.clone()),
                input_type: Some(self.qualify(&m.request)),
                output_type: Some(self.qualify(&m.response)),
                ..Default::default()
            })
            .collect();

        FileDescriptorProto {
            name: Some(format!("{}.proto", self.package.replace('.', "/"))),
            package: Some(self.package.clone()),
            dependency: self.imports().map(str::to_string).collect(),
            message_type,
            enum_type,
            service: vec![ServiceDescriptorProto {
                name: Some(service.name.clone()),
                method,
                ..Default::default()
            }],
            options: Some(FileOptions {
                go_package: Some(self.go_package.clone()),
                ..Default::default()
            }),
            syntax: Some(self.syntax.clone()),
            ..Default::default()
        }
    }

    fn message_descriptor(&self, message: &Message) -> DescriptorProto {
        let mut desc = DescriptorProto {
            name: Some(message.name.clone()),
            ..Default::default()
        };

        for field in message.fields() {
            let mut fd = self.field_descriptor(field);

            // proto3 `optional` is modelled as a synthetic oneof named `_<field>`
            if field.label == Some(FieldLabel::Optional) {
                fd.proto3_optional = Some(true);
                fd.oneof_index = Some(desc.oneof_decl.len() as i32);
                desc.oneof_decl.push(OneofDescriptorProto {
                    name: Some(format!("_{}", field.name)),
                    ..Default::default()
                });
            }

            desc.field.push(fd);
        }

        desc
    }

    fn field_descriptor(&self, field: &MessageField) -> FieldDescriptorProto {
        let (ty, type_name) = self.resolve_type(&field.ty);
        let label = match field.label {
            Some(FieldLabel::Repeated) => Label::Repeated,
            _ => Label::Optional,
        };

        FieldDescriptorProto {
            name: Some(field.name.clone()),
            number: Some(field.tag as i32),
            label: Some(label.into()),
            r#type: Some(ty.into()),
            type_name,
            ..Default::default()
        }
    }

    fn resolve_type(&self, ty: &FieldType) -> (Type, Option<String>) {
        match ty {
            FieldType::Scalar(scalar) => (scalar_type(*scalar), None),
            FieldType::Enum(name) => match self.enum_by_name(name) {
                Some(e) => (Type::Enum, Some(self.qualify(&e.name))),
                None => {
                    debug!(enum_name = %name, "unregistered enum, exporting as string");
                    (Type::String, None)
                }
            },
            FieldType::Message(name) => (Type::Message, Some(self.qualify(name))),
        }
    }

    fn qualify(&self, name: &str) -> String {
        if self.package.is_empty() {
            format!(".{}", name)
        } else {
            format!(".{}.{}", self.package, name)
        }
    }
}

fn scalar_type(scalar: ScalarType) -> Type {
    match scalar {
        ScalarType::String => Type::String,
        ScalarType::Bytes => Type::Bytes,
        ScalarType::Int64 => Type::Int64,
        ScalarType::Bool => Type::Bool,
        ScalarType::Double => Type::Double,
    }
}
