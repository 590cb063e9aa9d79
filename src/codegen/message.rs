//! Message generation
//!
//! A base message holds one field per table column, named after the raw
//! column. Every message of the CRUD family is derived from it by a pure
//! function of the base and a [`Variant`]; the base is never modified.

use super::INDENT;
use crate::naming;
use crate::options::FieldStyle;
use crate::types::ScalarType;
use crate::GeneratorError;
use std::fmt;

/// Columns the default and filter messages leave out
const SOFT_DELETE_COLUMNS: &[&str] = &["version", "del_state", "delete_time"];

/// Columns an add request leaves out
const ADD_EXCLUDED_COLUMNS: &[&str] = &[
    "id",
    "create_at",
    "create_time",
    "update_time",
    "update_at",
    "version",
    "del_state",
    "delete_time",
    "delete_at",
];

/// Columns an update request leaves out
const UPDATE_EXCLUDED_COLUMNS: &[&str] = &[
    "create_time",
    "create_at",
    "update_time",
    "update_at",
    "version",
    "del_state",
    "delete_time",
    "delete_at",
];

/// Type of a message field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A protobuf scalar
    Scalar(ScalarType),
    /// A generated enum, by name
    Enum(String),
    /// A generated message, by name
    Message(String),
}

impl FieldType {
    /// Type name as written in protobuf source
    pub fn name(&self) -> &str {
        match self {
            FieldType::Scalar(scalar) => scalar.as_str(),
            FieldType::Enum(name) | FieldType::Message(name) => name,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    /// proto3 `optional`
    Optional,
    /// `repeated`
    Repeated,
}

impl FieldLabel {
    /// Keyword as written in protobuf source
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLabel::Optional => "optional",
            FieldLabel::Repeated => "repeated",
        }
    }
}

/// A field of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    /// Field type
    pub ty: FieldType,
    /// Optional/repeated marker
    pub label: Option<FieldLabel>,
    /// Field name
    pub name: String,
    /// Field number, unique within the message
    pub tag: u32,
    /// Trailing comment
    pub comment: String,
}

impl MessageField {
    /// Create an unlabeled field
    pub fn new(ty: FieldType, name: impl Into<String>, tag: u32, comment: impl Into<String>) -> Self {
        Self {
            ty,
            label: None,
            name: name.into(),
            tag,
            comment: comment.into(),
        }
    }

    /// Set the field label
    pub fn with_label(mut self, label: FieldLabel) -> Self {
        self.label = Some(label);
        self
    }
}

impl fmt::Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label {
            write!(f, "{} ", label.as_str())?;
        }
        write!(f, "{} {} = {}", self.ty, self.name, self.tag)
    }
}

/// Members of a table's message family, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `M`
    Default,
    /// `MFilter`
    Filter,
    /// `AddMReq`
    AddReq,
    /// `AddMResp`
    AddResp,
    /// `UpdateMReq`
    UpdateReq,
    /// `UpdateMResp`
    UpdateResp,
    /// `DelMReq`
    DeleteReq,
    /// `DelMResp`
    DeleteResp,
    /// `SelectMByIdReq`
    SelectByIdReq,
    /// `SelectMByIdResp`
    SelectByIdResp,
    /// `SelectMListReq`
    SelectListReq,
    /// `SelectMListResp`
    SelectListResp,
}

impl Variant {
    /// Every variant, in render order
    pub const ALL: [Variant; 12] = [
        Variant::Default,
        Variant::Filter,
        Variant::AddReq,
        Variant::AddResp,
        Variant::UpdateReq,
        Variant::UpdateResp,
        Variant::DeleteReq,
        Variant::DeleteResp,
        Variant::SelectByIdReq,
        Variant::SelectByIdResp,
        Variant::SelectListReq,
        Variant::SelectListResp,
    ];

    /// Message name of this variant for base message `base`
    pub fn message_name(&self, base: &str) -> String {
        match self {
            Variant::Default => base.to_string(),
            Variant::Filter => format!("{}Filter", base),
            Variant::AddReq => format!("Add{}Req", base),
            Variant::AddResp => format!("Add{}Resp", base),
            Variant::UpdateReq => format!("Update{}Req", base),
            Variant::UpdateResp => format!("Update{}Resp", base),
            Variant::DeleteReq => format!("Del{}Req", base),
            Variant::DeleteResp => format!("Del{}Resp", base),
            Variant::SelectByIdReq => format!("Select{}ByIdReq", base),
            Variant::SelectByIdResp => format!("Select{}ByIdResp", base),
            Variant::SelectListReq => format!("Select{}ListReq", base),
            Variant::SelectListResp => format!("Select{}ListResp", base),
        }
    }

    /// Columns dropped when the variant copies the base fields, and whether
    /// the copies are optional. `None` for variants with a fixed shape.
    fn column_policy(&self) -> Option<(&'static [&'static str], bool)> {
        match self {
            Variant::Default => Some((SOFT_DELETE_COLUMNS, false)),
            Variant::Filter => Some((SOFT_DELETE_COLUMNS, true)),
            Variant::AddReq => Some((ADD_EXCLUDED_COLUMNS, false)),
            Variant::UpdateReq => Some((UPDATE_EXCLUDED_COLUMNS, true)),
            _ => None,
        }
    }
}

/// A protobuf message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message name
    pub name: String,
    /// Comment, taken from the table comment
    pub comment: String,
    /// Naming style applied to derived variants
    pub style: FieldStyle,
    fields: Vec<MessageField>,
}

impl Message {
    /// Create an empty message
    pub fn new(name: impl Into<String>, comment: impl Into<String>, style: FieldStyle) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            style,
            fields: Vec::new(),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[MessageField] {
        &self.fields
    }

    /// Tag the next appended field would get
    pub fn next_tag(&self) -> u32 {
        self.fields.len() as u32 + 1
    }

    /// Append a field; fails if its tag is already used
    pub fn append_field(&mut self, field: MessageField) -> Result<(), GeneratorError> {
        if let Some(existing) = self.fields.iter().find(|f| f.tag == field.tag) {
            return Err(GeneratorError::DuplicateFieldTag {
                message: self.name.clone(),
                tag: field.tag,
                existing: existing.name.clone(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Derive one member of the message family
    pub fn variant(&self, variant: Variant) -> Message {
        let name = variant.message_name(&self.name);

        let fields = match variant.column_policy() {
            Some((excluded, optional)) => self.copy_columns(excluded, optional),
            None => self.fixed_fields(variant),
        };

        Message {
            name,
            comment: self.comment.clone(),
            style: self.style,
            fields,
        }
    }

    /// Derive the whole family, in render order
    pub fn family(&self) -> Vec<Message> {
        Variant::ALL.iter().map(|v| self.variant(*v)).collect()
    }

    fn copy_columns(&self, excluded: &[&str], optional: bool) -> Vec<MessageField> {
        self.fields
            .iter()
            .filter(|f| !excluded.contains(&f.name.as_str()))
            .enumerate()
            .map(|(i, f)| {
                let name = naming::field_name(&f.name, self.style);
                let comment = if f.comment.is_empty() {
                    name.clone()
                } else {
                    f.comment.clone()
                };
                MessageField {
                    ty: f.ty.clone(),
                    label: if optional { Some(FieldLabel::Optional) } else { f.label },
                    name,
                    tag: i as u32 + 1,
                    comment,
                }
            })
            .collect()
    }

    fn fixed_fields(&self, variant: Variant) -> Vec<MessageField> {
        let int64 = || FieldType::Scalar(ScalarType::Int64);
        let self_field = naming::message_field_name(&self.name, self.style);

        match variant {
            Variant::DeleteReq | Variant::SelectByIdReq => {
                vec![MessageField::new(int64(), "id", 1, "id")]
            }
            Variant::SelectByIdResp => vec![MessageField::new(
                FieldType::Message(self.name.clone()),
                self_field.clone(),
                1,
                self_field,
            )],
            Variant::SelectListReq => {
                let filter = Variant::Filter.message_name(&self.name);
                vec![
                    MessageField::new(int64(), "page", 1, "page number"),
                    MessageField::new(int64(), "page_size", 2, "page size"),
                    MessageField::new(FieldType::Message(filter.clone()), "filter", 3, filter)
                        .with_label(FieldLabel::Optional),
                ]
            }
            Variant::SelectListResp => vec![
                MessageField::new(int64(), "count", 1, "total count"),
                MessageField::new(int64(), "page_count", 2, "total pages"),
                MessageField::new(FieldType::Message(self.name.clone()), "results", 3, self_field)
                    .with_label(FieldLabel::Repeated),
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {} {{", self.name)?;
        for field in &self.fields {
            writeln!(f, "{}{}; //{}", INDENT, field, field.comment)?;
        }
        writeln!(f, "}}")
    }
}
