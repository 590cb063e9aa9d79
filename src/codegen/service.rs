//! RPC service generation
//!
//! Each table contributes five methods whose request and response types are
//! members of its message family.

use super::message::{Message, Variant};
use super::INDENT;
use std::fmt;

/// One `rpc` line of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcMethod {
    /// Method name
    pub name: String,
    /// Request message name
    pub request: String,
    /// Response message name
    pub response: String,
    /// Comment line above the method
    pub comment: String,
}

/// Methods generated for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodGroup {
    /// Table comment, used as the group banner
    pub comment: String,
    /// Insert, Update, Delete, SelectById, SelectList
    pub methods: Vec<RpcMethod>,
}

impl MethodGroup {
    /// Build the CRUD methods for a base message
    pub fn for_message(message: &Message) -> Self {
        let base = &message.name;
        let c = &message.comment;
        let method = |name: String, req: Variant, resp: Variant, comment: String| RpcMethod {
            name,
            request: req.message_name(base),
            response: resp.message_name(base),
            comment,
        };

        Self {
            comment: c.clone(),
            methods: vec![
                method(
                    format!("Insert{}", base),
                    Variant::AddReq,
                    Variant::AddResp,
                    format!("create {}", c),
                ),
                method(
                    format!("Update{}", base),
                    Variant::UpdateReq,
                    Variant::UpdateResp,
                    format!("update {}", c),
                ),
                method(
                    format!("Delete{}", base),
                    Variant::DeleteReq,
                    Variant::DeleteResp,
                    format!("delete {} by id", c),
                ),
                method(
                    format!("Select{}ById", base),
                    Variant::SelectByIdReq,
                    Variant::SelectByIdResp,
                    format!("get {} by id", c),
                ),
                method(
                    format!("Select{}List", base),
                    Variant::SelectListReq,
                    Variant::SelectListResp,
                    format!("list {}", c),
                ),
            ],
        }
    }
}

/// The generated `service` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Service name
    pub name: String,
    /// Method groups, one per table in arrival order
    pub groups: Vec<MethodGroup>,
}

impl Service {
    /// Build the service for a set of base messages
    pub fn new(name: impl Into<String>, messages: &[Message]) -> Self {
        Self {
            name: name.into(),
            groups: messages.iter().map(MethodGroup::for_message).collect(),
        }
    }

    /// All methods, flattened in declaration order
    pub fn methods(&self) -> impl Iterator<Item = &RpcMethod> {
        self.groups.iter().flat_map(|g| g.methods.iter())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "service {} {{", self.name)?;
        for group in &self.groups {
            writeln!(
                f,
                "{}//-----------------------{}-----------------------",
                INDENT, group.comment
            )?;
            for m in &group.methods {
                writeln!(f)?;
                writeln!(f, "{}// {}", INDENT, m.comment)?;
                writeln!(
                    f,
                    "{}rpc {}({}) returns ({});",
                    INDENT, m.name, m.request, m.response
                )?;
            }
            writeln!(f)?;
        }
        writeln!(f, "}}")
    }
}
