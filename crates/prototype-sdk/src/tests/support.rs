//! Shapes and helpers shared by the crate's unit and behaviour tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::prototype::Prototype;
use crate::protocol::MessageResponse;
use crate::registry::{Message, ObjectDef};
use crate::schema::{Schema, Shape};

/// Object shape with one mandatory and one optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SimpleObject {
    pub(crate) foo: String,
    pub(crate) bar: i64,
}

impl Shape for SimpleObject {
    fn schema() -> Schema {
        Schema::builder("SimpleObject")
            .required("foo")
            .optional("bar")
            .build()
    }
}

/// Request shape with one mandatory field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SimpleParams {
    pub(crate) baz: String,
}

impl Shape for SimpleParams {
    fn schema() -> Schema {
        Schema::builder("SimpleParams").required("baz").build()
    }
}

/// Object shape overlapping [`SimpleObject`] with an extra optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct LooseObject {
    pub(crate) foo: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) qux: String,
}

impl Shape for LooseObject {
    fn schema() -> Schema {
        Schema::builder("LooseObject")
            .required("foo")
            .optional("qux")
            .build()
    }
}

/// Object shape whose validation hook accepts only powers of ten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PowerOfTen {
    pub(crate) power_of_ten: u64,
}

impl Shape for PowerOfTen {
    fn schema() -> Schema {
        Schema::builder("PowerOfTen").optional("power_of_ten").build()
    }

    fn validate(&self) -> Result<(), String> {
        if is_power_of_ten(self.power_of_ten) {
            Ok(())
        } else {
            Err(format!("{} is not a power of ten", self.power_of_ten))
        }
    }
}

fn is_power_of_ten(number: u64) -> bool {
    number
        .to_string()
        .strip_prefix('1')
        .is_some_and(|zeros| zeros.chars().all(|digit| digit == '0'))
}

/// Object shape holding a nested shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Wrapper {
    pub(crate) inner: Option<SimpleObject>,
    pub(crate) label: String,
}

impl Shape for Wrapper {
    fn schema() -> Schema {
        Schema::builder("Wrapper")
            .nested("inner", SimpleObject::schema())
            .required("label")
            .build()
    }
}

/// Shape with only optional fields, held by [`Envelope`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Note {
    pub(crate) note: String,
    pub(crate) pinned: bool,
}

impl Shape for Note {
    fn schema() -> Schema {
        Schema::builder("Note")
            .optional("note")
            .optional("pinned")
            .build()
    }
}

/// Object shape whose nested shape is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Envelope {
    pub(crate) inner: Note,
}

impl Shape for Envelope {
    fn schema() -> Schema {
        Schema::builder("Envelope")
            .required_nested("inner", Note::schema())
            .build()
    }
}

/// Shared log of handler invocations.
pub(crate) type CallLog = Rc<RefCell<Vec<String>>>;

/// Builds a JSON object from a `json!` literal.
pub(crate) fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be a JSON object, got {other}"),
    }
}

/// Registers `SimpleObject` with `m1` (no request) and `m2` (`SimpleParams`).
pub(crate) fn simple_prototype(calls: &CallLog) -> Prototype {
    let m1_calls = Rc::clone(calls);
    let m2_calls = Rc::clone(calls);
    Prototype::builder()
        .icon("mdi:test-tube")
        .object(
            ObjectDef::<SimpleObject>::new()
                .message(Message::new("m1", move |object: &SimpleObject| {
                    m1_calls.borrow_mut().push(format!("m1:{}", object.foo));
                    Ok(Vec::new())
                }))
                .message(Message::with_request(
                    "m2",
                    move |object: &SimpleObject, request: &SimpleParams| {
                        m2_calls
                            .borrow_mut()
                            .push(format!("m2:{}:{}", object.foo, request.baz));
                        Ok(vec![MessageResponse::new(&serde_json::json!({
                            "echo": request.baz,
                        }))?])
                    },
                )),
        )
        .build()
        .expect("simple prototype registers")
}

/// Registers two overlapping shapes that both declare `message`.
pub(crate) fn overlapping_prototype(message: &str, calls: &CallLog) -> Prototype {
    let simple_calls = Rc::clone(calls);
    let loose_calls = Rc::clone(calls);
    Prototype::builder()
        .object(ObjectDef::<SimpleObject>::new().message(Message::new(
            message,
            move |_: &SimpleObject| {
                simple_calls.borrow_mut().push(String::from("SimpleObject"));
                Ok(Vec::new())
            },
        )))
        .object(ObjectDef::<LooseObject>::new().message(Message::new(
            message,
            move |_: &LooseObject| {
                loose_calls.borrow_mut().push(String::from("LooseObject"));
                Ok(Vec::new())
            },
        )))
        .build()
        .expect("overlapping prototype registers")
}
