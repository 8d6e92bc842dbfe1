use wren_api::interface::{Accepts, Interface};
use wren_api::{interface, Message, Shape};

#[derive(Debug, Clone)]
struct Add(i32, i32);

impl Message for Add {
    type Result = i32;
}

#[derive(Debug, Clone)]
struct Sub(i32, i32);

impl Message for Sub {
    type Result = i32;

    fn name() -> &'static str {
        "Sub"
    }
}

#[derive(Debug, Clone)]
struct Reset;

impl Message for Reset {
    type Result = ();
}

interface! {
    pub Calculator { Add, Sub }
}

interface! {
    Resettable { Reset, }
}

fn accepts<I: Accepts<M>, M: Message>() -> bool {
    true
}

#[test]
fn test_default_message_name_is_type_name() {
    assert!(<Add as Message>::name().ends_with("Add"));
    assert_eq!(<Sub as Message>::name(), "Sub");
}

#[test]
fn test_interface_lists_shapes_in_order() {
    let shapes = Calculator::shapes();

    assert_eq!(shapes, vec![Shape::of::<Add>(), Shape::of::<Sub>()]);
    assert!(!shapes.contains(&Shape::of::<Reset>()));
    assert_eq!(Resettable::shapes(), vec![Shape::of::<Reset>()]);
}

#[test]
fn test_interface_accepts_declared_messages() {
    assert!(accepts::<Calculator, Add>());
    assert!(accepts::<Calculator, Sub>());
    assert!(accepts::<Resettable, Reset>());
}
